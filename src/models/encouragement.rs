//! Struggle log request shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A logged struggle and the encouragement written for it, kept as two fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StruggleLog {
    pub struggle: String,
    /// Encouragement text.
    pub message: String,
    /// Remaining client fields (e.g. `verse`), forwarded untouched.
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub extra: Map<String, Value>,
}

impl StruggleLog {
    /// Build from a raw request body. Both texts are trimmed and must be non-empty.
    pub fn from_body(body: Value) -> Option<Self> {
        let Value::Object(mut fields) = body else {
            return None;
        };

        let struggle = take_text(&mut fields, "struggle")?;
        let message = take_text(&mut fields, "message")?;

        Some(Self {
            struggle,
            message,
            extra: fields,
        })
    }
}

fn take_text(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
