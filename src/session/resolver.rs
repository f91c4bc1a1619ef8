// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Start-up identity resolution.
//!
//! Strategies are tried in order and the first one that yields a user wins.
//! When none does, stale tokens are cleared from the store.

use super::api::AuthApi;
use super::store::TokenStore;
use crate::models::CurrentUser;

/// One way of proving identity to the "who am I" endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// No explicit credential; the transport's session cookie applies.
    AmbientCookie,
    /// The stored access token, sent as a bearer credential.
    StoredBearer,
}

/// Outcome of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Authenticated {
        user: CurrentUser,
        via: ResolveStrategy,
    },
    Unauthenticated,
}

impl Resolution {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Resolution::Authenticated { user, .. } => Some(user),
            Resolution::Unauthenticated => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionResolver {
    strategies: Vec<ResolveStrategy>,
}

impl Default for SessionResolver {
    /// Cookie first, stored bearer token as fallback.
    fn default() -> Self {
        Self::with_strategies(vec![
            ResolveStrategy::AmbientCookie,
            ResolveStrategy::StoredBearer,
        ])
    }
}

impl SessionResolver {
    pub fn with_strategies(strategies: Vec<ResolveStrategy>) -> Self {
        Self { strategies }
    }

    pub async fn resolve<A, S>(&self, api: &A, store: &S) -> Resolution
    where
        A: AuthApi,
        S: TokenStore,
    {
        for &strategy in &self.strategies {
            if let Some(user) = attempt(strategy, api, store).await {
                tracing::info!(user_id = user.id, via = ?strategy, "Session resolved");
                return Resolution::Authenticated {
                    user,
                    via: strategy,
                };
            }
        }

        if let Err(e) = store.clear() {
            tracing::warn!(error = %e, "Failed to clear stale session tokens");
        }
        tracing::info!("No session to resume");
        Resolution::Unauthenticated
    }
}

async fn attempt<A, S>(strategy: ResolveStrategy, api: &A, store: &S) -> Option<CurrentUser>
where
    A: AuthApi,
    S: TokenStore,
{
    let bearer = match strategy {
        ResolveStrategy::AmbientCookie => None,
        ResolveStrategy::StoredBearer => match store.access_token() {
            Ok(Some(token)) => Some(token),
            Ok(None) => return None,
            Err(e) => {
                // Unreadable storage counts as "no stored token".
                tracing::warn!(error = %e, "Token storage unreadable");
                return None;
            }
        },
    };

    match api.current_user(bearer.as_deref()).await {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::debug!(via = ?strategy, error = %e, "Identity resolution attempt failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenPair;
    use crate::session::fake::{user, FakeAuthApi};
    use crate::session::store::MemoryTokenStore;

    fn stored(access: &str) -> MemoryTokenStore {
        MemoryTokenStore::with_tokens(&TokenPair {
            access_token: access.to_string(),
            refresh_token: "RT".to_string(),
        })
    }

    #[tokio::test]
    async fn test_cookie_wins_without_touching_store() {
        let api = FakeAuthApi::new().with_cookie_user(user(1, "grace"));
        let store = MemoryTokenStore::new();

        let resolution = SessionResolver::default().resolve(&api, &store).await;

        assert_eq!(
            resolution,
            Resolution::Authenticated {
                user: user(1, "grace"),
                via: ResolveStrategy::AmbientCookie
            }
        );
        assert_eq!(api.identity_calls(), vec![None]);
    }

    #[tokio::test]
    async fn test_stored_bearer_fallback() {
        let api = FakeAuthApi::new().with_bearer_user("AT1", user(2, "paul"));
        let store = stored("AT1");

        let resolution = SessionResolver::default().resolve(&api, &store).await;

        assert_eq!(resolution.user(), Some(&user(2, "paul")));
        assert_eq!(
            api.identity_calls(),
            vec![None, Some("AT1".to_string())]
        );
        assert!(store.get().unwrap().is_some(), "tokens kept on success");
    }

    #[tokio::test]
    async fn test_nothing_valid_clears_store() {
        let api = FakeAuthApi::new();
        let store = stored("expired");

        let resolution = SessionResolver::default().resolve(&api, &store).await;

        assert_eq!(resolution, Resolution::Unauthenticated);
        assert_eq!(store.get().unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_stored_token_skips_bearer_call() {
        let api = FakeAuthApi::new();
        let store = MemoryTokenStore::new();

        let resolution = SessionResolver::default().resolve(&api, &store).await;

        assert_eq!(resolution, Resolution::Unauthenticated);
        assert_eq!(api.identity_calls(), vec![None]);
    }

    #[tokio::test]
    async fn test_single_transport() {
        let api = FakeAuthApi::new()
            .with_cookie_user(user(1, "grace"))
            .with_bearer_user("AT1", user(1, "grace"));
        let store = stored("AT1");

        let resolver = SessionResolver::with_strategies(vec![ResolveStrategy::StoredBearer]);
        let resolution = resolver.resolve(&api, &store).await;

        assert!(matches!(
            resolution,
            Resolution::Authenticated {
                via: ResolveStrategy::StoredBearer,
                ..
            }
        ));
        assert_eq!(api.identity_calls(), vec![Some("AT1".to_string())]);
    }
}
