//! Request authorization — an ordered chain of pluggable verifiers.
//!
//! A request is authorized when the chain is empty or when any verifier
//! accepts it. Verifiers run in order and the first acceptance wins; later
//! verifiers are never consulted.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

/// Path prefixes that bypass authorization.
pub const PUBLIC_PREFIXES: &[&str] = &["/files/"];

/// Exact paths that bypass authorization.
pub const PUBLIC_PATHS: &[&str] = &["/health"];

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Verifies one inbound request.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn verify(&self, headers: &HeaderMap) -> Result<(), AuthError>;
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

// ─────────────────────────────────────────────
// Static token
// ─────────────────────────────────────────────

/// Accepts requests carrying one fixed bearer token.
pub struct StaticTokenAuthorizer {
    token: String,
}

impl StaticTokenAuthorizer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl Authorizer for StaticTokenAuthorizer {
    async fn verify(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        match bearer_token(headers) {
            None => Err(AuthError::MissingCredentials),
            Some(token) if token == self.token => Ok(()),
            Some(_) => Err(AuthError::InvalidCredentials),
        }
    }
}

/// Rejects every request. Installed when authorizers were configured but
/// none of them could be built.
pub struct DenyAllAuthorizer;

#[async_trait]
impl Authorizer for DenyAllAuthorizer {
    async fn verify(&self, _headers: &HeaderMap) -> Result<(), AuthError> {
        Err(AuthError::InvalidCredentials)
    }
}

// ─────────────────────────────────────────────
// Chain
// ─────────────────────────────────────────────

pub struct AuthChain {
    authorizers: Vec<Arc<dyn Authorizer>>,
    public_prefixes: Vec<String>,
}

impl AuthChain {
    pub fn new(authorizers: Vec<Arc<dyn Authorizer>>) -> Self {
        Self {
            authorizers,
            public_prefixes: PUBLIC_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// A chain that authorizes everything.
    pub fn open() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.authorizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorizers.is_empty()
    }

    pub fn is_public(&self, path: &str) -> bool {
        PUBLIC_PATHS.contains(&path)
            || self.public_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    pub async fn authorize(&self, path: &str, headers: &HeaderMap) -> bool {
        if self.authorizers.is_empty() || self.is_public(path) {
            return true;
        }

        for (index, authorizer) in self.authorizers.iter().enumerate() {
            match authorizer.verify(headers).await {
                Ok(()) => return true,
                Err(e) => debug!(authorizer = index, error = %e, "Verifier rejected request"),
            }
        }
        false
    }
}

/// Axum middleware guarding every route with the auth chain.
///
/// Returns 401 with `WWW-Authenticate: Bearer` on rejection.
pub async fn require_auth(State(chain): State<Arc<AuthChain>>, req: Request, next: Next) -> Response {
    // The body is not Sync, so only the parts are borrowed across the await.
    let (parts, body) = req.into_parts();
    if chain.authorize(parts.uri.path(), &parts.headers).await {
        return next.run(Request::from_parts(parts, body)).await;
    }

    warn!(path = %parts.uri.path(), "Unauthorized request");
    let mut res = Response::new(axum::body::Body::empty());
    *res.status_mut() = StatusCode::UNAUTHORIZED;
    res.headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        accept: bool,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(accept: bool) -> Arc<Self> {
            Arc::new(Self {
                accept,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Authorizer for Fixed {
        async fn verify(&self, _headers: &HeaderMap) -> Result<(), AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.accept {
                Ok(())
            } else {
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    fn with_bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_empty_chain_authorizes_all() {
        let chain = AuthChain::open();
        assert!(chain.is_empty());
        assert!(chain.authorize("/v1/models", &HeaderMap::new()).await);
    }

    #[tokio::test]
    async fn test_first_acceptance_short_circuits() {
        let reject = Fixed::new(false);
        let accept = Fixed::new(true);
        let never = Fixed::new(false);
        let chain = AuthChain::new(vec![
            reject.clone() as Arc<dyn Authorizer>,
            accept.clone() as Arc<dyn Authorizer>,
            never.clone() as Arc<dyn Authorizer>,
        ]);

        assert!(chain.authorize("/v1/models", &HeaderMap::new()).await);
        assert_eq!(reject.calls.load(Ordering::SeqCst), 1);
        assert_eq!(accept.calls.load(Ordering::SeqCst), 1);
        assert_eq!(never.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_reject() {
        let chain = AuthChain::new(vec![
            Fixed::new(false) as Arc<dyn Authorizer>,
            Fixed::new(false) as Arc<dyn Authorizer>,
        ]);
        assert!(!chain.authorize("/v1/chat/completions", &HeaderMap::new()).await);
    }

    #[tokio::test]
    async fn test_public_prefix_bypass() {
        let never = Fixed::new(false);
        let chain = AuthChain::new(vec![never.clone() as Arc<dyn Authorizer>]);

        assert!(chain.authorize("/files/logo.png", &HeaderMap::new()).await);
        assert!(chain.authorize("/health", &HeaderMap::new()).await);
        assert_eq!(never.calls.load(Ordering::SeqCst), 0);
        assert!(!chain.authorize("/filesystem", &HeaderMap::new()).await);
    }

    #[tokio::test]
    async fn test_health_is_exact_match() {
        let chain = AuthChain::new(vec![Fixed::new(false) as Arc<dyn Authorizer>]);
        assert!(chain.is_public("/health"));
        assert!(!chain.is_public("/healthz"));
        assert!(!chain.is_public("/health/debug"));
        assert!(!chain.authorize("/healthz/debug", &HeaderMap::new()).await);
    }

    #[tokio::test]
    async fn test_deny_all() {
        let chain = AuthChain::new(vec![Arc::new(DenyAllAuthorizer) as Arc<dyn Authorizer>]);
        assert!(!chain.authorize("/v1/models", &with_bearer("anything")).await);
        assert!(chain.authorize("/health", &HeaderMap::new()).await);
    }

    #[tokio::test]
    async fn test_static_token() {
        let auth = StaticTokenAuthorizer::new("secret");
        assert!(auth.verify(&with_bearer("secret")).await.is_ok());
        assert!(matches!(
            auth.verify(&with_bearer("wrong")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.verify(&HeaderMap::new()).await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&with_bearer("abc")), Some("abc"));
        let mut basic = HeaderMap::new();
        basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert_eq!(bearer_token(&basic), None);
    }
}
