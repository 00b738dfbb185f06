//! Authorization gate.
//!
//! Authentication state is resolved once per request into an explicit
//! `RequestContext`; protected handlers call `authorize` before touching any store.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::warn;

use crate::auth::session::IDENTITY_KEY;
use crate::errors::AppError;
use crate::models::Identity;

/// Per-request authentication state: `Anonymous` when `identity` is `None`.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub identity: Option<Identity>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Reads the identity stored in `session`.
    /// A session backend failure is treated as anonymous.
    pub async fn from_session(session: &Session) -> Self {
        match session.get::<Identity>(IDENTITY_KEY).await {
            Ok(Some(identity)) => Self::authenticated(identity),
            Ok(None) => Self::anonymous(),
            Err(e) => {
                warn!("Session lookup failed, treating request as anonymous: {e}");
                Self::anonymous()
            }
        }
    }
}

/// Returns the caller's identity, or `Unauthorized` for anonymous requests.
/// Performs no credential verification of its own.
pub fn authorize(ctx: &RequestContext) -> Result<&Identity, AppError> {
    ctx.identity.as_ref().ok_or(AppError::Unauthorized)
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))?;
        Ok(Self::from_session(&session).await)
    }
}
