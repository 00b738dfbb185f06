use std::sync::Arc;

use crate::auth::google::IdentityProvider;
use crate::candidates::store::CandidateStore;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres-backed in production; swapped for in-memory fakes in tests.
    pub candidates: Arc<dyn CandidateStore>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub config: Config,
}
