pub mod health;

use axum::{routing::get, Router};
use tower_sessions::SessionStore;

use crate::auth::handlers as auth;
use crate::auth::session::session_layer;
use crate::candidates::handlers as candidates;
use crate::state::AppState;

/// Routes for the whole API, with the session layer backed by `sessions`.
pub fn build_router<S>(state: AppState, sessions: S) -> Router
where
    S: SessionStore + Clone,
{
    let sessions = session_layer(sessions, &state.config);
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Candidate directory
        .route("/get_candidates", get(candidates::handle_get_candidates))
        .route(
            "/search_candidates",
            get(candidates::handle_search_candidates),
        )
        .route("/get_short_list", get(candidates::handle_get_short_list))
        .route("/add_short_list", get(candidates::handle_add_short_list))
        // Session
        .route("/login", get(auth::handle_login))
        .route("/logout", get(auth::handle_logout))
        // Identity provider handshake
        .route("/auth/google", get(auth::handle_google_start))
        .route("/auth/google/secrets", get(auth::handle_google_callback))
        .layer(sessions)
        .with_state(state)
}
