use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::gate::{authorize, RequestContext};
use crate::auth::session::{IDENTITY_KEY, OAUTH_STATE_KEY};
use crate::errors::AppError;
use crate::models::Identity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /login
pub async fn handle_login(ctx: RequestContext) -> Result<Json<Identity>, AppError> {
    let identity = authorize(&ctx)?;
    Ok(Json(identity.clone()))
}

/// GET /logout
pub async fn handle_logout(session: Session) -> Result<&'static str, AppError> {
    if let Some(identity) = RequestContext::from_session(&session).await.identity {
        info!("User {} logged out", identity.id);
    }
    session.flush().await?;
    Ok("user logged out")
}

/// GET /auth/google
pub async fn handle_google_start(
    State(state): State<AppState>,
    session: Session,
) -> Result<Redirect, AppError> {
    let csrf_state = Uuid::new_v4().simple().to_string();
    let url = state
        .identity_provider
        .authorize_url(&csrf_state)
        .map_err(anyhow::Error::from)?;
    session.insert(OAUTH_STATE_KEY, &csrf_state).await?;
    Ok(Redirect::to(&url))
}

/// GET /auth/google/secrets
/// Every failure path redirects to the frontend login page.
pub async fn handle_google_callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let failure = || Redirect::to(&state.config.login_url()).into_response();

    // The state is single-use whatever the outcome.
    let expected_state = match session.remove::<String>(OAUTH_STATE_KEY).await {
        Ok(expected) => expected,
        Err(e) => {
            warn!("Failed to read OAuth state from session: {e}");
            return failure();
        }
    };
    if let Some(error) = &params.error {
        warn!("Identity provider returned error: {error}");
        return failure();
    }
    let (Some(code), Some(returned_state)) = (params.code.as_deref(), params.state.as_deref())
    else {
        warn!("OAuth callback missing code or state");
        return failure();
    };
    if expected_state.as_deref() != Some(returned_state) {
        warn!("OAuth callback state mismatch");
        return failure();
    }

    let identity = match state.identity_provider.exchange_code(code).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!("OAuth code exchange failed: {e}");
            return failure();
        }
    };
    // New session id on privilege change.
    if let Err(e) = session.cycle_id().await {
        tracing::error!("Failed to rotate session id: {e}");
        return failure();
    }
    if let Err(e) = session.insert(IDENTITY_KEY, &identity).await {
        tracing::error!("Failed to store identity in session: {e}");
        return failure();
    }
    info!("User {} authenticated via {}", identity.id, identity.provider);

    Redirect::to(&state.config.frontend_url).into_response()
}
