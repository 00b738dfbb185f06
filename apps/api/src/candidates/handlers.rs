use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::gate::{authorize, RequestContext};
use crate::candidates::query::SearchCriteria;
use crate::errors::AppError;
use crate::models::Candidate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub location: Option<String>,
    pub job_role: Option<String>,
}

// Parameters on protected routes are validated after the gate, so they are
// all optional strings here.
#[derive(Debug, Deserialize)]
pub struct ShortListQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddShortListQuery {
    pub candidate_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortListUpdate {
    pub message: String,
    pub rows_affected: u64,
}

fn require_param(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("Missing required parameter '{name}'")))
}

/// GET /get_candidates
pub async fn handle_get_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    Ok(Json(state.candidates.list_all().await?))
}

/// GET /search_candidates
pub async fn handle_search_candidates(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    let criteria = SearchCriteria::new(params.location, params.job_role)?;
    Ok(Json(state.candidates.find_by_filter(&criteria).await?))
}

/// GET /get_short_list
pub async fn handle_get_short_list(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<ShortListQuery>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    authorize(&ctx)?;
    let user_id = require_param(params.user_id, "user_id")?;
    Ok(Json(state.candidates.list_shortlisted_by(&user_id).await?))
}

/// GET /add_short_list
pub async fn handle_add_short_list(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<AddShortListQuery>,
) -> Result<Json<ShortListUpdate>, AppError> {
    let identity = authorize(&ctx)?;
    let raw_candidate_id = require_param(params.candidate_id, "candidate_id")?;
    let candidate_id: i32 = raw_candidate_id.trim().parse().map_err(|_| {
        AppError::Validation(format!(
            "Parameter 'candidate_id' must be an integer, got '{raw_candidate_id}'"
        ))
    })?;
    let user_id = require_param(params.user_id, "user_id")?;

    let rows_affected = state
        .candidates
        .add_to_shortlist(candidate_id, &user_id)
        .await?;
    if rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "Candidate {candidate_id} not found"
        )));
    }

    info!(
        "{} shortlisted candidate {candidate_id} for {user_id}",
        identity.id
    );
    Ok(Json(ShortListUpdate {
        message: format!("Candidate {candidate_id} added to short list"),
        rows_affected,
    }))
}
