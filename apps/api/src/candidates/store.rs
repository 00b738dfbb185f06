use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use tracing::debug;

use crate::candidates::query::SearchCriteria;
use crate::models::Candidate;

const SELECT_CANDIDATES: &str =
    "SELECT candidate_id, location, job_role, short_listed_by FROM candidates";

/// Failure reaching or querying the candidate store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("candidate store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Sole owner of persisted candidate rows.
///
/// Carried in `AppState` as `Arc<dyn CandidateStore>`. No caching: every call
/// round-trips to the backing store.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Candidate>, StoreError>;

    async fn find_by_filter(&self, criteria: &SearchCriteria)
        -> Result<Vec<Candidate>, StoreError>;

    async fn list_shortlisted_by(&self, user_id: &str) -> Result<Vec<Candidate>, StoreError>;

    /// Adds `user_id` to the candidate's shortlist unless already present.
    /// Returns the number of matched rows: 1 if the candidate exists, else 0.
    async fn add_to_shortlist(&self, candidate_id: i32, user_id: &str)
        -> Result<u64, StoreError>;
}

/// PostgreSQL-backed store over a pool handed in at startup.
#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn list_all(&self) -> Result<Vec<Candidate>, StoreError> {
        let rows = sqlx::query_as::<_, Candidate>(&format!(
            "{SELECT_CANDIDATES} ORDER BY candidate_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_filter(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Candidate>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_CANDIDATES);
        criteria.push_predicate(&mut builder);
        builder.push(" ORDER BY candidate_id");

        let rows = builder
            .build_query_as::<Candidate>()
            .fetch_all(&self.pool)
            .await?;
        debug!("Search matched {} candidates", rows.len());
        Ok(rows)
    }

    async fn list_shortlisted_by(&self, user_id: &str) -> Result<Vec<Candidate>, StoreError> {
        let rows = sqlx::query_as::<_, Candidate>(&format!(
            "{SELECT_CANDIDATES} WHERE $1 = ANY(short_listed_by) ORDER BY candidate_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn add_to_shortlist(
        &self,
        candidate_id: i32,
        user_id: &str,
    ) -> Result<u64, StoreError> {
        // Single statement so the membership check and append are atomic per row.
        let result = sqlx::query(
            r#"
            UPDATE candidates
            SET short_listed_by = CASE
                WHEN $1 = ANY(short_listed_by) THEN short_listed_by
                ELSE array_append(short_listed_by, $1)
            END
            WHERE candidate_id = $2
            "#,
        )
        .bind(user_id)
        .bind(candidate_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
