use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A roster entry as persisted in the `candidates` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub candidate_id: i32,
    pub location: String,
    pub job_role: String,
    /// User ids that have shortlisted this candidate. Holds no duplicates.
    pub short_listed_by: Vec<String>,
}

