//! Search predicate construction.
//!
//! `SearchCriteria` can only exist with at least one constraint, so an
//! unconstrained search never reaches the store. Values are always bound as
//! parameters; only the fixed column names below are written into SQL text.

use sqlx::{Postgres, QueryBuilder};
use thiserror::Error;

#[cfg(test)]
use crate::models::Candidate;

const LOCATION_COLUMN: &str = "location";
const JOB_ROLE_COLUMN: &str = "job_role";
const LIKE_ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No search query provided")]
pub struct EmptySearchCriteria;

/// A non-empty set of case-insensitive substring constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    location: Option<String>,
    job_role: Option<String>,
}

impl SearchCriteria {
    /// Blank values count as absent. Fails when nothing remains to filter on.
    pub fn new(
        location: Option<String>,
        job_role: Option<String>,
    ) -> Result<Self, EmptySearchCriteria> {
        let criteria = Self {
            location: non_blank(location),
            job_role: non_blank(job_role),
        };
        if criteria.location.is_none() && criteria.job_role.is_none() {
            return Err(EmptySearchCriteria);
        }
        Ok(criteria)
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn job_role(&self) -> Option<&str> {
        self.job_role.as_deref()
    }

    /// Supplied constraints as `(column, value)` pairs, in a fixed order.
    fn constraints(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (LOCATION_COLUMN, self.location()),
            (JOB_ROLE_COLUMN, self.job_role()),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, v)))
    }

    /// Appends `WHERE col ILIKE $n ESCAPE '\' [AND ...]` to `builder`.
    pub fn push_predicate(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        let mut separator = " WHERE ";
        for (column, value) in self.constraints() {
            builder
                .push(separator)
                .push(column)
                .push(" ILIKE ")
                .push_bind(like_pattern(value))
                .push(format!(" ESCAPE '{LIKE_ESCAPE}'"));
            separator = " AND ";
        }
    }

    /// Test-only reference for the predicate the SQL expresses; backs the
    /// in-memory store fake.
    #[cfg(test)]
    pub fn matches(&self, candidate: &Candidate) -> bool {
        self.constraints().all(|(column, needle)| {
            let haystack = match column {
                LOCATION_COLUMN => candidate.location.as_str(),
                _ => candidate.job_role.as_str(),
            };
            contains_ignore_case(haystack, needle)
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Wraps `value` in `%…%`, escaping LIKE metacharacters so they match literally.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
