//! Candidate query and shortlist subsystem.
//!
//! Handlers orchestrate gate -> criteria -> store; the store is the only
//! reader and writer of candidate rows.

pub mod handlers;
pub mod query;
pub mod store;

pub use store::PgCandidateStore;
