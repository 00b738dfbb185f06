use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user authenticated by the external identity provider.
/// Lives only as long as its session and is never written to the candidate store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub provider: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
    pub authenticated_at: DateTime<Utc>,
}
