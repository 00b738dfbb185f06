//! Cookie sessions on `tower-sessions`.
//!
//! The session layer owns the `sid` cookie; this module only configures it and
//! provides a Redis backend built on the same `redis` client the rest of the
//! stack uses.

use async_trait::async_trait;
use redis::AsyncCommands;
use time::{Duration, OffsetDateTime};
use tower_sessions::cookie::SameSite;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::Config;

pub const SESSION_COOKIE: &str = "sid";
/// Session key holding the authenticated `Identity`.
pub const IDENTITY_KEY: &str = "identity";
/// Session key holding the CSRF `state` of an in-flight OAuth handshake.
pub const OAUTH_STATE_KEY: &str = "oauth_state";
const REDIS_KEY_PREFIX: &str = "session:";

/// HttpOnly, SameSite=Lax session cookie expiring after `SESSION_TTL_SECS` of inactivity.
pub fn session_layer<S>(store: S, config: &Config) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    let ttl = i64::try_from(config.session_ttl_secs).unwrap_or(i64::MAX);
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(ttl)))
}

#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn key(id: &Id) -> String {
        format!("{REDIS_KEY_PREFIX}{id}")
    }

    async fn connection(&self) -> session_store::Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend)
    }
}

fn backend(err: redis::RedisError) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

/// Seconds until `expiry_date`, never less than one so Redis accepts the TTL.
fn ttl_secs(expiry_date: OffsetDateTime) -> u64 {
    let remaining = (expiry_date - OffsetDateTime::now_utc()).whole_seconds();
    u64::try_from(remaining).unwrap_or(0).max(1)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let payload = serde_json::to_string(record)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(&record.id), payload, ttl_secs(record.expiry_date))
            .await
            .map_err(backend)
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn.get(Self::key(session_id)).await.map_err(backend)?;
        payload
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| session_store::Error::Decode(e.to_string()))
            })
            .transpose()
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(Self::key(session_id))
            .await
            .map_err(backend)
    }
}
