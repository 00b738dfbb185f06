//! In-memory fakes for the store, session and identity-provider seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::MemoryStore;

use crate::auth::google::{IdentityProvider, OAuthError};
use crate::auth::session::SESSION_COOKIE;
use crate::candidates::query::SearchCriteria;
use crate::candidates::store::{CandidateStore, StoreError};
use crate::config::Config;
use crate::models::{Candidate, Identity};
use crate::routes::build_router;
use crate::state::AppState;

pub const STUB_CODE: &str = "valid-code";

pub fn identity(id: &str) -> Identity {
    Identity {
        id: id.to_string(),
        provider: "google".to_string(),
        display_name: Some(format!("User {id}")),
        email: Some(format!("{id}@example.com")),
        picture: None,
        authenticated_at: Utc::now(),
    }
}

pub fn candidate(candidate_id: i32, location: &str, job_role: &str) -> Candidate {
    Candidate {
        candidate_id,
        location: location.to_string(),
        job_role: job_role.to_string(),
        short_listed_by: vec![],
    }
}

pub async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Candidate store over a `Vec`, counting every call it receives.
#[derive(Default)]
pub struct MemoryCandidateStore {
    rows: Mutex<Vec<Candidate>>,
    calls: AtomicUsize,
}

impl MemoryCandidateStore {
    pub fn new(rows: Vec<Candidate>) -> Self {
        Self {
            rows: Mutex::new(rows),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<Candidate> {
        self.rows.lock().unwrap().clone()
    }

    fn select(&self, predicate: impl Fn(&Candidate) -> bool) -> Vec<Candidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| predicate(c))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn list_all(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.select(|_| true))
    }

    async fn find_by_filter(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.select(|c| criteria.matches(c)))
    }

    async fn list_shortlisted_by(&self, user_id: &str) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.select(|c| c.short_listed_by.iter().any(|id| id == user_id)))
    }

    async fn add_to_shortlist(
        &self,
        candidate_id: i32,
        user_id: &str,
    ) -> Result<u64, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|c| c.candidate_id == candidate_id) else {
            return Ok(0);
        };
        if !row.short_listed_by.iter().any(|id| id == user_id) {
            row.short_listed_by.push(user_id.to_string());
        }
        Ok(1)
    }
}

/// Store whose every call fails as if the database were down.
pub struct UnavailableCandidateStore;

fn unavailable() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl CandidateStore for UnavailableCandidateStore {
    async fn list_all(&self) -> Result<Vec<Candidate>, StoreError> {
        Err(unavailable())
    }

    async fn find_by_filter(&self, _: &SearchCriteria) -> Result<Vec<Candidate>, StoreError> {
        Err(unavailable())
    }

    async fn list_shortlisted_by(&self, _: &str) -> Result<Vec<Candidate>, StoreError> {
        Err(unavailable())
    }

    async fn add_to_shortlist(&self, _: i32, _: &str) -> Result<u64, StoreError> {
        Err(unavailable())
    }
}

/// Accepts only `STUB_CODE`, yielding the identity `oauth-user`.
pub struct StubIdentityProvider;

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        Ok(format!("https://idp.example.com/authorize?state={state}"))
    }

    async fn exchange_code(&self, code: &str) -> Result<Identity, OAuthError> {
        if code == STUB_CODE {
            Ok(identity("oauth-user"))
        } else {
            Err(OAuthError::Rejected {
                status: 400,
                message: "invalid_grant".to_string(),
            })
        }
    }
}

/// Session backend that fails every operation, as an unreachable Redis would.
#[derive(Debug, Clone)]
pub struct FailingSessionStore;

fn session_backend_down() -> session_store::Error {
    session_store::Error::Backend("connection refused".to_string())
}

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn save(&self, _: &Record) -> session_store::Result<()> {
        Err(session_backend_down())
    }

    async fn load(&self, _: &Id) -> session_store::Result<Option<Record>> {
        Err(session_backend_down())
    }

    async fn delete(&self, _: &Id) -> session_store::Result<()> {
        Err(session_backend_down())
    }
}

pub struct TestApp {
    pub candidates: Arc<dyn CandidateStore>,
    pub sessions: MemoryStore,
}

impl TestApp {
    pub fn new(rows: Vec<Candidate>) -> Self {
        Self::with_store(Arc::new(MemoryCandidateStore::new(rows)))
    }

    pub fn with_store(candidates: Arc<dyn CandidateStore>) -> Self {
        Self {
            candidates,
            sessions: MemoryStore::default(),
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            candidates: self.candidates.clone(),
            identity_provider: Arc::new(StubIdentityProvider),
            config: Config::for_tests(),
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state(), self.sessions.clone())
    }
}

/// The `sid=<id>` pair from a response's `Set-Cookie` header, if any.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE}=")))
        .map(str::to_string)
}

/// Completes the OAuth handshake against `router` and returns the
/// authenticated session's `Cookie` header value.
pub async fn sign_in(router: &Router) -> String {
    let response = router
        .clone()
        .oneshot(Request::get("/auth/google").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let pending = session_cookie(&response).expect("handshake session cookie");
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    let state = location.rsplit("state=").next().unwrap().to_string();

    let response = router
        .clone()
        .oneshot(
            Request::get(format!("/auth/google/secrets?code={STUB_CODE}&state={state}"))
                .header(header::COOKIE, pending)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    session_cookie(&response).expect("authenticated session cookie")
}
