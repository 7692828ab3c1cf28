//! HTTP API for playground sessions

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::core::{LanguageEntry, RunRequest, RunResult};
use crate::editor::HeadlessEditor;
use crate::engine::RunDispatcher;
use crate::session::{PlaygroundSession, SessionSnapshot, UiEvent};

type SharedSession = Arc<Mutex<PlaygroundSession<HeadlessEditor>>>;

/// Bounds on the in-memory session table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Sessions untouched for longer than this are evicted
    pub idle_ttl: Duration,
    /// New sessions are refused once this many are live
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(30 * 60),
            max_sessions: 1000,
        }
    }
}

struct SessionSlot {
    session: SharedSession,
    last_active: Instant,
}

#[derive(Clone)]
pub struct AppState {
    dispatcher: RunDispatcher,
    limits: SessionLimits,
    sessions: Arc<RwLock<HashMap<String, SessionSlot>>>,
}

impl AppState {
    pub fn new(dispatcher: RunDispatcher, limits: SessionLimits) -> Self {
        Self {
            dispatcher,
            limits,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fetch a session and mark it active
    async fn session(&self, id: &str) -> Result<SharedSession, StatusCode> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions.get_mut(id).ok_or(StatusCode::NOT_FOUND)?;
        slot.last_active = Instant::now();
        Ok(slot.session.clone())
    }

    /// Store a new session unless the table is full after evicting idle ones
    async fn insert_session(
        &self,
        id: String,
        session: SharedSession,
        now: Instant,
    ) -> Result<(), StatusCode> {
        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.limits.max_sessions {
            evict_idle(&mut sessions, self.limits.idle_ttl, now);
        }
        if sessions.len() >= self.limits.max_sessions {
            warn!("Session limit reached ({}), refusing new session", self.limits.max_sessions);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }

        sessions.insert(
            id,
            SessionSlot {
                session,
                last_active: now,
            },
        );
        Ok(())
    }

    /// Drop sessions idle for longer than the TTL as of `now`
    pub async fn cleanup_expired_sessions(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        evict_idle(&mut sessions, self.limits.idle_ttl, now)
    }
}

fn evict_idle(sessions: &mut HashMap<String, SessionSlot>, idle_ttl: Duration, now: Instant) -> usize {
    let before = sessions.len();
    sessions.retain(|id, slot| {
        let expired = now.saturating_duration_since(slot.last_active) > idle_ttl;
        if expired {
            debug!("Session {} expired", id);
        }
        !expired
    });
    before - sessions.len()
}

/// Periodically evict idle sessions for as long as the server runs
fn spawn_session_sweeper(state: AppState) {
    let period = (state.limits.idle_ttl / 2).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let evicted = state.cleanup_expired_sessions(Instant::now()).await;
            if evicted > 0 {
                info!("Evicted {} idle sessions", evicted);
            }
        }
    });
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: String,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/languages", get(list_languages))
        .route("/api/run", post(run))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/events", post(post_event))
        .with_state(state)
}

/// Serve the API on `addr` until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Playground API listening on {}", addr);

    spawn_session_sweeper(state.clone());

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn list_languages(State(state): State<AppState>) -> Json<Vec<LanguageEntry>> {
    Json(state.dispatcher.registry().entries().cloned().collect())
}

async fn run(State(state): State<AppState>, Json(request): Json<RunRequest>) -> Json<RunResult> {
    Json(state.dispatcher.execute(&request).await)
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), StatusCode> {
    let id = uuid::Uuid::new_v4().to_string();
    let session = PlaygroundSession::headless(state.dispatcher.clone());
    let snapshot = session.snapshot();

    state
        .insert_session(id.clone(), Arc::new(Mutex::new(session)), Instant::now())
        .await?;

    info!("Created session {}", id);
    Ok((StatusCode::CREATED, Json(SessionView { id, snapshot })))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, StatusCode> {
    let session = state.session(&id).await?;
    let snapshot = session.lock().await.snapshot();
    Ok(Json(SessionView { id, snapshot }))
}

/// Apply an event. The session lock is held for the whole event, so runs
/// in one session never overlap.
async fn post_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(event): Json<UiEvent>,
) -> Result<Json<SessionView>, StatusCode> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.handle(event).await;
    Ok(Json(SessionView {
        id,
        snapshot: session.snapshot(),
    }))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    match state.sessions.write().await.remove(&id) {
        Some(_) => {
            info!("Deleted session {}", id);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}
