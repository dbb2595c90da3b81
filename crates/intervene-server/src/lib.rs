//! HTTP server for intervention rooms.
//!
//! Wraps the [`intervene_api`] router with Basic authentication and request
//! tracing, and keeps the tracker warm from the timeline's append feed.

pub mod auth;
pub mod error;
pub mod refresh;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use intervene_api::Shared;
use intervene_core::timeline::Timeline;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, UserCredentials, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub users:      Vec<UserCredentials>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state for the server's router.
#[derive(Clone)]
pub struct AppState<T: Timeline> {
  pub tracker: Shared<T>,
  pub auth:    Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server [`Router`]: the JSON API under `/api`, behind auth.
pub fn router<T>(state: AppState<T>) -> Router
where
  T: Timeline + 'static,
{
  let api = intervene_api::api_router(state.tracker.clone())
    .layer(middleware::from_fn_with_state(state.auth.clone(), require_auth));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use chrono::Utc;
  use intervene_core::{
    action::Action,
    content::MessageContent,
    status::InterventionStatus,
    timeline::TimelineEvent,
    tracker::InterventionTracker,
  };
  use intervene_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tokio::sync::broadcast;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  fn user(name: &str, password: &str) -> UserCredentials {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    UserCredentials { username: name.into(), password_hash: hash }
  }

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      tracker: Arc::new(InterventionTracker::new(Arc::new(store))),
      auth:    Arc::new(AuthConfig {
        users: vec![user("ana", "secret"), user("bruno", "hunter2")],
      }),
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn oneshot_json(
    state:  AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    auth:   Option<&str>,
    body:   Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(a) = auth {
      builder = builder.header(header::AUTHORIZATION, a);
    }
    let req = match body {
      Some(b) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Auth ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unauthenticated_requests_return_401() {
    let state = make_state().await;
    let resp  = oneshot_json(state, "GET", "/api/rooms", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn wrong_password_returns_401() {
    let state = make_state().await;
    let auth  = auth_header("ana", "hunter2");
    let resp  = oneshot_json(state, "GET", "/api/rooms", Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn authenticated_user_becomes_the_caller() {
    let state = make_state().await;
    let ana   = auth_header("ana", "secret");

    let resp = oneshot_json(
      state.clone(),
      "POST",
      "/api/rooms",
      Some(&ana),
      Some(json!({ "name": "SE Bauru" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let room_id = json_body(resp).await["room_id"].as_str().unwrap().to_owned();

    let resp = oneshot_json(
      state.clone(),
      "POST",
      &format!("/api/rooms/{room_id}/join"),
      Some(&ana),
      Some(json!({ "user_type": "cteep" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let membership = json_body(resp).await;
    assert_eq!(membership["user_id"], "ana");
    assert_eq!(membership["role"], "field_team");
  }

  #[tokio::test]
  async fn unknown_paths_are_404() {
    let state = make_state().await;
    let auth  = auth_header("ana", "secret");
    let resp  = oneshot_json(state, "GET", "/api/nowhere", Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Refresher ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn refresher_folds_appends_and_stops_on_close() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let room  = store.create_room("r".into()).await.unwrap();
    store
      .join(room.room_id, "ana".into(), Some("cteep".into()))
      .await
      .unwrap();
    let tracker = Arc::new(InterventionTracker::new(store.clone()));

    let (tx, rx) = broadcast::channel(4);
    let handle = refresh::spawn_refresher(tracker.clone(), rx);

    let event = store
      .submit(
        room.room_id,
        "ana".into(),
        MessageContent::tagged(Action::CreateIntervention, vec!["SE1".into()]),
      )
      .await
      .unwrap();
    tx.send(event).unwrap();

    // Refreshing an unknown room only logs.
    tx.send(TimelineEvent {
      event_id:    Uuid::new_v4(),
      room_id:     Uuid::new_v4(),
      sequence:    1,
      sender:      "ghost".into(),
      content:     MessageContent::text("?"),
      recorded_at: Utc::now(),
    })
    .unwrap();

    drop(tx);
    handle.await.unwrap();

    let d = tracker.status(room.room_id).await.unwrap();
    assert_eq!(d.status, InterventionStatus::Solicitada);
  }
}
