//! Async HTTP client wrapping the intervene JSON API.

use anyhow::{Context, Result, anyhow};
use intervene_core::{
  action::Action,
  controls::Control,
  role::Role,
  status::InterventionStatus,
  timeline::{Membership, Room, TimelineEvent},
};
use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for the intervene API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// `GET /rooms/:id/status` body.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusView {
  pub status:              InterventionStatus,
  pub label:               Option<String>,
  pub substations:         Vec<String>,
  pub last_sequence:       Option<u64>,
  pub transition_sequence: Option<u64>,
}

/// `GET /rooms/:id/controls` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlsView {
  pub role:     Role,
  pub status:   InterventionStatus,
  pub controls: Vec<Control>,
}

/// Outcome of a conditional status read.
pub enum Conditional<T> {
  Modified { value: T, etag: Option<String> },
  NotModified,
}

/// Async HTTP client for the intervene JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    tracing::debug!(path, "GET");
    let resp = self
      .auth(self.client.get(self.url(path)))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    let resp = check("GET", path, resp).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising GET {path}"))
  }

  async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
    tracing::debug!(path, "POST");
    let resp = self
      .auth(self.client.post(self.url(path)))
      .json(&body)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    let resp = check("POST", path, resp).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising POST {path}"))
  }

  // ── Rooms ─────────────────────────────────────────────────────────────────

  /// `GET /api/rooms`
  pub async fn list_rooms(&self) -> Result<Vec<Room>> { self.get("/rooms").await }

  /// `POST /api/rooms`
  pub async fn create_room(&self, name: &str) -> Result<Room> {
    self.post("/rooms", json!({ "name": name })).await
  }

  /// `GET /api/rooms/:id/members`
  pub async fn members(&self, room: Uuid) -> Result<Vec<Membership>> {
    self.get(&format!("/rooms/{room}/members")).await
  }

  /// `POST /api/rooms/:id/join`
  pub async fn join(&self, room: Uuid, user_type: Option<&str>) -> Result<Membership> {
    self
      .post(&format!("/rooms/{room}/join"), json!({ "user_type": user_type }))
      .await
  }

  // ── Timeline ──────────────────────────────────────────────────────────────

  /// `GET /api/rooms/:id/events[?after=<seq>]`
  pub async fn events(&self, room: Uuid, after: Option<u64>) -> Result<Vec<TimelineEvent>> {
    let path = match after {
      Some(seq) => format!("/rooms/{room}/events?after={seq}"),
      None => format!("/rooms/{room}/events"),
    };
    self.get(&path).await
  }

  /// `POST /api/rooms/:id/messages`
  pub async fn send_message(&self, room: Uuid, body: &str) -> Result<TimelineEvent> {
    self
      .post(&format!("/rooms/{room}/messages"), json!({ "body": body }))
      .await
  }

  /// `GET /api/rooms/:id/events/:seq/questions`
  pub async fn questions(&self, room: Uuid, sequence: u64) -> Result<Vec<String>> {
    self
      .get(&format!("/rooms/{room}/events/{sequence}/questions"))
      .await
  }

  // ── Interventions ─────────────────────────────────────────────────────────

  /// `GET /api/rooms/:id/interventions`
  pub async fn interventions(&self, room: Uuid) -> Result<Vec<TimelineEvent>> {
    self.get(&format!("/rooms/{room}/interventions")).await
  }

  /// `GET /api/rooms/:id/status`
  pub async fn status(&self, room: Uuid) -> Result<StatusView> {
    self.get(&format!("/rooms/{room}/status")).await
  }

  /// `GET /api/rooms/:id/status` with `If-None-Match: <etag>`.
  pub async fn status_if_changed(
    &self,
    room: Uuid,
    etag: Option<&str>,
  ) -> Result<Conditional<StatusView>> {
    let path = format!("/rooms/{room}/status");
    let mut req = self.auth(self.client.get(self.url(&path)));
    if let Some(tag) = etag {
      req = req.header(header::IF_NONE_MATCH, tag);
    }
    let resp = req
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    if resp.status() == StatusCode::NOT_MODIFIED {
      return Ok(Conditional::NotModified);
    }
    let resp = check("GET", &path, resp).await?;
    let etag = resp
      .headers()
      .get(header::ETAG)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);
    let value = resp.json().await.context("deserialising status")?;
    Ok(Conditional::Modified { value, etag })
  }

  /// `GET /api/rooms/:id/controls`
  pub async fn controls(&self, room: Uuid) -> Result<ControlsView> {
    self.get(&format!("/rooms/{room}/controls")).await
  }

  /// `POST /api/rooms/:id/transitions`
  pub async fn request_transition(
    &self,
    room: Uuid,
    action: Action,
    substations: &[String],
  ) -> Result<TimelineEvent> {
    self
      .post(
        &format!("/rooms/{room}/transitions"),
        json!({ "action": action.tag(), "substations": substations }),
      )
      .await
  }
}

/// Turn a non-success response into an error carrying the server's message.
async fn check(method: &str, path: &str, resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned));
  match message {
    Some(m) => Err(anyhow!("{method} {path} → {status}: {m}")),
    None => Err(anyhow!("{method} {path} → {status}")),
  }
}
