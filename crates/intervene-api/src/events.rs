//! Handlers for the room timeline.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/rooms/:id/events` | Optional `?after=<seq>` |
//! | `POST` | `/rooms/:id/messages` | Body: `{"body":"..."}`; ordinary chat, returns 201 |
//! | `GET`  | `/rooms/:id/events/:seq/questions` | Canned follow-ups for the event's substations |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use intervene_core::{
  questions::predefined_questions,
  timeline::{Timeline, TimelineEvent},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Shared, caller::Caller, error::ApiError, rooms::require_room};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Only events with a sequence strictly greater than this.
  pub after: Option<u64>,
}

/// `GET /rooms/:id/events[?after=<seq>]`
pub async fn list<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<TimelineEvent>>, ApiError> {
  require_room(&tracker, id).await?;
  let events = tracker
    .timeline()
    .events(id, params.after)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(events))
}

// ─── Chat ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MessageBody {
  pub body: String,
}

/// `POST /rooms/:id/messages`, body: `{"body":"bom dia"}`
pub async fn post_message<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Path(id): Path<Uuid>,
  Caller(user_id): Caller,
  Json(body): Json<MessageBody>,
) -> Result<impl IntoResponse, ApiError> {
  let event = tracker.send_message(id, &user_id, &body.body).await?;
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Predefined questions ─────────────────────────────────────────────────────

/// `GET /rooms/:id/events/:seq/questions`
///
/// Empty when the event carries no substations.
pub async fn questions<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Path((id, seq)): Path<(Uuid, u64)>,
) -> Result<Json<Vec<String>>, ApiError> {
  require_room(&tracker, id).await?;
  let event = tracker
    .timeline()
    .get_event(id, seq)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {seq} not found in room {id}")))?;
  Ok(Json(predefined_questions(&event.content.substations)))
}
