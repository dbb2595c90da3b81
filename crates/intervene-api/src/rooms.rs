//! Handlers for `/rooms` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/rooms` | All rooms |
//! | `POST` | `/rooms` | Body: `{"name":"..."}`; returns 201 |
//! | `GET`  | `/rooms/:id` | 404 if not found |
//! | `GET`  | `/rooms/:id/members` | Memberships with resolved roles |
//! | `POST` | `/rooms/:id/join` | Body: `{"user_type":"cteep"}`; returns 201, 409 if already joined |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use intervene_core::timeline::{Membership, Room, Timeline};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Shared, caller::Caller, error::ApiError};

/// 404 unless `room_id` exists.
pub(crate) async fn require_room<T: Timeline>(
  tracker: &Shared<T>,
  room_id: Uuid,
) -> Result<Room, ApiError> {
  tracker
    .timeline()
    .get_room(room_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("room {room_id} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /rooms`
pub async fn list<T: Timeline>(
  State(tracker): State<Shared<T>>,
) -> Result<Json<Vec<Room>>, ApiError> {
  let rooms = tracker
    .timeline()
    .list_rooms()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rooms))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /rooms`, body: `{"name":"SE Bauru"}`
pub async fn create<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let name = body.name.trim();
  if name.is_empty() {
    return Err(ApiError::BadRequest("room name is empty".into()));
  }
  let room = tracker
    .timeline()
    .create_room(name.to_owned())
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(room)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /rooms/:id`
pub async fn get_one<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Room>, ApiError> {
  Ok(Json(require_room(&tracker, id).await?))
}

// ─── Members ──────────────────────────────────────────────────────────────────

/// `GET /rooms/:id/members`
pub async fn members<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Membership>>, ApiError> {
  require_room(&tracker, id).await?;
  let members = tracker
    .timeline()
    .members(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(members))
}

// ─── Join ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct JoinBody {
  /// Self-declared; `"cteep"` joins as the field team.
  #[serde(default)]
  pub user_type: Option<String>,
}

/// `POST /rooms/:id/join`, body: `{"user_type":"cteep"}`
///
/// The role is fixed at join time and cannot be changed by re-joining.
pub async fn join<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Path(id): Path<Uuid>,
  Caller(user_id): Caller,
  Json(body): Json<JoinBody>,
) -> Result<impl IntoResponse, ApiError> {
  let membership = tracker.join(id, &user_id, body.user_type).await?;
  Ok((StatusCode::CREATED, Json(membership)))
}
