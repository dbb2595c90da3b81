//! Handlers for the intervention lifecycle of a room.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/rooms/:id/interventions` | Action messages only |
//! | `GET`  | `/rooms/:id/status` | Derived status; `ETag`, honours `If-None-Match` |
//! | `GET`  | `/rooms/:id/controls` | Action controls for the caller's role |
//! | `POST` | `/rooms/:id/transitions` | Body: [`TransitionBody`]; returns 201 + submitted event |

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use intervene_core::{
  action::Action,
  controls::{Control, controls as controls_for},
  role::Role,
  status::InterventionStatus,
  timeline::{Timeline, TimelineEvent},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Shared,
  caller::Caller,
  error::ApiError,
  etag::{if_none_match, status_etag},
  rooms::require_room,
};

// ─── Intervention timeline ────────────────────────────────────────────────────

/// `GET /rooms/:id/interventions`
///
/// Every message with a recognised action tag, whether or not it advanced
/// the state.
pub async fn timeline<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEvent>>, ApiError> {
  require_room(&tracker, id).await?;
  let mut events = tracker
    .timeline()
    .events(id, None)
    .await
    .map_err(ApiError::store)?;
  events.retain(TimelineEvent::is_action);
  Ok(Json(events))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusView {
  pub room_id:             Uuid,
  pub status:              InterventionStatus,
  pub label:               Option<String>,
  pub substations:         Vec<String>,
  pub last_sequence:       Option<u64>,
  pub transition_sequence: Option<u64>,
}

/// `GET /rooms/:id/status`
pub async fn status<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let derivation = tracker.status(id).await?;
  let etag = status_etag(id, &derivation);

  if if_none_match(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  let view = StatusView {
    room_id:             id,
    status:              derivation.status,
    label:               derivation.status.label().map(str::to_owned),
    substations:         derivation.substations,
    last_sequence:       derivation.last_sequence,
    transition_sequence: derivation.transition_sequence,
  };
  Ok(([(header::ETAG, etag)], Json(view)).into_response())
}

// ─── Controls ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ControlsView {
  pub role:     Role,
  pub status:   InterventionStatus,
  pub controls: Vec<Control>,
}

/// `GET /rooms/:id/controls`
pub async fn controls<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Path(id): Path<Uuid>,
  Caller(user_id): Caller,
) -> Result<Json<ControlsView>, ApiError> {
  let derivation = tracker.status(id).await?;
  let role = tracker
    .timeline()
    .resolve_role(id, &user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ControlsView {
    role,
    status: derivation.status,
    controls: controls_for(derivation.status, role),
  }))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TransitionBody {
  /// Action tag, e.g. `"create_intervention"`.
  pub action:      String,
  /// Required for `create_intervention`; ignored otherwise.
  #[serde(default)]
  pub substations: Vec<String>,
}

/// `POST /rooms/:id/transitions`
pub async fn transition<T: Timeline>(
  State(tracker): State<Shared<T>>,
  Path(id): Path<Uuid>,
  Caller(user_id): Caller,
  Json(body): Json<TransitionBody>,
) -> Result<impl IntoResponse, ApiError> {
  let action = Action::from_tag(&body.action).ok_or_else(|| {
    ApiError::BadRequest(format!("unknown action: {}", body.action))
  })?;
  let event = tracker
    .request_transition(id, &user_id, action, &body.substations)
    .await?;
  Ok((StatusCode::CREATED, Json(event)))
}
