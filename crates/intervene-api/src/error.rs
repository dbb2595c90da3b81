//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use intervene_core::TransitionError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("no authenticated caller")]
  Unauthenticated,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error(transparent)]
  Transition(#[from] TransitionError),

  #[error("delivery failed: {0}")]
  Delivery(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Transition(TransitionError::InvalidTransition { .. }) => {
        StatusCode::CONFLICT
      }
      ApiError::Transition(TransitionError::Unauthorized { .. }) => {
        StatusCode::FORBIDDEN
      }
      ApiError::Transition(TransitionError::MissingSubstations) => {
        StatusCode::UNPROCESSABLE_ENTITY
      }
      ApiError::Delivery(_) => StatusCode::BAD_GATEWAY,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<intervene_core::Error> for ApiError {
  fn from(e: intervene_core::Error) -> Self {
    use intervene_core::Error as E;
    match e {
      E::Transition(t) => ApiError::Transition(t),
      E::RoomNotFound(id) => ApiError::NotFound(format!("room {id} not found")),
      e @ E::NotAMember { .. } => ApiError::Forbidden(e.to_string()),
      e @ E::AlreadyMember { .. } => ApiError::Conflict(e.to_string()),
      E::EmptyMessage => ApiError::BadRequest("message body is empty".into()),
      E::Delivery(e) => ApiError::Delivery(e),
      E::Timeline(e) => ApiError::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
