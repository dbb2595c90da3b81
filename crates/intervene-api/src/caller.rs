//! The authenticated identity of the requester.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// The user id the mounting server authenticated for this request.
///
/// Read from the request extensions; a request without one is rejected
/// with `401`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Caller>()
      .cloned()
      .ok_or(ApiError::Unauthenticated)
  }
}
