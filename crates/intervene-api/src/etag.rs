//! ETag computation for the derived room status.
//!
//! The tag is a SHA-256 over the room id, the last folded sequence and the
//! status. Any new event in the room changes it.

use axum::http::{HeaderMap, header};
use intervene_core::derive::Derivation;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Compute a quoted strong ETag for `derivation` of `room_id`.
pub fn status_etag(room_id: Uuid, derivation: &Derivation) -> String {
  let mut hasher = Sha256::new();
  hasher.update(room_id.as_bytes());
  // Sequences start at 1, so 0 stands for "nothing folded".
  hasher.update(derivation.last_sequence.unwrap_or(0).to_le_bytes());
  hasher.update(derivation.status.to_string().as_bytes());
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// `true` if the request's `If-None-Match` names `etag` (or `*`).
///
/// Bare and weak (`W/`) forms are accepted as well as quoted ones.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  let Some(value) = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
  else {
    return false;
  };
  let wanted = strip_etag_quotes(etag);
  value.split(',').map(str::trim).any(|candidate| {
    candidate == "*"
      || strip_etag_quotes(candidate.trim_start_matches("W/")) == wanted
  })
}

fn strip_etag_quotes(s: &str) -> &str { s.trim_matches('"') }
