//! HTTP Basic-auth middleware and standalone verifier.
//!
//! A verified username becomes the request's [`Caller`], which is the user id
//! the API records as message sender and membership holder.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use intervene_api::Caller;
use serde::Deserialize;

use crate::error::Error;

/// One account allowed to use this server.
#[derive(Deserialize, Clone)]
pub struct UserCredentials {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Credentials accepted as valid for this server instance.
#[derive(Clone, Default)]
pub struct AuthConfig {
  pub users: Vec<UserCredentials>,
}

/// Verify credentials from headers, returning the authenticated username.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<String, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let user = config
    .users
    .iter()
    .find(|u| u.username == username)
    .ok_or(Error::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&user.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(user.username.clone())
}

/// Reject unauthenticated requests; tag the rest with their [`Caller`].
pub async fn require_auth(
  State(auth): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let username = match verify_auth(req.headers(), &auth) {
    Ok(u) => u,
    Err(e) => {
      tracing::debug!(path = %req.uri().path(), "rejected unauthenticated request");
      return Err(e);
    }
  };
  req.extensions_mut().insert(Caller(username));
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::header;
  use rand_core::OsRng;

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  fn make_config() -> AuthConfig {
    AuthConfig {
      users: vec![
        UserCredentials { username: "ana".into(),   password_hash: hash("secret") },
        UserCredentials { username: "bruno".into(), password_hash: hash("hunter2") },
      ],
    }
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    let encoded = B64.encode(format!("{user}:{pass}"));
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, format!("Basic {encoded}").parse().unwrap());
    h
  }

  #[test]
  fn correct_credentials_name_the_user() {
    let config = make_config();
    assert_eq!(verify_auth(&basic("ana", "secret"), &config).unwrap(), "ana");
    assert_eq!(verify_auth(&basic("bruno", "hunter2"), &config).unwrap(), "bruno");
  }

  #[test]
  fn another_users_password_is_rejected() {
    let config = make_config();
    assert!(matches!(
      verify_auth(&basic("ana", "hunter2"), &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn unknown_user() {
    let config = make_config();
    assert!(matches!(
      verify_auth(&basic("eve", "secret"), &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    assert!(matches!(
      verify_auth(&HeaderMap::new(), &make_config()),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64() {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, "Basic !!!not-base64!!!".parse().unwrap());
    assert!(matches!(verify_auth(&h, &make_config()), Err(Error::Unauthorized)));
  }
}
