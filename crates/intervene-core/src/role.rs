//! Participant roles.
//!
//! A role is resolved from room membership, never from message content. The
//! membership itself carries a self-declared user type, so the label is
//! only as trustworthy as the participant who declared it.

use serde::{Deserialize, Serialize};
use strum::Display;

/// User type that marks a participant as a member of the field team.
pub const FIELD_TEAM_USER_TYPE: &str = "cteep";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  /// The operating utility's field team ("cteep").
  FieldTeam,
  /// The other party authorizing and acknowledging.
  Counterparty,
  /// No declared user type, or not a member of the room.
  #[default]
  Unknown,
}

impl Role {
  /// Map a declared user type to a role.
  ///
  /// `"cteep"` is the field team; any other declared type is the
  /// counterparty; no declaration leaves the role unknown.
  pub fn from_user_type(user_type: Option<&str>) -> Self {
    match user_type {
      Some(FIELD_TEAM_USER_TYPE) => Self::FieldTeam,
      Some(_) => Self::Counterparty,
      None => Self::Unknown,
    }
  }
}
