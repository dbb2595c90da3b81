//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Message content is stored
//! as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use intervene_core::{
  content::MessageContent,
  role::Role,
  timeline::{Membership, Room, TimelineEvent},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::FieldTeam => "field_team",
    Role::Counterparty => "counterparty",
    Role::Unknown => "unknown",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "field_team" => Ok(Role::FieldTeam),
    "counterparty" => Ok(Role::Counterparty),
    "unknown" => Ok(Role::Unknown),
    other => Err(Error::UnknownRole(other.to_owned())),
  }
}

// ─── MessageContent ───────────────────────────────────────────────────────────

pub fn encode_content(c: &MessageContent) -> Result<String> {
  Ok(serde_json::to_string(c)?)
}

pub fn decode_content(s: &str) -> Result<MessageContent> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `rooms` row.
pub struct RawRoom {
  pub room_id:    String,
  pub name:       String,
  pub created_at: String,
}

impl RawRoom {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      room_id:    row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_room(self) -> Result<Room> {
    Ok(Room {
      room_id:    decode_uuid(&self.room_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `memberships` row.
pub struct RawMembership {
  pub room_id:   String,
  pub user_id:   String,
  pub user_type: Option<String>,
  pub role:      String,
  pub joined_at: String,
}

impl RawMembership {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      room_id:   row.get(0)?,
      user_id:   row.get(1)?,
      user_type: row.get(2)?,
      role:      row.get(3)?,
      joined_at: row.get(4)?,
    })
  }

  pub fn into_membership(self) -> Result<Membership> {
    Ok(Membership {
      room_id:   decode_uuid(&self.room_id)?,
      user_id:   self.user_id,
      user_type: self.user_type,
      role:      decode_role(&self.role)?,
      joined_at: decode_dt(&self.joined_at)?,
    })
  }
}

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub event_id:     String,
  pub room_id:      String,
  pub sequence:     i64,
  pub sender:       String,
  pub content_json: String,
  pub recorded_at:  String,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:     row.get(0)?,
      room_id:      row.get(1)?,
      sequence:     row.get(2)?,
      sender:       row.get(3)?,
      content_json: row.get(4)?,
      recorded_at:  row.get(5)?,
    })
  }

  pub fn into_event(self) -> Result<TimelineEvent> {
    Ok(TimelineEvent {
      event_id:    decode_uuid(&self.event_id)?,
      room_id:     decode_uuid(&self.room_id)?,
      sequence:    self.sequence as u64,
      sender:      self.sender,
      content:     decode_content(&self.content_json)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_roundtrips_through_column() {
    for role in [Role::FieldTeam, Role::Counterparty, Role::Unknown] {
      assert_eq!(decode_role(encode_role(role)).unwrap(), role);
    }
  }

  #[test]
  fn unknown_role_column_is_an_error() {
    assert!(matches!(decode_role("admin"), Err(Error::UnknownRole(_))));
  }

  #[test]
  fn bad_timestamp_is_an_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
