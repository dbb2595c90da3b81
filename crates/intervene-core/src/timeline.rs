//! The `Timeline` trait: the messaging channel the core consumes.
//!
//! A timeline owns rooms, their memberships, and each room's append-only
//! event log. It assigns every event a per-room `sequence`, which is the
//! total order all participants fold over. Implemented by storage backends
//! (e.g. `intervene-store-sqlite`).

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{content::MessageContent, derive::ActionMessage, role::Role};

// ─── Records ─────────────────────────────────────────────────────────────────

/// A conversation with its own timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
  pub room_id:    Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// A user's membership in a room. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
  pub room_id:   Uuid,
  pub user_id:   String,
  /// Self-declared user type, e.g. `"cteep"`.
  pub user_type: Option<String>,
  pub role:      Role,
  pub joined_at: DateTime<Utc>,
}

/// An immutable entry of a room timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
  pub event_id:    Uuid,
  pub room_id:     Uuid,
  /// 1-based, gap-free, strictly increasing within a room.
  pub sequence:    u64,
  pub sender:      String,
  pub content:     MessageContent,
  /// Assigned by the timeline; never changes after the append.
  pub recorded_at: DateTime<Utc>,
}

impl TimelineEvent {
  /// The deriver's view of this event, given the sender's resolved role.
  pub fn to_action_message(&self, sender_role: Role) -> ActionMessage {
    ActionMessage {
      sequence: self.sequence,
      action: self.content.action(),
      substations: self.content.substations.clone(),
      sender_role,
    }
  }

  /// Whether this event carries a recognized action tag.
  pub fn is_action(&self) -> bool { self.content.action().is_some() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the messaging channel.
///
/// Events are append-only. All methods return `Send` futures so the trait
/// can be used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Timeline: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Rooms ─────────────────────────────────────────────────────────────

  fn create_room(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Room, Self::Error>> + Send + '_;

  /// Retrieve a room by UUID. Returns `None` if not found.
  fn get_room(
    &self,
    room_id: Uuid,
  ) -> impl Future<Output = Result<Option<Room>, Self::Error>> + Send + '_;

  fn list_rooms(
    &self,
  ) -> impl Future<Output = Result<Vec<Room>, Self::Error>> + Send + '_;

  // ── Membership ────────────────────────────────────────────────────────

  /// Add `user_id` to a room. Returns an error if the room does not exist,
  /// and `None` if the user already joined it; the earlier membership
  /// stands. The check and the insert must be one atomic step.
  fn join(
    &self,
    room_id: Uuid,
    user_id: String,
    user_type: Option<String>,
  ) -> impl Future<Output = Result<Option<Membership>, Self::Error>> + Send + '_;

  fn members(
    &self,
    room_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Membership>, Self::Error>> + Send + '_;

  /// The role of `user_id` in a room; [`Role::Unknown`] for non-members.
  fn resolve_role<'a>(
    &'a self,
    room_id: Uuid,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Role, Self::Error>> + Send + 'a;

  // ── Events ────────────────────────────────────────────────────────────

  /// Append a message to a room's timeline and return the stored event.
  /// The `sequence` and `recorded_at` fields are set by the timeline.
  fn submit(
    &self,
    room_id: Uuid,
    sender: String,
    content: MessageContent,
  ) -> impl Future<Output = Result<TimelineEvent, Self::Error>> + Send + '_;

  /// Events of a room in ascending `sequence` order, optionally only those
  /// after the given sequence.
  fn events(
    &self,
    room_id: Uuid,
    after: Option<u64>,
  ) -> impl Future<Output = Result<Vec<TimelineEvent>, Self::Error>> + Send + '_;

  /// A single event by its position in the room.
  fn get_event(
    &self,
    room_id: Uuid,
    sequence: u64,
  ) -> impl Future<Output = Result<Option<TimelineEvent>, Self::Error>> + Send + '_;
}
