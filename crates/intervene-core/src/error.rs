//! Error types for `intervene-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{action::Action, role::Role, status::InterventionStatus};

/// Why the governor refused to compose a transition message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
  #[error("{action} is not a valid transition from status {status}")]
  InvalidTransition {
    status: InterventionStatus,
    action: Action,
  },

  #[error("{action} requires role {required}, caller has role {actual}")]
  Unauthorized {
    action:   Action,
    required: Role,
    actual:   Role,
  },

  #[error("create_intervention requires at least one substation")]
  MissingSubstations,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Transition(#[from] TransitionError),

  #[error("room not found: {0}")]
  RoomNotFound(Uuid),

  #[error("{user_id} is not a member of room {room_id}")]
  NotAMember { room_id: Uuid, user_id: String },

  #[error("{user_id} already joined room {room_id}")]
  AlreadyMember { room_id: Uuid, user_id: String },

  #[error("message body is empty")]
  EmptyMessage,

  /// The timeline refused or failed to append a composed message.
  #[error("delivery failed: {0}")]
  Delivery(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("timeline error: {0}")]
  Timeline(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
