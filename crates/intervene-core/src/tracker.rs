//! [`InterventionTracker`]: per-room cached derivations over a
//! [`Timeline`], plus the submission path for new transitions.
//!
//! The cache is only an optimisation: each entry is exactly what
//! [`derive_status`](crate::derive::derive_status) would return for the
//! events folded so far, and catching up reads just the events past its
//! `last_sequence`.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  action::Action,
  content::MessageContent,
  derive::Derivation,
  error::{Error, Result},
  governor,
  role::Role,
  timeline::{Membership, Timeline, TimelineEvent},
};

fn timeline_err<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Timeline(Box::new(e))
}

pub struct InterventionTracker<T> {
  timeline: Arc<T>,
  cache:    Mutex<HashMap<Uuid, Derivation>>,
}

impl<T: Timeline> InterventionTracker<T> {
  pub fn new(timeline: Arc<T>) -> Self {
    Self { timeline, cache: Mutex::new(HashMap::new()) }
  }

  pub fn timeline(&self) -> &Arc<T> { &self.timeline }

  fn cached(&self, room_id: Uuid) -> Option<Derivation> {
    let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
    cache.get(&room_id).cloned()
  }

  /// Keep whichever derivation has folded further.
  fn remember(&self, room_id: Uuid, next: &Derivation) {
    let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
    let entry = cache.entry(room_id).or_default();
    if next.last_sequence > entry.last_sequence {
      *entry = next.clone();
    }
  }

  /// Fold any events appended since the cached derivation.
  async fn catch_up(&self, room_id: Uuid) -> Result<Derivation> {
    let current = match self.cached(room_id) {
      Some(d) => d,
      None => {
        self
          .timeline
          .get_room(room_id)
          .await
          .map_err(timeline_err)?
          .ok_or(Error::RoomNotFound(room_id))?;
        Derivation::default()
      }
    };

    let events = self
      .timeline
      .events(room_id, current.last_sequence)
      .await
      .map_err(timeline_err)?;
    if events.is_empty() {
      self.remember(room_id, &current);
      return Ok(current);
    }

    let roles: HashMap<String, Role> = if events.iter().any(TimelineEvent::is_action) {
      self
        .timeline
        .members(room_id)
        .await
        .map_err(timeline_err)?
        .into_iter()
        .map(|m| (m.user_id, m.role))
        .collect()
    } else {
      HashMap::new()
    };

    let messages: Vec<_> = events
      .iter()
      .map(|e| {
        let role = roles.get(&e.sender).copied().unwrap_or_default();
        e.to_action_message(role)
      })
      .collect();

    let next = current.fold(&messages);
    self.remember(room_id, &next);
    Ok(next)
  }

  /// The current intervention state of a room.
  pub async fn status(&self, room_id: Uuid) -> Result<Derivation> {
    self.catch_up(room_id).await
  }

  /// Add `user_id` to a room. The role follows from `user_type` and is
  /// fixed from then on.
  pub async fn join(
    &self,
    room_id: Uuid,
    user_id: &str,
    user_type: Option<String>,
  ) -> Result<Membership> {
    self
      .timeline
      .get_room(room_id)
      .await
      .map_err(timeline_err)?
      .ok_or(Error::RoomNotFound(room_id))?;

    self
      .timeline
      .join(room_id, user_id.to_owned(), user_type)
      .await
      .map_err(timeline_err)?
      .ok_or_else(|| Error::AlreadyMember { room_id, user_id: user_id.to_owned() })
  }

  /// Re-derive after the timeline reported new events for `room_id`.
  pub async fn refresh(&self, room_id: Uuid) -> Result<()> {
    self.catch_up(room_id).await.map(|_| ())
  }

  /// Check `action` against the caller's role and the current state, then
  /// append the composed message to the room timeline.
  ///
  /// The returned event is what the timeline accepted; whether it moves the
  /// state is settled by the fold, since another participant may have
  /// advanced the room first.
  pub async fn request_transition(
    &self,
    room_id: Uuid,
    user_id: &str,
    action: Action,
    substations: &[String],
  ) -> Result<TimelineEvent> {
    let current = self.catch_up(room_id).await?;
    let role = self
      .timeline
      .resolve_role(room_id, user_id)
      .await
      .map_err(timeline_err)?;

    let content = match governor::request_transition(&current, role, action, substations) {
      Ok(content) => content,
      Err(e) => {
        warn!(%room_id, user_id, %action, %role, error = %e, "transition refused");
        return Err(e.into());
      }
    };

    let event = self
      .timeline
      .submit(room_id, user_id.to_owned(), content)
      .await
      .map_err(|e| Error::Delivery(Box::new(e)))?;

    info!(
      %room_id,
      user_id,
      %action,
      sequence = event.sequence,
      "transition message submitted"
    );

    if let Err(e) = self.catch_up(room_id).await {
      warn!(%room_id, error = %e, "re-derivation after submit failed");
    }
    Ok(event)
  }

  /// Post an ordinary chat message. Only room members may post.
  pub async fn send_message(
    &self,
    room_id: Uuid,
    user_id: &str,
    body: &str,
  ) -> Result<TimelineEvent> {
    let body = body.trim();
    if body.is_empty() {
      return Err(Error::EmptyMessage);
    }

    self
      .timeline
      .get_room(room_id)
      .await
      .map_err(timeline_err)?
      .ok_or(Error::RoomNotFound(room_id))?;

    let is_member = self
      .timeline
      .members(room_id)
      .await
      .map_err(timeline_err)?
      .iter()
      .any(|m| m.user_id == user_id);
    if !is_member {
      return Err(Error::NotAMember { room_id, user_id: user_id.to_owned() });
    }

    self
      .timeline
      .submit(room_id, user_id.to_owned(), MessageContent::text(body))
      .await
      .map_err(|e| Error::Delivery(Box::new(e)))
  }
}
