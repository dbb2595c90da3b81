//! [`SqliteStore`]: the SQLite implementation of [`Timeline`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;
use uuid::Uuid;

use intervene_core::{
  content::MessageContent,
  role::Role,
  timeline::{Membership, Room, Timeline, TimelineEvent},
};

use crate::{
  Error, Result,
  encode::{
    RawEvent, RawMembership, RawRoom, decode_role, encode_content, encode_dt,
    encode_role, encode_uuid,
  },
  schema::SCHEMA,
};

/// Appends buffered per subscriber before it starts lagging.
const SUBSCRIBER_CAPACITY: usize = 256;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An intervention timeline backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection and the broadcast sender are
/// reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:     tokio_rusqlite::Connection,
  appended: broadcast::Sender<TimelineEvent>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::with_connection(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::with_connection(conn).await
  }

  async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let (appended, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
    let store = Self { conn, appended };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Receive every event appended after this call, across all rooms.
  ///
  /// A receiver that falls more than a buffer behind gets
  /// [`broadcast::error::RecvError::Lagged`] and should re-read the
  /// timeline instead.
  pub fn subscribe(&self) -> broadcast::Receiver<TimelineEvent> {
    self.appended.subscribe()
  }

  async fn require_room(&self, room_id: Uuid) -> Result<()> {
    match self.get_room(room_id).await? {
      Some(_) => Ok(()),
      None => Err(Error::RoomNotFound(room_id)),
    }
  }
}

// ─── Timeline impl ───────────────────────────────────────────────────────────

impl Timeline for SqliteStore {
  type Error = Error;

  // ── Rooms ─────────────────────────────────────────────────────────────────

  async fn create_room(&self, name: String) -> Result<Room> {
    let room = Room {
      room_id: Uuid::new_v4(),
      name,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(room.room_id);
    let name_str = room.name.clone();
    let at_str   = encode_dt(room.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO rooms (room_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(room)
  }

  async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>> {
    let id_str = encode_uuid(room_id);

    let raw: Option<RawRoom> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT room_id, name, created_at FROM rooms WHERE room_id = ?1",
              rusqlite::params![id_str],
              RawRoom::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRoom::into_room).transpose()
  }

  async fn list_rooms(&self) -> Result<Vec<Room>> {
    let raws: Vec<RawRoom> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT room_id, name, created_at FROM rooms ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map([], RawRoom::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRoom::into_room).collect()
  }

  // ── Membership ────────────────────────────────────────────────────────────

  async fn join(
    &self,
    room_id:   Uuid,
    user_id:   String,
    user_type: Option<String>,
  ) -> Result<Option<Membership>> {
    self.require_room(room_id).await?;

    let membership = Membership {
      room_id,
      role: Role::from_user_type(user_type.as_deref()),
      user_id,
      user_type,
      joined_at: Utc::now(),
    };

    let room_str  = encode_uuid(room_id);
    let user_str  = membership.user_id.clone();
    let type_str  = membership.user_type.clone();
    let role_str  = encode_role(membership.role).to_owned();
    let at_str    = encode_dt(membership.joined_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO memberships (room_id, user_id, user_type, role, joined_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![room_str, user_str, type_str, role_str, at_str],
        )?;
        Ok(n)
      })
      .await?;

    if inserted == 0 {
      tracing::debug!(%room_id, user_id = %membership.user_id, "already a member");
      return Ok(None);
    }

    tracing::info!(
      %room_id,
      user_id = %membership.user_id,
      role = %membership.role,
      "member joined"
    );
    Ok(Some(membership))
  }

  async fn members(&self, room_id: Uuid) -> Result<Vec<Membership>> {
    let room_str = encode_uuid(room_id);

    let raws: Vec<RawMembership> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT room_id, user_id, user_type, role, joined_at
           FROM memberships WHERE room_id = ?1 ORDER BY joined_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![room_str], RawMembership::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMembership::into_membership).collect()
  }

  async fn resolve_role(&self, room_id: Uuid, user_id: &str) -> Result<Role> {
    let room_str = encode_uuid(room_id);
    let user_str = user_id.to_owned();

    let role: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT role FROM memberships WHERE room_id = ?1 AND user_id = ?2",
              rusqlite::params![room_str, user_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    role.as_deref().map(decode_role).transpose().map(Option::unwrap_or_default)
  }

  // ── Events (append-only) ──────────────────────────────────────────────────

  async fn submit(
    &self,
    room_id: Uuid,
    sender:  String,
    content: MessageContent,
  ) -> Result<TimelineEvent> {
    self.require_room(room_id).await?;

    let event_id    = Uuid::new_v4();
    let recorded_at = Utc::now();

    let event_str   = encode_uuid(event_id);
    let room_str    = encode_uuid(room_id);
    let sender_str  = sender.clone();
    let content_str = encode_content(&content)?;
    let at_str      = encode_dt(recorded_at);

    // All access goes through one connection thread, so reading MAX and
    // inserting inside one transaction cannot interleave with another append.
    let sequence: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let sequence: i64 = tx.query_row(
          "SELECT COALESCE(MAX(sequence), 0) + 1 FROM events WHERE room_id = ?1",
          rusqlite::params![room_str],
          |r| r.get(0),
        )?;
        tx.execute(
          "INSERT INTO events (event_id, room_id, sequence, sender, content_json, recorded_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            event_str,
            room_str,
            sequence,
            sender_str,
            content_str,
            at_str,
          ],
        )?;
        tx.commit()?;
        Ok(sequence)
      })
      .await?;

    let event = TimelineEvent {
      event_id,
      room_id,
      sequence: sequence as u64,
      sender,
      content,
      recorded_at,
    };

    tracing::debug!(
      %room_id,
      sequence = event.sequence,
      action = ?event.content.action,
      "event appended"
    );

    // No subscribers is not an error.
    let _ = self.appended.send(event.clone());
    Ok(event)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn events(
    &self,
    room_id: Uuid,
    after:   Option<u64>,
  ) -> Result<Vec<TimelineEvent>> {
    // Stored sequences fit in an i64, so nothing lies past a larger bound.
    let Ok(after_val) = i64::try_from(after.unwrap_or(0)) else {
      return Ok(Vec::new());
    };
    let room_str = encode_uuid(room_id);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, room_id, sequence, sender, content_json, recorded_at
           FROM events
           WHERE room_id = ?1 AND sequence > ?2
           ORDER BY sequence",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![room_str, after_val], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn get_event(
    &self,
    room_id:  Uuid,
    sequence: u64,
  ) -> Result<Option<TimelineEvent>> {
    let Ok(seq_val) = i64::try_from(sequence) else {
      return Ok(None);
    };
    let room_str = encode_uuid(room_id);

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT event_id, room_id, sequence, sender, content_json, recorded_at
               FROM events WHERE room_id = ?1 AND sequence = ?2",
              rusqlite::params![room_str, seq_val],
              RawEvent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }
}
