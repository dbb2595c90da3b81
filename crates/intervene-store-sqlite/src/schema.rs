//! SQL schema for the intervention timeline store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS rooms (
    room_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- Written once per (room, user); never updated, so role resolution is
-- stable for every past event.
CREATE TABLE IF NOT EXISTS memberships (
    room_id     TEXT NOT NULL REFERENCES rooms(room_id),
    user_id     TEXT NOT NULL,
    user_type   TEXT,
    role        TEXT NOT NULL,   -- 'field_team' | 'counterparty' | 'unknown'
    joined_at   TEXT NOT NULL,
    PRIMARY KEY (room_id, user_id)
);

-- Events are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS events (
    event_id      TEXT PRIMARY KEY,
    room_id       TEXT NOT NULL REFERENCES rooms(room_id),
    sequence      INTEGER NOT NULL,  -- 1-based, per room
    sender        TEXT NOT NULL,
    content_json  TEXT NOT NULL,     -- MessageContent
    recorded_at   TEXT NOT NULL,     -- ISO 8601 UTC; store-assigned
    UNIQUE (room_id, sequence)
);

PRAGMA user_version = 1;
";
