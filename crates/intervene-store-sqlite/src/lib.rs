//! SQLite backend for the intervention timeline.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Appends are published to subscribers
//! over a [`tokio::sync::broadcast`] channel.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
