//! Core types, the intervention state machine, and the timeline trait.
//!
//! Intervention status is never stored. It is derived by folding the room
//! timeline (see [`derive`]) and new transitions are gated by participant
//! role (see [`governor`]). Storage and HTTP live in other crates; this one
//! depends on neither.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod action;
pub mod content;
pub mod controls;
pub mod derive;
pub mod error;
pub mod governor;
pub mod questions;
pub mod role;
pub mod status;
pub mod timeline;
pub mod tracker;
pub mod transition;

pub use error::{Error, Result, TransitionError};
