//! JSON REST API for intervention rooms.
//!
//! Exposes an axum [`Router`] backed by an [`InterventionTracker`] over any
//! [`Timeline`]. Authentication is the caller's responsibility: the mounting
//! server must insert a [`Caller`] into the request extensions.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", intervene_api::api_router(tracker.clone()))
//! ```

pub mod caller;
pub mod error;
pub mod etag;
pub mod events;
pub mod interventions;
pub mod rooms;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use intervene_core::{timeline::Timeline, tracker::InterventionTracker};

pub use caller::Caller;
pub use error::ApiError;

/// Handler state: the tracker shared by every request.
pub type Shared<T> = Arc<InterventionTracker<T>>;

/// Build a fully-materialised API router for `tracker`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<T>(tracker: Shared<T>) -> Router<()>
where
  T: Timeline + 'static,
{
  Router::new()
    // Rooms
    .route("/rooms", get(rooms::list::<T>).post(rooms::create::<T>))
    .route("/rooms/{id}", get(rooms::get_one::<T>))
    .route("/rooms/{id}/members", get(rooms::members::<T>))
    .route("/rooms/{id}/join", post(rooms::join::<T>))
    // Timeline
    .route("/rooms/{id}/events", get(events::list::<T>))
    .route("/rooms/{id}/messages", post(events::post_message::<T>))
    .route(
      "/rooms/{id}/events/{seq}/questions",
      get(events::questions::<T>),
    )
    // Intervention lifecycle
    .route("/rooms/{id}/interventions", get(interventions::timeline::<T>))
    .route("/rooms/{id}/status", get(interventions::status::<T>))
    .route("/rooms/{id}/controls", get(interventions::controls::<T>))
    .route("/rooms/{id}/transitions", post(interventions::transition::<T>))
    .with_state(tracker)
}
