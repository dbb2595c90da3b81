//! Background task feeding timeline appends into the tracker.

use intervene_api::Shared;
use intervene_core::timeline::{Timeline, TimelineEvent};
use tokio::{
  sync::broadcast::{Receiver, error::RecvError},
  task::JoinHandle,
};
use tracing::{debug, warn};

/// Re-derive a room's status whenever an event is appended to it.
///
/// Runs until the sending side closes. A lagging receiver only logs: the
/// skipped rooms catch up on their next status read.
pub fn spawn_refresher<T>(
  tracker: Shared<T>,
  mut appended: Receiver<TimelineEvent>,
) -> JoinHandle<()>
where
  T: Timeline + 'static,
{
  tokio::spawn(async move {
    loop {
      match appended.recv().await {
        Ok(event) => {
          debug!(room_id = %event.room_id, sequence = event.sequence, "refreshing room");
          if let Err(e) = tracker.refresh(event.room_id).await {
            warn!(room_id = %event.room_id, error = %e, "refresh failed");
          }
        }
        Err(RecvError::Lagged(skipped)) => {
          warn!(skipped, "refresher lagged behind the timeline");
        }
        Err(RecvError::Closed) => break,
      }
    }
  })
}
