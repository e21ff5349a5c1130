use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::debug;

use crate::{error::Result, types::PlayerState};

/// Waits for a device to report a loaded track.
///
/// Calls `get_state` up to `max_attempts` times, sleeping `interval`
/// between two attempts, and returns as soon as a state with a track is
/// observed. Otherwise returns the last observed state, which may be
/// `None`. A failed `get_state` call counts as observing `None`.
///
/// Worst case wall time is `(max_attempts - 1) * interval` plus the time
/// spent inside `get_state`.
pub async fn await_track_ready<F, Fut>(
    mut get_state: F,
    max_attempts: u32,
    interval: Duration,
) -> Option<PlayerState>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<PlayerState>>>,
{
    let mut last = None;

    for attempt in 1..=max_attempts {
        last = match get_state().await {
            Ok(state) => state,
            Err(e) => {
                debug!(attempt, error = %e, "reading player state failed");
                None
            }
        };

        if last.as_ref().is_some_and(PlayerState::has_track) {
            debug!(attempt, "track ready");
            return last;
        }

        if attempt < max_attempts {
            sleep(interval).await;
        }
    }

    last
}
