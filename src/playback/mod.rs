//! Timing primitives of the playback flow: the bounded readiness poller
//! run before playback is declared started, and the progress ticker that
//! follows the track position while playing.

mod poller;
mod ticker;

pub use poller::await_track_ready;
pub use ticker::ProgressTicker;
