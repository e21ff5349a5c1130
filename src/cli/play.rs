use indicatif::{ProgressBar, ProgressStyle};
use tokio::signal;

use crate::{
    controller::{Controller, validate_city},
    error, info, success,
    types::PlayerState,
    utils, warning,
};

use super::{auth, context};

/// Looks up the weather of `city`, plays the matching playlist and renders
/// the track progress until Ctrl-C, then pauses.
pub async fn play(city: String, device: Option<String>) {
    let city = match validate_city(&city) {
        Ok(city) => city,
        Err(e) => error!("{}", e),
    };

    let token = match auth::ensure_token().await {
        Ok(token) => token,
        Err(e) => error!("Cannot authorize with Spotify. Err: {}", e),
    };

    let mut controller = match context::connect(token, device).await {
        Ok(controller) => controller,
        Err(e) => error!("{}", e),
    };

    let pb = context::spinner(format!("Fetching weather for {}...", city));
    let submitted = controller.submit(city).await;
    pb.finish_and_clear();
    if let Err(e) = submitted {
        context::abort(&controller, e);
    }

    if let (Some(report), Some(theme)) = (controller.weather(), controller.theme()) {
        context::print_weather(report, theme);
    }
    if let Some(playlist) = controller.playlist() {
        info!("Playlist: {}", playlist.name);
    }

    let pb = context::spinner("Starting playback...");
    let started = controller.play().await;
    pb.finish_and_clear();
    if let Some(notice) = controller.take_notice() {
        warning!("{}", notice);
    }
    if let Err(e) = started {
        context::abort(&controller, e);
    }

    success!("Playing. Press Ctrl-C to pause.");
    follow_progress(&controller).await;

    match controller.pause().await {
        Ok(()) => success!("Paused."),
        Err(e) => context::abort(&controller, e),
    }
}

/// Renders the sampled player state until Ctrl-C is pressed.
async fn follow_progress(controller: &Controller) {
    let pb = progress_bar(controller);
    let mut progress = controller.progress();

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            changed = progress.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = progress.borrow_and_update().clone();
                if let Some(state) = state {
                    render(&pb, &state);
                }
            }
        }
    }

    pb.finish_and_clear();
}

fn progress_bar(controller: &Controller) -> ProgressBar {
    let playback = controller.playback();
    let pb = ProgressBar::new(playback.track_duration.max(1));
    pb.set_style(
        ProgressStyle::with_template("{msg}\n{bar:40.cyan/blue} {prefix}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    if let Some(track) = &playback.current_track {
        pb.set_message(format!("{} - {}", track.name, track.artist_names()));
    }
    pb.set_position(playback.track_progress);
    pb.set_prefix(format!(
        "{}/{}",
        utils::format_duration(playback.track_progress),
        utils::format_duration(playback.track_duration)
    ));
    pb
}

fn render(pb: &ProgressBar, state: &PlayerState) {
    if let Some(track) = &state.track {
        pb.set_message(format!("{} - {}", track.name, track.artist_names()));
    }
    pb.set_length(state.duration_ms.max(1));
    pb.set_position(state.progress_ms);
    pb.set_prefix(format!(
        "{}/{}",
        utils::format_duration(state.progress_ms),
        utils::format_duration(state.duration_ms)
    ));
}
