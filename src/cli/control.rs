use tabled::Table;

use crate::{
    controller::Controller,
    error, info, success,
    types::TrackTableRow,
    utils,
};

use super::{auth, context};

async fn connected(device: Option<String>) -> Controller {
    let token = match auth::ensure_token().await {
        Ok(token) => token,
        Err(e) => error!("Cannot authorize with Spotify. Err: {}", e),
    };

    match context::connect(token, device).await {
        Ok(controller) => controller,
        Err(e) => error!("{}", e),
    }
}

async fn detached() -> Controller {
    match auth::ensure_token().await {
        Ok(token) => context::controller(token).await,
        Err(e) => error!("Cannot authorize with Spotify. Err: {}", e),
    }
}

pub async fn pause() {
    let mut controller = connected(None).await;
    match controller.pause().await {
        Ok(()) => success!("Paused."),
        Err(e) => context::abort(&controller, e),
    }
}

pub async fn resume() {
    let mut controller = connected(None).await;
    match controller.resume().await {
        Ok(()) => success!("Resumed."),
        Err(e) => context::abort(&controller, e),
    }
}

pub async fn next() {
    let mut controller = connected(None).await;
    match controller.next_track().await {
        Ok(()) => success!("Skipped to next track."),
        Err(e) => context::abort(&controller, e),
    }
}

pub async fn previous() {
    let mut controller = connected(None).await;
    match controller.previous_track().await {
        Ok(()) => success!("Back to previous track."),
        Err(e) => context::abort(&controller, e),
    }
}

pub async fn shuffle(enabled: bool) {
    let mut controller = connected(None).await;
    match controller.set_shuffle(enabled).await {
        Ok(()) => success!("Shuffle {}.", if enabled { "on" } else { "off" }),
        Err(e) => context::abort(&controller, e),
    }
}

/// Saves the playing track to the user's library.
pub async fn save() {
    let mut controller = detached().await;
    if let Err(e) = controller.save_current_track().await {
        context::abort(&controller, e);
    }
    if let Some(notice) = controller.take_notice() {
        success!("{}", notice);
    }
}

pub async fn now_playing() {
    let mut controller = detached().await;
    let state = match controller.refresh_now_playing().await {
        Ok(state) => state,
        Err(e) => context::abort(&controller, e),
    };

    let Some(track) = state.and_then(|s| s.track) else {
        info!("Nothing is playing right now.");
        return;
    };

    let playback = controller.playback();
    let row = TrackTableRow {
        name: track.name.clone(),
        artists: track.artist_names(),
        duration: format!(
            "{}/{}",
            utils::format_duration(playback.track_progress),
            utils::format_duration(playback.track_duration)
        ),
    };
    println!("{}", Table::new(vec![row]));
}
