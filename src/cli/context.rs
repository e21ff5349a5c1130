use std::{borrow::Cow, sync::Arc, time::Duration};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    Res, config,
    controller::{Controller, ControllerOptions},
    error, info,
    spotify::{
        device::{ConnectDevice, PlaybackDevice},
        player::SpotifyClient,
        playlist::PlaylistTable,
    },
    types::{AuthToken, WeatherReport},
    warning,
    weather::{WeatherClient, theme::ThemeTag},
};

const DEVICE_EVENTS_CAPACITY: usize = 16;

pub(crate) fn spinner(message: impl Into<Cow<'static, str>>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

/// Built-in playlist table with the user's overrides merged in.
pub(crate) async fn playlist_table() -> PlaylistTable {
    match PlaylistTable::load_overrides(&config::playlist_overrides_path()).await {
        Ok(table) => table,
        Err(e) => {
            warning!("Ignoring playlist overrides. Err: {}", e);
            PlaylistTable::builtin()
        }
    }
}

pub(crate) async fn controller_options() -> ControllerOptions {
    ControllerOptions {
        fallback_track_uri: config::fallback_track_uri(),
        playlists: playlist_table().await,
        ..ControllerOptions::default()
    }
}

/// Builds a controller holding `token`, without a playback device.
pub(crate) async fn controller(token: AuthToken) -> Controller {
    Controller::new(
        Arc::new(WeatherClient::from_env()),
        Arc::new(SpotifyClient::from_env()),
        controller_options().await,
    )
    .with_token(token)
}

/// Builds a controller and waits until a Spotify Connect device is ready.
pub(crate) async fn connect(token: AuthToken, device_name: Option<String>) -> Res<Controller> {
    let device = Arc::new(ConnectDevice::new(
        SpotifyClient::from_env(),
        token.access_token.clone(),
        device_name.or_else(config::device_name),
    ));
    let mut controller = controller(token).await;

    if !device.connect().await? {
        info!("No Spotify device found yet. Open Spotify on one of your devices.");
    }

    let (tx, rx) = mpsc::channel(DEVICE_EVENTS_CAPACITY);
    device.spawn_watcher(tx, config::DEVICE_POLL_INTERVAL);
    controller.attach_device(device, rx);

    let pb = spinner("Waiting for a Spotify device...");
    let ready = controller.wait_for_device(config::DEVICE_WAIT_TIMEOUT).await;
    pb.finish_and_clear();

    let device_id = ready.map_err(|_| "No Spotify device became available.")?;
    debug!(%device_id, "device ready");
    Ok(controller)
}

/// Prints the location, temperature and theme of a weather report.
pub(crate) fn print_weather(report: &WeatherReport, theme: ThemeTag) {
    let location = match &report.location.country {
        Some(country) => format!("{}, {}", report.location.name, country),
        None => report.location.name.clone(),
    };

    info!(
        "{}: {:.1}°C, code {} ({})",
        location.bold(),
        report.current.temperature,
        report.current.weathercode,
        theme.as_str().color(theme.color()).bold()
    );
}

/// Exits with the controller's user-facing message for `err`.
pub(crate) fn abort(controller: &Controller, err: impl std::fmt::Display) -> ! {
    match controller.error() {
        Some(message) => error!("{}", message),
        None => error!("{}", err),
    }
}
