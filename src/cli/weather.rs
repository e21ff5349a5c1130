use crate::{
    controller::{fetch_weather, validate_city},
    error,
    error::Operation,
    info,
    spotify::playlist::{DEFAULT_PLAYLIST_ID, resolve_playlist},
    weather::{WeatherClient, theme::classify},
};

use super::context;

/// Shows the current weather of `city` and the playlist it maps to.
///
/// Needs no Spotify token.
pub async fn weather(city: String) {
    let city = match validate_city(&city) {
        Ok(city) => city,
        Err(e) => error!("{}", e),
    };

    let api = WeatherClient::from_env();
    let pb = context::spinner(format!("Fetching weather for {}...", city));
    let result = fetch_weather(&api, city).await;
    pb.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => error!("{}", e.friendly_message(Operation::Weather)),
    };

    let code = report.current.weathercode;
    context::print_weather(&report, classify(code));

    let table = context::playlist_table().await;
    let playlist_id = resolve_playlist(code, &table, DEFAULT_PLAYLIST_ID);
    info!("Playlist: {}", playlist_id);
}
