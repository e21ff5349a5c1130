//! # Application State Controller
//!
//! The controller owns all application state and runs every flow:
//!
//! ```text
//! submit(city) → geocode → current weather → classify
//!              → resolve playlist → fetch playlist
//! play()       → activate device → start context → await track ready
//!              → (fallback: queue known track, retry play once)
//!              → progress ticker
//! pause()      → stop ticker → pause delay → pause device
//! ```
//!
//! It is driven through `&mut self` from a single task, so its state needs
//! no locking. Device readiness arrives on the channel handed over in
//! [`Controller::attach_device`]; the progress ticker publishes on a
//! `watch` channel obtained through [`Controller::progress`].

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::{
    config,
    error::{AppError, Operation, Result},
    playback::{ProgressTicker, await_track_ready},
    spotify::{
        device::PlaybackDevice,
        player::MusicApi,
        playlist::{DEFAULT_PLAYLIST_ID, PlaylistTable, playlist_uri, resolve_playlist},
    },
    types::{AuthToken, DeviceEvent, PlaybackState, PlayerState, Playlist, WeatherReport},
    utils,
    weather::{
        WeatherApi,
        theme::{ThemeTag, classify},
    },
};

/// Where the controller is in its flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    FetchingWeather,
    WeatherReady,
    FetchingPlaylist,
    PlaylistReady,
    Playing,
    Paused,
    Error,
}

/// State slots whose responses are sequenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Weather,
    Playlist,
}

/// Issues increasing request tickets per slot so that only the response
/// to the latest request of a slot is applied.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: HashMap<Slot, u64>,
}

impl RequestSequencer {
    pub fn issue(&mut self, slot: Slot) -> u64 {
        let next = self.latest.get(&slot).copied().unwrap_or(0) + 1;
        self.latest.insert(slot, next);
        next
    }

    pub fn is_latest(&self, slot: Slot, ticket: u64) -> bool {
        self.latest.get(&slot) == Some(&ticket)
    }
}

/// Tunables of the controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub ready_attempts: u32,
    pub ready_interval: Duration,
    pub fallback_delay: Duration,
    pub fallback_track_uri: String,
    pub pause_delay: Duration,
    pub progress_tick: Duration,
    pub playlists: PlaylistTable,
    pub default_playlist: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            ready_attempts: config::READY_POLL_ATTEMPTS,
            ready_interval: config::READY_POLL_INTERVAL,
            fallback_delay: config::FALLBACK_RETRY_DELAY,
            fallback_track_uri: config::DEFAULT_FALLBACK_TRACK.to_string(),
            pause_delay: config::PAUSE_DELAY,
            progress_tick: config::PROGRESS_TICK,
            playlists: PlaylistTable::builtin(),
            default_playlist: DEFAULT_PLAYLIST_ID.to_string(),
        }
    }
}

pub struct Controller {
    weather_api: Arc<dyn WeatherApi>,
    music_api: Arc<dyn MusicApi>,
    device: Option<Arc<dyn PlaybackDevice>>,
    events: Option<mpsc::Receiver<DeviceEvent>>,
    options: ControllerOptions,

    token: Option<AuthToken>,
    status: Status,
    weather: Option<WeatherReport>,
    theme: Option<ThemeTag>,
    playlist_id: Option<String>,
    playlist: Option<Playlist>,
    playback: PlaybackState,
    error: Option<String>,
    notice: Option<String>,

    sequencer: RequestSequencer,
    ticker: ProgressTicker,
    progress: Arc<watch::Sender<Option<PlayerState>>>,
}

impl Controller {
    pub fn new(
        weather_api: Arc<dyn WeatherApi>,
        music_api: Arc<dyn MusicApi>,
        options: ControllerOptions,
    ) -> Self {
        let (progress, _) = watch::channel(None);
        let progress = Arc::new(progress);
        Self {
            weather_api,
            music_api,
            device: None,
            events: None,
            options,
            token: None,
            status: Status::Idle,
            weather: None,
            theme: None,
            playlist_id: None,
            playlist: None,
            playback: PlaybackState::default(),
            error: None,
            notice: None,
            sequencer: RequestSequencer::default(),
            ticker: ProgressTicker::new(),
            progress,
        }
    }

    pub fn with_token(mut self, token: AuthToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn set_token(&mut self, token: Option<AuthToken>) {
        self.token = token;
    }

    /// Attaches the playback device and subscribes to its readiness events.
    pub fn attach_device(
        &mut self,
        device: Arc<dyn PlaybackDevice>,
        events: mpsc::Receiver<DeviceEvent>,
    ) {
        self.device = Some(device);
        self.events = Some(events);
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, Status::FetchingWeather | Status::FetchingPlaylist)
    }

    pub fn weather(&self) -> Option<&WeatherReport> {
        self.weather.as_ref()
    }

    pub fn theme(&self) -> Option<ThemeTag> {
        self.theme
    }

    pub fn playlist_id(&self) -> Option<&str> {
        self.playlist_id.as_deref()
    }

    pub fn playlist(&self) -> Option<&Playlist> {
        self.playlist.as_ref()
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn device_id(&self) -> Option<&str> {
        self.playback.device_id.as_deref()
    }

    /// Last user-facing error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Takes the pending soft warning, e.g. from the playback fallback path.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    /// Receiver of the player states sampled by the progress ticker.
    pub fn progress(&self) -> watch::Receiver<Option<PlayerState>> {
        self.progress.subscribe()
    }

    fn valid_token(&self) -> Option<String> {
        let now = utils::now_ms();
        self.token
            .as_ref()
            .filter(|t| !t.is_expired(now))
            .map(|t| t.access_token.clone())
    }

    /// Records `err` as the current error and hands it back to the caller.
    ///
    /// Weather and playlist data are left untouched.
    fn fail(&mut self, err: AppError, op: Operation) -> AppError {
        warn!(?op, error = %err, "operation failed");
        self.error = Some(err.friendly_message(op));
        self.status = Status::Error;
        err
    }

    /// Looks up the weather for `city` and, on success, loads the playlist
    /// that matches it.
    pub async fn submit(&mut self, city: &str) -> Result<()> {
        let city = match validate_city(city) {
            Ok(city) => city,
            Err(e) => return Err(self.fail(e, Operation::Weather)),
        };

        let ticket = self.begin_weather();
        let result = fetch_weather(self.weather_api.as_ref(), city).await;
        if self.apply_weather(ticket, result)? {
            self.load_playlist().await?;
        }
        Ok(())
    }

    /// Marks a weather request as in flight and returns its ticket.
    pub fn begin_weather(&mut self) -> u64 {
        self.status = Status::FetchingWeather;
        self.error = None;
        self.sequencer.issue(Slot::Weather)
    }

    /// Applies a weather response. Returns `Ok(false)` when the ticket has
    /// been superseded and the response was dropped.
    pub fn apply_weather(&mut self, ticket: u64, result: Result<WeatherReport>) -> Result<bool> {
        if !self.sequencer.is_latest(Slot::Weather, ticket) {
            debug!(ticket, "dropping stale weather response");
            return Ok(false);
        }

        match result {
            Ok(report) => {
                let theme = classify(report.current.weathercode);
                debug!(city = %report.location.name, code = report.current.weathercode, %theme, "weather ready");
                self.theme = Some(theme);
                self.weather = Some(report);
                self.status = Status::WeatherReady;
                Ok(true)
            }
            Err(e) => Err(self.fail(e, Operation::Weather)),
        }
    }

    /// Fetches the playlist mapped to the current weather.
    ///
    /// Without a valid token this fails before any network call.
    pub async fn load_playlist(&mut self) -> Result<()> {
        let Some(token) = self.valid_token() else {
            return Err(self.fail(AppError::MissingToken, Operation::Playlist));
        };

        let playlist_id = match &self.weather {
            Some(report) => resolve_playlist(
                report.current.weathercode,
                &self.options.playlists,
                &self.options.default_playlist,
            ),
            None => self.options.default_playlist.clone(),
        };

        let ticket = self.begin_playlist();
        let result = self.music_api.get_playlist(&token, &playlist_id).await;
        self.apply_playlist(ticket, playlist_id, result).map(|_| ())
    }

    /// Marks a playlist request as in flight and returns its ticket.
    pub fn begin_playlist(&mut self) -> u64 {
        self.status = Status::FetchingPlaylist;
        self.error = None;
        self.sequencer.issue(Slot::Playlist)
    }

    /// Applies a playlist response. Returns `Ok(false)` for stale tickets.
    pub fn apply_playlist(
        &mut self,
        ticket: u64,
        playlist_id: String,
        result: Result<Playlist>,
    ) -> Result<bool> {
        if !self.sequencer.is_latest(Slot::Playlist, ticket) {
            debug!(ticket, "dropping stale playlist response");
            return Ok(false);
        }

        match result {
            Ok(playlist) => {
                self.playlist_id = Some(playlist_id);
                self.playlist = Some(playlist);
                self.status = Status::PlaylistReady;
                Ok(true)
            }
            Err(e) => Err(self.fail(e, Operation::Playlist)),
        }
    }

    /// Applies a readiness notification. Repeated delivery is a no-op.
    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Ready { device_id } => {
                if self.playback.device_id.as_deref() != Some(device_id.as_str()) {
                    debug!(%device_id, "device ready");
                    self.playback.device_id = Some(device_id);
                }
            }
            DeviceEvent::NotReady { device_id } => {
                if self.playback.device_id.as_deref() == Some(device_id.as_str()) {
                    debug!(%device_id, "device went offline");
                    self.playback.device_id = None;
                    self.playback.is_playing = false;
                    self.ticker.stop();
                }
            }
        }
    }

    /// Applies every event already waiting on the channel.
    pub fn pump_device_events(&mut self) -> usize {
        let mut pending = Vec::new();
        if let Some(events) = self.events.as_mut() {
            while let Ok(event) = events.try_recv() {
                pending.push(event);
            }
        }

        let count = pending.len();
        for event in pending {
            self.handle_device_event(event);
        }
        count
    }

    /// Waits until a device has announced itself, at most `timeout`.
    pub async fn wait_for_device(&mut self, timeout: Duration) -> Result<String> {
        self.pump_device_events();
        if let Some(id) = self.playback.device_id.clone() {
            return Ok(id);
        }

        let Some(mut events) = self.events.take() else {
            return Err(AppError::NoPlayer);
        };

        let outcome = tokio::time::timeout(timeout, async {
            while let Some(event) = events.recv().await {
                self.handle_device_event(event);
                if let Some(id) = self.playback.device_id.clone() {
                    return Some(id);
                }
            }
            None
        })
        .await;
        self.events = Some(events);

        match outcome {
            Ok(Some(id)) => Ok(id),
            _ => Err(AppError::NotReady),
        }
    }

    /// Starts the loaded playlist on the ready device.
    ///
    /// The device is activated first, then the playlist context is started
    /// and the device is polled until it reports a loaded track. If it never
    /// does, one known track is queued and the play call is retried once.
    pub async fn play(&mut self) -> Result<()> {
        self.pump_device_events();

        let Some(device) = self.device.clone() else {
            return Err(self.fail(AppError::NoPlayer, Operation::Playback));
        };
        let context_uri = self.playlist.as_ref().map(|p| {
            if p.uri.is_empty() {
                playlist_uri(&p.id)
            } else {
                p.uri.clone()
            }
        });
        let (Some(token), Some(device_id), Some(context_uri)) = (
            self.valid_token(),
            self.playback.device_id.clone(),
            context_uri,
        ) else {
            return Err(self.fail(AppError::NotReady, Operation::Playback));
        };

        if let Err(e) = self.music_api.transfer_playback(&token, &device_id).await {
            return Err(self.fail(e, Operation::Playback));
        }
        if let Err(e) = self
            .music_api
            .start_playback(&token, &device_id, Some(&context_uri))
            .await
        {
            return Err(self.fail(e, Operation::Playback));
        }

        let polled = {
            let device = Arc::clone(&device);
            await_track_ready(
                move || {
                    let device = Arc::clone(&device);
                    async move { device.current_state().await }
                },
                self.options.ready_attempts,
                self.options.ready_interval,
            )
            .await
        };

        let state = match polled.filter(PlayerState::has_track) {
            Some(state) => Some(state),
            None => {
                warn!(%device_id, "no track loaded after polling, queueing fallback track");
                self.notice = Some("No track loaded yet, queueing a fallback track.".to_string());

                if let Err(e) = self
                    .music_api
                    .add_to_queue(&token, &self.options.fallback_track_uri, Some(&device_id))
                    .await
                {
                    return Err(self.fail(e, Operation::Playback));
                }

                tokio::time::sleep(self.options.fallback_delay).await;

                if let Err(e) = self
                    .music_api
                    .start_playback(&token, &device_id, Some(&context_uri))
                    .await
                {
                    return Err(self.fail(e, Operation::Playback));
                }
                device.current_state().await.ok().flatten()
            }
        };

        self.apply_player_state(state.as_ref());
        self.playback.is_playing = true;
        self.status = Status::Playing;
        self.error = None;
        self.start_progress(device);
        Ok(())
    }

    /// Stops progress tracking and pauses the device.
    pub async fn pause(&mut self) -> Result<()> {
        let Some(device) = self.device.clone() else {
            return Err(self.fail(AppError::NoPlayer, Operation::Pause));
        };

        self.ticker.stop();
        tokio::time::sleep(self.options.pause_delay).await;
        match device.pause().await {
            Ok(()) => {
                self.playback.is_playing = false;
                self.status = Status::Paused;
                Ok(())
            }
            Err(e) => Err(self.fail(e, Operation::Pause)),
        }
    }

    /// Resumes a paused device and restarts progress tracking.
    pub async fn resume(&mut self) -> Result<()> {
        let Some(device) = self.device.clone() else {
            return Err(self.fail(AppError::NoPlayer, Operation::Playback));
        };

        match device.resume().await {
            Ok(()) => {
                self.playback.is_playing = true;
                self.status = Status::Playing;
                self.start_progress(device);
                Ok(())
            }
            Err(e) => Err(self.fail(e, Operation::Playback)),
        }
    }

    pub async fn next_track(&mut self) -> Result<()> {
        let token = self.require_token(Operation::Playback)?;
        let device_id = self.playback.device_id.clone();
        match self.music_api.next_track(&token, device_id.as_deref()).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e, Operation::Playback)),
        }
    }

    pub async fn previous_track(&mut self) -> Result<()> {
        let token = self.require_token(Operation::Playback)?;
        let device_id = self.playback.device_id.clone();
        match self
            .music_api
            .previous_track(&token, device_id.as_deref())
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e, Operation::Playback)),
        }
    }

    pub async fn set_shuffle(&mut self, enabled: bool) -> Result<()> {
        let token = self.require_token(Operation::Playback)?;
        let device_id = self.playback.device_id.clone();
        match self
            .music_api
            .set_shuffle(&token, enabled, device_id.as_deref())
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e, Operation::Playback)),
        }
    }

    /// Refreshes the currently playing track from the API.
    pub async fn refresh_now_playing(&mut self) -> Result<Option<PlayerState>> {
        let token = self.require_token(Operation::Other)?;
        match self.music_api.currently_playing(&token).await {
            Ok(state) => {
                self.apply_player_state(state.as_ref());
                Ok(state)
            }
            Err(e) => Err(self.fail(e, Operation::Other)),
        }
    }

    /// Saves the current track to the user's library.
    ///
    /// The confirmation notice is only set once the save succeeded.
    pub async fn save_current_track(&mut self) -> Result<String> {
        let token = self.require_token(Operation::SaveTrack)?;

        if self.playback.current_track.is_none() {
            self.refresh_now_playing().await?;
        }
        let Some((track_id, name)) = self
            .playback
            .current_track
            .as_ref()
            .and_then(|t| t.id.clone().map(|id| (id, t.name.clone())))
        else {
            let err = AppError::Validation("No track is currently playing.".to_string());
            return Err(self.fail(err, Operation::SaveTrack));
        };

        match self.music_api.save_tracks(&token, &[track_id]).await {
            Ok(()) => {
                self.notice = Some(format!("Saved {name} to your library."));
                Ok(name)
            }
            Err(e) => Err(self.fail(e, Operation::SaveTrack)),
        }
    }

    fn require_token(&mut self, op: Operation) -> Result<String> {
        match self.valid_token() {
            Some(token) => Ok(token),
            None => Err(self.fail(AppError::MissingToken, op)),
        }
    }

    fn apply_player_state(&mut self, state: Option<&PlayerState>) {
        let Some(state) = state else {
            return;
        };
        self.playback.current_track = state.track.clone();
        self.playback.track_progress = state.progress_ms;
        self.playback.track_duration = state.duration_ms;
    }

    fn start_progress(&mut self, device: Arc<dyn PlaybackDevice>) {
        let progress = Arc::clone(&self.progress);
        self.ticker.start(self.options.progress_tick, move || {
            let device = Arc::clone(&device);
            let progress = Arc::clone(&progress);
            async move {
                match device.current_state().await {
                    Ok(state) => {
                        progress.send_replace(state);
                    }
                    Err(e) => debug!(error = %e, "progress poll failed"),
                }
            }
        });
    }
}

/// Trims `city` and rejects it when nothing is left.
pub fn validate_city(city: &str) -> Result<&str> {
    let city = city.trim();
    if city.is_empty() {
        return Err(AppError::Validation(
            "Please enter a valid city name.".to_string(),
        ));
    }
    Ok(city)
}

/// Geocodes `city` and reads its current weather.
pub async fn fetch_weather(api: &dyn WeatherApi, city: &str) -> Result<WeatherReport> {
    let location = api.geocode(city).await?.ok_or(AppError::CityNotFound)?;
    let current = api
        .current_weather(location.latitude, location.longitude)
        .await?;
    Ok(WeatherReport { location, current })
}
