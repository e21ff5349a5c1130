use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    error::{AppError, Result},
    spotify::player::{MusicApi, SpotifyClient},
    types::{Device, DeviceEvent, PlayerState},
};

/// A streaming endpoint the controller can drive.
///
/// Mirrors the surface of an in-browser playback SDK: a device connects,
/// reports its current state and can be paused or resumed. Readiness is
/// announced separately as [`DeviceEvent`]s.
#[async_trait]
pub trait PlaybackDevice: Send + Sync {
    /// Attaches to the endpoint. Returns whether a device is available.
    async fn connect(&self) -> Result<bool>;

    /// State of this device, `None` when it is not the one playing.
    async fn current_state(&self) -> Result<Option<PlayerState>>;

    async fn pause(&self) -> Result<()>;

    async fn resume(&self) -> Result<()>;
}

/// Picks the device named `name` (case-insensitive), or the active device,
/// or the first device that has an ID.
pub fn select_device<'a>(devices: &'a [Device], name: Option<&str>) -> Option<&'a Device> {
    let with_id = || devices.iter().filter(|d| d.id.is_some());
    match name {
        Some(name) => with_id().find(|d| d.name.eq_ignore_ascii_case(name)),
        None => with_id()
            .find(|d| d.is_active)
            .or_else(|| with_id().next()),
    }
}

/// Readiness transition between the previously announced device and the
/// currently selected one, if any.
pub fn readiness_change(previous: Option<&str>, current: Option<&str>) -> Vec<DeviceEvent> {
    match (previous, current) {
        (Some(p), Some(c)) if p == c => Vec::new(),
        (None, None) => Vec::new(),
        (prev, cur) => {
            let mut events = Vec::new();
            if let Some(p) = prev {
                events.push(DeviceEvent::NotReady {
                    device_id: p.to_string(),
                });
            }
            if let Some(c) = cur {
                events.push(DeviceEvent::Ready {
                    device_id: c.to_string(),
                });
            }
            events
        }
    }
}

/// A Spotify Connect device driven through the Web API player endpoints.
pub struct ConnectDevice {
    api: SpotifyClient,
    token: String,
    device_name: Option<String>,
    bound: Mutex<Option<String>>,
}

impl ConnectDevice {
    pub fn new(api: SpotifyClient, token: impl Into<String>, device_name: Option<String>) -> Self {
        Self {
            api,
            token: token.into(),
            device_name,
            bound: Mutex::new(None),
        }
    }

    /// ID of the device this handle currently drives.
    pub async fn device_id(&self) -> Option<String> {
        self.bound.lock().await.clone()
    }

    /// Re-reads the device list and rebinds to the selected device.
    async fn refresh(&self) -> Result<Option<String>> {
        let devices = self.api.devices(&self.token).await?;
        let selected =
            select_device(&devices, self.device_name.as_deref()).and_then(|d| d.id.clone());

        let mut bound = self.bound.lock().await;
        *bound = selected.clone();
        Ok(selected)
    }

    /// Polls the device list every `period` and publishes readiness changes.
    ///
    /// The task ends once the receiving side of `events` is dropped.
    pub fn spawn_watcher(
        self: &Arc<Self>,
        events: mpsc::Sender<DeviceEvent>,
        period: Duration,
    ) -> JoinHandle<()> {
        let device = Arc::clone(self);
        tokio::spawn(async move {
            let mut announced: Option<String> = None;
            loop {
                match device.refresh().await {
                    Ok(current) => {
                        for event in readiness_change(announced.as_deref(), current.as_deref()) {
                            debug!(?event, "device readiness changed");
                            if events.send(event).await.is_err() {
                                return;
                            }
                        }
                        announced = current;
                    }
                    Err(e) => warn!(error = %e, "failed to list playback devices"),
                }

                if events.is_closed() {
                    return;
                }
                tokio::time::sleep(period).await;
            }
        })
    }
}

#[async_trait]
impl PlaybackDevice for ConnectDevice {
    async fn connect(&self) -> Result<bool> {
        Ok(self.refresh().await?.is_some())
    }

    async fn current_state(&self) -> Result<Option<PlayerState>> {
        let bound = self.device_id().await;
        let state = self.api.playback_state(&self.token).await?;

        Ok(state.filter(|s| match (&bound, &s.device_id) {
            (Some(b), Some(d)) => b == d,
            _ => false,
        }))
    }

    async fn pause(&self) -> Result<()> {
        match self.device_id().await {
            Some(id) => self.api.pause_playback(&self.token, &id).await,
            None => Err(AppError::NoPlayer),
        }
    }

    async fn resume(&self) -> Result<()> {
        match self.device_id().await {
            Some(id) => self.api.start_playback(&self.token, &id, None).await,
            None => Err(AppError::NoPlayer),
        }
    }
}
