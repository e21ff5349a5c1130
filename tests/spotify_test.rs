use serde_json::json;
use weatherplay::{
    error::AppError,
    spotify::{
        device::{ConnectDevice, PlaybackDevice, readiness_change, select_device},
        player::{MusicApi, SpotifyClient},
    },
    types::{Device, DeviceEvent},
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLAYLIST_ID: &str = "59ZYAP4IaizWIk5SOt2RFx";

fn playlist_json() -> serde_json::Value {
    json!({
        "id": PLAYLIST_ID,
        "name": "Stormy Nights",
        "uri": format!("spotify:playlist:{PLAYLIST_ID}"),
        "images": [{ "url": "https://i.scdn.co/image/cover", "height": 640, "width": 640 }],
        "external_urls": { "spotify": format!("https://open.spotify.com/playlist/{PLAYLIST_ID}") },
        "tracks": {
            "total": 1,
            "items": [
                {
                    "track": {
                        "id": "track-1",
                        "name": "Riders on the Storm",
                        "uri": "spotify:track:track-1",
                        "duration_ms": 428000,
                        "artists": [{ "name": "The Doors" }]
                    }
                }
            ]
        }
    })
}

fn player_json(device_id: &str) -> serde_json::Value {
    json!({
        "device": { "id": device_id, "name": "Laptop", "is_active": true, "type": "Computer" },
        "is_playing": true,
        "progress_ms": 12000,
        "item": {
            "id": "track-1",
            "name": "Riders on the Storm",
            "uri": "spotify:track:track-1",
            "duration_ms": 428000,
            "artists": [{ "name": "The Doors" }]
        }
    })
}

// Helper function to create a test device
fn device(id: Option<&str>, name: &str, is_active: bool) -> Device {
    Device {
        id: id.map(str::to_string),
        name: name.to_string(),
        is_active,
        kind: "Computer".to_string(),
    }
}

#[tokio::test]
async fn test_get_playlist() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/playlists/{PLAYLIST_ID}")))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = SpotifyClient::new(server.uri());
    let playlist = client.get_playlist("token", PLAYLIST_ID).await.unwrap();

    assert_eq!(playlist.name, "Stormy Nights");
    assert_eq!(playlist.uri, format!("spotify:playlist:{PLAYLIST_ID}"));
    let tracks = playlist.tracks.unwrap();
    assert_eq!(tracks.total, 1);
    let track = tracks.items[0].track.as_ref().unwrap();
    assert_eq!(track.artist_names(), "The Doors");
}

#[tokio::test]
async fn test_get_playlist_through_proxy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/spotify/playlist/{PLAYLIST_ID}")))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = SpotifyClient::new("http://127.0.0.1:9").with_playlist_proxy(server.uri());
    let playlist = client.get_playlist("token", PLAYLIST_ID).await.unwrap();

    assert_eq!(playlist.id, PLAYLIST_ID);
}

#[tokio::test]
async fn test_get_playlist_rejects_invalid_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = SpotifyClient::new(server.uri());
    let result = client.get_playlist("token", "../me/tracks").await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_unauthorized_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/playlists/{PLAYLIST_ID}")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "The access token expired" }
        })))
        .mount(&server)
        .await;

    let client = SpotifyClient::new(server.uri());
    let result = client.get_playlist("expired", PLAYLIST_ID).await;

    assert!(matches!(
        result,
        Err(AppError::Upstream { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_transfer_and_start_playback() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/player"))
        .and(body_json(json!({ "device_ids": ["abc"], "play": false })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/play"))
        .and(query_param("device_id", "abc"))
        .and(body_json(json!({ "context_uri": format!("spotify:playlist:{PLAYLIST_ID}") })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = SpotifyClient::new(server.uri());
    client.transfer_playback("token", "abc").await.unwrap();
    client
        .start_playback(
            "token",
            "abc",
            Some(&format!("spotify:playlist:{PLAYLIST_ID}")),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_currently_playing_without_playback_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = SpotifyClient::new(server.uri());

    assert_eq!(client.currently_playing("token").await.unwrap(), None);
}

#[tokio::test]
async fn test_playback_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player"))
        .respond_with(ResponseTemplate::new(200).set_body_json(player_json("abc")))
        .mount(&server)
        .await;

    let client = SpotifyClient::new(server.uri());
    let state = client.playback_state("token").await.unwrap().unwrap();

    assert_eq!(state.device_id.as_deref(), Some("abc"));
    assert!(state.is_playing);
    assert!(state.has_track());
    assert_eq!(state.progress_ms, 12000);
    assert_eq!(state.duration_ms, 428000);
}

#[tokio::test]
async fn test_library_and_queue_calls() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/tracks"))
        .and(query_param("ids", "track-1,track-2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/me/player/queue"))
        .and(query_param("uri", "spotify:track:4cOdK2wGLETKBW3PvgPWqT"))
        .and(query_param("device_id", "abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/shuffle"))
        .and(query_param("state", "true"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/me/player/next"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = SpotifyClient::new(server.uri());
    client
        .save_tracks("token", &["track-1".to_string(), "track-2".to_string()])
        .await
        .unwrap();
    client
        .add_to_queue("token", "spotify:track:4cOdK2wGLETKBW3PvgPWqT", Some("abc"))
        .await
        .unwrap();
    client.set_shuffle("token", true, None).await.unwrap();
    client.next_track("token", None).await.unwrap();
}

#[test]
fn test_select_device() {
    let devices = vec![
        device(None, "Restricted", true),
        device(Some("tv"), "Living Room TV", false),
        device(Some("laptop"), "Laptop", true),
    ];

    // named, case-insensitive
    assert_eq!(
        select_device(&devices, Some("living room tv")).and_then(|d| d.id.as_deref()),
        Some("tv")
    );
    // active device with an id wins without a name
    assert_eq!(
        select_device(&devices, None).and_then(|d| d.id.as_deref()),
        Some("laptop")
    );
    assert!(select_device(&devices, Some("Phone")).is_none());
    assert!(select_device(&[], None).is_none());

    let idle = vec![device(Some("tv"), "TV", false), device(Some("pc"), "PC", false)];
    assert_eq!(
        select_device(&idle, None).and_then(|d| d.id.as_deref()),
        Some("tv")
    );
}

#[test]
fn test_readiness_change() {
    let ready = |id: &str| DeviceEvent::Ready {
        device_id: id.to_string(),
    };
    let gone = |id: &str| DeviceEvent::NotReady {
        device_id: id.to_string(),
    };

    assert!(readiness_change(None, None).is_empty());
    assert!(readiness_change(Some("a"), Some("a")).is_empty());
    assert_eq!(readiness_change(None, Some("a")), vec![ready("a")]);
    assert_eq!(readiness_change(Some("a"), None), vec![gone("a")]);
    assert_eq!(
        readiness_change(Some("a"), Some("b")),
        vec![gone("a"), ready("b")]
    );
}

#[tokio::test]
async fn test_connect_device_binds_and_controls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                { "id": "tv", "name": "TV", "is_active": false, "type": "TV" },
                { "id": "abc", "name": "Laptop", "is_active": false, "type": "Computer" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/player"))
        .respond_with(ResponseTemplate::new(200).set_body_json(player_json("abc")))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/me/player/pause"))
        .and(query_param("device_id", "abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let device = ConnectDevice::new(
        SpotifyClient::new(server.uri()),
        "token",
        Some("laptop".to_string()),
    );

    assert!(device.connect().await.unwrap());
    assert_eq!(device.device_id().await.as_deref(), Some("abc"));

    let state = device.current_state().await.unwrap().unwrap();
    assert_eq!(state.device_id.as_deref(), Some("abc"));

    device.pause().await.unwrap();
}

#[tokio::test]
async fn test_connect_device_ignores_other_players() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/player/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [{ "id": "abc", "name": "Laptop", "is_active": true, "type": "Computer" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/player"))
        .respond_with(ResponseTemplate::new(200).set_body_json(player_json("phone")))
        .mount(&server)
        .await;

    let device = ConnectDevice::new(SpotifyClient::new(server.uri()), "token", None);
    device.connect().await.unwrap();

    assert_eq!(device.current_state().await.unwrap(), None);
}

#[tokio::test]
async fn test_unbound_device_cannot_pause() {
    let device = ConnectDevice::new(SpotifyClient::new("http://127.0.0.1:9"), "token", None);

    assert!(matches!(device.pause().await, Err(AppError::NoPlayer)));
}
