use serde_json::json;
use weatherplay::{
    controller::fetch_weather,
    error::AppError,
    weather::{WeatherApi, WeatherClient, theme::classify, theme::ThemeTag},
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn raleigh_json() -> serde_json::Value {
    json!({
        "results": [
            {
                "id": 4487042,
                "name": "Raleigh",
                "latitude": 35.7721,
                "longitude": -78.63861,
                "country": "United States"
            }
        ],
        "generationtime_ms": 0.6
    })
}

async fn mount_forecast(server: &MockServer, code: i64) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "35.7721"))
        .and(query_param("longitude", "-78.63861"))
        .and(query_param("current_weather", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 35.77,
            "longitude": -78.64,
            "current_weather": {
                "temperature": 24.3,
                "windspeed": 11.2,
                "weathercode": code,
                "time": "2024-06-01T18:00"
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_geocode_returns_first_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Raleigh"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(raleigh_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = WeatherClient::new(server.uri(), server.uri());
    let location = client.geocode("Raleigh").await.unwrap().unwrap();

    assert_eq!(location.name, "Raleigh");
    assert_eq!(location.country.as_deref(), Some("United States"));
    assert_eq!(location.latitude, 35.7721);
}

#[tokio::test]
async fn test_geocode_without_results_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generationtime_ms": 0.3
        })))
        .mount(&server)
        .await;

    let client = WeatherClient::new(server.uri(), server.uri());

    assert_eq!(client.geocode("Atlantis").await.unwrap(), None);
}

#[tokio::test]
async fn test_current_weather() {
    let server = MockServer::start().await;
    mount_forecast(&server, 95).await;

    let client = WeatherClient::new(server.uri(), server.uri());
    let current = client.current_weather(35.7721, -78.63861).await.unwrap();

    assert_eq!(current.weathercode, 95);
    assert_eq!(current.temperature, 24.3);
}

#[tokio::test]
async fn test_upstream_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let client = WeatherClient::new(server.uri(), server.uri());
    let result = client.geocode("Raleigh").await;

    assert!(matches!(
        result,
        Err(AppError::Upstream { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_fetch_weather_for_stormy_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(raleigh_json()))
        .mount(&server)
        .await;
    mount_forecast(&server, 95).await;

    let client = WeatherClient::new(server.uri(), server.uri());
    let report = fetch_weather(&client, "Raleigh").await.unwrap();

    assert_eq!(report.location.name, "Raleigh");
    assert_eq!(classify(report.current.weathercode), ThemeTag::Stormy);
}

#[tokio::test]
async fn test_fetch_weather_unknown_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = WeatherClient::new(server.uri(), server.uri());
    let result = fetch_weather(&client, "Atlantis").await;

    assert!(matches!(result, Err(AppError::CityNotFound)));
}
