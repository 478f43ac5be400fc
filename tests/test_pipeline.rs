use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use weather_recommender::config::ProviderConfig;
use weather_recommender::{AppConfig, OutputFormat, RecommendError, Recommender};

const GENERATED: &str = "Here are some ideas for a rainy day:\n```json\n[\n  {\n    \"name\": \"Lotte World\",\n    \"location\": \"Jamsil\",\n    \"travel_time\": \"25 minutes by subway\",\n    \"description\": \"Indoor theme park, perfect for rain\",\n    \"website\": \"lotteworld.com\",\n    \"cost_krw\": 62000,\n    \"clothing\": \"Light jacket\",\n  },\n  {\n    \"name\": \"Hidden Tea House\",\n    \"location\": \"unknown\",\n    \"description\": \"Free tastings on weekdays\"\n  }\n]\n```";

fn config_for(server: &ServerGuard) -> AppConfig {
    let mut config = AppConfig::default();
    config.geocoding.api_key = Some("maps_key".to_string());
    config.geocoding.base_url = server.url();
    config.weather.api_key = Some("weather_key".to_string());
    config.weather.base_url = server.url();

    let mut google = ProviderConfig::with_model("gemini-2.5-pro");
    google.api_key = Some("gemini_key".to_string());
    google.base_url = Some(server.url());
    config.providers.insert("google".to_string(), google);
    config
}

async fn mock_geocode(server: &mut ServerGuard, address: &str, lat: f64, lng: f64) -> Mock {
    server
        .mock("GET", "/maps/api/geocode/json")
        .match_query(Matcher::UrlEncoded("address".into(), address.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "results": [{
                    "formatted_address": format!("{}, South Korea", address),
                    "geometry": {"location": {"lat": lat, "lng": lng}}
                }],
                "status": "OK"
            })
            .to_string(),
        )
        .create_async()
        .await
}

async fn mock_weather(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"cod": 200, "main": {"temp": 16.2, "humidity": 88}, "weather": [{"description": "moderate rain"}]}"#,
        )
        .create_async()
        .await
}

async fn mock_gemini(server: &mut ServerGuard, text: &str) -> Mock {
    server
        .mock("POST", "/v1beta/models/gemini-2.5-pro:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "gemini_key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{"content": {"parts": [{"text": text}]}}]
            })
            .to_string(),
        )
        .create_async()
        .await
}

#[tokio::test]
async fn test_end_to_end_json_report() {
    let mut server = Server::new_async().await;
    let seoul = mock_geocode(&mut server, "Seoul", 37.5665, 126.978).await;
    let jamsil = mock_geocode(&mut server, "Jamsil", 37.5133, 127.1).await;
    let weather = mock_weather(&mut server).await;
    let gemini = mock_gemini(&mut server, GENERATED).await;

    let result = Recommender::builder()
        .location("Seoul")
        .budget_krw(100000.0)
        .interest("theme parks")
        .format(OutputFormat::Json)
        .config(config_for(&server))
        .build()
        .await
        .unwrap();

    seoul.assert_async().await;
    jamsil.assert_async().await;
    weather.assert_async().await;
    gemini.assert_async().await;

    let report = &result.report;
    assert_eq!(report.context.address, "Seoul, South Korea");
    assert_eq!(report.context.weather.humidity, 88);
    assert_eq!(report.records.len(), 2);

    let lotte = &report.records[0];
    assert_eq!(lotte.website, "https://lotteworld.com");
    assert_eq!(lotte.cost_reference, 45.26);
    assert_eq!(lotte.extra_attributes["clothing"], "Light jacket");
    assert_eq!(lotte.latitude, Some(37.5133));
    assert!(report.records[1].coordinates().is_none());
    assert!(result.saved_to.is_none());

    let rendered: Value = serde_json::from_str(&result.rendered).unwrap();
    assert_eq!(rendered["weather"]["description"], "moderate rain");
    assert_eq!(rendered["recommendations"].as_array().unwrap().len(), 2);
    assert_eq!(rendered["markers"], json!([
        {"name": "Lotte World", "latitude": 37.5133, "longitude": 127.1}
    ]));
}

#[tokio::test]
async fn test_unknown_location_stops_before_generation() {
    let mut server = Server::new_async().await;
    let _geocode = server
        .mock("GET", "/maps/api/geocode/json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"results": [], "status": "ZERO_RESULTS"}"#)
        .create_async()
        .await;
    let gemini = server
        .mock("POST", "/v1beta/models/gemini-2.5-pro:generateContent")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = Recommender::builder()
        .location("Atlantis")
        .config(config_for(&server))
        .build()
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendError::LocationNotFound(_)));
    gemini.assert_async().await;
}

#[tokio::test]
async fn test_weather_error_is_reported() {
    let mut server = Server::new_async().await;
    let _seoul = mock_geocode(&mut server, "Seoul", 37.5665, 126.978).await;
    let _weather = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"cod": 401, "message": "Invalid API key"}"#)
        .create_async()
        .await;

    let err = Recommender::builder()
        .location("Seoul")
        .config(config_for(&server))
        .build()
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Weather API error: Invalid API key");
}

#[tokio::test]
async fn test_malformed_generation_renders_empty_html() {
    let mut server = Server::new_async().await;
    let _seoul = mock_geocode(&mut server, "Seoul", 37.5665, 126.978).await;
    let _weather = mock_weather(&mut server).await;
    let _gemini = mock_gemini(&mut server, "```json\n[{\"name\": \"Broken\n```").await;

    let result = Recommender::builder()
        .location("Seoul")
        .config(config_for(&server))
        .build()
        .await
        .unwrap();

    assert!(result.report.records.is_empty());
    assert!(result.rendered.contains("<h2>Weather in Seoul, South Korea</h2>"));
    assert!(result.rendered.contains("No recommendations available."));
}

#[tokio::test]
async fn test_saved_report() {
    let mut server = Server::new_async().await;
    let _seoul = mock_geocode(&mut server, "Seoul", 37.5665, 126.978).await;
    let _jamsil = mock_geocode(&mut server, "Jamsil", 37.5133, 127.1).await;
    let _weather = mock_weather(&mut server).await;
    let _gemini = mock_gemini(&mut server, GENERATED).await;

    let directory =
        std::env::temp_dir().join(format!("weather-recommender-it-{}", std::process::id()));
    let mut config = config_for(&server);
    config.reports.directory = directory.to_string_lossy().into_owned();

    let result = Recommender::builder()
        .location("Seoul")
        .format(OutputFormat::Text)
        .save_report(true)
        .config(config)
        .build()
        .await
        .unwrap();

    let path = result.saved_to.unwrap();
    assert_eq!(path.extension().unwrap(), "txt");
    let saved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved, result.rendered);
    assert!(saved.contains("1. Lotte World"));
    assert!(saved.contains("Cost: Free"));

    std::fs::remove_dir_all(&directory).unwrap();
}
