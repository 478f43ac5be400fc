use std::time::Duration;
use weather_recommender::{
    recommend, AppConfig, OutputFormat, Provider, RecommendError, Recommender,
};

/// Live request with the configured provider
/// This test is ignored by default since it requires network access and API keys
#[tokio::test]
#[ignore]
async fn test_builder_live_request() {
    let result = Recommender::builder()
        .location("Seoul")
        .budget_krw(50000.0)
        .format(OutputFormat::Text)
        .build()
        .await;

    assert!(result.is_ok());
    let result = result.unwrap();
    assert!(result.rendered.starts_with("Weather in "));
    assert!(!result.report.records.is_empty());
}

/// Test convenience function: recommend
/// This test is ignored by default since it requires network access and API keys
#[tokio::test]
#[ignore]
async fn test_convenience_recommend() {
    let result = recommend("Busan", 0.0).await;

    assert!(result.is_ok());
    assert!(result.unwrap().rendered.contains("<h2>Weather in"));
}

#[tokio::test]
async fn test_builder_no_location_error() {
    let result = Recommender::builder().budget_krw(10000.0).build().await;

    assert!(result.is_err());
    match result.unwrap_err() {
        RecommendError::BuilderError(msg) => {
            assert!(msg.contains("No location specified"));
        }
        other => panic!("Expected BuilderError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_builder_unknown_provider_is_config_error() {
    let mut config = AppConfig::default();
    config.geocoding.api_key = Some("maps_key".to_string());
    config.weather.api_key = Some("weather_key".to_string());
    config.default_provider = "ollama".to_string();

    let result = Recommender::builder()
        .location("Seoul")
        .config(config)
        .build()
        .await;

    assert!(matches!(result, Err(RecommendError::ConfigError(_))));
}

#[tokio::test]
async fn test_builder_method_chaining() {
    // Only checks that the builder accepts every option
    let _builder = Recommender::builder()
        .location("Jeju")
        .budget_krw(80000.0)
        .interest("hiking")
        .interest("seafood")
        .provider(Provider::Anthropic)
        .api_key("test-key")
        .model("claude-sonnet-4-5")
        .timeout(Duration::from_secs(10))
        .config(AppConfig::default())
        .format(OutputFormat::Places)
        .save_report(false);
}
