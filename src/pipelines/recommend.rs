use crate::config::{AppConfig, RecommendationConfig};
use crate::enrichment::enrich;
use crate::error::RecommendError;
use crate::model::{RecommendationQuery, RecommendationReport, RequestContext};
use crate::normalizer::Normalizer;
use crate::providers::{
    build_recommendation_prompt, FallbackProvider, LlmProvider, ProviderFactory,
};
use crate::services::{Geocoder, GoogleGeocoder, OpenWeatherClient, WeatherService};
use log::{debug, info};
use std::time::Duration;

/// One request, end to end:
///
/// 1. Resolves the requested place (not found aborts the request)
/// 2. Fetches the current weather there (failure aborts the request)
/// 3. Asks the generator for suggestions (failure aborts the request)
/// 4. Normalizes the generated text; unusable output yields zero records
/// 5. Geocodes each record's location; failures only affect that record
pub struct RecommendationPipeline {
    geocoder: Box<dyn Geocoder>,
    weather: Box<dyn WeatherService>,
    generator: Box<dyn LlmProvider>,
    normalizer: Normalizer,
    count: usize,
    exchange_rate: f64,
}

impl RecommendationPipeline {
    pub fn new(
        settings: &RecommendationConfig,
        geocoder: Box<dyn Geocoder>,
        weather: Box<dyn WeatherService>,
        generator: Box<dyn LlmProvider>,
    ) -> Self {
        Self {
            geocoder,
            weather,
            generator,
            normalizer: Normalizer::new(settings.exchange_rate),
            count: settings.count,
            exchange_rate: settings.exchange_rate,
        }
    }

    /// Build the pipeline with the HTTP-backed collaborators
    pub fn from_config(config: &AppConfig) -> Result<Self, RecommendError> {
        let timeout = Duration::from_secs(config.timeout);
        let geocoder = GoogleGeocoder::new(&config.geocoding, timeout).map_err(configuration)?;
        let weather = OpenWeatherClient::new(&config.weather, timeout).map_err(configuration)?;

        // Providers without their own timeout inherit the global one
        let mut providers_config = config.clone();
        ProviderFactory::fill_missing_entries(&mut providers_config);
        for provider in providers_config.providers.values_mut() {
            provider.timeout.get_or_insert(config.timeout);
        }
        let generator = FallbackProvider::new(&providers_config).map_err(configuration)?;

        Ok(Self::new(
            &config.recommendations,
            Box::new(geocoder),
            Box::new(weather),
            Box::new(generator),
        ))
    }

    pub async fn run(
        &self,
        query: &RecommendationQuery,
    ) -> Result<RecommendationReport, RecommendError> {
        let context = self.context(query).await?;

        let prompt = build_recommendation_prompt(&context, self.count, self.exchange_rate);
        debug!("Prompt for {}: {}", context.address, prompt);

        let raw_text = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| RecommendError::GenerationError(e.to_string()))?;

        let mut records = self.normalizer.normalize(&raw_text);
        let resolved = enrich(&mut records, self.geocoder.as_ref()).await;
        info!(
            "{} recommendation(s) for {}, {} with coordinates",
            records.len(),
            context.address,
            resolved
        );

        Ok(RecommendationReport {
            context,
            records,
            raw_text,
        })
    }

    /// Resolve the requester and their weather.
    pub async fn context(
        &self,
        query: &RecommendationQuery,
    ) -> Result<RequestContext, RecommendError> {
        let location = query.location.trim();
        if location.is_empty() {
            return Err(RecommendError::LocationNotFound(query.location.clone()));
        }

        let address = self
            .geocoder
            .resolve(location)
            .await
            .map_err(|e| RecommendError::GeocodingError(e.to_string()))?
            .ok_or_else(|| RecommendError::LocationNotFound(location.to_string()))?;

        let weather = self
            .weather
            .current(address.coordinates)
            .await
            .map_err(|e| RecommendError::WeatherError(e.to_string()))?;

        Ok(RequestContext {
            address: address.formatted_address,
            coordinates: address.coordinates,
            weather,
            budget_krw: query.budget_krw.max(0.0),
            interests: query.interests.clone(),
        })
    }
}

fn configuration(e: Box<dyn std::error::Error + Send + Sync>) -> RecommendError {
    RecommendError::ConfigError(config::ConfigError::Message(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, GeocodedAddress, WeatherSnapshot};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::error::Error;

    struct MapGeocoder(HashMap<&'static str, (f64, f64)>);

    #[async_trait]
    impl Geocoder for MapGeocoder {
        async fn resolve(
            &self,
            address: &str,
        ) -> Result<Option<GeocodedAddress>, Box<dyn Error + Send + Sync>> {
            Ok(self.0.get(address).map(|&(latitude, longitude)| GeocodedAddress {
                coordinates: Coordinates {
                    latitude,
                    longitude,
                },
                formatted_address: format!("{}, South Korea", address),
            }))
        }
    }

    struct FixedWeather(Result<WeatherSnapshot, &'static str>);

    #[async_trait]
    impl WeatherService for FixedWeather {
        async fn current(
            &self,
            _coordinates: Coordinates,
        ) -> Result<WeatherSnapshot, Box<dyn Error + Send + Sync>> {
            self.0.clone().map_err(|e| e.into())
        }
    }

    struct FixedGenerator(Result<&'static str, &'static str>);

    #[async_trait]
    impl LlmProvider for FixedGenerator {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
            self.0.map(str::to_string).map_err(|e| e.into())
        }
    }

    fn sunny() -> Result<WeatherSnapshot, &'static str> {
        Ok(WeatherSnapshot {
            temperature_celsius: 24.0,
            description: "clear sky".to_string(),
            humidity: 40,
        })
    }

    fn pipeline(
        weather: Result<WeatherSnapshot, &'static str>,
        generated: Result<&'static str, &'static str>,
    ) -> RecommendationPipeline {
        let places = HashMap::from([("Seoul", (37.57, 126.98)), ("Jamsil", (37.51, 127.1))]);
        RecommendationPipeline::new(
            &RecommendationConfig::default(),
            Box::new(MapGeocoder(places)),
            Box::new(FixedWeather(weather)),
            Box::new(FixedGenerator(generated)),
        )
    }

    fn query(location: &str) -> RecommendationQuery {
        RecommendationQuery {
            location: location.to_string(),
            budget_krw: 30000.0,
            interests: vec![],
        }
    }

    #[tokio::test]
    async fn test_run_normalizes_and_enriches() {
        let generated = "```json\n[\
            {\"name\": \"Lotte World\", \"location\": \"Jamsil\", \"cost_krw\": 62000},\
            {\"name\": \"Secret Garden\", \"location\": \"unknown\"}\
        ]\n```";
        let report = pipeline(sunny(), Ok(generated))
            .run(&query("Seoul"))
            .await
            .unwrap();

        assert_eq!(report.context.address, "Seoul, South Korea");
        assert_eq!(report.context.weather.description, "clear sky");
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].latitude, Some(37.51));
        assert_eq!(report.records[0].cost_reference, 45.26);
        assert!(report.records[1].coordinates().is_none());
        assert_eq!(report.markers().len(), 1);
        assert_eq!(report.raw_text, generated);
    }

    #[tokio::test]
    async fn test_location_not_found() {
        let err = pipeline(sunny(), Ok("[]"))
            .run(&query("Atlantis"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::LocationNotFound(ref l) if l == "Atlantis"));
    }

    #[tokio::test]
    async fn test_blank_location_not_found() {
        let err = pipeline(sunny(), Ok("[]")).run(&query("  ")).await.unwrap_err();
        assert!(matches!(err, RecommendError::LocationNotFound(_)));
    }

    #[tokio::test]
    async fn test_weather_error_halts() {
        let err = pipeline(Err("Invalid API key"), Ok("[]"))
            .run(&query("Seoul"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Weather API error: Invalid API key");
    }

    #[tokio::test]
    async fn test_generation_error_halts() {
        let err = pipeline(sunny(), Err("quota exceeded"))
            .run(&query("Seoul"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::GenerationError(ref m) if m == "quota exceeded"));
    }

    #[tokio::test]
    async fn test_malformed_output_is_an_empty_report() {
        let report = pipeline(sunny(), Ok("```json\n[{\"name\": \n```"))
            .run(&query("Seoul"))
            .await
            .unwrap();
        assert!(report.records.is_empty());
    }

    #[test]
    fn test_from_config_unknown_provider() {
        let mut config = AppConfig::default();
        config.geocoding.api_key = Some("maps".to_string());
        config.weather.api_key = Some("weather".to_string());
        config.default_provider = "ollama".to_string();
        let result = RecommendationPipeline::from_config(&config);
        assert!(matches!(result, Err(RecommendError::ConfigError(_))));
    }

}
