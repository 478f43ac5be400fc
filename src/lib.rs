//! Weather- and budget-aware nearby recommendations.
//!
//! A request resolves a place, looks up its current weather, asks a
//! text-generation provider for suggestions, normalizes whatever comes back
//! into [`RecommendationRecord`]s and geocodes each suggestion for a map.

pub mod builder;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod pipelines;
pub mod providers;
pub mod render;
pub mod report;
pub mod services;

// Re-export builder API
pub use builder::{Provider, RecommendResult, Recommender, RecommenderBuilder};

// Re-export core types
pub use config::AppConfig;
pub use error::RecommendError;
pub use model::{
    Coordinates, Marker, RecommendationQuery, RecommendationRecord, RecommendationReport,
    RequestContext, WeatherSnapshot,
};
pub use normalizer::{normalize, GenerationPayload, Normalizer};
pub use pipelines::RecommendationPipeline;
pub use render::{render, OutputFormat};

/// Recommendations for `location` with the configured provider, rendered as HTML.
///
/// A budget of 0 means any budget.
///
/// # Example
/// ```no_run
/// # use weather_recommender::recommend;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let result = recommend("Seoul", 50000.0).await?;
/// for record in &result.report.records {
///     println!("{} ({})", record.name, record.location);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn recommend(location: &str, budget_krw: f64) -> Result<RecommendResult, RecommendError> {
    Recommender::builder()
        .location(location)
        .budget_krw(budget_krw)
        .build()
        .await
}
