use serde::Serialize;
use std::collections::BTreeMap;

/// Placeholder for a location or travel time the model did not provide.
pub const UNKNOWN: &str = "unknown";

/// Placeholder for a website the model did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A successful address lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodedAddress {
    pub coordinates: Coordinates,
    pub formatted_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub temperature_celsius: f64,
    pub description: String,
    pub humidity: u8,
}

/// One inbound recommendation request.
#[derive(Debug, Clone, Default)]
pub struct RecommendationQuery {
    pub location: String,
    /// Budget in KRW; 0 means "any budget"
    pub budget_krw: f64,
    pub interests: Vec<String>,
}

/// Everything known about the requester, built once per request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub address: String,
    pub coordinates: Coordinates,
    pub weather: WeatherSnapshot,
    pub budget_krw: f64,
    pub interests: Vec<String>,
}

/// One suggested place or activity in the fixed output schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRecord {
    pub name: String,
    pub location: String,
    pub travel_time: String,
    pub description: String,
    pub website: String,
    /// Cost in KRW
    pub cost_local: f64,
    /// Cost in USD
    pub cost_reference: f64,
    pub extra_attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl RecommendationRecord {
    /// A record with every field set to its default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: UNKNOWN.to_string(),
            travel_time: UNKNOWN.to_string(),
            description: String::new(),
            website: NOT_AVAILABLE.to_string(),
            cost_local: 0.0,
            cost_reference: 0.0,
            extra_attributes: BTreeMap::new(),
            latitude: None,
            longitude: None,
        }
    }

    /// Whether the location is something worth geocoding.
    pub fn has_location(&self) -> bool {
        let location = self.location.trim();
        !location.is_empty() && !location.eq_ignore_ascii_case(UNKNOWN)
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// A loosely-typed block from the labeled text format, keys kept verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledBlock {
    pub name: String,
    pub fields: Vec<(String, String)>,
    /// Lines in the block that carried no label
    pub free_text: Vec<String>,
}

impl LabeledBlock {
    /// Value of the first field whose label matches case-insensitively.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(label))
            .map(|(_, value)| value.as_str())
    }
}

/// A map marker for one enriched record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// The outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    pub context: RequestContext,
    pub records: Vec<RecommendationRecord>,
    /// Unprocessed generator output
    #[serde(skip)]
    pub raw_text: String,
}

impl RecommendationReport {
    pub fn markers(&self) -> Vec<Marker> {
        self.records
            .iter()
            .filter_map(|record| {
                record.coordinates().map(|c| Marker {
                    name: record.name.clone(),
                    latitude: c.latitude,
                    longitude: c.longitude,
                })
            })
            .collect()
    }

    /// Place names, falling back to free-text extraction when nothing normalized.
    pub fn place_names(&self) -> Vec<String> {
        if self.records.is_empty() {
            let cleaned = crate::normalizer::clean_generated_text(&self.raw_text);
            return crate::normalizer::extract_place_names(&cleaned);
        }
        let mut names: Vec<String> = Vec::new();
        for record in &self.records {
            if !names.contains(&record.name) {
                names.push(record.name.clone());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_record_has_sentinels() {
        let record = RecommendationRecord::named("Park");
        assert_eq!(record.location, "unknown");
        assert_eq!(record.travel_time, "unknown");
        assert_eq!(record.website, "N/A");
        assert_eq!(record.cost_local, 0.0);
        assert!(!record.has_location());
        assert!(record.coordinates().is_none());
    }

    #[test]
    fn test_unresolved_coordinates_are_not_serialized() {
        let record = RecommendationRecord::named("Park");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("latitude").is_none());
        assert!(json.get("longitude").is_none());
        assert_eq!(json["cost_local"], 0.0);
    }

    #[test]
    fn test_labeled_block_lookup_is_case_insensitive() {
        let block = LabeledBlock {
            name: "Cafe X".to_string(),
            fields: vec![("Location".to_string(), "Busan".to_string())],
            free_text: vec![],
        };
        assert_eq!(block.get("location"), Some("Busan"));
        assert_eq!(block.get("Website"), None);
    }
}
