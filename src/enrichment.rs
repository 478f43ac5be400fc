use crate::model::RecommendationRecord;
use crate::services::Geocoder;
use log::{debug, warn};

/// Attach coordinates to every record whose location resolves.
///
/// One lookup per record, in order. A failed or empty lookup leaves that
/// record without coordinates and does not stop the others. Returns the
/// number of records that were resolved.
pub async fn enrich(records: &mut [RecommendationRecord], geocoder: &dyn Geocoder) -> usize {
    let mut resolved = 0;

    for record in records.iter_mut() {
        if !record.has_location() {
            debug!("Skipping '{}': no location to geocode", record.name);
            continue;
        }

        match geocoder.resolve(&record.location).await {
            Ok(Some(address)) => {
                record.latitude = Some(address.coordinates.latitude);
                record.longitude = Some(address.coordinates.longitude);
                resolved += 1;
            }
            Ok(None) => {
                warn!("No coordinates for '{}' ({})", record.name, record.location);
            }
            Err(e) => {
                warn!("Geocoding failed for '{}' ({}): {}", record.name, record.location, e);
            }
        }
    }

    resolved
}
