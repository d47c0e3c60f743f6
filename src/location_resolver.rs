//! Location Resolution Module
//!
//! This module handles resolving the free-form start and destination inputs
//! into coordinates before a route can be requested.

use tracing::debug;

use crate::maps::Geocoder;
use crate::models::Coordinate;
use crate::{Result, RoadbiteError};

/// Service for resolving address inputs
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve an address into a coordinate, failing when nothing matches
    pub async fn resolve_location(geocoder: &dyn Geocoder, address: &str) -> Result<Coordinate> {
        debug!("Geocoding location: {}", address);

        let coordinate = geocoder
            .geocode(address)
            .await?
            .ok_or_else(|| RoadbiteError::location_not_found(address))?;

        debug!(
            "Resolved {} to ({})",
            address,
            coordinate.format_coordinates()
        );
        Ok(coordinate)
    }

    /// Resolve both route endpoints, origin first
    pub async fn resolve_endpoints(
        geocoder: &dyn Geocoder,
        origin: &str,
        destination: &str,
    ) -> Result<(Coordinate, Coordinate)> {
        let origin = Self::resolve_location(geocoder, origin).await?;
        let destination = Self::resolve_location(geocoder, destination).await?;
        Ok((origin, destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::fake::FakeMaps;

    #[tokio::test]
    async fn test_resolve_known_location() {
        let maps = FakeMaps::new().with_location("Munich", Coordinate::new(48.137, 11.575));
        let coordinate = LocationResolver::resolve_location(&maps, "Munich")
            .await
            .unwrap();
        assert_eq!(coordinate, Coordinate::new(48.137, 11.575));
    }

    #[tokio::test]
    async fn test_unknown_location_is_not_found() {
        let maps = FakeMaps::new();
        let err = LocationResolver::resolve_location(&maps, "Atlantis")
            .await
            .unwrap_err();
        assert!(matches!(err, RoadbiteError::LocationNotFound { ref address } if address == "Atlantis"));
    }

    #[tokio::test]
    async fn test_resolve_endpoints_stops_at_first_miss() {
        let maps = FakeMaps::new().with_location("Munich", Coordinate::new(48.137, 11.575));
        let err = LocationResolver::resolve_endpoints(&maps, "Nowhere", "Munich")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Nowhere"));
        assert_eq!(maps.geocode_calls(), 1);
    }
}
