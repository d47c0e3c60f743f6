//! Maps collaborators
//!
//! Geocoding, driving directions and nearby place search are provided by an
//! external maps service. The search pipeline only talks to the traits in
//! this module; `google` holds the Google Maps Platform adapter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::models::{Coordinate, PlaceCandidate, Route};
use crate::search::LookupParams;

#[cfg(test)]
pub(crate) mod fake;
pub mod google;
pub mod polyline;

pub use google::GoogleMapsClient;

/// Resolves free-form addresses to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service has no match for the address
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>>;
}

/// Computes driving routes
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn compute_route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route>;
}

/// Searches places around a coordinate
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Unsuccessful service statuses yield an empty list; only transport
    /// and decoding problems are errors.
    async fn lookup_nearby(
        &self,
        location: Coordinate,
        params: &LookupParams,
    ) -> Result<Vec<PlaceCandidate>>;
}

/// The set of collaborators one finder works with
#[derive(Clone)]
pub struct MapsServices {
    pub geocoder: Arc<dyn Geocoder>,
    pub routes: Arc<dyn RouteProvider>,
    pub places: Arc<dyn PlaceLookup>,
}

impl MapsServices {
    /// Use one client for all three collaborators
    pub fn from_client<C>(client: C) -> Self
    where
        C: Geocoder + RouteProvider + PlaceLookup + 'static,
    {
        let client = Arc::new(client);
        Self {
            geocoder: client.clone(),
            routes: client.clone(),
            places: client,
        }
    }
}
