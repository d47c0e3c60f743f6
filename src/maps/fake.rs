//! In-memory maps collaborators for tests

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{Geocoder, PlaceLookup, RouteProvider};
use crate::models::{Coordinate, PlaceCandidate, Route};
use crate::search::LookupParams;
use crate::{Result, RoadbiteError};

/// Pauses the first place lookup until released
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// Scripted maps service: fixed geocodes, one route, place lists per call
#[derive(Default)]
pub struct FakeMaps {
    locations: HashMap<String, Coordinate>,
    route: Option<Route>,
    places: Vec<Vec<PlaceCandidate>>,
    failing_lookups: HashSet<usize>,
    gate: Option<Arc<Gate>>,
    geocode_calls: AtomicUsize,
    route_calls: AtomicUsize,
    lookup_calls: AtomicUsize,
}

impl FakeMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, address: &str, coordinate: Coordinate) -> Self {
        self.locations.insert(address.to_string(), coordinate);
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    /// Places returned by the n-th lookup, in call order
    pub fn with_places(mut self, places: Vec<Vec<PlaceCandidate>>) -> Self {
        self.places = places;
        self
    }

    pub fn failing_lookup(mut self, call: usize) -> Self {
        self.failing_lookups.insert(call);
        self
    }

    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn route_calls(&self) -> usize {
        self.route_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeMaps {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.locations.get(address).copied())
    }
}

#[async_trait]
impl RouteProvider for FakeMaps {
    async fn compute_route(&self, _origin: Coordinate, _destination: Coordinate) -> Result<Route> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        self.route
            .clone()
            .ok_or_else(|| RoadbiteError::route_failed("ZERO_RESULTS"))
    }
}

#[async_trait]
impl PlaceLookup for FakeMaps {
    async fn lookup_nearby(
        &self,
        _location: Coordinate,
        _params: &LookupParams,
    ) -> Result<Vec<PlaceCandidate>> {
        let call = self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            if call == 0 {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
        }
        if self.failing_lookups.contains(&call) {
            return Err(RoadbiteError::api("connection reset"));
        }
        Ok(self.places.get(call).cloned().unwrap_or_default())
    }
}
