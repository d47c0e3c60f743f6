//! The route restaurant search pipeline
//!
//! validate input -> geocode endpoints -> compute route -> sample ->
//! one lookup per sample point, in order -> select.
//!
//! All per-search state lives in a [`SearchContext`]; the finder itself only
//! holds the collaborator handles and the in-flight guard.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::policy::SearchPolicy;
use super::sampler::{SamplePoint, sample_route};
use super::selection::select;
use crate::location_resolver::LocationResolver;
use crate::maps::{MapsServices, PlaceLookup};
use crate::models::{Coordinate, PlaceCandidate, Route, RouteSummary};
use crate::{Result, RoadbiteError};

/// Start and destination as typed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
}

impl SearchRequest {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }

    /// Trimmed copy of the request; both fields must be non-empty
    pub fn validated(&self) -> Result<Self> {
        let origin = self.origin.trim();
        let destination = self.destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err(RoadbiteError::MissingInput);
        }
        Ok(Self::new(origin, destination))
    }
}

/// Everything known about one search while it runs
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub request: SearchRequest,
    pub policy: SearchPolicy,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub route: Route,
    pub samples: Vec<SamplePoint>,
}

impl SearchContext {
    pub fn new(
        request: SearchRequest,
        policy: SearchPolicy,
        origin: Coordinate,
        destination: Coordinate,
        route: Route,
    ) -> Self {
        let samples = sample_route(&route, &policy.sampling);
        Self {
            request,
            policy,
            origin,
            destination,
            route,
            samples,
        }
    }
}

/// Raw lookups of all sample points
#[derive(Debug, Default)]
pub struct Aggregated {
    pub candidates: Vec<PlaceCandidate>,
    pub failed_lookups: usize,
}

/// Look up places at every sample point, one after another.
///
/// A failed lookup is logged and contributes nothing.
pub async fn collect_candidates(context: &SearchContext, places: &dyn PlaceLookup) -> Aggregated {
    let mut aggregated = Aggregated::default();

    for sample in &context.samples {
        match places
            .lookup_nearby(sample.coordinate, &context.policy.lookup)
            .await
        {
            Ok(found) => {
                aggregated.candidates.extend(
                    found
                        .into_iter()
                        .map(|place| place.at_sample(sample.ordinal, sample.distance_from_start_km)),
                );
            }
            Err(e) => {
                warn!(
                    "Lookup near sample {} ({:.1}km) failed: {}",
                    sample.ordinal, sample.distance_from_start_km, e
                );
                aggregated.failed_lookups += 1;
            }
        }
    }

    aggregated
}

/// Outcome of one search
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub route: RouteSummary,
    pub restaurants: Vec<PlaceCandidate>,
    pub sample_count: usize,
    pub failed_lookups: usize,
    pub min_rating_count: Option<u32>,
    pub searched_at: DateTime<Utc>,
}

/// Finds restaurants along driving routes
pub struct RouteRestaurantFinder {
    services: MapsServices,
    in_flight: Mutex<()>,
}

impl RouteRestaurantFinder {
    pub fn new(services: MapsServices) -> Self {
        Self {
            services,
            in_flight: Mutex::new(()),
        }
    }

    /// Run one search.
    ///
    /// Empty inputs are rejected before any service is called. While a search
    /// is running, further calls fail with [`RoadbiteError::SearchInProgress`].
    #[instrument(skip(self, policy), fields(origin = %request.origin, destination = %request.destination))]
    pub async fn search(&self, request: &SearchRequest, policy: &SearchPolicy) -> Result<SearchReport> {
        let request = request.validated()?;
        policy.validate()?;

        let _guard = self.in_flight.try_lock().map_err(|_| {
            warn!("Rejecting search while another one is running");
            RoadbiteError::SearchInProgress
        })?;

        let start_time = Instant::now();

        let (origin, destination) = LocationResolver::resolve_endpoints(
            self.services.geocoder.as_ref(),
            &request.origin,
            &request.destination,
        )
        .await?;

        let route = self
            .services
            .routes
            .compute_route(origin, destination)
            .await?;

        let context = SearchContext::new(request, policy.clone(), origin, destination, route);
        info!(
            "Sampling {} points along {:.1}km route",
            context.samples.len(),
            context.route.total_distance_km()
        );

        let aggregated = collect_candidates(&context, self.services.places.as_ref()).await;
        let raw_count = aggregated.candidates.len();
        let restaurants = select(
            aggregated.candidates,
            &context.policy,
            context.route.total_distance_km(),
        );

        info!(
            "Selected {} of {} places from {} lookups ({} failed) in {:.3}s",
            restaurants.len(),
            raw_count,
            context.samples.len(),
            aggregated.failed_lookups,
            start_time.elapsed().as_secs_f64()
        );

        Ok(SearchReport {
            route: context.route.summary(),
            restaurants,
            sample_count: context.samples.len(),
            failed_lookups: aggregated.failed_lookups,
            min_rating_count: context.policy.min_rating_count,
            searched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::maps::fake::{FakeMaps, Gate};
    use crate::search::policy::{OutputOrder, Selection};

    fn route(total_distance_m: u64) -> Route {
        Route {
            path: (0..120)
                .map(|i| Coordinate::new(48.0 + i as f64 * 0.01, 11.0))
                .collect(),
            total_distance_m,
            duration_s: Some(3600),
            distance_text: None,
            duration_text: None,
            start_address: "Munich, Germany".to_string(),
            end_address: "Innsbruck, Austria".to_string(),
        }
    }

    fn place(id: &str, rating: f64, rating_count: u32) -> PlaceCandidate {
        PlaceCandidate {
            rating: Some(rating),
            rating_count,
            ..PlaceCandidate::new(Some(id.to_string()), format!("Restaurant {id}"))
        }
    }

    fn maps() -> FakeMaps {
        FakeMaps::new()
            .with_location("Munich", Coordinate::new(48.137, 11.575))
            .with_location("Innsbruck", Coordinate::new(47.269, 11.404))
    }

    fn finder(maps: FakeMaps) -> (RouteRestaurantFinder, Arc<FakeMaps>) {
        let maps = Arc::new(maps);
        let services = MapsServices {
            geocoder: maps.clone(),
            routes: maps.clone(),
            places: maps.clone(),
        };
        (RouteRestaurantFinder::new(services), maps)
    }

    fn all_places_policy() -> SearchPolicy {
        SearchPolicy {
            min_rating_count: None,
            selection: Selection::All,
            order: OutputOrder::DistanceFromStart,
            ..SearchPolicy::along_route()
        }
    }

    #[test]
    fn test_request_validation_trims() {
        let request = SearchRequest::new("  Munich ", "Innsbruck\n").validated().unwrap();
        assert_eq!(request, SearchRequest::new("Munich", "Innsbruck"));
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_any_call() {
        let (finder, maps) = finder(maps().with_route(route(12_000)));
        let err = finder
            .search(&SearchRequest::new("Munich", "   "), &SearchPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RoadbiteError::MissingInput));
        assert_eq!(maps.geocode_calls(), 0);
        assert_eq!(maps.route_calls(), 0);
        assert_eq!(maps.lookup_calls(), 0);
    }

    #[tokio::test]
    async fn test_geocoding_miss_aborts_search() {
        let (finder, maps) = finder(maps().with_route(route(12_000)));
        let err = finder
            .search(&SearchRequest::new("Munich", "Atlantis"), &SearchPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RoadbiteError::LocationNotFound { .. }));
        assert_eq!(maps.route_calls(), 0);
    }

    #[tokio::test]
    async fn test_route_failure_aborts_search() {
        let (finder, maps) = finder(maps());
        let err = finder
            .search(&SearchRequest::new("Munich", "Innsbruck"), &SearchPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RoadbiteError::RouteFailed { .. }));
        assert_eq!(maps.lookup_calls(), 0);
    }

    #[tokio::test]
    async fn test_one_lookup_per_sample_point() {
        let (finder, maps) = finder(maps().with_route(route(12_000)));
        let report = finder
            .search(&SearchRequest::new("Munich", "Innsbruck"), &all_places_policy())
            .await
            .unwrap();
        assert_eq!(report.sample_count, 4);
        assert_eq!(maps.lookup_calls(), 4);
        assert_eq!(report.route.from, "Munich, Germany");
    }

    #[tokio::test]
    async fn test_candidates_annotated_and_deduplicated() {
        let places = vec![
            vec![place("p1", 4.5, 1500)],
            vec![place("p1", 4.5, 1500), place("p2", 4.0, 3000)],
            vec![],
            vec![place("p3", 3.9, 1200)],
        ];
        let (finder, _) = finder(maps().with_route(route(12_000)).with_places(places));
        let report = finder
            .search(&SearchRequest::new("Munich", "Innsbruck"), &all_places_policy())
            .await
            .unwrap();

        let found: Vec<(&str, f64)> = report
            .restaurants
            .iter()
            .map(|p| (p.dedup_key(), p.distance_from_start_km))
            .collect();
        assert_eq!(found, vec![("p1", 0.0), ("p2", 3.0), ("p3", 9.0)]);
    }

    #[tokio::test]
    async fn test_failed_lookup_is_skipped() {
        let places = vec![
            vec![place("p1", 4.5, 1500)],
            vec![place("lost", 5.0, 9000)],
            vec![place("p2", 4.0, 3000)],
        ];
        let (finder, maps) = finder(
            maps()
                .with_route(route(9_000))
                .with_places(places)
                .failing_lookup(1),
        );
        let report = finder
            .search(&SearchRequest::new("Munich", "Innsbruck"), &all_places_policy())
            .await
            .unwrap();

        assert_eq!(maps.lookup_calls(), 3);
        assert_eq!(report.failed_lookups, 1);
        let ids: Vec<&str> = report.restaurants.iter().map(|p| p.dedup_key()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_default_policy_applies_threshold_and_spacing() {
        // 30 km route sampled every 3 km: 10 lookups, cutoff at 20 km
        let mut places = vec![Vec::new(); 10];
        places[0] = vec![place("early", 4.1, 1200), place("few-ratings", 4.9, 40)];
        places[1] = vec![place("too-close", 4.8, 5000)];
        places[2] = vec![place("second", 4.0, 2000)];
        places[8] = vec![place("too-late", 5.0, 8000)];
        let (finder, _) = finder(maps().with_route(route(30_000)).with_places(places));

        let report = finder
            .search(&SearchRequest::new("Munich", "Innsbruck"), &SearchPolicy::default())
            .await
            .unwrap();

        let ids: Vec<&str> = report.restaurants.iter().map(|p| p.dedup_key()).collect();
        assert_eq!(ids, vec!["early", "second"]);
        assert_eq!(report.min_rating_count, Some(1000));
    }

    #[tokio::test]
    async fn test_concurrent_search_is_rejected() {
        let gate = Arc::new(Gate::default());
        let (finder, _) = finder(maps().with_route(route(6_000)).with_gate(gate.clone()));
        let finder = Arc::new(finder);

        let first = {
            let finder = finder.clone();
            tokio::spawn(async move {
                finder
                    .search(&SearchRequest::new("Munich", "Innsbruck"), &all_places_policy())
                    .await
            })
        };
        gate.entered.notified().await;

        let err = finder
            .search(&SearchRequest::new("Munich", "Innsbruck"), &all_places_policy())
            .await
            .unwrap_err();
        assert!(matches!(err, RoadbiteError::SearchInProgress));

        gate.release.notify_one();
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.sample_count, 2);

        // The guard is released once the first search finishes
        assert!(
            finder
                .search(&SearchRequest::new("Munich", "Innsbruck"), &all_places_policy())
                .await
                .is_ok()
        );
    }
}
