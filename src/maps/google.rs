//! Google Maps Platform client
//!
//! Implements the geocoding, directions and nearby search collaborators on
//! top of the Maps web services (JSON output). Requests go through a
//! `reqwest-middleware` client so transient failures can be retried when
//! `google.max_retries` is configured.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Url;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::{Geocoder, PlaceLookup, RouteProvider};
use crate::config::GoogleConfig;
use crate::models::{Coordinate, PlaceCandidate, Route};
use crate::search::LookupParams;
use crate::{Result, RoadbiteError};

const STATUS_OK: &str = "OK";

/// Google Maps web service client
pub struct GoogleMapsClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

impl GoogleMapsClient {
    /// Create a new client
    pub fn new(config: &GoogleConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RoadbiteError::config("Google Maps API key cannot be empty"));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("roadbite/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RoadbiteError::config(format!("Failed to create HTTP client: {e}")))?;

        let mut builder = ClientBuilder::new(http);
        if config.max_retries > 0 {
            let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self {
            client: builder.build(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        query.push(("key", self.api_key.as_str()));

        Url::parse_with_params(&format!("{}/{}", self.base_url, path), &query)
            .map_err(|e| RoadbiteError::config(format!("Invalid Google Maps base URL: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint_url(path, params)?;
        let start_time = Instant::now();

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("Google Maps rejected {} request ({}): {}", path, status, body);
            return Err(RoadbiteError::api(format!(
                "Google Maps rejected {path} request with {status}"
            )));
        }
        if !status.is_success() {
            return Err(RoadbiteError::api(format!(
                "Google Maps {path} request failed with {status}"
            )));
        }

        let data = response.json::<T>().await.map_err(|e| {
            RoadbiteError::api(format!("Failed to parse Google Maps {path} response: {e}"))
        })?;

        let elapsed = start_time.elapsed();
        debug!("{} answered in {:.3}s", path, elapsed.as_secs_f64());
        if elapsed.as_secs() > 5 {
            warn!("Slow Google Maps response for {}: {:.3}s", path, elapsed.as_secs_f64());
        }

        Ok(data)
    }
}

#[async_trait]
impl Geocoder for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>> {
        let response: wire::GeocodeResponse = self
            .get_json("geocode/json", &[("address", address.to_string())])
            .await?;
        Ok(wire::coordinate_from_geocode(response))
    }
}

#[async_trait]
impl RouteProvider for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn compute_route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route> {
        let response: wire::DirectionsResponse = self
            .get_json(
                "directions/json",
                &[
                    ("origin", origin.to_query_value()),
                    ("destination", destination.to_query_value()),
                    ("mode", "driving".to_string()),
                    ("alternatives", "false".to_string()),
                ],
            )
            .await?;

        let route = wire::route_from_directions(response)?;
        info!(
            "Route from {} to {}: {:.1}km driven, {:.1}km along {} polyline points",
            route.start_address,
            route.end_address,
            route.total_distance_km(),
            route.path_length_km(),
            route.path.len()
        );
        Ok(route)
    }
}

#[async_trait]
impl PlaceLookup for GoogleMapsClient {
    #[instrument(skip(self, params), fields(radius = params.radius_m))]
    async fn lookup_nearby(
        &self,
        location: Coordinate,
        params: &LookupParams,
    ) -> Result<Vec<PlaceCandidate>> {
        let mut query = vec![
            ("location", location.to_query_value()),
            ("radius", params.radius_m.to_string()),
            ("type", params.category.clone()),
        ];
        if let Some(keyword) = &params.keyword {
            query.push(("keyword", keyword.clone()));
        }

        let response: wire::NearbySearchResponse =
            self.get_json("place/nearbysearch/json", &query).await?;
        Ok(wire::places_from_nearby(response))
    }
}

/// Maps web service response structures and conversion utilities
mod wire {
    use serde::Deserialize;
    use tracing::{debug, warn};

    use super::STATUS_OK;
    use crate::maps::polyline::decode_polyline;
    use crate::models::{Coordinate, PlaceCandidate, Route};
    use crate::{Result, RoadbiteError};

    #[derive(Debug, Deserialize)]
    pub struct LatLng {
        pub lat: f64,
        pub lng: f64,
    }

    impl From<LatLng> for Coordinate {
        fn from(value: LatLng) -> Self {
            Coordinate::new(value.lat, value.lng)
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        pub location: LatLng,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodeResponse {
        pub status: String,
        #[serde(default)]
        pub results: Vec<GeocodeResult>,
        pub error_message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodeResult {
        pub geometry: Geometry,
        pub formatted_address: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DirectionsResponse {
        pub status: String,
        #[serde(default)]
        pub routes: Vec<DirectionsRoute>,
        pub error_message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DirectionsRoute {
        pub overview_polyline: EncodedPolyline,
        #[serde(default)]
        pub legs: Vec<Leg>,
    }

    #[derive(Debug, Deserialize)]
    pub struct EncodedPolyline {
        pub points: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Leg {
        pub distance: Option<TextValue>,
        pub duration: Option<TextValue>,
        #[serde(default)]
        pub start_address: String,
        #[serde(default)]
        pub end_address: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct TextValue {
        pub text: String,
        pub value: u64,
    }

    #[derive(Debug, Deserialize)]
    pub struct NearbySearchResponse {
        pub status: String,
        #[serde(default)]
        pub results: Vec<PlaceResult>,
        pub error_message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PlaceResult {
        pub place_id: Option<String>,
        pub name: Option<String>,
        pub rating: Option<f64>,
        pub user_ratings_total: Option<u32>,
        pub price_level: Option<u8>,
        pub vicinity: Option<String>,
        pub geometry: Option<Geometry>,
        #[serde(default)]
        pub types: Vec<String>,
    }

    fn describe(status: &str, error_message: Option<&str>) -> String {
        match error_message {
            Some(message) => format!("{status}: {message}"),
            None => status.to_string(),
        }
    }

    /// First geocoding hit; any unsuccessful status counts as no match
    pub fn coordinate_from_geocode(response: GeocodeResponse) -> Option<Coordinate> {
        if response.status != STATUS_OK {
            debug!(
                "Geocoding returned {}",
                describe(&response.status, response.error_message.as_deref())
            );
            return None;
        }
        let first = response.results.into_iter().next()?;
        if let Some(address) = &first.formatted_address {
            debug!("Geocoded to {}", address);
        }
        Some(first.geometry.location.into())
    }

    pub fn route_from_directions(response: DirectionsResponse) -> Result<Route> {
        if response.status != STATUS_OK {
            return Err(RoadbiteError::route_failed(describe(
                &response.status,
                response.error_message.as_deref(),
            )));
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoadbiteError::route_failed("no routes in directions response"))?;
        let path = decode_polyline(&route.overview_polyline.points)?;

        let first_leg = route
            .legs
            .first()
            .ok_or_else(|| RoadbiteError::route_failed("route has no legs"))?;
        let last_leg = route.legs.last().unwrap_or(first_leg);

        let total_distance_m = route
            .legs
            .iter()
            .filter_map(|leg| leg.distance.as_ref().map(|d| d.value))
            .sum();
        let duration_s = route
            .legs
            .iter()
            .map(|leg| leg.duration.as_ref().map(|d| d.value))
            .sum::<Option<u64>>();
        let single_leg = route.legs.len() == 1;

        Ok(Route {
            total_distance_m,
            duration_s,
            distance_text: first_leg
                .distance
                .as_ref()
                .filter(|_| single_leg)
                .map(|d| d.text.clone()),
            duration_text: first_leg
                .duration
                .as_ref()
                .filter(|_| single_leg)
                .map(|d| d.text.clone()),
            start_address: first_leg.start_address.clone(),
            end_address: last_leg.end_address.clone(),
            path,
        })
    }

    /// Candidates of a nearby search; unsuccessful statuses yield none
    pub fn places_from_nearby(response: NearbySearchResponse) -> Vec<PlaceCandidate> {
        if response.status != STATUS_OK {
            if response.status != "ZERO_RESULTS" {
                warn!(
                    "Nearby search returned {}",
                    describe(&response.status, response.error_message.as_deref())
                );
            }
            return Vec::new();
        }

        response
            .results
            .into_iter()
            .filter_map(|place| {
                let name = place.name?;
                Some(PlaceCandidate {
                    place_id: place.place_id,
                    name,
                    rating: place.rating,
                    rating_count: place.user_ratings_total.unwrap_or(0),
                    price_level: place.price_level,
                    address: place.vicinity,
                    coordinate: place.geometry.map(|g| g.location.into()),
                    types: place.types,
                    distance_from_start_km: 0.0,
                    sample: 0,
                })
            })
            .collect()
    }
}
