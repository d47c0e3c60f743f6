//! `roadbite` - Find well-rated restaurants along a driving route
//!
//! This library samples points along a driving route, looks up restaurants
//! near each point and selects a short, well-spaced list of stops.

pub mod api;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod maps;
pub mod models;
pub mod render;
pub mod search;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::RoadbiteConfig;
pub use error::RoadbiteError;
pub use maps::{Geocoder, GoogleMapsClient, MapsServices, PlaceLookup, RouteProvider};
pub use models::{Coordinate, PlaceCandidate, Route, RouteSummary};
pub use search::{
    PolicyPreset, RouteRestaurantFinder, SearchPolicy, SearchReport, SearchRequest,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RoadbiteError>;
