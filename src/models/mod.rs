//! Data models for the roadbite application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and distances
//! - Route: Driving route polyline and summary
//! - Place: Restaurant candidates found along the route

pub mod location;
pub mod place;
pub mod route;

// Re-export all public types for convenient access
pub use location::{Coordinate, RoutePoint};
pub use place::PlaceCandidate;
pub use route::{Route, RouteSummary};
