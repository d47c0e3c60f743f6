//! Driving route model

use serde::{Deserialize, Serialize};

use super::RoutePoint;

/// A computed driving route between two endpoints
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Route {
    /// Ordered overview polyline
    pub path: Vec<RoutePoint>,
    /// Total traversed distance in metres
    pub total_distance_m: u64,
    /// Travel time in seconds, when the provider reports it
    pub duration_s: Option<u64>,
    /// Provider formatted distance, e.g. "412 km"
    pub distance_text: Option<String>,
    /// Provider formatted duration, e.g. "4 hours 5 mins"
    pub duration_text: Option<String>,
    pub start_address: String,
    pub end_address: String,
}

impl Route {
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_m as f64 / 1000.0
    }

    /// Geometric length of the overview polyline in kilometres.
    ///
    /// The overview path is simplified, so this usually underestimates the
    /// driven distance. Logged next to the reported distance.
    #[must_use]
    pub fn path_length_km(&self) -> f64 {
        self.path
            .windows(2)
            .map(|pair| pair[0].distance_km(&pair[1]))
            .sum()
    }

    #[must_use]
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            distance: self
                .distance_text
                .clone()
                .unwrap_or_else(|| format!("{:.1} km", self.total_distance_km())),
            duration: self
                .duration_text
                .clone()
                .or_else(|| self.duration_s.map(format_duration))
                .unwrap_or_else(|| "Unknown".to_string()),
            from: self.start_address.clone(),
            to: self.end_address.clone(),
            total_distance_m: self.total_distance_m,
            path: self.path.clone(),
        }
    }
}

/// Route details handed to the presentation layer
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteSummary {
    pub distance: String,
    pub duration: String,
    pub from: String,
    pub to: String,
    pub total_distance_m: u64,
    pub path: Vec<RoutePoint>,
}

fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours} h {minutes} min")
    } else {
        format!("{minutes} min")
    }
}
