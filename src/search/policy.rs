//! Search policy: how to sample the route and which places to keep

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, RoadbiteError};

/// How sample points are placed along the route polyline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum SamplingMode {
    /// One sample every `interval_m` metres, starting at the route start
    FixedInterval { interval_m: u64 },
    /// Every `stride`-th polyline vertex, at most `max_samples` of them
    IndexStride { stride: usize, max_samples: usize },
    /// One sample in the middle of each `interval_m` long route segment
    PerInterval { interval_m: u64 },
}

/// Parameters passed to every nearby-place lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupParams {
    pub radius_m: u32,
    /// Place type filter, e.g. `restaurant`
    pub category: String,
    pub keyword: Option<String>,
}

impl Default for LookupParams {
    fn default() -> Self {
        Self {
            radius_m: 2000,
            category: "restaurant".to_string(),
            keyword: Some("restaurant food dining".to_string()),
        }
    }
}

/// Which deduplicated candidates survive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Selection {
    All,
    /// Keep the best rated places of every sample interval
    TopPerInterval { per_interval: usize },
    /// Spread picks along the route, preferring the best rated of each cluster
    Spacing {
        min_spacing_km: f64,
        avoid_last_km: f64,
        cluster_window_km: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputOrder {
    DistanceFromStart,
    RatingDescending,
}

/// Complete search strategy for one search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPolicy {
    pub sampling: SamplingMode,
    pub lookup: LookupParams,
    /// Minimum number of user ratings a place needs
    pub min_rating_count: Option<u32>,
    pub selection: Selection,
    pub order: OutputOrder,
}

impl SearchPolicy {
    /// Sample every 3 km, keep places with 1000+ ratings, spaced along the route
    #[must_use]
    pub fn along_route() -> Self {
        Self {
            sampling: SamplingMode::FixedInterval { interval_m: 3000 },
            lookup: LookupParams::default(),
            min_rating_count: Some(1000),
            selection: Selection::Spacing {
                min_spacing_km: 5.0,
                avoid_last_km: 10.0,
                cluster_window_km: 2.0,
            },
            order: OutputOrder::DistanceFromStart,
        }
    }

    /// One lookup per 10 km segment, best three places of each segment
    #[must_use]
    pub fn top_per_interval() -> Self {
        Self {
            sampling: SamplingMode::PerInterval { interval_m: 10_000 },
            lookup: LookupParams::default(),
            min_rating_count: None,
            selection: Selection::TopPerInterval { per_interval: 3 },
            order: OutputOrder::DistanceFromStart,
        }
    }

    /// Cheap polyline stride sampling, best rated first
    #[must_use]
    pub fn stride() -> Self {
        Self {
            sampling: SamplingMode::IndexStride {
                stride: 10,
                max_samples: 20,
            },
            lookup: LookupParams::default(),
            min_rating_count: Some(1000),
            selection: Selection::All,
            order: OutputOrder::RatingDescending,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.sampling {
            SamplingMode::FixedInterval { interval_m } | SamplingMode::PerInterval { interval_m }
                if interval_m == 0 =>
            {
                return Err(RoadbiteError::validation("sample interval must be positive"));
            }
            SamplingMode::IndexStride { stride: 0, .. } => {
                return Err(RoadbiteError::validation("sample stride must be positive"));
            }
            _ => {}
        }

        if self.lookup.radius_m == 0 || self.lookup.radius_m > 50_000 {
            return Err(RoadbiteError::validation(
                "lookup radius must be between 1 and 50000 metres",
            ));
        }

        if self.lookup.category.trim().is_empty() {
            return Err(RoadbiteError::validation("lookup category cannot be empty"));
        }

        match self.selection {
            Selection::TopPerInterval { per_interval: 0 } => Err(RoadbiteError::validation(
                "per-interval count must be positive",
            )),
            Selection::Spacing {
                min_spacing_km,
                avoid_last_km,
                cluster_window_km,
            } if min_spacing_km < 0.0 || avoid_last_km < 0.0 || cluster_window_km < 0.0 => Err(
                RoadbiteError::validation("spacing parameters cannot be negative"),
            ),
            _ => Ok(()),
        }
    }
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self::along_route()
    }
}

/// Named policies selectable from config, CLI and API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyPreset {
    #[default]
    AlongRoute,
    TopPerInterval,
    Stride,
}

impl PolicyPreset {
    pub const NAMES: [&'static str; 3] = ["along-route", "top-per-interval", "stride"];

    #[must_use]
    pub fn policy(self) -> SearchPolicy {
        match self {
            PolicyPreset::AlongRoute => SearchPolicy::along_route(),
            PolicyPreset::TopPerInterval => SearchPolicy::top_per_interval(),
            PolicyPreset::Stride => SearchPolicy::stride(),
        }
    }
}

impl FromStr for PolicyPreset {
    type Err = RoadbiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "along-route" => Ok(PolicyPreset::AlongRoute),
            "top-per-interval" => Ok(PolicyPreset::TopPerInterval),
            "stride" => Ok(PolicyPreset::Stride),
            other => Err(RoadbiteError::validation(format!(
                "unknown policy '{other}'. Must be one of: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyPreset::AlongRoute => Self::NAMES[0],
            PolicyPreset::TopPerInterval => Self::NAMES[1],
            PolicyPreset::Stride => Self::NAMES[2],
        };
        f.write_str(name)
    }
}
