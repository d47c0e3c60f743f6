//! Route sampling
//!
//! Turns a route polyline into the ordered list of points at which nearby
//! places are looked up. Distance based modes map a distance ratio onto the
//! overview polyline (`floor(distance / total * len)`), so sample positions
//! are only as accurate as the polyline's vertex spacing.

use serde::Serialize;

use super::policy::SamplingMode;
use crate::models::{Coordinate, Route};

/// A point on the route where a nearby-places lookup is issued
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePoint {
    /// Position of this sample in the sample sequence
    pub ordinal: usize,
    /// Index into the route polyline
    pub index: usize,
    pub coordinate: Coordinate,
    pub distance_from_start_km: f64,
}

/// Compute the sample points for a route.
///
/// Never returns a sample whose polyline index is out of bounds.
#[must_use]
pub fn sample_route(route: &Route, mode: &SamplingMode) -> Vec<SamplePoint> {
    let path_len = route.path.len();
    if path_len == 0 || route.total_distance_m == 0 {
        return Vec::new();
    }

    let positions: Vec<(usize, f64)> = match *mode {
        SamplingMode::FixedInterval { interval_m } => {
            fixed_interval_distances(route.total_distance_m, interval_m)
                .into_iter()
                .map(|d| (ratio_index(d, route.total_distance_m, path_len), d))
                .collect()
        }
        SamplingMode::PerInterval { interval_m } => {
            interval_midpoints(route.total_distance_m, interval_m)
                .into_iter()
                .map(|d| (ratio_index(d, route.total_distance_m, path_len), d))
                .collect()
        }
        SamplingMode::IndexStride {
            stride,
            max_samples,
        } => {
            if stride == 0 {
                return Vec::new();
            }
            (0..path_len)
                .step_by(stride)
                .take(max_samples)
                .map(|index| {
                    let ratio = index as f64 / path_len as f64;
                    (index, ratio * route.total_distance_m as f64)
                })
                .collect()
        }
    };

    positions
        .into_iter()
        .filter(|(index, _)| *index < path_len)
        .enumerate()
        .map(|(ordinal, (index, distance_m))| SamplePoint {
            ordinal,
            index,
            coordinate: route.path[index],
            distance_from_start_km: distance_m / 1000.0,
        })
        .collect()
}

fn ratio_index(distance_m: f64, total_m: u64, path_len: usize) -> usize {
    let ratio = distance_m / total_m as f64;
    (ratio * path_len as f64).floor() as usize
}

/// 0, i, 2i, ... strictly below the total
fn fixed_interval_distances(total_m: u64, interval_m: u64) -> Vec<f64> {
    if interval_m == 0 {
        return Vec::new();
    }
    (0..total_m)
        .step_by(interval_m as usize)
        .map(|d| d as f64)
        .collect()
}

/// Midpoint of every interval; the last one is clamped to the route end
fn interval_midpoints(total_m: u64, interval_m: u64) -> Vec<f64> {
    if interval_m == 0 {
        return Vec::new();
    }
    (0..total_m)
        .step_by(interval_m as usize)
        .map(|start| {
            let end = (start + interval_m).min(total_m);
            (start + end) as f64 / 2.0
        })
        .collect()
}
