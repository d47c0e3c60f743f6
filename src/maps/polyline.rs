//! Encoded polyline decoding
//!
//! Directions responses carry the route geometry in the encoded polyline
//! format (5 decimal precision). Decoding happens at the API boundary; the
//! rest of the crate only sees coordinates.

use crate::models::Coordinate;
use crate::{Result, RoadbiteError};

const PRECISION: f64 = 1e5;

/// Decode an encoded polyline string into coordinates
pub fn decode_polyline(encoded: &str) -> Result<Vec<Coordinate>> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut position = 0;
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;

    while position < bytes.len() {
        latitude = accumulate(latitude, next_value(bytes, &mut position)?)?;
        longitude = accumulate(longitude, next_value(bytes, &mut position)?)?;
        points.push(Coordinate::new(
            latitude as f64 / PRECISION,
            longitude as f64 / PRECISION,
        ));
    }

    Ok(points)
}

fn accumulate(current: i64, delta: i64) -> Result<i64> {
    current
        .checked_add(delta)
        .ok_or_else(|| RoadbiteError::api("polyline value overflow"))
}

fn next_value(bytes: &[u8], position: &mut usize) -> Result<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*position).ok_or_else(|| {
            RoadbiteError::api(format!("truncated polyline at byte {}", *position))
        })?;
        *position += 1;

        if !(63..=126).contains(&byte) {
            return Err(RoadbiteError::api(format!(
                "invalid polyline character {:?}",
                byte as char
            )));
        }
        if shift > 60 {
            return Err(RoadbiteError::api("polyline value overflow"));
        }

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
