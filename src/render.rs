//! Text rendering of search results
//!
//! Shared by the CLI listing and the HTTP marker payload.

use std::fmt::Write as _;

use serde::Serialize;

use crate::models::{Coordinate, PlaceCandidate, RouteSummary};
use crate::search::SearchReport;

const MAX_STARS: usize = 5;
const MAX_TYPE_TAGS: usize = 2;

/// Star bar: one ★ per whole point, a ☆ for a half point, padded with ☆
#[must_use]
pub fn star_bar(rating: f64) -> String {
    let rating = rating.clamp(0.0, MAX_STARS as f64);
    let full = rating.floor() as usize;
    let half = usize::from(rating.fract() >= 0.5);
    let empty = MAX_STARS.saturating_sub(full + half);

    format!("{}{}{}", "★".repeat(full), "☆".repeat(half), "☆".repeat(empty))
}

/// "4.5 ⭐ (1234 reviews)", with N/A for an absent rating
#[must_use]
pub fn rating_text(place: &PlaceCandidate) -> String {
    let rating = place
        .rating
        .map_or_else(|| "N/A".to_string(), |rating| format!("{rating:.1}"));
    format!("{rating} ⭐ ({} reviews)", place.rating_count)
}

#[must_use]
pub fn price_label(price_level: Option<u8>) -> String {
    match price_level {
        None => "Price not available".to_string(),
        Some(0) => "Free".to_string(),
        Some(level @ 1..=4) => {
            let label = match level {
                1 => "Budget",
                2 => "Moderate",
                3 => "Expensive",
                _ => "Very Expensive",
            };
            format!("{} • {label}", "$".repeat(usize::from(level)))
        }
        Some(_) => "Price not available".to_string(),
    }
}

/// Last two comma-separated parts of an address, usually city and region
#[must_use]
pub fn locality(address: Option<&str>) -> String {
    let Some(address) = address.map(str::trim).filter(|a| !a.is_empty()) else {
        return "Location not available".to_string();
    };

    let parts: Vec<&str> = address.split(',').map(str::trim).collect();
    if parts.len() >= 2 {
        parts[parts.len() - 2..].join(", ")
    } else {
        address.to_string()
    }
}

#[must_use]
pub fn distance_text(distance_from_start_km: f64) -> String {
    format!("{distance_from_start_km:.1}km from start")
}

/// First category tags with underscores turned into spaces
#[must_use]
pub fn type_tags(types: &[String]) -> Vec<String> {
    types
        .iter()
        .take(MAX_TYPE_TAGS)
        .map(|t| t.replace('_', " "))
        .collect()
}

#[must_use]
pub fn empty_message(min_rating_count: Option<u32>) -> String {
    match min_rating_count {
        Some(threshold) => {
            format!("No restaurants with {threshold}+ ratings found along this route.")
        }
        None => "No restaurants found along this route.".to_string(),
    }
}

#[must_use]
pub fn route_summary_text(route: &RouteSummary) -> String {
    format!(
        "Distance: {}\nDuration: {}\nFrom: {}\nTo: {}",
        route.distance, route.duration, route.from, route.to
    )
}

/// One numbered entry of the listing
#[must_use]
pub fn listing_entry(number: usize, place: &PlaceCandidate) -> String {
    let mut entry = format!(
        "{number}. {}\n   {} {}\n   {}\n   {}\n   {}",
        place.name,
        star_bar(place.rating_or_zero()),
        rating_text(place),
        locality(place.address.as_deref()),
        distance_text(place.distance_from_start_km),
        price_label(place.price_level),
    );

    let tags = type_tags(&place.types);
    if !tags.is_empty() {
        let _ = write!(entry, "\n   [{}]", tags.join("] ["));
    }
    entry
}

/// Full text report: route summary followed by the numbered listing
#[must_use]
pub fn report_text(report: &SearchReport) -> String {
    let mut out = route_summary_text(&report.route);
    out.push_str("\n\n");

    if report.restaurants.is_empty() {
        out.push_str(&empty_message(report.min_rating_count));
    } else {
        let listing: Vec<String> = report
            .restaurants
            .iter()
            .enumerate()
            .map(|(i, place)| listing_entry(i + 1, place))
            .collect();
        out.push_str(&listing.join("\n\n"));
    }

    if report.failed_lookups > 0 {
        let _ = write!(
            out,
            "\n\n({} of {} lookups failed)",
            report.failed_lookups, report.sample_count
        );
    }
    out
}

/// Map marker for one listed restaurant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    /// Listing number, starting at 1
    pub number: usize,
    pub title: String,
    pub position: Coordinate,
    /// Info panel text
    pub info: String,
}

/// Markers for the listing; entries without a coordinate keep their number
/// but get no marker.
#[must_use]
pub fn markers(restaurants: &[PlaceCandidate]) -> Vec<MarkerView> {
    restaurants
        .iter()
        .enumerate()
        .filter_map(|(i, place)| {
            let position = place.coordinate?;
            let number = i + 1;
            Some(MarkerView {
                number,
                title: format!("{number}. {}", place.name),
                position,
                info: format!(
                    "Rating: {}\nDistance: {}\nLocation: {}\nPrice: {}",
                    rating_text(place),
                    distance_text(place.distance_from_start_km),
                    locality(place.address.as_deref()),
                    price_label(place.price_level),
                ),
            })
        })
        .collect()
}
