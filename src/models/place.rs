//! Restaurant candidates returned by nearby-place lookups

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A place found near a sample point, before or after selection
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaceCandidate {
    /// Provider place identifier
    pub place_id: Option<String>,
    pub name: String,
    /// Average rating, 0 to 5
    pub rating: Option<f64>,
    /// Number of user ratings, absent counts as 0
    pub rating_count: u32,
    /// Price level, 0 (free) to 4 (very expensive)
    pub price_level: Option<u8>,
    /// Short address ("vicinity")
    pub address: Option<String>,
    pub coordinate: Option<Coordinate>,
    /// Category tags such as `restaurant` or `meal_takeaway`
    pub types: Vec<String>,
    /// Distance of the sample point this place was found at, in kilometres
    pub distance_from_start_km: f64,
    /// Ordinal of the sample point this place was found at
    pub sample: usize,
}

impl PlaceCandidate {
    /// Create a bare candidate; lookups fill in the rest
    #[must_use]
    pub fn new(place_id: Option<String>, name: impl Into<String>) -> Self {
        Self {
            place_id,
            name: name.into(),
            rating: None,
            rating_count: 0,
            price_level: None,
            address: None,
            coordinate: None,
            types: Vec::new(),
            distance_from_start_km: 0.0,
            sample: 0,
        }
    }

    /// Identity used for deduplication: the place id, or the name without one
    #[must_use]
    pub fn dedup_key(&self) -> &str {
        self.place_id.as_deref().unwrap_or(&self.name)
    }

    /// Rating used for ranking; absent ratings rank as 0
    #[must_use]
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// Tag this candidate with the sample point it was found at
    #[must_use]
    pub fn at_sample(mut self, sample: usize, distance_from_start_km: f64) -> Self {
        self.sample = sample;
        self.distance_from_start_km = distance_from_start_km;
        self
    }
}
