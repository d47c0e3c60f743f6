//! Restaurant search along a route
//!
//! - Policy: sampling mode, lookup parameters and selection strategy
//! - Sampler: sample points along the route polyline
//! - Selection: threshold, deduplication, per-interval and spacing filters
//! - Finder: the end-to-end search pipeline

pub mod finder;
pub mod policy;
pub mod sampler;
pub mod selection;

pub use finder::{RouteRestaurantFinder, SearchContext, SearchReport, SearchRequest};
pub use policy::{LookupParams, OutputOrder, PolicyPreset, SamplingMode, SearchPolicy, Selection};
pub use sampler::{SamplePoint, sample_route};
pub use selection::{dedupe_candidates, filter_by_rating_count, select, spacing_filter, top_per_interval};
