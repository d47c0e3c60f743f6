//! Candidate aggregation, deduplication and selection

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::policy::{OutputOrder, SearchPolicy, Selection};
use crate::models::PlaceCandidate;

/// Drop repeated places, keeping the first occurrence of every dedup key
#[must_use]
pub fn dedupe_candidates(candidates: Vec<PlaceCandidate>) -> Vec<PlaceCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.dedup_key().to_string()))
        .collect()
}

/// Keep places with at least `min_rating_count` user ratings
#[must_use]
pub fn filter_by_rating_count(
    candidates: Vec<PlaceCandidate>,
    min_rating_count: u32,
) -> Vec<PlaceCandidate> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.rating_count >= min_rating_count)
        .collect()
}

fn by_rating_desc(a: &PlaceCandidate, b: &PlaceCandidate) -> Ordering {
    b.rating_or_zero()
        .partial_cmp(&a.rating_or_zero())
        .unwrap_or(Ordering::Equal)
}

fn by_distance(a: &PlaceCandidate, b: &PlaceCandidate) -> Ordering {
    a.distance_from_start_km
        .partial_cmp(&b.distance_from_start_km)
        .unwrap_or(Ordering::Equal)
}

/// Best `per_interval` places of every sample interval.
///
/// Works on raw (not yet deduplicated) lookups so each interval is ranked on
/// everything its lookup returned. The result is deduplicated afterwards, so a
/// place already picked for an earlier interval is not repeated.
#[must_use]
pub fn top_per_interval(candidates: Vec<PlaceCandidate>, per_interval: usize) -> Vec<PlaceCandidate> {
    let mut intervals: BTreeMap<usize, Vec<PlaceCandidate>> = BTreeMap::new();
    for candidate in candidates {
        intervals.entry(candidate.sample).or_default().push(candidate);
    }

    let picked = intervals
        .into_values()
        .flat_map(|group| {
            let mut group = dedupe_candidates(group);
            group.sort_by(by_rating_desc);
            group.truncate(per_interval);
            group
        })
        .collect();

    dedupe_candidates(picked)
}

/// Spread picks along the route.
///
/// Walks candidates by distance from start. A candidate is considered once it
/// is at least `min_spacing_km` past the last pick and not within the final
/// `avoid_last_km` of the route; the best rated eligible place within
/// `cluster_window_km` of it is kept. Absent ratings rank as 0 and ties keep
/// the candidate under consideration.
#[must_use]
pub fn spacing_filter(
    candidates: Vec<PlaceCandidate>,
    total_distance_km: f64,
    min_spacing_km: f64,
    avoid_last_km: f64,
    cluster_window_km: f64,
) -> Vec<PlaceCandidate> {
    let mut sorted = candidates;
    sorted.sort_by(by_distance);

    let cutoff_km = total_distance_km - avoid_last_km;
    let mut kept: Vec<PlaceCandidate> = Vec::new();

    for candidate in &sorted {
        if candidate.distance_from_start_km > cutoff_km {
            continue;
        }

        let last_kept_km = kept.last().map(|last| last.distance_from_start_km);
        let eligible = |place: &PlaceCandidate| {
            place.distance_from_start_km <= cutoff_km
                && last_kept_km
                    .is_none_or(|last| place.distance_from_start_km - last >= min_spacing_km)
                && !kept.iter().any(|k| k.dedup_key() == place.dedup_key())
        };

        if !eligible(candidate) {
            continue;
        }

        let mut cluster: Vec<&PlaceCandidate> = vec![candidate];
        cluster.extend(sorted.iter().filter(|other| {
            other.dedup_key() != candidate.dedup_key()
                && (other.distance_from_start_km - candidate.distance_from_start_km).abs()
                    <= cluster_window_km
                && eligible(*other)
        }));
        cluster.sort_by(|a, b| by_rating_desc(a, b));

        let best = cluster[0].clone();
        debug!(
            "Keeping {} at {:.1}km out of {} nearby candidates",
            best.name,
            best.distance_from_start_km,
            cluster.len()
        );
        kept.push(best);
    }

    kept
}

/// Apply the whole selection policy to the raw, aggregated lookups
#[must_use]
pub fn select(
    raw: Vec<PlaceCandidate>,
    policy: &SearchPolicy,
    total_distance_km: f64,
) -> Vec<PlaceCandidate> {
    let raw_count = raw.len();
    let candidates = match policy.min_rating_count {
        Some(min) => filter_by_rating_count(raw, min),
        None => raw,
    };

    let mut selected = match policy.selection {
        Selection::All => dedupe_candidates(candidates),
        Selection::TopPerInterval { per_interval } => top_per_interval(candidates, per_interval),
        Selection::Spacing {
            min_spacing_km,
            avoid_last_km,
            cluster_window_km,
        } => spacing_filter(
            dedupe_candidates(candidates),
            total_distance_km,
            min_spacing_km,
            avoid_last_km,
            cluster_window_km,
        ),
    };

    match policy.order {
        OutputOrder::DistanceFromStart => selected.sort_by(by_distance),
        OutputOrder::RatingDescending => selected.sort_by(by_rating_desc),
    }

    debug!("Selected {} of {} raw candidates", selected.len(), raw_count);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::policy::{LookupParams, SamplingMode};
    use rstest::rstest;

    fn place(id: &str, km: f64, rating: Option<f64>) -> PlaceCandidate {
        PlaceCandidate {
            rating,
            rating_count: 1500,
            ..PlaceCandidate::new(Some(id.to_string()), format!("Place {id}"))
        }
        .at_sample(0, km)
    }

    fn spacing(candidates: Vec<PlaceCandidate>, total_km: f64) -> Vec<PlaceCandidate> {
        spacing_filter(candidates, total_km, 5.0, 10.0, 2.0)
    }

    fn ids(candidates: &[PlaceCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.dedup_key()).collect()
    }

    #[test]
    fn test_dedupe_collapses_identical_ids() {
        let first = place("p1", 3.0, Some(4.0));
        let second = place("p1", 9.0, Some(4.9));
        let deduped = dedupe_candidates(vec![first.clone(), second]);
        assert_eq!(deduped, vec![first]);
    }

    #[test]
    fn test_dedupe_uses_name_without_id() {
        let a = PlaceCandidate::new(None, "Diner");
        let b = PlaceCandidate::new(None, "Diner");
        let c = PlaceCandidate::new(Some("Diner2".to_string()), "Diner");
        assert_eq!(dedupe_candidates(vec![a, b, c]).len(), 2);
    }

    #[test]
    fn test_dedupe_preserves_encounter_order() {
        let list = vec![
            place("c", 1.0, None),
            place("a", 2.0, None),
            place("c", 3.0, None),
            place("b", 4.0, None),
            place("a", 5.0, None),
        ];
        assert_eq!(ids(&dedupe_candidates(list)), vec!["c", "a", "b"]);
    }

    #[rstest]
    #[case(999, 0)]
    #[case(1000, 1)]
    #[case(25_000, 1)]
    fn test_rating_count_threshold(#[case] count: u32, #[case] expected: usize) {
        let candidate = PlaceCandidate {
            rating_count: count,
            ..PlaceCandidate::new(None, "Diner")
        };
        let kept = filter_by_rating_count(vec![candidate], 1000);
        assert_eq!(kept.len(), expected);
        assert!(kept.iter().all(|c| c.rating_count >= 1000));
    }

    #[test]
    fn test_top_per_interval_keeps_best_three() {
        let ratings = [3.1, 4.8, 4.2, 2.0, 4.5];
        let mut raw: Vec<PlaceCandidate> = ratings
            .iter()
            .enumerate()
            .map(|(i, r)| place(&format!("a{i}"), 10.0, Some(*r)).at_sample(0, 5.0))
            .collect();
        raw.push(place("b0", 15.0, Some(3.0)).at_sample(1, 15.0));
        raw.push(place("b1", 15.0, None).at_sample(1, 15.0));

        let picked = top_per_interval(raw, 3);
        assert_eq!(ids(&picked), vec!["a1", "a4", "a2", "b0", "b1"]);
    }

    #[test]
    fn test_top_per_interval_dedupes_across_intervals() {
        let raw = vec![
            place("p1", 5.0, Some(4.9)).at_sample(0, 5.0),
            place("p1", 15.0, Some(4.9)).at_sample(1, 15.0),
            place("p2", 15.0, Some(4.0)).at_sample(1, 15.0),
        ];
        let picked = top_per_interval(raw, 3);
        assert_eq!(ids(&picked), vec!["p1", "p2"]);
        assert_eq!(picked[0].sample, 0);
    }

    #[test]
    fn test_spacing_enforces_minimum_gap() {
        let raw = vec![
            place("a", 0.0, Some(4.0)),
            place("b", 3.0, Some(4.0)),
            place("c", 6.0, Some(4.0)),
            place("d", 9.0, Some(4.0)),
            place("e", 12.0, Some(4.0)),
        ];
        let kept = spacing(raw, 40.0);
        assert_eq!(ids(&kept), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_spacing_avoids_end_of_route() {
        let raw = vec![place("a", 0.0, Some(4.0)), place("b", 21.0, Some(5.0))];
        let kept = spacing(raw, 30.0);
        assert_eq!(ids(&kept), vec!["a"]);
    }

    #[test]
    fn test_spacing_prefers_best_rated_in_cluster() {
        let raw = vec![
            place("a", 0.0, Some(3.5)),
            place("b", 1.5, Some(4.7)),
            place("c", 2.0, Some(4.1)),
        ];
        let kept = spacing(raw, 50.0);
        assert_eq!(ids(&kept), vec!["b"]);
    }

    #[test]
    fn test_spacing_ties_keep_considered_candidate() {
        let raw = vec![place("a", 0.0, Some(4.0)), place("b", 1.0, Some(4.0))];
        let kept = spacing(raw, 50.0);
        assert_eq!(ids(&kept), vec!["a"]);
    }

    #[test]
    fn test_spacing_absent_rating_counts_as_zero() {
        let raw = vec![place("a", 0.0, None), place("b", 1.0, Some(0.5))];
        let kept = spacing(raw, 50.0);
        assert_eq!(ids(&kept), vec!["b"]);
    }

    #[test]
    fn test_spacing_cluster_pick_respects_constraints() {
        // "b" is the best rated neighbour of "c" but too close to "a", so
        // "d" wins that cluster. "z" is inside the avoided tail of the route.
        let raw = vec![
            place("a", 0.0, Some(3.0)),
            place("b", 4.0, Some(5.0)),
            place("c", 5.5, Some(3.0)),
            place("d", 7.0, Some(4.0)),
            place("y", 19.0, Some(3.0)),
            place("z", 20.5, Some(5.0)),
        ];
        let kept = spacing(raw, 30.0);
        assert_eq!(ids(&kept), vec!["a", "d", "y"]);
    }

    #[test]
    fn test_spacing_properties_hold_on_dense_input() {
        let raw: Vec<PlaceCandidate> = (0..200)
            .map(|i| {
                let km = (i as f64 * 0.37) % 70.0;
                let rating = Some(((i * 7) % 50) as f64 / 10.0);
                place(&format!("p{i}"), km, rating)
            })
            .collect();
        let total_km = 72.0;
        let kept = spacing(raw, total_km);

        assert!(!kept.is_empty());
        for pair in kept.windows(2) {
            assert!(pair[1].distance_from_start_km - pair[0].distance_from_start_km >= 5.0);
        }
        assert!(kept.iter().all(|c| c.distance_from_start_km <= total_km - 10.0));
        assert_eq!(dedupe_candidates(kept.clone()).len(), kept.len());
    }

    #[test]
    fn test_spacing_short_route_keeps_nothing() {
        let raw = vec![place("a", 0.0, Some(4.0)), place("b", 3.0, Some(4.0))];
        assert!(spacing(raw, 8.0).is_empty());
    }

    #[test]
    fn test_select_applies_threshold_then_spacing() {
        let mut low = place("low", 0.0, Some(5.0));
        low.rating_count = 12;
        let raw = vec![low, place("ok", 1.0, Some(3.0)), place("ok", 1.0, Some(3.0))];
        let selected = select(raw, &SearchPolicy::along_route(), 40.0);
        assert_eq!(ids(&selected), vec!["ok"]);
    }

    #[test]
    fn test_select_rating_descending_order() {
        let policy = SearchPolicy {
            sampling: SamplingMode::FixedInterval { interval_m: 3000 },
            lookup: LookupParams::default(),
            min_rating_count: None,
            selection: Selection::All,
            order: OutputOrder::RatingDescending,
        };
        let raw = vec![
            place("a", 0.0, Some(3.0)),
            place("b", 3.0, None),
            place("c", 6.0, Some(4.5)),
            place("d", 9.0, Some(3.0)),
        ];
        let selected = select(raw, &policy, 20.0);
        assert_eq!(ids(&selected), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn test_select_top_per_interval_orders_by_distance() {
        let raw = vec![
            place("far", 15.0, Some(4.9)).at_sample(1, 15.0),
            place("near", 5.0, Some(4.0)).at_sample(0, 5.0),
        ];
        let selected = select(raw, &SearchPolicy::top_per_interval(), 20.0);
        assert_eq!(ids(&selected), vec!["near", "far"]);
    }
}
