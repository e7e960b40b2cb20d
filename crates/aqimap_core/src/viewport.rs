//! # Viewport Diffing
//!
//! Computes, for a viewport change, the minimal set of annotation
//! operations the map surface must apply: readings to add, readings to
//! remove, and readings present before and after whose displayed value
//! changed.
//!
//! Map surfaces cannot render tens of thousands of annotations, so when the
//! visible population exceeds the display cap a stability-preserving sample
//! is taken: readings already on screen that remain inside the viewport are
//! kept, and the remaining budget is filled from a uniform shuffle of the
//! visible population. Retention bias keeps pans and zooms from churning
//! the map, while the shuffle still rotates through the full population
//! over repeated redraws.
//!
//! The RNG is a parameter so callers control determinism in tests.

use crate::reading::Reading;
use crate::spatial::SensorIndex;
use crate::types::{CoordinateRegion, SensorId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Annotation operations produced by one diff computation.
///
/// `updated` pairs the instance currently on screen with its replacement
/// value so the caller can refresh it in place via [`Reading::update`].
#[derive(Debug, Default)]
pub struct RenderDiff {
    pub to_add: Vec<Reading>,
    pub to_remove: Vec<Reading>,
    pub updated: Vec<(Reading, Reading)>,
}

impl RenderDiff {
    /// True when applying the diff would change nothing on screen.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty() && self.updated.is_empty()
    }
}

/// Computes the render diff for `region` against the readings currently on
/// screen.
///
/// Pure in-memory computation with no failure mode: a degenerate zero-span
/// region degrades to an empty or minimal result. The caller is expected to
/// run it off the interactive context; it scans potentially tens of
/// thousands of points.
pub fn compute_render_diff<R: Rng>(
    index: &SensorIndex,
    region: CoordinateRegion,
    current: &HashMap<SensorId, Reading>,
    max_display: usize,
    rng: &mut R,
) -> RenderDiff {
    let rect = region.bounding_rect();
    let mut visible = index.query_rect(&rect);

    let target: HashMap<SensorId, Reading> = if visible.len() <= max_display {
        visible.into_iter().map(|r| (r.id(), r)).collect()
    } else {
        // Over budget: keep on-screen readings that are still inside the
        // viewport, then fill the remaining slots from a uniform shuffle.
        // Sticky members are never evicted by the fill.
        let mut target: HashMap<SensorId, Reading> = current
            .values()
            .filter(|r| rect.contains(r.latitude(), r.longitude()))
            .map(|r| (r.id(), r.clone()))
            .collect();

        visible.shuffle(rng);
        for reading in visible {
            if target.len() >= max_display {
                break;
            }
            target.entry(reading.id()).or_insert(reading);
        }

        // The sticky set can only exceed the cap if the caller let the
        // visible set grow past it; trim arbitrarily in that case.
        if target.len() > max_display {
            let evict: Vec<SensorId> = target
                .keys()
                .copied()
                .skip(max_display)
                .collect();
            for id in evict {
                target.remove(&id);
            }
        }
        target
    };

    let mut diff = RenderDiff::default();
    for (id, reading) in &target {
        match current.get(id) {
            None => diff.to_add.push(reading.clone()),
            Some(existing) => {
                if existing.aqi() != reading.aqi() {
                    diff.updated.push((existing.clone(), reading.clone()));
                }
            }
        }
    }
    for reading in current.values() {
        if !target.contains_key(&reading.id()) {
            diff.to_remove.push(reading.clone());
        }
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::AqiWindows;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn reading(id: u32, lat: f32, lon: f32, aqi: u32) -> Reading {
        Reading::new(SensorId(id), lat, lon, AqiWindows::uniform(aqi), 0)
    }

    fn visible_map(readings: &[Reading]) -> HashMap<SensorId, Reading> {
        readings.iter().map(|r| (r.id(), r.clone())).collect()
    }

    fn ids(readings: &[Reading]) -> HashSet<u32> {
        readings.iter().map(|r| r.id().0).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn first_draw_over_empty_screen_adds_visible_readings() {
        let index = SensorIndex::bulk_load(vec![
            reading(1, 10.0, 10.0, 5),
            reading(2, 80.0, 80.0, 200),
        ]);
        let region = CoordinateRegion::new((10.0, 10.0), (20.0, 20.0));

        let diff = compute_render_diff(&index, region, &HashMap::new(), 10, &mut rng());
        assert_eq!(ids(&diff.to_add), HashSet::from([1]));
        assert!(diff.to_remove.is_empty());
        assert!(diff.updated.is_empty());
    }

    #[test]
    fn under_budget_diff_is_exact() {
        let index = SensorIndex::bulk_load(vec![
            reading(1, 5.0, 5.0, 10),
            reading(2, 6.0, 6.0, 20),
            reading(3, 50.0, 50.0, 30),
        ]);
        // Previously showing 2 (still in region) and 3 (now out of region).
        let current = visible_map(&[reading(2, 6.0, 6.0, 20), reading(3, 50.0, 50.0, 30)]);
        let region = CoordinateRegion::new((5.0, 5.0), (10.0, 10.0));

        let diff = compute_render_diff(&index, region, &current, 100, &mut rng());
        assert_eq!(ids(&diff.to_add), HashSet::from([1]));
        assert_eq!(ids(&diff.to_remove), HashSet::from([3]));
        assert!(diff.updated.is_empty());
    }

    #[test]
    fn oversampled_target_retains_all_sticky_members() {
        let readings: Vec<Reading> = (0..500)
            .map(|i| reading(i, (i % 10) as f32, (i / 10) as f32 * 0.1, 40))
            .collect();
        let index = SensorIndex::bulk_load(readings.clone());
        // 20 readings already on screen, all still inside the region.
        let sticky: Vec<Reading> = readings.iter().take(20).cloned().collect();
        let current = visible_map(&sticky);
        let region = CoordinateRegion::new((5.0, 25.0), (1000.0, 1000.0));
        let max_display = 50;

        let diff = compute_render_diff(&index, region, &current, max_display, &mut rng());

        // No sticky member is removed, and the additions fill the budget
        // exactly with distinct non-sticky readings.
        assert!(diff.to_remove.is_empty());
        assert_eq!(diff.to_add.len(), max_display - sticky.len());
        let added = ids(&diff.to_add);
        assert_eq!(added.len(), max_display - sticky.len());
        let sticky_ids = ids(&sticky);
        assert!(added.is_disjoint(&sticky_ids));
    }

    #[test]
    fn oversampling_rotates_through_population() {
        let readings: Vec<Reading> = (0..300).map(|i| reading(i, 1.0, 1.0, 40)).collect();
        let index = SensorIndex::bulk_load(readings);
        let region = CoordinateRegion::new((1.0, 1.0), (2.0, 2.0));

        // Each fresh draw over an empty screen samples the population
        // uniformly, so repeated draws cycle well past one display budget.
        let mut rng = rng();
        let mut seen = HashSet::new();
        for _ in 0..40 {
            let diff = compute_render_diff(&index, region, &HashMap::new(), 30, &mut rng);
            assert_eq!(diff.to_add.len(), 30);
            seen.extend(diff.to_add.iter().map(|r| r.id().0));
        }
        assert!(seen.len() > 100, "only {} distinct readings shown", seen.len());
    }

    #[test]
    fn changed_value_is_reported_as_update_not_churn() {
        let index = SensorIndex::bulk_load(vec![reading(1, 10.0, 10.0, 120)]);
        let current = visible_map(&[reading(1, 10.0, 10.0, 80)]);
        let region = CoordinateRegion::new((10.0, 10.0), (4.0, 4.0));

        let diff = compute_render_diff(&index, region, &current, 10, &mut rng());
        assert!(diff.to_add.is_empty());
        assert!(diff.to_remove.is_empty());
        assert_eq!(diff.updated.len(), 1);
        let (existing, replacement) = &diff.updated[0];
        assert_eq!(existing.aqi(), 80);
        assert_eq!(replacement.aqi(), 120);
        assert_eq!(existing.id(), replacement.id());
    }

    #[test]
    fn diff_is_idempotent_once_converged() {
        let readings = vec![reading(1, 2.0, 2.0, 10), reading(2, 3.0, 3.0, 20)];
        let index = SensorIndex::bulk_load(readings.clone());
        let current = visible_map(&readings);
        let region = CoordinateRegion::new((2.5, 2.5), (5.0, 5.0));

        let diff = compute_render_diff(&index, region, &current, 10, &mut rng());
        assert!(diff.is_empty());
    }

    #[test]
    fn zero_span_region_degrades_to_point_query() {
        let index = SensorIndex::bulk_load(vec![reading(1, 2.0, 2.0, 10), reading(2, 3.0, 3.0, 20)]);
        let region = CoordinateRegion::new((2.0, 2.0), (0.0, 0.0));

        let diff = compute_render_diff(&index, region, &HashMap::new(), 10, &mut rng());
        assert_eq!(ids(&diff.to_add), HashSet::from([1]));
    }
}
