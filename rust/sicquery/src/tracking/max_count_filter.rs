//! Top-N intensity selection without a full sort.
//!
//! A full run can carry tens of millions of data points, so an `O(n log n)`
//! sort just to keep the most intense N is off the table. Instead the values
//! are bucketed into a fixed histogram, the bins are walked from the top until
//! the target count is covered, and only the single boundary bin gets a
//! partial sort to decide exactly which of its members make the cut.

/// Discarded points get their value replaced with this sentinel.
pub const SKIP_DATA_POINT_FLAG: f32 = -1.0;

const HISTOGRAM_BIN_COUNT: usize = 5000;

/// Marks all but the `max_allowed` largest values with
/// [`SKIP_DATA_POINT_FLAG`], in place. Returns the number of kept points.
///
/// Every kept value is >= every discarded value. Degenerate inputs (empty
/// data, `max_allowed >= len`, or a non-positive maximum that defeats the
/// histogram) keep everything.
pub fn apply_max_count_filter(values: &mut [f32], max_allowed: usize) -> usize {
    let total = values.len();
    if total == 0 || max_allowed >= total {
        return total;
    }
    if max_allowed == 0 {
        for value in values.iter_mut() {
            *value = SKIP_DATA_POINT_FLAG;
        }
        return 0;
    }

    let max_value = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max_value <= 0.0 || !max_value.is_finite() {
        return total;
    }
    let bin_width = max_value / HISTOGRAM_BIN_COUNT as f32;
    let bin_of = |value: f32| -> usize {
        if value <= 0.0 {
            0
        } else {
            ((value / bin_width) as usize).min(HISTOGRAM_BIN_COUNT - 1)
        }
    };

    let mut histogram = vec![0_usize; HISTOGRAM_BIN_COUNT];
    for value in values.iter() {
        histogram[bin_of(*value)] += 1;
    }

    // Walk from the most intense bin down until the target is covered.
    let mut running_total = 0;
    let mut boundary_bin = None;
    for bin in (0..HISTOGRAM_BIN_COUNT).rev() {
        running_total += histogram[bin];
        if running_total >= max_allowed {
            boundary_bin = Some(bin);
            break;
        }
    }
    let Some(boundary_bin) = boundary_bin else {
        return total;
    };
    let kept_above: usize = histogram[boundary_bin + 1..].iter().sum();
    let keep_in_boundary = max_allowed - kept_above;

    // Boundary-bin members need an exact decision; everyone else is settled
    // by their bin alone.
    let mut candidates: Vec<(f32, usize)> = Vec::with_capacity(histogram[boundary_bin]);
    for (index, value) in values.iter().enumerate() {
        if bin_of(*value) == boundary_bin {
            candidates.push((*value, index));
        }
    }
    for value in values.iter_mut() {
        if bin_of(*value) < boundary_bin {
            *value = SKIP_DATA_POINT_FLAG;
        }
    }

    if keep_in_boundary < candidates.len() {
        let discard = candidates.len() - keep_in_boundary;
        candidates.select_nth_unstable_by(discard - 1, |a, b| a.0.total_cmp(&b.0));
        for (_, index) in &candidates[..discard] {
            values[*index] = SKIP_DATA_POINT_FLAG;
        }
    }

    max_allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn kept(values: &[f32]) -> Vec<f32> {
        values
            .iter()
            .copied()
            .filter(|v| *v != SKIP_DATA_POINT_FLAG)
            .collect()
    }

    #[test]
    fn test_keeps_exactly_max_allowed() {
        let mut values: Vec<f32> = (1..=100).map(|i| i as f32).collect();
        let kept_count = apply_max_count_filter(&mut values, 10);
        assert_eq!(kept_count, 10);
        let survivors = kept(&values);
        assert_eq!(survivors.len(), 10);
        // The ten largest inputs survive.
        let mut sorted = survivors.clone();
        sorted.sort_by(f32::total_cmp);
        assert_eq!(sorted, (91..=100).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn test_kept_dominate_discarded() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let n = rng.gen_range(10..5000);
            let max_allowed = rng.gen_range(1..n);
            let mut values: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0..1e6)).collect();
            let original = values.clone();

            let kept_count = apply_max_count_filter(&mut values, max_allowed);
            assert_eq!(kept_count, max_allowed);

            let mut min_kept = f32::INFINITY;
            let mut max_discarded = f32::NEG_INFINITY;
            let mut survivors = 0;
            for (value, original_value) in values.iter().zip(original.iter()) {
                if *value == SKIP_DATA_POINT_FLAG {
                    max_discarded = max_discarded.max(*original_value);
                } else {
                    assert_eq!(value, original_value);
                    min_kept = min_kept.min(*value);
                    survivors += 1;
                }
            }
            assert_eq!(survivors, max_allowed);
            assert!(min_kept >= max_discarded);
        }
    }

    #[test]
    fn test_degenerate_inputs_keep_everything() {
        let mut empty: Vec<f32> = vec![];
        assert_eq!(apply_max_count_filter(&mut empty, 5), 0);

        let mut small = vec![1.0, 2.0, 3.0];
        assert_eq!(apply_max_count_filter(&mut small, 3), 3);
        assert_eq!(small, vec![1.0, 2.0, 3.0]);

        let mut zeros = vec![0.0, 0.0, 0.0, 0.0];
        assert_eq!(apply_max_count_filter(&mut zeros, 2), 4);
        assert_eq!(zeros, vec![0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_max_allowed_zero_discards_everything() {
        let mut values = vec![5.0, 1.0];
        assert_eq!(apply_max_count_filter(&mut values, 0), 0);
        assert!(values.iter().all(|v| *v == SKIP_DATA_POINT_FLAG));
    }

    #[test]
    fn test_boundary_bin_ties() {
        // Many identical values force the cut inside one bin.
        let mut values = vec![10.0_f32; 50];
        values.extend(vec![100.0_f32; 5]);
        let kept_count = apply_max_count_filter(&mut values, 20);
        assert_eq!(kept_count, 20);
        assert_eq!(kept(&values).len(), 20);
        // All five large values survive.
        assert_eq!(values.iter().filter(|v| **v == 100.0).count(), 5);
    }
}
