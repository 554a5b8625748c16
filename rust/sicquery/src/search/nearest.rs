use super::{
    distance,
    SearchValue,
};

/// What to return when the target value is not present in the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValuePolicy {
    /// The element with the smallest absolute distance to the target.
    #[default]
    ClosestPoint,
    /// The last element below the target (clamped to index 0).
    PreviousPoint,
    /// The first element above the target (clamped to the last index).
    NextPoint,
}

/// Nearest-match binary search over a sorted ascending slice.
///
/// Returns the index of an exact match when one exists, otherwise resolves the
/// neighbour per `policy`. Targets outside the array's range clamp to the
/// first/last index. `None` only for an empty slice.
///
/// The slice must be sorted ascending; unsorted input yields an arbitrary
/// index (caller responsibility, not checked here).
///
/// # Examples
/// ```
/// use sicquery::search::{find_nearest, MissingValuePolicy};
///
/// let scans = [100, 200, 300];
/// assert_eq!(find_nearest(&scans, 200, MissingValuePolicy::ClosestPoint), Some(1));
/// assert_eq!(find_nearest(&scans, 240, MissingValuePolicy::ClosestPoint), Some(1));
/// assert_eq!(find_nearest(&scans, 240, MissingValuePolicy::NextPoint), Some(2));
/// let empty: [i32; 0] = [];
/// assert_eq!(find_nearest(&empty, 1, MissingValuePolicy::ClosestPoint), None);
/// ```
pub fn find_nearest<T: SearchValue>(
    sorted: &[T],
    target: T,
    policy: MissingValuePolicy,
) -> Option<usize> {
    if sorted.is_empty() {
        return None;
    }

    // First index whose element is >= target.
    let insertion = sorted.partition_point(|&x| x < target);

    if insertion < sorted.len() && sorted[insertion] == target {
        return Some(insertion);
    }
    if insertion == 0 {
        return Some(0);
    }
    if insertion == sorted.len() {
        return Some(sorted.len() - 1);
    }

    // target lies strictly between sorted[insertion - 1] and sorted[insertion]
    let index = match policy {
        MissingValuePolicy::PreviousPoint => insertion - 1,
        MissingValuePolicy::NextPoint => insertion,
        MissingValuePolicy::ClosestPoint => {
            let below = distance(sorted[insertion - 1], target);
            let above = distance(sorted[insertion], target);
            if below <= above {
                insertion - 1
            } else {
                insertion
            }
        }
    };
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_exact_match_wins_regardless_of_policy() {
        let data = [1.0, 2.5, 4.0, 8.0];
        for policy in [
            MissingValuePolicy::ClosestPoint,
            MissingValuePolicy::PreviousPoint,
            MissingValuePolicy::NextPoint,
        ] {
            assert_eq!(find_nearest(&data, 4.0, policy), Some(2));
        }
    }

    #[test]
    fn test_single_element() {
        let data = [42];
        assert_eq!(
            find_nearest(&data, 7, MissingValuePolicy::ClosestPoint),
            Some(0)
        );
        assert_eq!(
            find_nearest(&data, 100, MissingValuePolicy::NextPoint),
            Some(0)
        );
    }

    #[test]
    fn test_out_of_range_clamps() {
        let data = [10, 20, 30];
        for policy in [
            MissingValuePolicy::ClosestPoint,
            MissingValuePolicy::PreviousPoint,
            MissingValuePolicy::NextPoint,
        ] {
            assert_eq!(find_nearest(&data, 5, policy), Some(0));
            assert_eq!(find_nearest(&data, 35, policy), Some(2));
        }
    }

    #[test]
    fn test_between_points_policies() {
        let data = [10.0, 20.0, 30.0];
        assert_eq!(
            find_nearest(&data, 13.0, MissingValuePolicy::ClosestPoint),
            Some(0)
        );
        assert_eq!(
            find_nearest(&data, 18.0, MissingValuePolicy::ClosestPoint),
            Some(1)
        );
        assert_eq!(
            find_nearest(&data, 18.0, MissingValuePolicy::PreviousPoint),
            Some(0)
        );
        assert_eq!(
            find_nearest(&data, 13.0, MissingValuePolicy::NextPoint),
            Some(1)
        );
        // Equidistant resolves to the lower index.
        assert_eq!(
            find_nearest(&data, 15.0, MissingValuePolicy::ClosestPoint),
            Some(0)
        );
    }

    #[test]
    fn test_closest_matches_naive_scan() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let n = rng.gen_range(1..200);
            let mut data: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..1000.0)).collect();
            data.sort_by(|a, b| a.total_cmp(b));

            let target = rng.gen_range(-50.0..1050.0);
            let got = find_nearest(&data, target, MissingValuePolicy::ClosestPoint).unwrap();

            let best = data
                .iter()
                .map(|x| (x - target).abs())
                .fold(f64::INFINITY, f64::min);
            assert!(
                (data[got] - target).abs() <= best,
                "target={} got index {} value {}",
                target,
                got,
                data[got]
            );
        }
    }
}
