use super::{
    distance,
    SearchValue,
};
use std::cmp::Ordering;

/// Inclusive index range of all elements within `tolerance_half_width` of
/// `value` in a sorted ascending slice; `None` when no element is in band.
///
/// Recursive halving: the midpoint probe either lands inside the tolerance
/// band (then the exact boundaries are a short linear walk outward, since the
/// band is contiguous in a sorted array) or tells us which half can still
/// contain the band. Two-element subranges are resolved by direct comparison.
///
/// # Examples
/// ```
/// use sicquery::search::find_value_range_in_sorted;
///
/// let mzs = [100.0, 100.5, 101.0, 101.5];
/// assert_eq!(find_value_range_in_sorted(&mzs, 101.0, 0.6), Some((1, 3)));
/// assert_eq!(find_value_range_in_sorted(&mzs, 99.0, 0.5), None);
/// ```
pub fn find_value_range_in_sorted<T: SearchValue>(
    sorted: &[T],
    value: T,
    tolerance_half_width: T,
) -> Option<(usize, usize)> {
    if sorted.is_empty() {
        return None;
    }
    search_band(sorted, value, tolerance_half_width, 0, sorted.len() - 1)
}

fn in_band<T: SearchValue>(x: T, value: T, tol: T) -> bool {
    distance(x, value) <= tol
}

fn search_band<T: SearchValue>(
    sorted: &[T],
    value: T,
    tol: T,
    lo: usize,
    hi: usize,
) -> Option<(usize, usize)> {
    // Degenerate one/two element subrange: direct comparison.
    if hi - lo <= 1 {
        let lo_in = in_band(sorted[lo], value, tol);
        let hi_in = in_band(sorted[hi], value, tol);
        return match (lo_in, hi_in) {
            (true, true) => Some((lo, hi)),
            (true, false) => Some((lo, lo)),
            (false, true) => Some((hi, hi)),
            (false, false) => None,
        };
    }

    let mid = lo + (hi - lo) / 2;
    if in_band(sorted[mid], value, tol) {
        // Walk outward for the exact boundaries.
        let mut start = mid;
        while start > 0 && in_band(sorted[start - 1], value, tol) {
            start -= 1;
        }
        let mut end = mid;
        while end + 1 < sorted.len() && in_band(sorted[end + 1], value, tol) {
            end += 1;
        }
        return Some((start, end));
    }

    if sorted[mid] < value {
        search_band(sorted, value, tol, mid + 1, hi)
    } else {
        search_band(sorted, value, tol, lo, mid - 1)
    }
}

/// Immutable-after-build range search over a caller-provided array, keeping a
/// permutation back to the original element order.
///
/// Built once with [`SearchRange::fill_with_data`], queried many times with
/// [`SearchRange::find_value_range`]. Query results index into the *sorted*
/// view; [`SearchRange::original_index`] maps a sorted position back to the
/// caller's array.
#[derive(Debug, Clone, Default)]
pub struct SearchRange<T> {
    sorted: Vec<T>,
    original_index: Vec<usize>,
}

impl<T: SearchValue> SearchRange<T> {
    pub fn fill_with_data(data: &[T]) -> Self {
        let mut pairs: Vec<(T, usize)> = data.iter().copied().zip(0..data.len()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        Self {
            sorted: pairs.iter().map(|p| p.0).collect(),
            original_index: pairs.iter().map(|p| p.1).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn sorted_values(&self) -> &[T] {
        &self.sorted
    }

    /// Maps a sorted position back to the index in the original array.
    pub fn original_index(&self, sorted_position: usize) -> Option<usize> {
        self.original_index.get(sorted_position).copied()
    }

    /// Inclusive sorted-position range of elements within the tolerance band.
    pub fn find_value_range(&self, value: T, tolerance_half_width: T) -> Option<(usize, usize)> {
        find_value_range_in_sorted(&self.sorted, value, tolerance_half_width)
    }
}
