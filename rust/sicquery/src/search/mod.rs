pub mod nearest;
pub mod range;

use std::fmt::Debug;
use std::ops::Sub;

/// Scalar types the search routines operate on (ints and floats alike).
pub trait SearchValue: Copy + PartialOrd + Sub<Output = Self> + Debug {}

impl<T: Copy + PartialOrd + Sub<Output = T> + Debug> SearchValue for T {}

/// Absolute distance without requiring signed arithmetic.
pub(crate) fn distance<T: SearchValue>(a: T, b: T) -> T {
    if a > b {
        a - b
    } else {
        b - a
    }
}

pub use nearest::{
    find_nearest,
    MissingValuePolicy,
};
pub use range::{
    find_value_range_in_sorted,
    SearchRange,
};
