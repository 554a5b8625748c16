#![doc = include_str!("../README.md")]

// Re-export main structures
pub use crate::aggregation::{
    aggregate_ions_in_range,
    find_max_value_in_mz_range,
    IonAggregate,
};
pub use crate::cache::{
    CacheStats,
    SpectrumCache,
    SpectrumCacheOptions,
};
pub use crate::models::{
    BaselineNoiseOptions,
    BaselineNoiseStats,
    MsSpectrum,
    NoiseThresholdMode,
    ScanInfo,
};
pub use crate::search::{
    find_nearest,
    find_value_range_in_sorted,
    MissingValuePolicy,
    SearchRange,
};
pub use crate::timeline::{
    find_nearest_survey_scan_index,
    ScanCoordinate,
    ScanTimeline,
};
pub use crate::tracking::{
    ScanTracker,
    SpectrumProcessingOptions,
    MAX_ALLOWABLE_ION_COUNT,
};

// Re-export traits
pub use crate::traits::{
    NoiseEstimator,
    SilentReporter,
    StatusReporter,
    TracingReporter,
};
pub use crate::utils::AbortSignal;

// Declare modules
pub mod aggregation;
pub mod cache;
pub mod errors;
pub mod models;
pub mod search;
pub mod timeline;
pub mod tracking;
pub mod traits;
pub mod utils;

// Re-export errors
pub use crate::errors::{
    CacheError,
    DataProcessingError,
    SicError,
};
