pub mod noise_estimator;
pub mod reporter;

pub use noise_estimator::{
    NoiseEstimator,
    TrimmedMedianEstimator,
};
pub use reporter::{
    SilentReporter,
    StatusReporter,
    TracingReporter,
};
