pub mod scan_info;
pub mod spectrum;

pub use scan_info::{
    BaselineNoiseOptions,
    BaselineNoiseStats,
    NoiseThresholdMode,
    ScanInfo,
};
pub use spectrum::MsSpectrum;
