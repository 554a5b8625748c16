use serde::{
    Deserialize,
    Serialize,
};

/// How the per-scan baseline noise level is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoiseThresholdMode {
    /// Use a fixed noise level from the options, no estimation.
    #[serde(rename = "absolute_threshold")]
    AbsoluteThreshold,
    /// Delegate to the peak finder's trimmed estimator over the intensities.
    #[serde(rename = "trimmed_median_by_abundance")]
    #[default]
    TrimmedMedianByAbundance,
}

/// Per-run configuration for baseline noise determination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineNoiseOptions {
    #[serde(default)]
    pub mode: NoiseThresholdMode,
    /// Noise level used verbatim in absolute-threshold mode.
    #[serde(default = "default_absolute_threshold")]
    pub absolute_threshold: f64,
    /// Fraction of the lowest-abundance points the trimmed estimator keeps.
    #[serde(default = "default_trimmed_fraction")]
    pub trimmed_fraction: f64,
    /// Minimum number of points the estimator should use when available.
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

fn default_absolute_threshold() -> f64 {
    0.0
}

fn default_trimmed_fraction() -> f64 {
    0.75
}

fn default_min_points() -> usize {
    15
}

impl Default for BaselineNoiseOptions {
    fn default() -> Self {
        Self {
            mode: NoiseThresholdMode::default(),
            absolute_threshold: default_absolute_threshold(),
            trimmed_fraction: default_trimmed_fraction(),
            min_points: default_min_points(),
        }
    }
}

/// Baseline noise statistics for one scan.
///
/// Computed once per scan (either fixed or via the external estimator) and
/// treated as immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BaselineNoiseStats {
    pub noise_level: f64,
    pub noise_std_dev: f64,
    pub points_used: usize,
    pub mode: NoiseThresholdMode,
}

impl BaselineNoiseStats {
    pub fn absolute(level: f64) -> Self {
        Self {
            noise_level: level,
            noise_std_dev: 0.0,
            points_used: 1,
            mode: NoiseThresholdMode::AbsoluteThreshold,
        }
    }
}

/// The slice of per-scan metadata this core reads and writes.
///
/// The orchestrator owns the full scan record; only the fields the tracker
/// fills (ion counts, TIC/base peak, noise stats) live here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanInfo {
    pub scan_number: u32,
    /// Acquisition (elution) time in minutes.
    pub scan_time: f32,
    /// Ion count after reduction, as stored in the cache.
    pub ion_count: usize,
    /// Ion count as delivered by the reader, before any reduction.
    pub ion_count_raw: usize,
    /// MRM/SRM scans are exempt from low-intensity discarding.
    pub is_mrm_scan: bool,
    pub total_ion_intensity: f64,
    pub base_peak_intensity: f32,
    pub baseline_noise_stats: BaselineNoiseStats,
}

impl ScanInfo {
    pub fn new(scan_number: u32, scan_time: f32) -> Self {
        Self {
            scan_number,
            scan_time,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_options_deserialize_with_defaults() {
        let opts: BaselineNoiseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.mode, NoiseThresholdMode::TrimmedMedianByAbundance);
        assert_eq!(opts.trimmed_fraction, 0.75);

        let opts: BaselineNoiseOptions =
            serde_json::from_str(r#"{"mode": "absolute_threshold", "absolute_threshold": 250.0}"#)
                .unwrap();
        assert_eq!(opts.mode, NoiseThresholdMode::AbsoluteThreshold);
        assert_eq!(opts.absolute_threshold, 250.0);
    }

    #[test]
    fn test_absolute_stats_use_one_point() {
        let stats = BaselineNoiseStats::absolute(100.0);
        assert_eq!(stats.noise_level, 100.0);
        assert_eq!(stats.points_used, 1);
        assert_eq!(stats.mode, NoiseThresholdMode::AbsoluteThreshold);
    }
}
