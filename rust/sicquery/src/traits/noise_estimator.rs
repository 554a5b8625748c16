use crate::errors::DataProcessingError;
use crate::models::{
    BaselineNoiseOptions,
    BaselineNoiseStats,
    NoiseThresholdMode,
};

/// Seam to the external peak-finder's baseline noise estimation.
///
/// The tracker hands over the scan's intensity array (non-positive values
/// already make no sense for noise and should be ignored by implementations)
/// plus the per-run options, and stores the returned stats on the scan.
pub trait NoiseEstimator {
    fn trimmed_noise_level(
        &self,
        intensities: &[f32],
        options: &BaselineNoiseOptions,
    ) -> Result<BaselineNoiseStats, DataProcessingError>;
}

/// Simple deterministic estimator: median of the lowest `trimmed_fraction`
/// of the positive intensities.
///
/// The production estimator lives in the external peak-finder library; this
/// one backs the demo binary and the tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrimmedMedianEstimator;

impl NoiseEstimator for TrimmedMedianEstimator {
    fn trimmed_noise_level(
        &self,
        intensities: &[f32],
        options: &BaselineNoiseOptions,
    ) -> Result<BaselineNoiseStats, DataProcessingError> {
        let mut positive: Vec<f32> = intensities.iter().copied().filter(|i| *i > 0.0).collect();
        if positive.is_empty() {
            return Err(DataProcessingError::ExpectedNonEmptyData);
        }
        positive.sort_by(|a, b| a.total_cmp(b));

        let fraction = options.trimmed_fraction.clamp(0.0, 1.0);
        let mut keep = ((positive.len() as f64) * fraction).round() as usize;
        keep = keep.clamp(1, positive.len());
        if keep < options.min_points {
            keep = options.min_points.min(positive.len());
        }
        let kept = &positive[..keep];

        let median = if keep % 2 == 1 {
            kept[keep / 2] as f64
        } else {
            (kept[keep / 2 - 1] as f64 + kept[keep / 2] as f64) / 2.0
        };
        let mean = kept.iter().map(|i| *i as f64).sum::<f64>() / keep as f64;
        let variance = kept
            .iter()
            .map(|i| {
                let d = *i as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / keep as f64;

        Ok(BaselineNoiseStats {
            noise_level: median,
            noise_std_dev: variance.sqrt(),
            points_used: keep,
            mode: NoiseThresholdMode::TrimmedMedianByAbundance,
        })
    }
}
