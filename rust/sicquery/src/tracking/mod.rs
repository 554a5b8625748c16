//! Per-scan processing: noise stats, spectral reduction and cache hand-off.

pub mod compress;
pub mod max_count_filter;

pub use compress::compress_spectra_data;
pub use max_count_filter::{
    apply_max_count_filter,
    SKIP_DATA_POINT_FLAG,
};

use crate::cache::SpectrumCache;
use crate::errors::SicError;
use crate::models::{
    BaselineNoiseOptions,
    BaselineNoiseStats,
    MsSpectrum,
    NoiseThresholdMode,
    ScanInfo,
};
use crate::traits::{
    NoiseEstimator,
    StatusReporter,
    TracingReporter,
    TrimmedMedianEstimator,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::sync::Arc;

/// Hard cap on stored data points per scan.
pub const MAX_ALLOWABLE_ION_COUNT: usize = 50_000;

/// How many cap-exceeded diagnostics are emitted before throttling down to
/// new maxima only.
const CAP_WARNINGS_BEFORE_THROTTLE: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumProcessingOptions {
    /// When false only noise stats are computed; no spectrum is cached.
    #[serde(default = "default_true")]
    pub retain_spectra: bool,
    /// Drop points below the scan's baseline noise level (never for MRM scans).
    #[serde(default)]
    pub discard_low_intensity_data: bool,
    #[serde(default)]
    pub compress_spectra: bool,
    /// Merge resolution for compression, in m/z units.
    #[serde(default = "default_mz_resolution")]
    pub compress_mz_resolution: f64,
    /// Reporter-ion protection band: points inside are never reduced away.
    #[serde(default)]
    pub mz_ignore_range: Option<(f64, f64)>,
    #[serde(default)]
    pub baseline_noise: BaselineNoiseOptions,
}

fn default_true() -> bool {
    true
}

fn default_mz_resolution() -> f64 {
    0.05
}

impl Default for SpectrumProcessingOptions {
    fn default() -> Self {
        Self {
            retain_spectra: true,
            discard_low_intensity_data: false,
            compress_spectra: false,
            compress_mz_resolution: default_mz_resolution(),
            mz_ignore_range: None,
            baseline_noise: BaselineNoiseOptions::default(),
        }
    }
}

/// Drives the per-scan reduction pipeline and owns its diagnostics state.
pub struct ScanTracker {
    reporter: Arc<dyn StatusReporter>,
    noise_estimator: Box<dyn NoiseEstimator>,
    cap_exceeded_count: u64,
    largest_ion_count_seen: usize,
}

impl ScanTracker {
    pub fn new() -> Self {
        Self::with_collaborators(Arc::new(TracingReporter), Box::new(TrimmedMedianEstimator))
    }

    pub fn with_collaborators(
        reporter: Arc<dyn StatusReporter>,
        noise_estimator: Box<dyn NoiseEstimator>,
    ) -> Self {
        Self {
            reporter,
            noise_estimator,
            cap_exceeded_count: 0,
            largest_ion_count_seen: 0,
        }
    }

    /// Fills `scan.baseline_noise_stats`.
    ///
    /// Absolute-threshold mode takes the configured level verbatim; otherwise
    /// the injected estimator works on the positive intensities. Runs whether
    /// or not spectra are being retained, since downstream peak detection
    /// needs the noise level regardless.
    pub fn compute_noise_level(
        &self,
        scan: &mut ScanInfo,
        intensities: &[f32],
        options: &BaselineNoiseOptions,
    ) {
        scan.baseline_noise_stats = match options.mode {
            NoiseThresholdMode::AbsoluteThreshold => {
                BaselineNoiseStats::absolute(options.absolute_threshold)
            }
            NoiseThresholdMode::TrimmedMedianByAbundance => {
                match self.noise_estimator.trimmed_noise_level(intensities, options) {
                    Ok(stats) => stats,
                    Err(e) => {
                        self.reporter.report_warning(&format!(
                            "noise estimation failed for scan {}: {}",
                            scan.scan_number, e
                        ));
                        BaselineNoiseStats {
                            noise_level: 0.0,
                            noise_std_dev: 0.0,
                            points_used: 0,
                            mode: NoiseThresholdMode::TrimmedMedianByAbundance,
                        }
                    }
                }
            }
        };
    }

    /// Caps the spectrum at `max_ion_count` points via the histogram filter,
    /// always keeping points inside the protection band.
    pub fn discard_data_to_limit_ion_count(
        &self,
        spectrum: &mut MsSpectrum,
        max_ion_count: usize,
        mz_ignore_range: Option<(f64, f64)>,
    ) {
        if spectrum.ion_count() <= max_ion_count {
            return;
        }
        let mut working = spectrum.intensities.clone();
        apply_max_count_filter(&mut working, max_ion_count);

        let mut target = 0;
        for index in 0..spectrum.ion_count() {
            let protected = in_ignore(spectrum.mz[index], mz_ignore_range);
            if protected || working[index] != SKIP_DATA_POINT_FLAG {
                spectrum.mz[target] = spectrum.mz[index];
                spectrum.intensities[target] = spectrum.intensities[index];
                target += 1;
            }
        }
        spectrum.truncate(target);
    }

    /// Drops points below the scan's baseline noise level, keeping the
    /// protection band.
    pub fn discard_data_below_noise_threshold(
        &self,
        spectrum: &mut MsSpectrum,
        noise_level: f64,
        mz_ignore_range: Option<(f64, f64)>,
    ) {
        if noise_level <= 0.0 {
            return;
        }
        let mut target = 0;
        for index in 0..spectrum.ion_count() {
            let protected = in_ignore(spectrum.mz[index], mz_ignore_range);
            if protected || spectrum.intensities[index] as f64 >= noise_level {
                spectrum.mz[target] = spectrum.mz[index];
                spectrum.intensities[target] = spectrum.intensities[index];
                target += 1;
            }
        }
        spectrum.truncate(target);
    }

    /// Runs the full per-scan pipeline and stores the result in the cache.
    ///
    /// Order: noise stats (always) -> early return when spectra are not being
    /// retained -> low-intensity discard (optional, skipped for MRM scans) ->
    /// compression (optional) -> ion-count cap -> cache store. A failure is
    /// returned tagged with the last completed stage.
    pub fn process_and_store_spectrum(
        &mut self,
        scan: &mut ScanInfo,
        mut spectrum: MsSpectrum,
        cache: &mut SpectrumCache,
        options: &SpectrumProcessingOptions,
    ) -> Result<(), SicError> {
        let mut completed_stage = "start";

        if let Err(e) = spectrum.validate() {
            let error = SicError::custom(format!(
                "scan {} failed after stage '{}': {}",
                scan.scan_number, completed_stage, e
            ));
            self.reporter.report_error(&error.to_string(), Some(&e));
            return Err(error);
        }

        scan.ion_count_raw = spectrum.ion_count();
        scan.total_ion_intensity = spectrum.total_ion_intensity();
        scan.base_peak_intensity = spectrum.base_peak_intensity();
        self.compute_noise_level(scan, &spectrum.intensities, &options.baseline_noise);
        completed_stage = "compute noise level";

        if !options.retain_spectra {
            scan.ion_count = 0;
            return Ok(());
        }

        if options.discard_low_intensity_data && !scan.is_mrm_scan {
            self.discard_data_below_noise_threshold(
                &mut spectrum,
                scan.baseline_noise_stats.noise_level,
                options.mz_ignore_range,
            );
            completed_stage = "discard low intensity data";
        }

        if options.compress_spectra {
            compress_spectra_data(
                &mut spectrum,
                options.compress_mz_resolution,
                options.mz_ignore_range,
            );
            completed_stage = "compress spectra data";
        }

        if spectrum.ion_count() > MAX_ALLOWABLE_ION_COUNT {
            self.warn_ion_count_cap(scan.scan_number, spectrum.ion_count());
            self.discard_data_to_limit_ion_count(
                &mut spectrum,
                MAX_ALLOWABLE_ION_COUNT,
                options.mz_ignore_range,
            );
        }
        scan.ion_count = spectrum.ion_count();

        cache.add_spectrum(spectrum);
        tracing::debug!(
            scan_number = scan.scan_number,
            ion_count = scan.ion_count,
            last_stage = completed_stage,
            "spectrum processed and stored"
        );
        Ok(())
    }

    /// First ten occurrences log unconditionally, afterwards only new maxima.
    fn warn_ion_count_cap(&mut self, scan_number: u32, ion_count: usize) {
        self.cap_exceeded_count += 1;
        let is_new_maximum = ion_count > self.largest_ion_count_seen;
        if is_new_maximum {
            self.largest_ion_count_seen = ion_count;
        }
        if self.cap_exceeded_count <= CAP_WARNINGS_BEFORE_THROTTLE || is_new_maximum {
            self.reporter.report_warning(&format!(
                "scan {} has {} data points, capping at {}",
                scan_number, ion_count, MAX_ALLOWABLE_ION_COUNT
            ));
        }
    }
}

impl Default for ScanTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn in_ignore(mz: f64, ignore_range: Option<(f64, f64)>) -> bool {
    match ignore_range {
        Some((start, end)) => mz >= start && mz <= end,
        None => false,
    }
}
