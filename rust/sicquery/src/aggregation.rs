//! m/z-window ion aggregation over a single spectrum.
//!
//! This is the inner loop of SIC extraction: for every scan in a parent ion's
//! window the orchestrator asks for the summed (or max) intensity at the
//! target m/z, and the answers lined up by scan number form the chromatogram.

use crate::models::MsSpectrum;
use crate::search::find_value_range_in_sorted;

/// Result of aggregating ions inside an m/z tolerance band.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IonAggregate {
    /// Summed or maximum intensity, depending on the query.
    pub intensity: f64,
    /// Number of data points inside the band.
    pub match_count: usize,
    /// The in-band m/z closest to the search target (first seen wins ties).
    pub closest_mz: f64,
}

/// Sums (or maxes) the intensities of all ions within
/// `tolerance_half_width` of `target_mz`.
///
/// The spectrum's m/z array must be sorted ascending. Empty spectra and
/// empty bands return the all-zero aggregate; this never fails.
///
/// # Examples
/// ```
/// use sicquery::aggregation::aggregate_ions_in_range;
/// use sicquery::models::MsSpectrum;
///
/// let sp = MsSpectrum::new(1, vec![100.0, 100.5, 101.0, 101.5], vec![10.0, 20.0, 30.0, 40.0]);
/// let agg = aggregate_ions_in_range(&sp, 101.0, 0.6, false);
/// assert_eq!(agg.intensity, 90.0);
/// assert_eq!(agg.match_count, 3);
/// assert_eq!(agg.closest_mz, 101.0);
/// ```
pub fn aggregate_ions_in_range(
    spectrum: &MsSpectrum,
    target_mz: f64,
    tolerance_half_width: f64,
    return_max: bool,
) -> IonAggregate {
    if spectrum.is_empty() || spectrum.mz.len() != spectrum.intensities.len() {
        return IonAggregate::default();
    }

    let Some((start, end)) = find_value_range_in_sorted(&spectrum.mz, target_mz, tolerance_half_width)
    else {
        return IonAggregate::default();
    };

    let mut intensity = 0.0_f64;
    let mut closest_mz = spectrum.mz[start];
    let mut closest_distance = (closest_mz - target_mz).abs();

    for i in start..=end {
        let point_intensity = spectrum.intensities[i] as f64;
        if return_max {
            intensity = intensity.max(point_intensity);
        } else {
            intensity += point_intensity;
        }
        let distance = (spectrum.mz[i] - target_mz).abs();
        if distance < closest_distance {
            closest_distance = distance;
            closest_mz = spectrum.mz[i];
        }
    }

    IonAggregate {
        intensity,
        match_count: end - start + 1,
        closest_mz,
    }
}

/// Linear scan for the most intense ion inside an explicit `[mz_start, mz_end]`
/// window. Returns `(mz, intensity)` of the best point, `None` when the window
/// is empty.
///
/// For dense spectra [`aggregate_ions_in_range`] with a center and half-width
/// is faster; the linear scan only pays off for very sparse spectra where the
/// binary descent overhead dominates.
pub fn find_max_value_in_mz_range(
    spectrum: &MsSpectrum,
    mz_start: f64,
    mz_end: f64,
) -> Option<(f64, f32)> {
    if spectrum.mz.len() != spectrum.intensities.len() {
        return None;
    }
    let mut best: Option<(f64, f32)> = None;
    for (mz, intensity) in spectrum.mz.iter().zip(spectrum.intensities.iter()) {
        if *mz < mz_start || *mz > mz_end {
            continue;
        }
        match best {
            Some((_, best_intensity)) if *intensity <= best_intensity => {}
            _ => best = Some((*mz, *intensity)),
        }
    }
    best
}
