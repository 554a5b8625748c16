//! Conversion between the three ways of naming a position in a run:
//! absolute scan number, relative position in `[0, 1]` across the master scan
//! order, and acquisition (elution) time in minutes. Custom SIC search
//! windows arrive in any of the three and get resolved here.

use crate::errors::DataProcessingError;
use crate::search::{
    find_nearest,
    MissingValuePolicy,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Which representation a caller-supplied value is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanCoordinate {
    #[serde(rename = "absolute")]
    Absolute,
    #[serde(rename = "relative")]
    Relative,
    #[serde(rename = "acquisition_time")]
    AcquisitionTime,
}

/// The master scan order: parallel ascending scan-number and scan-time arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanTimeline {
    scan_numbers: Vec<u32>,
    /// Acquisition times in minutes, parallel to `scan_numbers`.
    scan_times: Vec<f32>,
}

impl ScanTimeline {
    pub fn new(scan_numbers: Vec<u32>, scan_times: Vec<f32>) -> Result<Self, DataProcessingError> {
        if scan_numbers.len() != scan_times.len() {
            return Err(DataProcessingError::ExpectedVectorSameLength {
                left: scan_numbers.len(),
                right: scan_times.len(),
            });
        }
        if scan_numbers.is_empty() {
            return Err(DataProcessingError::ExpectedNonEmptyData);
        }
        Ok(Self {
            scan_numbers,
            scan_times,
        })
    }

    pub fn scan_count(&self) -> usize {
        self.scan_numbers.len()
    }

    pub fn scan_numbers(&self) -> &[u32] {
        &self.scan_numbers
    }

    pub fn scan_times(&self) -> &[f32] {
        &self.scan_times
    }

    fn scan_number_span(&self) -> f32 {
        (self.scan_numbers[self.scan_numbers.len() - 1] - self.scan_numbers[0]) as f32
    }

    fn run_time_span(&self) -> f32 {
        self.scan_times[self.scan_times.len() - 1] - self.scan_times[0]
    }

    /// Converts `value` (in the representation named by `kind`) to an
    /// absolute scan number.
    ///
    /// With `converting_range_or_tolerance` the value is a *width*, measured
    /// against the total run span rather than offset from the run start; the
    /// result is then a scan-number width, not a scan of the run.
    pub fn to_absolute_scan(
        &self,
        value: f32,
        kind: ScanCoordinate,
        converting_range_or_tolerance: bool,
    ) -> u32 {
        match kind {
            ScanCoordinate::Absolute => value.max(0.0).round() as u32,
            ScanCoordinate::Relative => {
                if converting_range_or_tolerance {
                    (value * self.scan_number_span()).round().max(0.0) as u32
                } else {
                    let index = self.relative_to_index(value);
                    self.scan_numbers[index]
                }
            }
            ScanCoordinate::AcquisitionTime => {
                if converting_range_or_tolerance {
                    let span = self.run_time_span();
                    if span <= 0.0 {
                        0
                    } else {
                        (value / span * self.scan_number_span()).round().max(0.0) as u32
                    }
                } else {
                    let index = self.nearest_index_by_time(value);
                    self.scan_numbers[index]
                }
            }
        }
    }

    /// Converts `value` to an acquisition time in minutes (a time width when
    /// `converting_range_or_tolerance` is set).
    pub fn to_scan_time(
        &self,
        value: f32,
        kind: ScanCoordinate,
        converting_range_or_tolerance: bool,
    ) -> f32 {
        match kind {
            ScanCoordinate::AcquisitionTime => value,
            ScanCoordinate::Relative => {
                if converting_range_or_tolerance {
                    value * self.run_time_span()
                } else {
                    self.scan_times[self.relative_to_index(value)]
                }
            }
            ScanCoordinate::Absolute => {
                if converting_range_or_tolerance {
                    let span = self.scan_number_span();
                    if span <= 0.0 {
                        0.0
                    } else {
                        value / span * self.run_time_span()
                    }
                } else {
                    let target = value.max(0.0).round() as u32;
                    self.scan_times[self.nearest_index_by_scan(target)]
                }
            }
        }
    }

    /// Converts `value` to a relative position in `[0, 1]`.
    pub fn to_relative(
        &self,
        value: f32,
        kind: ScanCoordinate,
        converting_range_or_tolerance: bool,
    ) -> f32 {
        match kind {
            ScanCoordinate::Relative => value,
            _ => {
                let time = self.to_scan_time(value, kind, converting_range_or_tolerance);
                let span = self.run_time_span();
                if span <= 0.0 {
                    0.0
                } else if converting_range_or_tolerance {
                    time / span
                } else {
                    (time - self.scan_times[0]) / span
                }
            }
        }
    }

    fn relative_to_index(&self, relative: f32) -> usize {
        let clamped = relative.clamp(0.0, 1.0);
        (clamped * (self.scan_count() - 1) as f32).round() as usize
    }

    fn nearest_index_by_time(&self, time: f32) -> usize {
        // Non-empty by construction.
        find_nearest(&self.scan_times, time, MissingValuePolicy::ClosestPoint).unwrap_or(0)
    }

    fn nearest_index_by_scan(&self, scan_number: u32) -> usize {
        find_nearest(
            &self.scan_numbers,
            scan_number,
            MissingValuePolicy::ClosestPoint,
        )
        .unwrap_or(0)
    }
}

/// Nearest entry in the survey-scan subsequence to `target_scan`.
///
/// Survey scans are a (possibly short) strict subsequence of the master
/// order, so a linear walk with a manual straddle tie-break beats setting up
/// a binary search: an exact match short-circuits, otherwise the closer of
/// the two straddling entries wins.
pub fn find_nearest_survey_scan_index(
    survey_scan_numbers: &[u32],
    target_scan: u32,
) -> Option<usize> {
    if survey_scan_numbers.is_empty() {
        return None;
    }
    let mut best_index = 0;
    let mut best_distance = u32::MAX;
    for (index, scan) in survey_scan_numbers.iter().enumerate() {
        if *scan == target_scan {
            return Some(index);
        }
        let distance = scan.abs_diff(target_scan);
        if distance < best_distance {
            best_distance = distance;
            best_index = index;
        }
    }
    Some(best_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> ScanTimeline {
        ScanTimeline::new(vec![100, 200, 300], vec![1.0, 2.0, 3.0]).unwrap()
    }

    #[test]
    fn test_requires_parallel_nonempty_arrays() {
        assert!(ScanTimeline::new(vec![1], vec![]).is_err());
        assert!(ScanTimeline::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_relative_midpoint_resolves_to_middle_scan() {
        let tl = timeline();
        assert_eq!(tl.to_absolute_scan(0.5, ScanCoordinate::Relative, false), 200);
        assert_eq!(tl.to_absolute_scan(0.0, ScanCoordinate::Relative, false), 100);
        assert_eq!(tl.to_absolute_scan(1.0, ScanCoordinate::Relative, false), 300);
        // Out-of-range relative values clamp.
        assert_eq!(tl.to_absolute_scan(1.5, ScanCoordinate::Relative, false), 300);
    }

    #[test]
    fn test_absolute_passthrough() {
        let tl = timeline();
        assert_eq!(tl.to_absolute_scan(250.0, ScanCoordinate::Absolute, false), 250);
    }

    #[test]
    fn test_time_to_scan_uses_nearest() {
        let tl = timeline();
        assert_eq!(
            tl.to_absolute_scan(2.1, ScanCoordinate::AcquisitionTime, false),
            200
        );
        assert_eq!(
            tl.to_absolute_scan(10.0, ScanCoordinate::AcquisitionTime, false),
            300
        );
    }

    #[test]
    fn test_scan_to_time_uses_nearest() {
        let tl = timeline();
        assert_eq!(tl.to_scan_time(210.0, ScanCoordinate::Absolute, false), 2.0);
        assert_eq!(tl.to_scan_time(2.5, ScanCoordinate::AcquisitionTime, false), 2.5);
    }

    #[test]
    fn test_range_semantics_measure_the_span() {
        let tl = timeline();
        // A relative width of 0.5 covers half the scan-number span.
        assert_eq!(tl.to_absolute_scan(0.5, ScanCoordinate::Relative, true), 100);
        // A one-minute time width over a two-minute run is half the span.
        assert_eq!(
            tl.to_absolute_scan(1.0, ScanCoordinate::AcquisitionTime, true),
            100
        );
        assert_eq!(tl.to_scan_time(0.5, ScanCoordinate::Relative, true), 1.0);
        assert_eq!(tl.to_scan_time(100.0, ScanCoordinate::Absolute, true), 1.0);
    }

    #[test]
    fn test_to_relative_roundtrip() {
        let tl = timeline();
        let rel = tl.to_relative(200.0, ScanCoordinate::Absolute, false);
        assert!((rel - 0.5).abs() < 1e-6);
        assert_eq!(tl.to_relative(0.25, ScanCoordinate::Relative, false), 0.25);
    }

    #[test]
    fn test_survey_scan_lookup() {
        let surveys = [10, 50, 90];
        assert_eq!(find_nearest_survey_scan_index(&surveys, 50), Some(1));
        assert_eq!(find_nearest_survey_scan_index(&surveys, 55), Some(1));
        assert_eq!(find_nearest_survey_scan_index(&surveys, 75), Some(2));
        assert_eq!(find_nearest_survey_scan_index(&surveys, 0), Some(0));
        assert_eq!(find_nearest_survey_scan_index(&surveys, 1000), Some(2));
        assert_eq!(find_nearest_survey_scan_index(&[], 5), None);
        // Equidistant straddle resolves to the earlier entry.
        assert_eq!(find_nearest_survey_scan_index(&surveys, 30), Some(0));
    }

    #[test]
    fn test_single_scan_run() {
        let tl = ScanTimeline::new(vec![42], vec![5.0]).unwrap();
        assert_eq!(tl.to_absolute_scan(0.7, ScanCoordinate::Relative, false), 42);
        assert_eq!(tl.to_scan_time(42.0, ScanCoordinate::Absolute, false), 5.0);
        assert_eq!(tl.to_absolute_scan(1.0, ScanCoordinate::AcquisitionTime, true), 0);
    }
}
