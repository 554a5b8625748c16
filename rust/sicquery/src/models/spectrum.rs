use crate::errors::DataProcessingError;
use serde::{
    Deserialize,
    Serialize,
};

/// One scan's worth of mass spectral data.
///
/// The two arrays are parallel: `mz[i]` and `intensities[i]` describe the same
/// data point, and m/z values are expected to be sorted ascending. Sortedness
/// is a convention of the upstream readers, not something this type enforces;
/// the range-search and compression routines assume it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsSpectrum {
    pub scan_number: u32,
    pub mz: Vec<f64>,
    pub intensities: Vec<f32>,
}

impl MsSpectrum {
    pub fn new(scan_number: u32, mz: Vec<f64>, intensities: Vec<f32>) -> Self {
        Self {
            scan_number,
            mz,
            intensities,
        }
    }

    pub fn with_capacity(scan_number: u32, capacity: usize) -> Self {
        Self {
            scan_number,
            mz: Vec::with_capacity(capacity),
            intensities: Vec::with_capacity(capacity),
        }
    }

    pub fn ion_count(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    pub fn push(&mut self, mz: f64, intensity: f32) {
        self.mz.push(mz);
        self.intensities.push(intensity);
    }

    /// Checks the parallel-array invariant.
    pub fn validate(&self) -> Result<(), DataProcessingError> {
        if self.mz.len() != self.intensities.len() {
            return Err(DataProcessingError::ExpectedVectorSameLength {
                left: self.mz.len(),
                right: self.intensities.len(),
            });
        }
        Ok(())
    }

    /// Shrinks both arrays to `new_count` points, dropping the tail.
    ///
    /// Used by the reduction passes after copy-compaction.
    pub fn truncate(&mut self, new_count: usize) {
        self.mz.truncate(new_count);
        self.intensities.truncate(new_count);
    }

    /// Largest intensity in the spectrum, 0.0 when empty.
    pub fn base_peak_intensity(&self) -> f32 {
        self.intensities.iter().copied().fold(0.0, f32::max)
    }

    pub fn total_ion_intensity(&self) -> f64 {
        self.intensities.iter().map(|i| *i as f64).sum()
    }
}
