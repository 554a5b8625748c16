use crate::errors::CacheError;
use crate::models::MsSpectrum;
use byteorder::{
    LittleEndian,
    ReadBytesExt,
    WriteBytesExt,
};
use std::fs::File;
use std::io::{
    Seek,
    SeekFrom,
    Write,
};
use std::path::Path;

/// Append-only scratch file holding evicted spectra.
///
/// Record layout (little endian): scan number `u32`, ion count `u32`,
/// `count` m/z values as `f64`, `count` intensities as `f32`. Offsets are
/// tracked only by the in-memory cache index; the file is unlinked on
/// creation and disappears when the cache drops.
#[derive(Debug)]
pub(crate) struct SpectrumPageFile {
    file: File,
    write_offset: u64,
}

impl SpectrumPageFile {
    pub fn create_in(directory: &Path) -> Result<Self, CacheError> {
        let file = tempfile::tempfile_in(directory)?;
        Ok(Self {
            file,
            write_offset: 0,
        })
    }

    /// Appends one spectrum, returning its `(offset, length)`.
    ///
    /// The record is staged in memory and written with a single `write_all`;
    /// on failure the write offset is not advanced, so the next append
    /// overwrites any partial bytes and the file never holds a referenced
    /// partial record.
    pub fn append(&mut self, spectrum: &MsSpectrum) -> Result<(u64, u32), CacheError> {
        let count = spectrum.ion_count();
        let mut record = Vec::with_capacity(8 + count * 12);
        record.write_u32::<LittleEndian>(spectrum.scan_number)?;
        record.write_u32::<LittleEndian>(count as u32)?;
        for mz in &spectrum.mz {
            record.write_f64::<LittleEndian>(*mz)?;
        }
        for intensity in &spectrum.intensities {
            record.write_f32::<LittleEndian>(*intensity)?;
        }

        let offset = self.write_offset;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&record)?;
        self.write_offset += record.len() as u64;
        Ok((offset, record.len() as u32))
    }

    /// Reads back the record at `offset`, checking it belongs to
    /// `expected_scan` and matches the recorded `length`.
    pub fn read_at(
        &mut self,
        offset: u64,
        length: u32,
        expected_scan: u32,
    ) -> Result<MsSpectrum, CacheError> {
        self.file.seek(SeekFrom::Start(offset))?;
        let scan_number = self.file.read_u32::<LittleEndian>()?;
        if scan_number != expected_scan {
            return Err(CacheError::PageRecordMismatch {
                expected: expected_scan,
                found: scan_number,
            });
        }
        let count = self.file.read_u32::<LittleEndian>()? as usize;
        if 8 + count * 12 != length as usize {
            return Err(CacheError::PageRecordMismatch {
                expected: expected_scan,
                found: scan_number,
            });
        }

        let mut mz = vec![0.0_f64; count];
        self.file.read_f64_into::<LittleEndian>(&mut mz)?;
        let mut intensities = vec![0.0_f32; count];
        self.file.read_f32_into::<LittleEndian>(&mut intensities)?;

        Ok(MsSpectrum {
            scan_number,
            mz,
            intensities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = SpectrumPageFile::create_in(dir.path()).unwrap();

        let first = MsSpectrum::new(5, vec![100.0, 200.5], vec![1.5, 2.5]);
        let second = MsSpectrum::new(6, vec![300.0], vec![9.0]);
        let (off_a, len_a) = page.append(&first).unwrap();
        let (off_b, len_b) = page.append(&second).unwrap();
        assert_eq!(off_a, 0);
        assert_eq!(off_b, len_a as u64);

        assert_eq!(page.read_at(off_b, len_b, 6).unwrap(), second);
        assert_eq!(page.read_at(off_a, len_a, 5).unwrap(), first);
    }

    #[test]
    fn test_scan_mismatch_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = SpectrumPageFile::create_in(dir.path()).unwrap();
        let (offset, length) = page
            .append(&MsSpectrum::new(9, vec![1.0], vec![1.0]))
            .unwrap();
        match page.read_at(offset, length, 10) {
            Err(CacheError::PageRecordMismatch { expected, found }) => {
                assert_eq!((expected, found), (10, 9));
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_spectrum_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = SpectrumPageFile::create_in(dir.path()).unwrap();
        let empty = MsSpectrum::new(3, vec![], vec![]);
        let (offset, length) = page.append(&empty).unwrap();
        assert_eq!(length, 8);
        assert_eq!(page.read_at(offset, length, 3).unwrap(), empty);
    }
}
