//! Bounded in-memory spectrum pool with disk page-out.
//!
//! A full profile-mode run does not fit in memory, so the pool holds the most
//! recently stored `spectra_to_retain_in_memory` spectra and pages the rest
//! out to a shared scratch file, keeping only `(offset, length)` per evicted
//! scan. Strictly single-threaded: append-on-evict, random-read-on-uncache.

mod page_file;

use crate::errors::CacheError;
use crate::models::MsSpectrum;
use crate::traits::{
    StatusReporter,
    TracingReporter,
};
use nohash_hasher::BuildNoHashHasher;
use page_file::SpectrumPageFile;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumCacheOptions {
    /// When false every spectrum stays resident and the pool grows unbounded.
    #[serde(default = "default_true")]
    pub disk_caching_enabled: bool,
    #[serde(default = "default_retain")]
    pub spectra_to_retain_in_memory: usize,
    /// Directory for the scratch file; the system temp dir when `None`.
    #[serde(default)]
    pub cache_directory: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_retain() -> usize {
    1000
}

impl Default for SpectrumCacheOptions {
    fn default() -> Self {
        Self {
            disk_caching_enabled: true,
            spectra_to_retain_in_memory: default_retain(),
            cache_directory: None,
        }
    }
}

/// Diagnostic counters owned by the cache instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Spectra written to the page file (evictions).
    pub cache_events: u64,
    /// Spectra read back from the page file.
    pub uncache_events: u64,
    /// Lookups satisfied from memory.
    pub pool_hits: u64,
}

#[derive(Debug, Clone, Copy)]
enum CacheEntry {
    Resident { slot: usize },
    Paged { offset: u64, length: u32 },
    /// A page-file failure made this scan permanently unavailable.
    Unavailable,
}

pub struct SpectrumCache {
    options: SpectrumCacheOptions,
    slots: Vec<Option<MsSpectrum>>,
    entries: HashMap<u32, CacheEntry, BuildNoHashHasher<u32>>,
    /// Round-robin pointer; the slot it rests on holds the oldest insertion.
    evict_cursor: usize,
    page_file: Option<SpectrumPageFile>,
    stats: CacheStats,
    reporter: Arc<dyn StatusReporter>,
}

impl std::fmt::Debug for SpectrumCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumCache")
            .field("options", &self.options)
            .field("resident", &self.resident_count())
            .field("tracked_scans", &self.entries.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl SpectrumCache {
    pub fn new(options: SpectrumCacheOptions) -> Self {
        Self::with_reporter(options, Arc::new(TracingReporter))
    }

    pub fn with_reporter(
        options: SpectrumCacheOptions,
        reporter: Arc<dyn StatusReporter>,
    ) -> Self {
        let capacity = options.spectra_to_retain_in_memory.max(1);
        Self {
            slots: Vec::with_capacity(capacity.min(default_retain())),
            options,
            entries: HashMap::with_hasher(BuildNoHashHasher::default()),
            evict_cursor: 0,
            page_file: None,
            stats: CacheStats::default(),
            reporter,
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of spectra currently held in memory.
    pub fn resident_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Number of distinct scans ever stored (resident, paged or failed).
    pub fn tracked_scan_count(&self) -> usize {
        self.entries.len()
    }

    /// Stores a spectrum, taking ownership.
    ///
    /// A scan that is already resident is overwritten in place. Storing into a
    /// full pool evicts the oldest insertion to the page file first; an
    /// eviction I/O failure is reported and makes the *evicted* scan
    /// unavailable, never the one being stored.
    pub fn add_spectrum(&mut self, spectrum: MsSpectrum) {
        let scan_number = spectrum.scan_number;
        if let Some(CacheEntry::Resident { slot }) = self.entries.get(&scan_number) {
            self.slots[*slot] = Some(spectrum);
            return;
        }
        // Paged or Unavailable entries are simply superseded by the fresh data.
        let slot = self.acquire_slot();
        self.slots[slot] = Some(spectrum);
        self.entries
            .insert(scan_number, CacheEntry::Resident { slot });
    }

    /// Fetches a scan's spectrum, paging it back in when needed.
    ///
    /// With `can_uncache = false` a paged-out scan is an error instead of a
    /// disk read.
    pub fn get_spectrum(
        &mut self,
        scan_number: u32,
        can_uncache: bool,
    ) -> Result<&MsSpectrum, CacheError> {
        match self.entries.get(&scan_number).copied() {
            None => Err(CacheError::ScanNotCached(scan_number)),
            Some(CacheEntry::Unavailable) => Err(CacheError::ScanUnavailable(scan_number)),
            Some(CacheEntry::Resident { slot }) => {
                self.stats.pool_hits += 1;
                self.slots[slot]
                    .as_ref()
                    .ok_or(CacheError::ScanNotCached(scan_number))
            }
            Some(CacheEntry::Paged { offset, length }) => {
                if !can_uncache {
                    return Err(CacheError::UncachingDisallowed(scan_number));
                }
                let spectrum = match self.read_page(offset, length, scan_number) {
                    Ok(spectrum) => spectrum,
                    Err(e) => {
                        self.entries.insert(scan_number, CacheEntry::Unavailable);
                        self.reporter.report_error(
                            &format!("failed to uncache scan {}", scan_number),
                            Some(&e),
                        );
                        return Err(e);
                    }
                };
                let slot = self.acquire_slot();
                self.slots[slot] = Some(spectrum);
                self.entries
                    .insert(scan_number, CacheEntry::Resident { slot });
                self.stats.uncache_events += 1;
                self.slots[slot]
                    .as_ref()
                    .ok_or(CacheError::ScanNotCached(scan_number))
            }
        }
    }

    /// Drops all cached spectra and the page-file index, keeping the stats.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.entries.clear();
        self.evict_cursor = 0;
        self.page_file = None;
    }

    fn read_page(
        &mut self,
        offset: u64,
        length: u32,
        scan_number: u32,
    ) -> Result<MsSpectrum, CacheError> {
        match self.page_file.as_mut() {
            Some(page) => page.read_at(offset, length, scan_number),
            // A Paged entry without a page file means the index is corrupt;
            // treat it like a missing record.
            None => Err(CacheError::ScanUnavailable(scan_number)),
        }
    }

    /// Returns a free slot index, evicting the oldest insertion when full.
    fn acquire_slot(&mut self) -> usize {
        let capacity = self.options.spectra_to_retain_in_memory.max(1);
        if !self.options.disk_caching_enabled || self.slots.len() < capacity {
            self.slots.push(None);
            return self.slots.len() - 1;
        }

        let slot = self.evict_cursor;
        self.evict_cursor = (self.evict_cursor + 1) % capacity;
        if let Some(evicted) = self.slots[slot].take() {
            self.page_out(evicted);
        }
        slot
    }

    fn page_out(&mut self, spectrum: MsSpectrum) {
        let scan_number = spectrum.scan_number;
        let result = self
            .ensure_page_file()
            .and_then(|page| page.append(&spectrum));
        match result {
            Ok((offset, length)) => {
                tracing::debug!(scan_number, offset, length, "paged spectrum out");
                self.entries
                    .insert(scan_number, CacheEntry::Paged { offset, length });
                self.stats.cache_events += 1;
            }
            Err(e) => {
                self.entries.insert(scan_number, CacheEntry::Unavailable);
                self.reporter.report_error(
                    &format!("failed to page out scan {}", scan_number),
                    Some(&e),
                );
            }
        }
    }

    fn ensure_page_file(&mut self) -> Result<&mut SpectrumPageFile, CacheError> {
        if self.page_file.is_none() {
            let directory = self
                .options
                .cache_directory
                .clone()
                .unwrap_or_else(std::env::temp_dir);
            self.page_file = Some(SpectrumPageFile::create_in(&directory)?);
        }
        match self.page_file.as_mut() {
            Some(page) => Ok(page),
            None => unreachable!("page file was just created"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SilentReporter;
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    #[derive(Default)]
    struct ErrorCounter {
        errors: AtomicUsize,
    }

    impl StatusReporter for ErrorCounter {
        fn report_status(&self, _message: &str) {}
        fn report_warning(&self, _message: &str) {}
        fn report_error(&self, _message: &str, _cause: Option<&dyn std::error::Error>) {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        fn report_progress(&self, _percent_complete: f32) {}
    }

    fn spectrum(scan: u32) -> MsSpectrum {
        let base = scan as f64;
        MsSpectrum::new(
            scan,
            vec![base + 100.0, base + 101.0, base + 102.0],
            vec![scan as f32, scan as f32 * 2.0, scan as f32 * 3.0],
        )
    }

    fn small_cache(capacity: usize) -> SpectrumCache {
        SpectrumCache::with_reporter(
            SpectrumCacheOptions {
                disk_caching_enabled: true,
                spectra_to_retain_in_memory: capacity,
                cache_directory: None,
            },
            Arc::new(SilentReporter),
        )
    }

    #[test]
    fn test_store_then_get_is_bit_identical() {
        let mut cache = small_cache(10);
        let original = spectrum(42);
        cache.add_spectrum(original.clone());
        let fetched = cache.get_spectrum(42, false).unwrap();
        assert_eq!(*fetched, original);
        assert_eq!(cache.stats().pool_hits, 1);
        assert_eq!(cache.stats().cache_events, 0);
    }

    #[test]
    fn test_missing_scan_is_an_error() {
        let mut cache = small_cache(10);
        assert!(matches!(
            cache.get_spectrum(7, true),
            Err(CacheError::ScanNotCached(7))
        ));
    }

    #[test]
    fn test_eviction_keeps_every_scan_retrievable() {
        let mut cache = small_cache(3);
        for scan in 0..10 {
            cache.add_spectrum(spectrum(scan));
        }
        assert_eq!(cache.resident_count(), 3);
        assert_eq!(cache.stats().cache_events, 7);

        let mut gets = 0;
        for scan in 0..10 {
            let fetched = cache.get_spectrum(scan, true).unwrap().clone();
            assert_eq!(fetched, spectrum(scan));
            gets += 1;
        }
        let stats = cache.stats();
        assert_eq!(stats.pool_hits + stats.uncache_events, gets);
        assert!(stats.uncache_events >= 7);
    }

    #[test]
    fn test_paged_scan_without_uncache_permission() {
        let mut cache = small_cache(2);
        for scan in 0..4 {
            cache.add_spectrum(spectrum(scan));
        }
        // Scan 0 was evicted first.
        assert!(matches!(
            cache.get_spectrum(0, false),
            Err(CacheError::UncachingDisallowed(0))
        ));
        // But it can still be paged back in.
        assert_eq!(*cache.get_spectrum(0, true).unwrap(), spectrum(0));
    }

    #[test]
    fn test_overwrite_in_place_does_not_evict() {
        let mut cache = small_cache(2);
        cache.add_spectrum(spectrum(1));
        cache.add_spectrum(spectrum(2));
        let replacement = MsSpectrum::new(1, vec![999.0], vec![9.0]);
        cache.add_spectrum(replacement.clone());

        assert_eq!(cache.stats().cache_events, 0);
        assert_eq!(*cache.get_spectrum(1, false).unwrap(), replacement);
        assert_eq!(*cache.get_spectrum(2, false).unwrap(), spectrum(2));
    }

    #[test]
    fn test_disabled_disk_caching_grows_unbounded() {
        let mut cache = SpectrumCache::with_reporter(
            SpectrumCacheOptions {
                disk_caching_enabled: false,
                spectra_to_retain_in_memory: 2,
                cache_directory: None,
            },
            Arc::new(SilentReporter),
        );
        for scan in 0..20 {
            cache.add_spectrum(spectrum(scan));
        }
        assert_eq!(cache.resident_count(), 20);
        assert_eq!(cache.stats().cache_events, 0);
        for scan in 0..20 {
            assert!(cache.get_spectrum(scan, false).is_ok());
        }
    }

    #[test]
    fn test_fifo_eviction_order() {
        let mut cache = small_cache(2);
        cache.add_spectrum(spectrum(10));
        cache.add_spectrum(spectrum(11));
        cache.add_spectrum(spectrum(12));
        // 10 was the oldest insertion, so it is the one on disk.
        assert!(matches!(
            cache.get_spectrum(10, false),
            Err(CacheError::UncachingDisallowed(10))
        ));
        assert!(cache.get_spectrum(11, false).is_ok());
        assert!(cache.get_spectrum(12, false).is_ok());
    }

    #[test]
    fn test_page_out_failure_only_loses_the_evicted_scan() {
        let reporter = Arc::new(ErrorCounter::default());
        let mut cache = SpectrumCache::with_reporter(
            SpectrumCacheOptions {
                disk_caching_enabled: true,
                spectra_to_retain_in_memory: 1,
                cache_directory: Some(PathBuf::from("/nonexistent/sicquery-scratch")),
            },
            reporter.clone(),
        );
        cache.add_spectrum(spectrum(1));
        // Evicting scan 1 tries to create the page file in a directory that
        // does not exist.
        cache.add_spectrum(spectrum(2));

        assert_eq!(reporter.errors.load(Ordering::Relaxed), 1);
        assert!(matches!(
            cache.get_spectrum(1, true),
            Err(CacheError::ScanUnavailable(1))
        ));
        // The failure is confined to the evicted scan.
        assert_eq!(*cache.get_spectrum(2, false).unwrap(), spectrum(2));
        assert_eq!(cache.stats().cache_events, 0);
    }

    #[test]
    fn test_clear_resets_index() {
        let mut cache = small_cache(2);
        cache.add_spectrum(spectrum(1));
        cache.clear();
        assert_eq!(cache.resident_count(), 0);
        assert!(cache.get_spectrum(1, true).is_err());
    }
}
