use std::fmt::Display;

#[derive(Debug)]
pub enum SicError {
    Cache(CacheError),
    DataProcessing(DataProcessingError),
    Other(String),
}

impl Display for SicError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache(e) => write!(f, "spectrum cache error: {}", e),
            Self::DataProcessing(e) => write!(f, "data processing error: {}", e),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SicError {}

impl SicError {
    pub fn custom(msg: impl Display) -> Self {
        Self::Other(msg.to_string())
    }
}

/// Errors from in-memory processing of spectra and traces.
#[derive(Debug)]
pub enum DataProcessingError {
    ExpectedNonEmptyData,
    ExpectedVectorLength { real: usize, expected: usize },
    ExpectedVectorSameLength { left: usize, right: usize },
    IndexOutOfBounds(usize),
    InvalidConfiguration(String),
}

impl Display for DataProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpectedNonEmptyData => write!(f, "expected non-empty data"),
            Self::ExpectedVectorLength { real, expected } => {
                write!(f, "expected vector of length {}, got {}", expected, real)
            }
            Self::ExpectedVectorSameLength { left, right } => {
                write!(
                    f,
                    "expected parallel vectors of the same length, got {} and {}",
                    left, right
                )
            }
            Self::IndexOutOfBounds(i) => write!(f, "index {} out of bounds", i),
            Self::InvalidConfiguration(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for DataProcessingError {}

/// Errors from the spectrum pool and its disk page file.
#[derive(Debug)]
pub enum CacheError {
    /// The scan was never handed to the cache.
    ScanNotCached(u32),
    /// The scan is only on disk and the caller disallowed uncaching.
    UncachingDisallowed(u32),
    /// A previous page-file failure made this scan permanently unavailable.
    ScanUnavailable(u32),
    /// The page record at the stored offset does not belong to the scan.
    PageRecordMismatch { expected: u32, found: u32 },
    Io(std::io::Error),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScanNotCached(scan) => write!(f, "scan {} was never cached", scan),
            Self::UncachingDisallowed(scan) => {
                write!(f, "scan {} is paged out and uncaching is disallowed", scan)
            }
            Self::ScanUnavailable(scan) => {
                write!(f, "scan {} is unavailable after a page file error", scan)
            }
            Self::PageRecordMismatch { expected, found } => {
                write!(
                    f,
                    "page record mismatch: expected scan {}, found {}",
                    expected, found
                )
            }
            Self::Io(e) => write!(f, "page file I/O error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        CacheError::Io(e)
    }
}

impl From<DataProcessingError> for SicError {
    fn from(e: DataProcessingError) -> Self {
        SicError::DataProcessing(e)
    }
}

impl From<CacheError> for SicError {
    fn from(e: CacheError) -> Self {
        SicError::Cache(e)
    }
}
