//! Store configuration.

/// Tunables for scan and pagination behavior.
///
/// Retry behavior for optimistic writes is deliberately not configurable; see
/// [`crate::record::WRITE_RETRY_ATTEMPTS`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Hard cap on the number of keys a full scan (`list`, `count`, `clear`)
    /// will pull into memory before stopping early with a warning.
    pub max_scan_keys: usize,

    /// Page size used when a listing is requested without an explicit limit.
    pub default_page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_scan_keys: 100_000,
            default_page_size: 50,
        }
    }
}
