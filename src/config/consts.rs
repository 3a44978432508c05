/// Cache category used when the config does not name one
pub const DEFAULT_CATEGORY: &str = "SmallFeatureSet";
/// Extension of the locked, in-progress file for a work item
pub const PENDING_EXTENSION: &str = "tmp";
/// Extension of the published result file for a work item
pub const RESULT_EXTENSION: &str = "json";
/// Extractor used when the config does not name one
pub const DEFAULT_EXTRACTOR: &str = "mean_intensity";
/// Poll interval for the timeout lock mode when none is configured (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
