//! Session constants.

/// Maximum number of large-file results kept per scan.
pub const MAX_RESULTS: usize = 1000;

/// Default threshold for the large-file scan (100 MiB).
pub const DEFAULT_LARGE_FILE_MIN_SIZE: u64 = 100 * 1024 * 1024;

/// Directory under the platform config dir holding the settings file.
pub const CONFIG_DIR_NAME: &str = "coolclean";

/// Settings file name.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";
