//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Manifest retrieval constants
pub mod manifest {
    /// Default manifest location when nothing is configured
    pub const DEFAULT_URL: &str = "http://localhost:8000/videos.json";
}

/// Persisted storage constants
pub mod storage {
    /// Key holding the fingerprint of the last adopted manifest.
    /// Stable across versions, do not rename.
    pub const FINGERPRINT_KEY: &str = "videos_manifest_hash";

    /// Storage file name inside the data directory
    pub const FILENAME: &str = "storage.json";
}

/// Config file location
pub mod config {
    /// Directory name under the platform config/data dirs
    pub const APP_DIR: &str = "video-gallery";

    /// Config file name
    pub const FILENAME: &str = "config.json";
}

/// Timing constants
pub mod timing {
    /// Background poll interval in seconds
    pub const DEFAULT_POLL_SECS: u64 = 60;

    /// Search input debounce in milliseconds
    pub const DEFAULT_DEBOUNCE_MS: u64 = 180;
}

/// Config validation ranges
pub mod validation {
    /// Polling faster than this just hammers the origin
    pub const MIN_POLL_SECS: u64 = 5;

    pub const MAX_POLL_SECS: u64 = 24 * 60 * 60;

    pub const MAX_DEBOUNCE_MS: u64 = 5_000;
}

/// View constants
pub mod view {
    /// Thumbnail used when an entry has neither thumb nor poster
    pub const PLACEHOLDER_THUMB: &str = "data:image/svg+xml;utf8,<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"640\" height=\"360\"><rect width=\"100%\" height=\"100%\" fill=\"%23081223\"/><text x=\"50%\" y=\"50%\" fill=\"%239aa4b2\" font-size=\"24\" text-anchor=\"middle\" dominant-baseline=\"central\">No+thumb</text></svg>";

    /// Alt text for thumbnails of untitled entries
    pub const DEFAULT_THUMB_ALT: &str = "video thumb";

    /// Shown when there is nothing to display
    pub const EMPTY_MESSAGE: &str = "No videos found.";
}

/// Player constants
pub mod player {
    /// Permissions granted to embedded players
    pub const EMBED_ALLOW: &str =
        "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";
}
