use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::constants::{manifest, timing};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute URL, or a path relative to `base_url`
    #[serde(default = "default_manifest_url")]
    pub manifest_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Background poll interval (0 = disabled)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// No timeout unless set; the HTTP client default applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Fingerprint storage file; `memory` keeps it in-process only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
}

fn default_manifest_url() -> String {
    manifest::DEFAULT_URL.to_string()
}

fn default_poll_interval_secs() -> u64 {
    timing::DEFAULT_POLL_SECS
}

fn default_search_debounce_ms() -> u64 {
    timing::DEFAULT_DEBOUNCE_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            manifest_url: default_manifest_url(),
            base_url: None,
            poll_interval_secs: default_poll_interval_secs(),
            search_debounce_ms: default_search_debounce_ms(),
            request_timeout_secs: None,
            storage_path: None,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load from `path` (or the default location), then apply env overrides
    ///
    /// A missing file yields defaults. A file that does not parse is an error:
    /// the user has to fix it, it is never overwritten.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |var| env::var(var).ok())
    }

    fn load_with(path: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => {
                let config = serde_json::from_str::<Self>(&contents).map_err(|e| {
                    error!(path = %path.display(), error = %e, "Failed to parse config file");
                    error!(path = %path.display(), "Please fix the syntax errors in your config file.");
                    e
                });
                let config = config.context(format!("Invalid config file {}", path.display()))?;
                info!(path = %path.display(), "Loaded config");
                config
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(e).context(format!("Failed to read config file {}", path.display()));
            }
        };

        config.apply_overrides(lookup);
        config.validate_and_clamp();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        fs::write(path, contents)
            .context(format!("Failed to write config file to {}", path.display()))?;
        Ok(())
    }

    fn parse_num(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<u64> {
        let raw = lookup(var)?;
        raw.trim()
            .parse::<u64>()
            .inspect_err(|e| error!(var = %var, value = %raw, error = ?e, "failed to parse env var"))
            .ok()
    }

    /// Apply `GALLERY_*` overrides through `lookup` (normally `std::env::var`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("GALLERY_MANIFEST_URL") {
            self.manifest_url = url;
        }
        if let Some(base) = lookup("GALLERY_BASE_URL") {
            self.base_url = Some(base);
        }
        if let Some(secs) = Self::parse_num(&lookup, "GALLERY_POLL_SECS") {
            self.poll_interval_secs = secs;
        }
        if let Some(ms) = Self::parse_num(&lookup, "GALLERY_DEBOUNCE_MS") {
            self.search_debounce_ms = ms;
        }
        if let Some(secs) = Self::parse_num(&lookup, "GALLERY_TIMEOUT_SECS") {
            self.request_timeout_secs = Some(secs);
        }
        if let Some(path) = lookup("GALLERY_STORAGE") {
            self.storage_path = Some(PathBuf::from(path));
        }
    }

    /// Clamp values to sane ranges
    pub fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        if self.manifest_url.trim().is_empty() {
            warn!(using = manifest::DEFAULT_URL, "manifest_url is empty, using default");
            self.manifest_url = default_manifest_url();
        }

        if self.poll_interval_secs != 0 {
            if self.poll_interval_secs < MIN_POLL_SECS {
                warn!(poll_interval_secs = self.poll_interval_secs, min = MIN_POLL_SECS, "poll_interval_secs below minimum, clamping");
                self.poll_interval_secs = MIN_POLL_SECS;
            } else if self.poll_interval_secs > MAX_POLL_SECS {
                warn!(poll_interval_secs = self.poll_interval_secs, max = MAX_POLL_SECS, "poll_interval_secs exceeds maximum, clamping");
                self.poll_interval_secs = MAX_POLL_SECS;
            }
        }

        if self.search_debounce_ms > MAX_DEBOUNCE_MS {
            warn!(search_debounce_ms = self.search_debounce_ms, max = MAX_DEBOUNCE_MS, "search_debounce_ms exceeds maximum, clamping");
            self.search_debounce_ms = MAX_DEBOUNCE_MS;
        }

        if self.request_timeout_secs == Some(0) {
            warn!("request_timeout_secs of 0 would fail every request, ignoring");
            self.request_timeout_secs = None;
        }
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
