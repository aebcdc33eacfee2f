//! Manifest loader
//!
//! Fetches the manifest, fingerprints the raw text and decides whether the
//! store should adopt it. Failures never escape `load()`; they clear the
//! visible list and leave the cached fingerprint alone.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::source::ManifestSource;
use crate::store::ManifestStore;
use crate::types::{parse_manifest, ManifestEntry};

/// What a single `load()` did
#[derive(Debug)]
pub enum LoadOutcome {
    /// New manifest adopted: fingerprint stored, entries replaced
    Adopted { fingerprint: Fingerprint, count: usize },
    /// Fingerprint unchanged but memory was empty, entries filled
    Restored { count: usize },
    /// Fingerprint unchanged and entries already present
    Unchanged,
    /// Source unavailable or unparseable; entries cleared
    Failed(LoadError),
}

impl LoadOutcome {
    /// Whether the view was asked to redraw
    pub fn rendered(&self) -> bool {
        !matches!(self, LoadOutcome::Unchanged)
    }
}

struct Fetched {
    fingerprint: Fingerprint,
    entries: Vec<ManifestEntry>,
}

pub struct Loader<S> {
    source: S,
    store: Arc<ManifestStore>,
    // Serializes overlapping loads (poll tick during a manual refresh)
    in_flight: Mutex<()>,
}

impl<S: ManifestSource> Loader<S> {
    pub fn new(source: S, store: Arc<ManifestStore>) -> Self {
        Self {
            source,
            store,
            in_flight: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<ManifestStore> {
        &self.store
    }

    async fn fetch_manifest(&self) -> Result<Fetched, LoadError> {
        let text = self.source.fetch().await?;
        let entries = parse_manifest(&text)?;
        Ok(Fetched {
            fingerprint: fingerprint(&text),
            entries,
        })
    }

    /// Load the manifest; `force` skips the unchanged-fingerprint shortcut
    pub async fn load(&self, force: bool) -> LoadOutcome {
        let _guard = self.in_flight.lock().await;

        let fetched = match self.fetch_manifest().await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(location = %self.source.location(), error = %e, "Could not load manifest");
                self.store.clear();
                return LoadOutcome::Failed(e);
            }
        };

        let cached = self.store.cached_fingerprint();
        if !force && cached.as_ref() == Some(&fetched.fingerprint) {
            if self.store.is_empty() {
                let count = fetched.entries.len();
                info!(count, fingerprint = %fetched.fingerprint.short(), "Manifest unchanged, restoring entries");
                self.store.restore(fetched.entries);
                return LoadOutcome::Restored { count };
            }
            debug!(fingerprint = %fetched.fingerprint.short(), "Manifest unchanged");
            return LoadOutcome::Unchanged;
        }

        let count = fetched.entries.len();
        info!(
            count,
            force,
            old = cached.as_ref().map(Fingerprint::short).unwrap_or("none"),
            new = %fetched.fingerprint.short(),
            "Adopting manifest"
        );
        self.store.adopt(fetched.fingerprint.clone(), fetched.entries);
        LoadOutcome::Adopted {
            fingerprint: fetched.fingerprint,
            count,
        }
    }
}
