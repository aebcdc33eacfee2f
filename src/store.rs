//! Manifest store
//!
//! Holds the current manifest entries and the fingerprint of the last adopted
//! manifest. The fingerprint is mirrored into persisted storage so it survives
//! restarts; the entries are session-only.
//!
//! The store is shared through `Arc` between the loader (writer) and the view
//! (reader). Views pull `current_entries()` when the render signal changes.

use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::constants::storage::FINGERPRINT_KEY;
use crate::fingerprint::Fingerprint;
use crate::persistence::Storage;
use crate::types::ManifestEntry;

/// Sent to views whenever the visible list must be redrawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSignal {
    /// Nothing rendered yet
    Idle,
    /// Entries changed; pull `current_entries()`
    Entries { generation: u64 },
    /// Load failed; show the empty state
    Empty { generation: u64 },
}

#[derive(Debug, Default)]
struct StoreState {
    entries: Vec<ManifestEntry>,
    fingerprint: Option<Fingerprint>,
    generation: u64,
}

pub struct ManifestStore {
    storage: Box<dyn Storage>,
    state: Mutex<StoreState>,
    render_tx: watch::Sender<RenderSignal>,
}

impl ManifestStore {
    /// Create the store, reading the cached fingerprint from storage
    pub fn new(storage: Box<dyn Storage>) -> Self {
        let fingerprint = storage.get_item(FINGERPRINT_KEY).map(Fingerprint::from_hex);
        match &fingerprint {
            Some(fp) => info!(fingerprint = %fp.short(), "Loaded cached manifest fingerprint"),
            None => info!("No cached manifest fingerprint"),
        }
        let (render_tx, _) = watch::channel(RenderSignal::Idle);
        Self {
            storage,
            state: Mutex::new(StoreState {
                fingerprint,
                ..Default::default()
            }),
            render_tx,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the entries in manifest order
    pub fn current_entries(&self) -> Vec<ManifestEntry> {
        self.lock().entries.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Fingerprint of the last adopted manifest (possibly from a prior session)
    pub fn cached_fingerprint(&self) -> Option<Fingerprint> {
        self.lock().fingerprint.clone()
    }

    /// Receiver that changes whenever a render is due
    pub fn subscribe(&self) -> watch::Receiver<RenderSignal> {
        self.render_tx.subscribe()
    }

    /// Replace fingerprint and entries together, then request a render
    ///
    /// The fingerprint is written first and both writes happen under the same
    /// lock, so no reader sees new entries paired with an old fingerprint.
    /// A failed disk write is logged; the in-memory state is still replaced.
    /// The storage write is synchronous and runs on the caller's runtime thread.
    pub fn adopt(&self, fingerprint: Fingerprint, entries: Vec<ManifestEntry>) {
        let mut state = self.lock();

        if let Err(e) = self.storage.set_item(FINGERPRINT_KEY, fingerprint.as_str()) {
            error!(error = %e, "Failed to persist manifest fingerprint");
        }
        state.fingerprint = Some(fingerprint);
        state.entries = entries;
        state.generation += 1;

        debug!(count = state.entries.len(), generation = state.generation, "Adopted manifest");
        self.render_tx.send_replace(RenderSignal::Entries {
            generation: state.generation,
        });
    }

    /// Fill entries without touching the fingerprint
    /// Used when the fingerprint already matches but memory is empty (cold start)
    pub fn restore(&self, entries: Vec<ManifestEntry>) {
        let mut state = self.lock();
        state.entries = entries;
        state.generation += 1;

        debug!(count = state.entries.len(), generation = state.generation, "Restored manifest entries");
        self.render_tx.send_replace(RenderSignal::Entries {
            generation: state.generation,
        });
    }

    /// Drop all entries and signal the empty state; the fingerprint is kept
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.generation += 1;

        self.render_tx.send_replace(RenderSignal::Empty {
            generation: state.generation,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;
    use crate::persistence::MemoryStorage;
    use std::sync::Arc;

    fn entries(titles: &[&str]) -> Vec<ManifestEntry> {
        titles
            .iter()
            .map(|t| ManifestEntry {
                title: Some(t.to_string()),
                ..Default::default()
            })
            .collect()
    }

    /// Storage that shares its map with the test so writes can be inspected
    struct SharedStorage(Arc<MemoryStorage>);

    impl Storage for SharedStorage {
        fn get_item(&self, key: &str) -> Option<String> {
            self.0.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), crate::persistence::StorageError> {
            self.0.set_item(key, value)
        }
    }

    #[test]
    fn test_new_reads_cached_fingerprint() {
        let store = ManifestStore::new(Box::new(MemoryStorage::with_item(FINGERPRINT_KEY, "abc")));
        assert_eq!(store.cached_fingerprint(), Some(Fingerprint::from_hex("abc")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_adopt_persists_fingerprint_and_replaces_entries() {
        let backing = Arc::new(MemoryStorage::new());
        let store = ManifestStore::new(Box::new(SharedStorage(backing.clone())));
        let fp = fingerprint("x");

        store.adopt(fp.clone(), entries(&["A", "B"]));

        assert_eq!(store.current_entries().len(), 2);
        assert_eq!(store.cached_fingerprint(), Some(fp.clone()));
        assert_eq!(backing.get_item(FINGERPRINT_KEY).as_deref(), Some(fp.as_str()));

        store.adopt(fingerprint("y"), entries(&["C"]));
        assert_eq!(store.current_entries(), entries(&["C"]));
    }

    #[test]
    fn test_restore_keeps_fingerprint() {
        let store = ManifestStore::new(Box::new(MemoryStorage::with_item(FINGERPRINT_KEY, "abc")));
        store.restore(entries(&["A"]));
        assert_eq!(store.current_entries(), entries(&["A"]));
        assert_eq!(store.cached_fingerprint(), Some(Fingerprint::from_hex("abc")));
    }

    #[test]
    fn test_clear_keeps_fingerprint() {
        let store = ManifestStore::new(Box::new(MemoryStorage::new()));
        store.adopt(fingerprint("x"), entries(&["A"]));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.cached_fingerprint(), Some(fingerprint("x")));
    }

    #[test]
    fn test_render_signals() {
        let store = ManifestStore::new(Box::new(MemoryStorage::new()));
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow(), RenderSignal::Idle);

        store.adopt(fingerprint("x"), entries(&["A"]));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), RenderSignal::Entries { generation: 1 });

        store.clear();
        assert_eq!(*rx.borrow_and_update(), RenderSignal::Empty { generation: 2 });
        assert!(!rx.has_changed().unwrap());
    }
}
