//! Per-speaker filter settings shared between the control and audio threads
//!
//! The live settings map is an immutable snapshot behind an [`ArcSwap`].
//! Readers take a reference-counted snapshot with a single atomic load and
//! never block; writers build a complete replacement map and publish it with
//! a single atomic store. A reader holding an old snapshot keeps it alive
//! until it drops the `Arc`, so no reader ever sees a torn or freed map.

pub mod format;

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::constants::MAX_CUTOFF_HZ;
use crate::error::{CutoffError, Result};

/// Cutoff setting for one speaker. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterSetting {
    enabled: bool,
    cutoff_hz: u32,
}

impl FilterSetting {
    /// Cutoffs above `MAX_CUTOFF_HZ` are clamped.
    pub fn new(enabled: bool, cutoff_hz: u32) -> Self {
        Self {
            enabled,
            cutoff_hz: cutoff_hz.min(MAX_CUTOFF_HZ),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn cutoff_hz(&self) -> u32 {
        self.cutoff_hz
    }
}

/// Speaker identity to setting
pub type FilterMap = BTreeMap<String, FilterSetting>;

/// Authoritative per-speaker settings with lock-free snapshot reads
pub struct FilterStore {
    path: PathBuf,
    live: ArcSwap<FilterMap>,
    persisted: ArcSwap<FilterMap>,
}

impl FilterStore {
    /// Load settings from `path` and publish them as the first live snapshot
    ///
    /// A missing file is an empty configuration. Any other read failure is
    /// returned so the caller can decide how to degrade.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(text) => format::parse(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config file at {}, starting empty", path.display());
                FilterMap::new()
            }
            Err(e) => return Err(CutoffError::io(path, e)),
        };

        log::info!(
            "Loaded {} speaker setting(s) from {}",
            settings.len(),
            path.display()
        );
        Ok(Self::with_settings(path, settings))
    }

    /// Store whose persisted state is `settings`, without touching the disk
    pub fn with_settings(path: impl Into<PathBuf>, settings: FilterMap) -> Self {
        let snapshot = Arc::new(settings);
        Self {
            path: path.into(),
            live: ArcSwap::new(Arc::clone(&snapshot)),
            persisted: ArcSwap::new(snapshot),
        }
    }

    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::with_settings(path, FilterMap::new())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current live snapshot. Lock-free and allocation-free.
    pub fn load(&self) -> Arc<FilterMap> {
        self.live.load_full()
    }

    /// Setting for a single speaker in the current snapshot
    pub fn get(&self, identity: &str) -> Option<FilterSetting> {
        self.live.load().get(identity).copied()
    }

    /// Publish `settings` as the new live snapshot
    pub fn store(&self, settings: FilterMap) {
        self.live.store(Arc::new(settings));
    }

    /// Republish a previously loaded snapshot
    pub fn store_snapshot(&self, snapshot: Arc<FilterMap>) {
        self.live.store(snapshot);
    }

    /// Copy the live snapshot, apply `change` to the copy and publish it
    pub fn update<F>(&self, mut change: F)
    where
        F: FnMut(&mut FilterMap),
    {
        self.live.rcu(|current| {
            let mut next = FilterMap::clone(current);
            change(&mut next);
            next
        });
    }

    pub fn set(&self, identity: &str, setting: FilterSetting) {
        self.update(|settings| {
            settings.insert(identity.to_string(), setting);
        });
    }

    pub fn remove(&self, identity: &str) {
        self.update(|settings| {
            settings.remove(identity);
        });
    }

    /// True when the live snapshot differs from what was last persisted
    pub fn is_dirty(&self) -> bool {
        let live = self.live.load();
        let persisted = self.persisted.load();
        !Arc::ptr_eq(&live, &persisted) && **live != **persisted
    }

    /// Write the live snapshot to disk if it changed since the last write
    ///
    /// Returns `Ok(true)` when the file was written. A failed write is logged
    /// and returned; the live snapshot is left as it was.
    pub fn persist(&self) -> Result<bool> {
        let live = self.live.load_full();
        {
            let persisted = self.persisted.load();
            if Arc::ptr_eq(&live, &persisted) || *live == **persisted {
                return Ok(false);
            }
        }

        if let Err(e) = std::fs::write(&self.path, format::serialize(&live)) {
            log::error!(
                "Error while trying to save config file. Settings will not be persisted. {}",
                e
            );
            return Err(CutoffError::io(&self.path, e));
        }

        log::debug!(
            "Persisted {} speaker setting(s) to {}",
            live.len(),
            self.path.display()
        );
        self.persisted.store(live);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("freq_cutoff_store_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_setting_clamps_cutoff() {
        assert_eq!(FilterSetting::new(true, 50_000).cutoff_hz(), MAX_CUTOFF_HZ);
    }

    #[test]
    fn test_store_then_load() {
        let store = FilterStore::empty(temp_path("unused"));
        let mut settings = FilterMap::new();
        settings.insert("alice".into(), FilterSetting::new(true, 4000));
        store.store(settings.clone());
        assert_eq!(*store.load(), settings);
    }

    #[test]
    fn test_old_snapshot_survives_store() {
        let store = FilterStore::empty(temp_path("unused"));
        store.set("alice", FilterSetting::new(true, 4000));
        let before = store.load();

        store.set("alice", FilterSetting::new(false, 1000));

        assert_eq!(before["alice"], FilterSetting::new(true, 4000));
        assert_eq!(store.get("alice"), Some(FilterSetting::new(false, 1000)));
    }

    #[test]
    fn test_update_and_remove() {
        let store = FilterStore::empty(temp_path("unused"));
        store.set("alice", FilterSetting::new(true, 4000));
        store.set("bob", FilterSetting::new(true, 2000));
        store.remove("alice");
        let snapshot = store.load();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("bob"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = FilterStore::open(temp_path("does_not_exist")).unwrap();
        assert!(store.load().is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_unreadable_file_is_error() {
        // A directory cannot be read as a file.
        let dir = temp_path("a_directory");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(matches!(FilterStore::open(&dir), Err(CutoffError::Io { .. })));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_persist_only_when_dirty() {
        let path = temp_path("persist_once.conf");
        let store = FilterStore::empty(&path);
        store.set("alice", FilterSetting::new(true, 4000));
        assert!(store.is_dirty());

        assert!(store.persist().unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "alice 4000 1\n");

        // A second persist must not touch the disk.
        std::fs::remove_file(&path).unwrap();
        assert!(!store.persist().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_restoring_equal_map_is_not_dirty() {
        let path = temp_path("restore_equal.conf");
        let store = FilterStore::empty(&path);
        store.set("alice", FilterSetting::new(true, 4000));
        store.remove("alice");
        assert!(!store.is_dirty());
        assert!(!store.persist().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_persist_keeps_live_snapshot() {
        let path = temp_path("no_such_dir").join("settings.conf");
        let store = FilterStore::empty(&path);
        store.set("alice", FilterSetting::new(true, 4000));

        assert!(store.persist().is_err());
        assert_eq!(store.get("alice"), Some(FilterSetting::new(true, 4000)));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let store = FilterStore::empty(temp_path("unused"));
        let speakers = ["a", "b", "c", "d", "e", "f"];

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..2000 {
                        let snapshot = store.load();
                        let mut cutoffs = snapshot.values().map(FilterSetting::cutoff_hz);
                        if let Some(first) = cutoffs.next() {
                            assert!(cutoffs.all(|c| c == first), "torn snapshot");
                        }
                    }
                });
            }

            for generation in 0..500u32 {
                let settings = speakers
                    .iter()
                    .map(|id| (id.to_string(), FilterSetting::new(true, generation * 10)))
                    .collect();
                store.store(settings);
            }
        });
    }
}
