//! Per-server tracking of speakers
//!
//! Both maps in a [`ScopeRegistry`] are append-only for the life of the
//! scope. Leave/disconnect/kick events from the host are not ordered with
//! respect to in-flight audio for the same handle, so audio may still arrive
//! after a "client left" notification. Pruning on those events could drop or
//! misroute audio, so nothing is ever removed except a filter whose speaker
//! lost its setting. Memory grows with the number of distinct speakers heard:
//! one identity string and one small fixed-size filter per speaker and
//! channel. If a hard bound is ever needed, cap the maps by size (LRU) rather
//! than tracking lifecycle events.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::host::{ClientHandle, IdentityResolver, ScopeId};
use crate::signal_processing::SpeakerFilter;

/// Identity cache and speaker filters for one server connection
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    identities: HashMap<ClientHandle, String>,
    failed: HashSet<ClientHandle>,
    filters: HashMap<ClientHandle, SpeakerFilter>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable identity for `handle`, asking the host on first sight
    ///
    /// Successful lookups are cached forever. Failures are not cached, so
    /// the lookup is retried on the next call; only the first failure per
    /// handle is logged as a warning.
    pub fn resolve<R>(&mut self, resolver: &R, scope: ScopeId, handle: ClientHandle) -> Option<&str>
    where
        R: IdentityResolver + ?Sized,
    {
        if !self.identities.contains_key(&handle) {
            match resolver.unique_identifier(scope, handle) {
                Ok(identity) if !identity.is_empty() => {
                    log::info!("Resolving uid for client id {} -- found {}", handle, identity);
                    self.failed.remove(&handle);
                    self.identities.insert(handle, identity);
                }
                Ok(_) => {
                    self.note_failure(handle, "empty identity");
                    return None;
                }
                Err(e) => {
                    self.note_failure(handle, &e.to_string());
                    return None;
                }
            }
        }
        self.identities.get(&handle).map(String::as_str)
    }

    fn note_failure(&mut self, handle: ClientHandle, reason: &str) {
        if self.failed.insert(handle) {
            log::warn!(
                "Error resolving client identity for client id {}: {}",
                handle,
                reason
            );
        } else {
            log::debug!("Client id {} still unresolved: {}", handle, reason);
        }
    }

    /// Cached identity, without consulting the host
    pub fn identity(&self, handle: ClientHandle) -> Option<&str> {
        self.identities.get(&handle).map(String::as_str)
    }

    /// Filter for `handle`, created or rebuilt so that it matches `cutoff_hz`
    ///
    /// In the common case this is a map lookup and an integer comparison.
    /// A cutoff change redesigns the filter and discards all channel history.
    pub fn speaker_filter(&mut self, handle: ClientHandle, cutoff_hz: u32) -> &mut SpeakerFilter {
        match self.filters.entry(handle) {
            Entry::Occupied(entry) => {
                let filter = entry.into_mut();
                if filter.cutoff_hz() != cutoff_hz {
                    log::info!(
                        "Updating filter cutoff for client id {} ({} Hz -> {} Hz)",
                        handle,
                        filter.cutoff_hz(),
                        cutoff_hz
                    );
                    filter.retune(cutoff_hz);
                }
                filter
            }
            Entry::Vacant(entry) => {
                log::info!("Creating filter for client id {} at {} Hz", handle, cutoff_hz);
                entry.insert(SpeakerFilter::new(cutoff_hz))
            }
        }
    }

    pub fn filter(&self, handle: ClientHandle) -> Option<&SpeakerFilter> {
        self.filters.get(&handle)
    }

    /// Forget the filter of a speaker that no longer has a setting
    pub fn drop_filter(&mut self, handle: ClientHandle) -> bool {
        self.filters.remove(&handle).is_some()
    }

    pub fn resolved_count(&self) -> usize {
        self.identities.len()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }
}
