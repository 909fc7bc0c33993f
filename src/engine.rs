use std::collections::HashMap;
use std::sync::Arc;

use crate::host::{ClientHandle, IdentityResolver, ScopeId};
use crate::scope::ScopeRegistry;
use crate::store::FilterStore;

/// What the engine did with one voice buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferOutcome {
    /// Speaker could not be resolved yet
    Unresolved,
    /// Speaker has no setting; any old filter was dropped
    Unconfigured,
    /// Speaker has a disabled setting; filter memory kept
    Disabled,
    /// Buffer was low-pass filtered in place
    Filtered,
}

/// Real-time side of the plugin
///
/// Owned by whichever thread delivers playback audio. The only state shared
/// with the control side is the [`FilterStore`]; everything else is touched
/// by this thread alone and needs no synchronization. Scopes are created on
/// first use and never removed (see [`crate::scope`]).
pub struct CutoffEngine<R> {
    store: Arc<FilterStore>,
    resolver: R,
    scopes: HashMap<ScopeId, ScopeRegistry>,
}

impl<R: IdentityResolver> CutoffEngine<R> {
    pub fn new(store: Arc<FilterStore>, resolver: R) -> Self {
        Self {
            store,
            resolver,
            scopes: HashMap::new(),
        }
    }

    /// Filter one buffer of interleaved 16-bit samples in place
    ///
    /// Never fails: anything that goes wrong leaves the buffer untouched.
    /// Once a speaker and its channels have been seen, this path takes one
    /// atomic snapshot load and performs no allocation or locking.
    pub fn process_voice_data(
        &mut self,
        scope: ScopeId,
        handle: ClientHandle,
        samples: &mut [i16],
        channels: usize,
    ) -> BufferOutcome {
        let registry = self.scopes.entry(scope).or_default();

        let snapshot = self.store.load();
        let setting = match registry.resolve(&self.resolver, scope, handle) {
            Some(identity) => snapshot.get(identity).copied(),
            None => return BufferOutcome::Unresolved,
        };

        match setting {
            None => {
                if registry.drop_filter(handle) {
                    log::info!("Removed filter for client id {}", handle);
                }
                BufferOutcome::Unconfigured
            }
            Some(setting) if !setting.enabled() => BufferOutcome::Disabled,
            Some(setting) => {
                registry
                    .speaker_filter(handle, setting.cutoff_hz())
                    .process_interleaved(samples, channels);
                BufferOutcome::Filtered
            }
        }
    }

    pub fn scope(&self, scope: ScopeId) -> Option<&ScopeRegistry> {
        self.scopes.get(&scope)
    }

    /// Scope registry, created on first use
    pub fn scope_mut(&mut self, scope: ScopeId) -> &mut ScopeRegistry {
        self.scopes.entry(scope).or_default()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn store(&self) -> &Arc<FilterStore> {
        &self.store
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}
