//! Boundary to the host voice client
//!
//! The host owns the mapping from transient client handles to stable unique
//! identities. The engine only consumes it through [`IdentityResolver`].

use std::collections::HashMap;

use crate::error::{CutoffError, Result};

/// Connection to a server; handles are only meaningful within one scope.
pub type ScopeId = u64;

/// Transient per-connection client number assigned by the server.
pub type ClientHandle = u16;

/// Fallback shown when the host cannot provide a display name.
pub const UNKNOWN_DISPLAY_NAME: &str = "UNKNOWN";

pub trait IdentityResolver {
    /// Stable unique identity of `handle` on `scope`
    fn unique_identifier(&self, scope: ScopeId, handle: ClientHandle) -> Result<String>;

    /// Human-readable nickname of `handle` on `scope`
    fn display_name(&self, scope: ScopeId, handle: ClientHandle) -> Result<String>;
}

impl<R: IdentityResolver + ?Sized> IdentityResolver for &R {
    fn unique_identifier(&self, scope: ScopeId, handle: ClientHandle) -> Result<String> {
        (**self).unique_identifier(scope, handle)
    }

    fn display_name(&self, scope: ScopeId, handle: ClientHandle) -> Result<String> {
        (**self).display_name(scope, handle)
    }
}

/// Resolver backed by a fixed table, for offline rendering and tests
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    clients: HashMap<(ScopeId, ClientHandle), (String, String)>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(
        mut self,
        scope: ScopeId,
        handle: ClientHandle,
        identity: &str,
        display_name: &str,
    ) -> Self {
        self.insert(scope, handle, identity, display_name);
        self
    }

    pub fn insert(
        &mut self,
        scope: ScopeId,
        handle: ClientHandle,
        identity: &str,
        display_name: &str,
    ) {
        self.clients.insert(
            (scope, handle),
            (identity.to_string(), display_name.to_string()),
        );
    }

    fn lookup(&self, scope: ScopeId, handle: ClientHandle) -> Result<&(String, String)> {
        self.clients
            .get(&(scope, handle))
            .ok_or_else(|| CutoffError::IdentityResolution {
                scope,
                handle,
                reason: "client not connected".to_string(),
            })
    }
}

impl IdentityResolver for StaticResolver {
    fn unique_identifier(&self, scope: ScopeId, handle: ClientHandle) -> Result<String> {
        self.lookup(scope, handle).map(|(identity, _)| identity.clone())
    }

    fn display_name(&self, scope: ScopeId, handle: ClientHandle) -> Result<String> {
        self.lookup(scope, handle).map(|(_, name)| name.clone())
    }
}

/// Display name for the settings title, falling back to [`UNKNOWN_DISPLAY_NAME`]
pub fn display_name_or_unknown<R: IdentityResolver + ?Sized>(
    resolver: &R,
    scope: ScopeId,
    handle: ClientHandle,
) -> String {
    resolver.display_name(scope, handle).unwrap_or_else(|e| {
        log::error!("Error resolving client display name for client id {}: {}", handle, e);
        UNKNOWN_DISPLAY_NAME.to_string()
    })
}
