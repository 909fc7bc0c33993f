//! Plugin lifecycle as seen by the host
//!
//! The host calls [`CutoffPlugin::init`] once with its configuration
//! directory, feeds every decoded playback buffer through
//! [`CutoffPlugin::on_playback_voice_data`] on its audio thread, opens
//! settings sessions from its UI thread and finally calls
//! [`CutoffPlugin::shutdown`]. The two threads share only the
//! [`FilterStore`] returned by [`CutoffPlugin::store`].

use std::sync::Arc;

use crate::config::PluginConfig;
use crate::engine::{BufferOutcome, CutoffEngine};
use crate::error::Result;
use crate::host::{ClientHandle, IdentityResolver, ScopeId, display_name_or_unknown};
use crate::settings::SettingsSession;
use crate::store::FilterStore;

pub const PLUGIN_NAME: &str = "Frequency Cutoff Plugin";
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PLUGIN_DESCRIPTION: &str =
    "This plugin cuts off all sounds above a given frequency (configured per user).";

pub struct CutoffPlugin<R> {
    config: PluginConfig,
    engine: CutoffEngine<R>,
}

impl<R: IdentityResolver> CutoffPlugin<R> {
    /// Load persisted settings and get ready for audio
    ///
    /// A settings file that cannot be read is reported and replaced by an
    /// empty in-memory configuration; the plugin keeps working.
    pub fn init(config: PluginConfig, resolver: R) -> Self {
        log::info!("Config path: {}", config.config_dir.display());
        let path = config.config_path();

        let store = FilterStore::open(&path).unwrap_or_else(|e| {
            log::error!(
                "Error loading persisted settings ({}). Most likely it has become corrupted \
                 for some reason. To reset to an empty state, please delete {} from {}.",
                e,
                config.config_filename,
                config.config_dir.display()
            );
            FilterStore::empty(&path)
        });

        Self {
            config,
            engine: CutoffEngine::new(Arc::new(store), resolver),
        }
    }

    /// Host callback for every decoded playback buffer
    pub fn on_playback_voice_data(
        &mut self,
        scope: ScopeId,
        handle: ClientHandle,
        samples: &mut [i16],
        channels: usize,
    ) -> BufferOutcome {
        self.engine
            .process_voice_data(scope, handle, samples, channels)
    }

    /// Open a settings session for a client
    ///
    /// Resolves the identity directly through the host rather than through
    /// the audio thread's cache, which only the audio thread may touch.
    pub fn open_settings(&self, scope: ScopeId, handle: ClientHandle) -> Result<SettingsSession> {
        let resolver = self.engine.resolver();
        let identity = resolver.unique_identifier(scope, handle)?;
        let display_name = display_name_or_unknown(resolver, scope, handle);
        Ok(SettingsSession::open(
            Arc::clone(self.engine.store()),
            &identity,
            &display_name,
        ))
    }

    /// Shared settings store for the control side
    pub fn store(&self) -> Arc<FilterStore> {
        Arc::clone(self.engine.store())
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn engine(&self) -> &CutoffEngine<R> {
        &self.engine
    }

    /// Persist anything still pending
    pub fn shutdown(self) -> Result<bool> {
        log::info!("Shutting down {}", PLUGIN_NAME);
        self.engine.store().persist()
    }
}
