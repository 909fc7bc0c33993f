pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod host;
pub mod plugin;
pub mod scope;
pub mod settings;
pub mod signal_processing;
pub mod store;
pub mod wav;

pub use config::PluginConfig;
pub use engine::{BufferOutcome, CutoffEngine};
pub use error::{CutoffError, Result};
pub use host::{ClientHandle, IdentityResolver, ScopeId, StaticResolver};
pub use plugin::CutoffPlugin;
pub use settings::SettingsSession;
pub use store::{FilterMap, FilterSetting, FilterStore};
