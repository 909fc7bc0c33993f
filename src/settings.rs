//! Per-speaker settings session
//!
//! Models the cutoff dialog as plain operations over the [`FilterStore`]:
//! the session remembers the snapshot it was opened on so that cancelling
//! can roll back any live previews, and every closing action persists.

use std::sync::Arc;

use crate::constants::{
    CUTOFF_PAGE_HZ, CUTOFF_STEP_HZ, DEFAULT_CUTOFF_HZ, MAX_CUTOFF_HZ, MIN_CUTOFF_HZ,
};
use crate::error::Result;
use crate::store::{FilterMap, FilterSetting, FilterStore};

const SLIDER_MIN: u32 = MIN_CUTOFF_HZ / CUTOFF_STEP_HZ;
const SLIDER_MAX: u32 = MAX_CUTOFF_HZ / CUTOFF_STEP_HZ;
const PAGE_STEPS: u32 = CUTOFF_PAGE_HZ / CUTOFF_STEP_HZ;

pub struct SettingsSession {
    store: Arc<FilterStore>,
    identity: String,
    display_name: String,
    original: Arc<FilterMap>,
    enabled: bool,
    slider: u32,
}

impl SettingsSession {
    /// Start editing `identity`. A speaker without a setting starts disabled
    /// at the default cutoff.
    pub fn open(store: Arc<FilterStore>, identity: &str, display_name: &str) -> Self {
        let original = store.load();
        let (enabled, cutoff_hz) = match original.get(identity) {
            Some(setting) => (setting.enabled(), setting.cutoff_hz()),
            None => (false, DEFAULT_CUTOFF_HZ),
        };

        Self {
            store,
            identity: identity.to_string(),
            display_name: display_name.to_string(),
            original,
            enabled,
            slider: (cutoff_hz / CUTOFF_STEP_HZ).clamp(SLIDER_MIN, SLIDER_MAX),
        }
    }

    pub fn title(&self) -> String {
        format!("Frequency cutoff for {}", self.display_name)
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn slider_position(&self) -> u32 {
        self.slider
    }

    pub fn cutoff_hz(&self) -> u32 {
        self.slider * CUTOFF_STEP_HZ
    }

    pub fn label(&self) -> String {
        format!("{} Hz", self.cutoff_hz())
    }

    /// Move the slider; the new value is not applied until it is released.
    pub fn set_slider(&mut self, position: u32) {
        self.slider = position.clamp(SLIDER_MIN, SLIDER_MAX);
    }

    /// Move the slider to the step nearest `cutoff_hz`
    pub fn set_cutoff_hz(&mut self, cutoff_hz: u32) {
        self.set_slider((cutoff_hz + CUTOFF_STEP_HZ / 2) / CUTOFF_STEP_HZ);
    }

    pub fn step_up(&mut self) {
        self.set_slider(self.slider.saturating_add(1));
    }

    pub fn step_down(&mut self) {
        self.set_slider(self.slider.saturating_sub(1));
    }

    pub fn page_up(&mut self) {
        self.set_slider(self.slider.saturating_add(PAGE_STEPS));
    }

    pub fn page_down(&mut self) {
        self.set_slider(self.slider.saturating_sub(PAGE_STEPS));
    }

    /// Releasing the slider previews the setting live.
    pub fn slider_released(&self) {
        self.apply_temporary();
    }

    /// Toggling the checkbox previews the setting live.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.apply_temporary();
    }

    pub fn current_setting(&self) -> FilterSetting {
        FilterSetting::new(self.enabled, self.cutoff_hz())
    }

    /// Publish the current state without persisting it
    pub fn apply_temporary(&self) {
        self.store.set(&self.identity, self.current_setting());
    }

    /// Keep the current state and persist
    pub fn apply(self) -> Result<bool> {
        self.apply_temporary();
        self.store.persist()
    }

    /// Roll back to the snapshot the session was opened on and persist
    pub fn cancel(self) -> Result<bool> {
        self.store.store_snapshot(self.original);
        self.store.persist()
    }

    /// Drop this speaker's setting and persist
    ///
    /// Starts from the snapshot the session was opened on, so previews made
    /// during the session are discarded along with the entry.
    pub fn remove(self) -> Result<bool> {
        let mut settings = FilterMap::clone(&self.original);
        settings.remove(&self.identity);
        self.store.store(settings);
        self.store.persist()
    }
}
