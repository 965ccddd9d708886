//! Selected preset and temperature

use std::sync::Arc;
use thiserror::Error;

use super::store::{KeyValueStore, StoreError, SELECTED_PRESET_KEY, TEMPERATURE_KEY};
use crate::models::Preset;

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("Temperature must be between 0.0 and 1.0, got {0}")]
    InvalidTemperature(f32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// User choices that persist between analyses
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn selected_preset(&self) -> Result<Option<String>, PreferencesError> {
        Ok(self.store.get(SELECTED_PRESET_KEY)?.filter(|id| !id.is_empty()))
    }

    /// Stored temperature; unparseable values read as unset
    pub fn temperature(&self) -> Result<Option<f32>, PreferencesError> {
        let raw = self.store.get(TEMPERATURE_KEY)?;
        Ok(raw.and_then(|v| v.parse::<f32>().ok()).filter(|t| valid(*t)))
    }

    /// Select a preset and adopt its default temperature
    pub fn select_preset(&self, preset: &Preset) -> Result<(), PreferencesError> {
        self.store.set(SELECTED_PRESET_KEY, &preset.id)?;
        if valid(preset.temperature) {
            self.store
                .set(TEMPERATURE_KEY, &preset.temperature.to_string())?;
        }
        tracing::info!(preset = %preset.id, "Preset selected");
        Ok(())
    }

    pub fn set_temperature(&self, temperature: f32) -> Result<(), PreferencesError> {
        if !valid(temperature) {
            return Err(PreferencesError::InvalidTemperature(temperature));
        }
        self.store.set(TEMPERATURE_KEY, &temperature.to_string())?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), PreferencesError> {
        self.store.remove(SELECTED_PRESET_KEY)?;
        self.store.remove(TEMPERATURE_KEY)?;
        Ok(())
    }
}

fn valid(temperature: f32) -> bool {
    (0.0..=1.0).contains(&temperature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;

    fn preset(id: &str, temperature: f32) -> Preset {
        Preset {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            icon: String::new(),
            color: "slate".to_string(),
            target_audience: None,
            report_style: None,
            focus_analysis: None,
            temperature,
            custom_cards: None,
        }
    }

    #[test]
    fn test_select_preset_stores_id_and_temperature() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        prefs.select_preset(&preset("family_balance", 0.7)).unwrap();

        assert_eq!(prefs.selected_preset().unwrap().as_deref(), Some("family_balance"));
        assert_eq!(prefs.temperature().unwrap(), Some(0.7));
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            prefs.set_temperature(1.5),
            Err(PreferencesError::InvalidTemperature(_))
        ));
        prefs.set_temperature(0.3).unwrap();
        assert_eq!(prefs.temperature().unwrap(), Some(0.3));
    }

    #[test]
    fn test_garbage_temperature_reads_as_unset() {
        let store = Arc::new(MemoryStore::new());
        store.set(TEMPERATURE_KEY, "warm").unwrap();
        let prefs = Preferences::new(store);
        assert_eq!(prefs.temperature().unwrap(), None);
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        prefs.select_preset(&preset("strategic_hr", 0.5)).unwrap();
        prefs.clear().unwrap();
        assert_eq!(prefs.selected_preset().unwrap(), None);
        assert_eq!(prefs.temperature().unwrap(), None);
    }
}
