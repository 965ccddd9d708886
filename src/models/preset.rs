//! Preset DTOs

use serde::{Deserialize, Serialize};

/// Named analysis configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_style: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_analysis: Option<Vec<String>>,
    /// Sampling temperature the preset runs the model with
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_cards: Option<Vec<AnalysisCard>>,
}

impl Preset {
    /// Custom cards, empty when the preset has none
    pub fn cards(&self) -> &[AnalysisCard] {
        self.custom_cards.as_deref().unwrap_or(&[])
    }
}

/// A result card a preset adds to the report
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalysisCard {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_preset_decodes() {
        let json = r#"{
            "id": "default",
            "name": "Standard",
            "description": "Balanced analysis",
            "icon": "🔍",
            "color": "neon-blue",
            "temperature": 0.7
        }"#;
        let preset: Preset = serde_json::from_str(json).unwrap();
        assert!(preset.cards().is_empty());
        assert!(preset.target_audience.is_none());

        let encoded = serde_json::to_value(&preset).unwrap();
        assert!(encoded.get("custom_cards").is_none());
    }
}
