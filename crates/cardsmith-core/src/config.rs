//! Editor configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CardError, CardResult};
use crate::placement::PlacementResolver;
use crate::qr::QrResolver;
use crate::render::RenderEngine;

/// Tunables for an editor session. Every field defaults when missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum retained undo snapshots
    pub history_capacity: usize,
    /// Quiet period before a committed state is saved
    pub autosave_idle_ms: u64,
    /// Path of the public viewer page used in shareable links
    pub viewer_path: String,
    /// Minimum edge of generated QR images in pixels
    pub qr_generated_min_px: u32,
    /// Offset step for keyboard nudges
    pub nudge_step: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            autosave_idle_ms: 1500,
            viewer_path: "/card.html".to_string(),
            qr_generated_min_px: 256,
            nudge_step: 1,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> CardResult<Self> {
        serde_json::from_str(json).map_err(|e| CardError::Integrity(format!("invalid config: {}", e)))
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> CardResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn autosave_idle(&self) -> Duration {
        Duration::from_millis(self.autosave_idle_ms)
    }

    pub fn qr_resolver(&self) -> QrResolver {
        QrResolver::new(self.viewer_path.clone(), self.qr_generated_min_px)
    }

    /// Render engine wired with this configuration
    pub fn render_engine(&self) -> RenderEngine {
        RenderEngine::new(PlacementResolver::new(), self.qr_resolver())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.autosave_idle(), Duration::from_millis(1500));
        assert_eq!(config.viewer_path, "/card.html");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EditorConfig::from_json(r#"{"history_capacity": 5}"#).unwrap();
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.qr_generated_min_px, 256);
    }

    #[test]
    fn test_malformed_json_is_integrity_error() {
        assert!(matches!(
            EditorConfig::from_json("{history"),
            Err(CardError::Integrity(_))
        ));
    }
}
