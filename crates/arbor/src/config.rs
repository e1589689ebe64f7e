//! Tunables for the layout engine.

use serde::Deserialize;

use crate::error::Result;

/// Layout engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Upper bound on solver sweeps per recalculation.
    pub max_sweeps: usize,
    /// Extra rows spawned beyond the visible window of a virtualized container.
    pub overscan_rows: usize,
    /// Pan speed lost per second, in pixels per second.
    pub pan_friction: f32,
    /// Number of rows asked for when a data source is scrolled to its end.
    pub page_size: usize,
    /// Fire content-area notifications when only padding or margin changed.
    pub notify_padding_changes: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_sweeps: 512,
            overscan_rows: 1,
            pan_friction: 2000.0,
            page_size: 50,
            notify_padding_changes: false,
        }
    }
}

impl LayoutConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
