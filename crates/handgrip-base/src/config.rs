use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which point of the hand drives the on-screen gesture position.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerAnchor {
    IndexTip,
    #[default]
    PinchMidpoint,
}

/// How the thumb/index distance is normalized before thresholding.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinchMetric {
    /// Planar distance in normalized image coordinates.
    #[default]
    Image,
    /// Planar distance divided by the wrist to middle-finger MCP length.
    HandScale,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub enabled: bool,
    pub enter_threshold: f32,
    pub exit_threshold: f32,
    pub smoothing_alpha: f32,
    pub debounce_ms: u64,
    pub hit_test_radius_px: f32,
    /// Pointer travel after a grab before the target starts to follow.
    pub drag_threshold_px: f32,
    pub mirror_x: bool,
    pub swap_handedness: bool,
    pub pointer_anchor: PointerAnchor,
    pub pinch_metric: PinchMetric,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enter_threshold: 0.045,
            exit_threshold: 0.08,
            smoothing_alpha: 0.3,
            debounce_ms: 250,
            hit_test_radius_px: 60.0,
            drag_threshold_px: 0.0,
            mirror_x: false,
            swap_handedness: false,
            pointer_anchor: PointerAnchor::PinchMidpoint,
            pinch_metric: PinchMetric::Image,
        }
    }
}

impl GestureConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("enter_threshold", self.enter_threshold)?;
        ensure_positive("exit_threshold", self.exit_threshold)?;
        if self.exit_threshold <= self.enter_threshold {
            return Err(Error::InvalidParameter(format!(
                "exit_threshold ({}) must be greater than enter_threshold ({})",
                self.exit_threshold, self.enter_threshold
            )));
        }
        ensure_positive("smoothing_alpha", self.smoothing_alpha)?;
        if self.smoothing_alpha > 1.0 {
            return Err(Error::InvalidParameter(
                "smoothing_alpha must be in (0, 1]".to_string(),
            ));
        }
        ensure_positive("hit_test_radius_px", self.hit_test_radius_px)?;
        if !(self.drag_threshold_px.is_finite() && self.drag_threshold_px >= 0.0) {
            return Err(Error::InvalidParameter(
                "drag_threshold_px must be a finite value >= 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce_interval_ms(&self) -> f64 {
        self.debounce_ms as f64
    }
}

fn ensure_positive(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "{name} must be a finite value > 0"
        )));
    }
    Ok(())
}
