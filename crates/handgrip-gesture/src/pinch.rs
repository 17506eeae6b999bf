use handgrip_base::PinchMetric;

use crate::landmarks::{Landmark, LandmarkSet};

/// Edge produced by one pinch update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinchTransition {
    None,
    Started,
    Ended,
}

/// Thumb/index pinch with hysteresis: a pinch starts at or below
/// `enter_threshold` and only ends above `exit_threshold`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchState {
    pub is_pinching: bool,
    pub enter_threshold: f32,
    pub exit_threshold: f32,
}

impl PinchState {
    pub fn new(enter_threshold: f32, exit_threshold: f32) -> Self {
        Self {
            is_pinching: false,
            enter_threshold,
            exit_threshold,
        }
    }

    /// Next state for the given fingertips.
    pub fn detect(self, thumb_tip: Landmark, index_tip: Landmark) -> Self {
        let mut next = self;
        next.update(thumb_tip.planar_distance(&index_tip));
        next
    }

    pub fn update(&mut self, distance: f32) -> PinchTransition {
        if !distance.is_finite() {
            return PinchTransition::None;
        }
        let was_pinching = self.is_pinching;
        self.is_pinching = if was_pinching {
            distance <= self.exit_threshold
        } else {
            distance <= self.enter_threshold
        };
        match (was_pinching, self.is_pinching) {
            (false, true) => PinchTransition::Started,
            (true, false) => PinchTransition::Ended,
            _ => PinchTransition::None,
        }
    }

    /// Releases the pinch when the hand disappears.
    pub fn force_release(&mut self) -> PinchTransition {
        if std::mem::replace(&mut self.is_pinching, false) {
            PinchTransition::Ended
        } else {
            PinchTransition::None
        }
    }
}

/// Thumb-tip to index-tip distance under the configured metric.
///
/// `HandScale` divides by the wrist to middle-MCP length so the threshold
/// does not depend on how far the hand is from the camera. A degenerate
/// hand (zero scale) yields `None`.
pub fn pinch_distance(set: &LandmarkSet, metric: PinchMetric) -> Option<f32> {
    let distance = set.thumb_tip().planar_distance(&set.index_tip());
    match metric {
        PinchMetric::Image => Some(distance),
        PinchMetric::HandScale => {
            let scale = set.wrist().planar_distance(&set.middle_mcp());
            if scale <= f32::EPSILON {
                None
            } else {
                Some(distance / scale)
            }
        }
    }
}
