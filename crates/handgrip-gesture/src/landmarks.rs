//! Hand landmark model.
//!
//! Points follow the 21-landmark hand topology used by common webcam hand
//! trackers, in normalized image coordinates (x right, y down, both in
//! `[0, 1]`; z is relative depth and mostly unreliable).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of landmarks reported per hand.
pub const LANDMARK_COUNT: usize = 21;

pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Distance in the image plane; z is ignored.
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Landmark, t: f32) -> Landmark {
        Landmark::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("expected 21 landmarks, got {0}")]
    WrongCount(usize),
    #[error("landmark {0} has a non-finite coordinate")]
    NonFinite(usize),
}

/// A validated set of exactly [`LANDMARK_COUNT`] finite points.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn from_slice(raw: &[Landmark]) -> Result<Self, LandmarkError> {
        let points: [Landmark; LANDMARK_COUNT] = raw
            .try_into()
            .map_err(|_| LandmarkError::WrongCount(raw.len()))?;
        if let Some(bad) = points.iter().position(|point| !point.is_finite()) {
            return Err(LandmarkError::NonFinite(bad));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    pub fn thumb_tip(&self) -> Landmark {
        self.points[index::THUMB_TIP]
    }

    pub fn index_tip(&self) -> Landmark {
        self.points[index::INDEX_TIP]
    }

    pub fn wrist(&self) -> Landmark {
        self.points[index::WRIST]
    }

    pub fn middle_mcp(&self) -> Landmark {
        self.points[index::MIDDLE_MCP]
    }

    pub(crate) fn points_mut(&mut self) -> &mut [Landmark; LANDMARK_COUNT] {
        &mut self.points
    }
}

/// Which hand an observation belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandRole {
    #[serde(alias = "Left")]
    Left,
    #[serde(alias = "Right")]
    Right,
}

impl HandRole {
    pub const ALL: [HandRole; 2] = [HandRole::Left, HandRole::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// One detected hand in one video frame, straight from the tracker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub role: HandRole,
    pub landmarks: Vec<Landmark>,
}

/// Everything the tracker reported for one video frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Host clock in milliseconds; only differences matter.
    pub timestamp_ms: f64,
    #[serde(default)]
    pub hands: Vec<HandObservation>,
}

impl Frame {
    pub fn new(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            hands: Vec::new(),
        }
    }

    pub fn with_hand(mut self, role: HandRole, landmarks: Vec<Landmark>) -> Self {
        self.hands.push(HandObservation { role, landmarks });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand() -> Vec<Landmark> {
        vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT]
    }

    #[test]
    fn accepts_full_finite_set() {
        let set = LandmarkSet::from_slice(&flat_hand());
        assert!(set.is_ok());
    }

    #[test]
    fn rejects_short_set() {
        let raw = vec![Landmark::default(); 5];
        assert_eq!(LandmarkSet::from_slice(&raw), Err(LandmarkError::WrongCount(5)));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let mut raw = flat_hand();
        raw[7].z = f32::INFINITY;
        assert_eq!(LandmarkSet::from_slice(&raw), Err(LandmarkError::NonFinite(7)));

        raw[7].z = 0.0;
        raw[3].x = f32::NAN;
        assert_eq!(LandmarkSet::from_slice(&raw), Err(LandmarkError::NonFinite(3)));
    }

    #[test]
    fn planar_distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(0.3, 0.4, 9.0);
        assert!((a.planar_distance(&b) - 0.5).abs() < 1.0e-6);
    }

    #[test]
    fn role_accepts_tracker_labels() -> Result<(), serde_json::Error> {
        let role: HandRole = serde_json::from_str("\"Left\"")?;
        assert_eq!(role, HandRole::Left);
        let role: HandRole = serde_json::from_str("\"right\"")?;
        assert_eq!(role, HandRole::Right);
        assert_eq!(HandRole::Left.opposite(), HandRole::Right);
        Ok(())
    }
}
