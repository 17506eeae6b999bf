use std::collections::HashSet;

use handgrip_base::{GestureConfig, PointerAnchor, Result, TargetId};
use handgrip_geometry::{Point2, Projector, Rect};
use serde::Serialize;
use tracing::{debug, trace};

use crate::debounce::Debouncer;
use crate::events::GestureEvent;
use crate::hit_test::hit_test;
use crate::landmarks::{Frame, HandRole, LandmarkSet};
use crate::machine::{FrameContext, GestureStateKind, HandInput, HandMachine};
use crate::pinch::{PinchState, PinchTransition, pinch_distance};
use crate::pose::{HandPose, classify_pose};
use crate::smoother::LandmarkSmoother;
use crate::targets::TargetSet;

/// Snapshot of one hand, for overlays and debugging.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HandStatus {
    pub role: HandRole,
    pub detected: bool,
    pub pinching: bool,
    pub pose: HandPose,
    pub state: GestureStateKind,
    pub target: Option<TargetId>,
    pub position: Option<Point2>,
}

#[derive(Clone, Debug)]
struct HandTrack {
    machine: HandMachine,
    smoother: LandmarkSmoother,
    pinch: PinchState,
    pose: HandPose,
    detected: bool,
}

impl HandTrack {
    fn new(role: HandRole, config: &GestureConfig) -> Self {
        Self {
            machine: HandMachine::new(role),
            smoother: LandmarkSmoother::new(config.smoothing_alpha),
            pinch: PinchState::new(config.enter_threshold, config.exit_threshold),
            pose: HandPose::Open,
            detected: false,
        }
    }

    /// Ends everything this hand was doing. `reset_smoother` is false when
    /// the hand is only missing for a malformed frame.
    fn lose(&mut self, reset_smoother: bool, targets: &TargetSet, events: &mut Vec<GestureEvent>) {
        let role = self.machine.role();
        if self.pinch.force_release() == PinchTransition::Ended {
            events.push(GestureEvent::PinchEnded {
                role,
                position: None,
            });
        }
        self.machine.release(targets, events);
        self.pose = HandPose::Open;
        if reset_smoother {
            self.smoother.reset();
        }
        if self.detected {
            self.detected = false;
            debug!(role = role.as_str(), "hand lost");
            events.push(GestureEvent::HandLost { role });
        }
    }
}

/// Gesture interpretation for up to two hands.
///
/// Owns all per-hand state; the host owns the targets and the camera and
/// lends them for each frame.
#[derive(Clone, Debug)]
pub struct GestureSession {
    config: GestureConfig,
    left: HandTrack,
    right: HandTrack,
    select_gate: Debouncer<HandRole>,
}

impl GestureSession {
    pub fn new(config: GestureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            left: HandTrack::new(HandRole::Left, &config),
            right: HandTrack::new(HandRole::Right, &config),
            select_gate: Debouncer::new(config.debounce_interval_ms()),
            config,
        })
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn status(&self, role: HandRole) -> HandStatus {
        let track = self.track(role);
        let state = track.machine.state();
        HandStatus {
            role,
            detected: track.detected,
            pinching: track.pinch.is_pinching,
            pose: track.pose,
            state: state.kind(),
            target: state.target(),
            position: track.machine.last_position(),
        }
    }

    /// Interprets one tracker frame.
    ///
    /// Hands are handled in detection order. A target already captured by
    /// another hand, or already hit by an earlier hand in this frame, is not
    /// visible to later hands.
    pub fn on_frame<P: Projector + ?Sized>(
        &mut self,
        frame: &Frame,
        targets: &mut TargetSet,
        projector: &P,
        viewport: Rect,
    ) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        if !self.config.enabled {
            return events;
        }

        let mut claimed: HashSet<TargetId> = HandRole::ALL
            .iter()
            .filter_map(|&role| self.track(role).machine.captured())
            .collect();
        let mut seen: Vec<HandRole> = Vec::with_capacity(HandRole::ALL.len());

        for observation in &frame.hands {
            let role = if self.config.swap_handedness {
                observation.role.opposite()
            } else {
                observation.role
            };
            if seen.contains(&role) {
                debug!(role = role.as_str(), "duplicate hand in frame ignored");
                continue;
            }
            seen.push(role);

            match LandmarkSet::from_slice(&observation.landmarks) {
                Ok(raw) => self.track_hand(
                    role,
                    raw,
                    frame.timestamp_ms,
                    &mut claimed,
                    targets,
                    projector,
                    viewport,
                    &mut events,
                ),
                Err(err) => {
                    debug!(role = role.as_str(), %err, "malformed landmarks; hand treated as absent");
                    self.track_mut(role).lose(false, targets, &mut events);
                }
            }
        }

        for role in HandRole::ALL {
            if !seen.contains(&role) {
                self.track_mut(role).lose(true, targets, &mut events);
            }
        }

        trace!(timestamp_ms = frame.timestamp_ms, events = events.len(), "frame");
        events
    }

    /// Drops every capture and forgets both hands, as if they left the frame.
    pub fn cancel_all(&mut self, targets: &TargetSet) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        for role in HandRole::ALL {
            self.track_mut(role).lose(true, targets, &mut events);
        }
        events
    }

    #[allow(clippy::too_many_arguments)]
    fn track_hand<P: Projector + ?Sized>(
        &mut self,
        role: HandRole,
        raw: LandmarkSet,
        now_ms: f64,
        claimed: &mut HashSet<TargetId>,
        targets: &mut TargetSet,
        projector: &P,
        viewport: Rect,
        events: &mut Vec<GestureEvent>,
    ) {
        let Self {
            config,
            left,
            right,
            select_gate,
        } = self;
        let track = match role {
            HandRole::Left => left,
            HandRole::Right => right,
        };

        // Pinch edges come from the raw fingertips; smoothing only steadies
        // the pointer.
        let distance = pinch_distance(&raw, config.pinch_metric).unwrap_or(f32::NAN);
        let smoothed = track.smoother.push(raw).clone();
        if !track.detected {
            track.detected = true;
            debug!(role = role.as_str(), "hand found");
            events.push(GestureEvent::HandFound { role });
        }

        let position = gesture_position(&smoothed, config, viewport);

        let hit = if track.machine.is_dragging() {
            None
        } else {
            let candidates = targets.iter().filter(|target| !claimed.contains(&target.id));
            match hit_test(position, candidates, projector, viewport, config.hit_test_radius_px) {
                Ok(hit) => hit,
                Err(err) => {
                    debug!(role = role.as_str(), %err, "projection failed; gesture state held");
                    return;
                }
            }
        };

        let pose = classify_pose(&smoothed);
        if pose != track.pose {
            track.pose = pose;
            events.push(GestureEvent::PoseChanged { role, pose });
        }

        let transition = track.pinch.update(distance);
        match transition {
            PinchTransition::Started => events.push(GestureEvent::PinchStarted { role, position }),
            PinchTransition::Ended => events.push(GestureEvent::PinchEnded {
                role,
                position: Some(position),
            }),
            PinchTransition::None => {}
        }

        let input = HandInput {
            position,
            pinch: transition,
            pinching: track.pinch.is_pinching,
            hit,
        };
        let mut ctx = FrameContext {
            now_ms,
            targets,
            projector,
            viewport,
            select_gate,
            drag_threshold_px: config.drag_threshold_px,
        };
        track.machine.advance(&input, &mut ctx, events);

        if let Some(hit) = hit {
            claimed.insert(hit.target);
        }
        if let Some(target) = track.machine.captured() {
            claimed.insert(target);
        }
    }

    fn track(&self, role: HandRole) -> &HandTrack {
        match role {
            HandRole::Left => &self.left,
            HandRole::Right => &self.right,
        }
    }

    fn track_mut(&mut self, role: HandRole) -> &mut HandTrack {
        match role {
            HandRole::Left => &mut self.left,
            HandRole::Right => &mut self.right,
        }
    }
}

/// Screen position of the configured anchor point.
fn gesture_position(set: &LandmarkSet, config: &GestureConfig, viewport: Rect) -> Point2 {
    let (x, y) = match config.pointer_anchor {
        PointerAnchor::IndexTip => {
            let tip = set.index_tip();
            (tip.x, tip.y)
        }
        PointerAnchor::PinchMidpoint => {
            let (thumb, index) = (set.thumb_tip(), set.index_tip());
            ((thumb.x + index.x) * 0.5, (thumb.y + index.y) * 0.5)
        }
    };
    viewport.map_normalized(x, y, config.mirror_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{LANDMARK_COUNT, Landmark, index};
    use handgrip_geometry::{ScreenSpace, Vec3, pos2};

    fn hand(x: f32, y: f32, spread: f32) -> Vec<Landmark> {
        let mut points = vec![Landmark::new(x, y + 0.2, 0.0); LANDMARK_COUNT];
        points[index::MIDDLE_MCP] = Landmark::new(x, y + 0.1, 0.0);
        points[index::THUMB_TIP] = Landmark::new(x - spread / 2.0, y, 0.0);
        points[index::INDEX_TIP] = Landmark::new(x + spread / 2.0, y, 0.0);
        points
    }

    fn config() -> GestureConfig {
        GestureConfig {
            smoothing_alpha: 1.0,
            debounce_ms: 0,
            ..GestureConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GestureConfig {
            exit_threshold: 0.01,
            ..GestureConfig::default()
        };
        assert!(GestureSession::new(config).is_err());
    }

    #[test]
    fn disabled_session_is_silent() -> Result<()> {
        let mut session = GestureSession::new(GestureConfig {
            enabled: false,
            ..config()
        })?;
        let frame = Frame::new(0.0).with_hand(HandRole::Left, hand(0.5, 0.5, 0.2));
        let events = session.on_frame(&frame, &mut TargetSet::new(), &ScreenSpace, Rect::from_size(100.0, 100.0));
        assert!(events.is_empty());
        assert!(!session.status(HandRole::Left).detected);
        Ok(())
    }

    #[test]
    fn found_and_lost_are_reported_once() -> Result<()> {
        let mut session = GestureSession::new(config())?;
        let mut targets = TargetSet::new();
        let viewport = Rect::from_size(100.0, 100.0);
        let present = Frame::new(0.0).with_hand(HandRole::Right, hand(0.5, 0.5, 0.2));

        let events = session.on_frame(&present, &mut targets, &ScreenSpace, viewport);
        assert_eq!(events, vec![GestureEvent::HandFound { role: HandRole::Right }]);
        assert!(session.on_frame(&present, &mut targets, &ScreenSpace, viewport).is_empty());

        let events = session.on_frame(&Frame::new(32.0), &mut targets, &ScreenSpace, viewport);
        assert_eq!(events, vec![GestureEvent::HandLost { role: HandRole::Right }]);
        Ok(())
    }

    #[test]
    fn swapped_and_mirrored_hands() -> Result<()> {
        let mut session = GestureSession::new(GestureConfig {
            swap_handedness: true,
            mirror_x: true,
            pointer_anchor: PointerAnchor::IndexTip,
            ..config()
        })?;
        let frame = Frame::new(0.0).with_hand(HandRole::Left, hand(0.25, 0.5, 0.2));
        session.on_frame(&frame, &mut TargetSet::new(), &ScreenSpace, Rect::from_size(100.0, 100.0));

        let status = session.status(HandRole::Right);
        assert!(status.detected);
        // Index tip at x = 0.35, mirrored to 0.65.
        let position = status.position.unwrap_or_default();
        assert!((position.x - 65.0).abs() < 1.0e-3, "{position:?}");
        assert!(!session.status(HandRole::Left).detected);
        Ok(())
    }

    #[test]
    fn duplicate_role_is_ignored() -> Result<()> {
        let mut session = GestureSession::new(config())?;
        let frame = Frame::new(0.0)
            .with_hand(HandRole::Left, hand(0.2, 0.5, 0.2))
            .with_hand(HandRole::Left, hand(0.8, 0.5, 0.02));
        let events = session.on_frame(&frame, &mut TargetSet::new(), &ScreenSpace, Rect::from_size(100.0, 100.0));
        assert_eq!(events, vec![GestureEvent::HandFound { role: HandRole::Left }]);
        assert!(!session.status(HandRole::Left).pinching);
        Ok(())
    }

    #[test]
    fn fist_changes_pose() -> Result<()> {
        let mut session = GestureSession::new(config())?;
        let mut fist = hand(0.5, 0.5, 0.2);
        for (tip, pip) in [
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
            (index::RING_TIP, index::RING_PIP),
            (index::PINKY_TIP, index::PINKY_PIP),
        ] {
            fist[pip] = Landmark::new(0.5, 0.5, 0.0);
            fist[tip] = Landmark::new(0.5, 0.6, 0.0);
        }
        let frame = Frame::new(0.0).with_hand(HandRole::Left, fist);
        let events = session.on_frame(&frame, &mut TargetSet::new(), &ScreenSpace, Rect::from_size(100.0, 100.0));
        assert!(events.contains(&GestureEvent::PoseChanged {
            role: HandRole::Left,
            pose: HandPose::Fist,
        }));
        assert_eq!(session.status(HandRole::Left).pose, HandPose::Fist);
        Ok(())
    }

    #[test]
    fn status_reports_capture() -> Result<()> {
        let mut session = GestureSession::new(GestureConfig {
            pointer_anchor: PointerAnchor::IndexTip,
            ..config()
        })?;
        let mut targets = TargetSet::new();
        let id = targets.push(crate::targets::Target::new("card", Vec3::new(50.0, 50.0, 0.0)));
        let viewport = Rect::from_size(100.0, 100.0);

        // Index tip lands on (0.5, 0.5) with the fingers 0.02 apart.
        let frame = Frame::new(0.0).with_hand(HandRole::Left, hand(0.49, 0.5, 0.02));
        session.on_frame(&frame, &mut targets, &ScreenSpace, viewport);

        let status = session.status(HandRole::Left);
        assert!(status.pinching);
        assert_eq!(status.state, GestureStateKind::Dragging);
        assert_eq!(status.target, Some(id));
        let position = status.position.unwrap_or_default();
        assert!(position.distance(pos2(50.0, 50.0)) < 1.0e-3, "{position:?}");
        Ok(())
    }
}
