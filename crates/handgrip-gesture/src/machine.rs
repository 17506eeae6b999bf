//! Per-hand gesture state machine.
//!
//! `Idle -> Hovering -> Dragging -> Idle`, advanced once per frame from the
//! smoothed gesture position, the pinch detector and the hit-test result.
//! Hovering is an affordance only: a pinch that starts over a target captures
//! it straight from `Idle`.

use handgrip_base::TargetId;
use handgrip_geometry::{Point2, Projector, Rect, Vec2, Vec3};
use serde::Serialize;
use tracing::debug;

use crate::debounce::Debouncer;
use crate::events::GestureEvent;
use crate::hit_test::Hit;
use crate::landmarks::HandRole;
use crate::pinch::PinchTransition;
use crate::targets::TargetSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Hovering { target: TargetId },
    Dragging { target: TargetId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureStateKind {
    Idle,
    Hovering,
    Dragging,
}

impl GestureState {
    pub fn kind(&self) -> GestureStateKind {
        match self {
            Self::Idle => GestureStateKind::Idle,
            Self::Hovering { .. } => GestureStateKind::Hovering,
            Self::Dragging { .. } => GestureStateKind::Dragging,
        }
    }

    pub fn target(&self) -> Option<TargetId> {
        match *self {
            Self::Idle => None,
            Self::Hovering { target } | Self::Dragging { target } => Some(target),
        }
    }
}

/// What the session observed for one hand in one frame.
#[derive(Clone, Copy, Debug)]
pub struct HandInput {
    pub position: Point2,
    pub pinch: PinchTransition,
    pub pinching: bool,
    /// `None` when nothing was hit or the hand is dragging.
    pub hit: Option<Hit>,
}

/// Shared, per-frame collaborators of every hand machine.
pub struct FrameContext<'a, P: ?Sized> {
    pub now_ms: f64,
    pub targets: &'a mut TargetSet,
    pub projector: &'a P,
    pub viewport: Rect,
    pub select_gate: &'a mut Debouncer<HandRole>,
    /// Gesture travel after capture before the target follows.
    pub drag_threshold_px: f32,
}

#[derive(Clone, Copy, Debug)]
struct Grab {
    target: TargetId,
    /// Target's screen position when it was captured.
    anchor: Point2,
    depth: f64,
    /// Gesture movement accumulated since capture.
    offset: Vec2,
    world_position: Vec3,
    /// The offset has left the dead zone and the target follows.
    engaged: bool,
}

#[derive(Clone, Debug)]
pub struct HandMachine {
    role: HandRole,
    state: GestureState,
    grab: Option<Grab>,
    /// A pinch started and has not yet captured or been spent.
    armed: bool,
    last_position: Option<Point2>,
}

impl HandMachine {
    pub fn new(role: HandRole) -> Self {
        Self {
            role,
            state: GestureState::Idle,
            grab: None,
            armed: false,
            last_position: None,
        }
    }

    pub fn role(&self) -> HandRole {
        self.role
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn captured(&self) -> Option<TargetId> {
        match self.state {
            GestureState::Dragging { target } => Some(target),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<TargetId> {
        match self.state {
            GestureState::Hovering { target } => Some(target),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    pub fn last_position(&self) -> Option<Point2> {
        self.last_position
    }

    pub fn advance<P: Projector + ?Sized>(
        &mut self,
        input: &HandInput,
        ctx: &mut FrameContext<'_, P>,
        events: &mut Vec<GestureEvent>,
    ) {
        match self.state {
            GestureState::Dragging { target } => {
                if input.pinching {
                    self.drag(target, input.position, ctx, events);
                } else {
                    self.drop_capture(input.position, ctx.targets, events);
                }
            }
            GestureState::Idle | GestureState::Hovering { .. } => {
                self.idle_or_hover(input, ctx, events);
            }
        }
        self.last_position = Some(input.position);
    }

    /// Forces `Idle` when the hand is gone or the interaction is cancelled.
    pub fn release(&mut self, targets: &TargetSet, events: &mut Vec<GestureEvent>) {
        match self.state {
            GestureState::Dragging { .. } => {
                let position = self
                    .last_position
                    .or_else(|| self.grab.map(|grab| grab.anchor + grab.offset))
                    .unwrap_or_default();
                self.drop_capture(position, targets, events);
            }
            GestureState::Hovering { target } => {
                events.push(GestureEvent::HoverExit {
                    role: self.role,
                    target,
                });
                self.state = GestureState::Idle;
            }
            GestureState::Idle => {}
        }
        self.armed = false;
        self.last_position = None;
    }

    fn idle_or_hover<P: Projector + ?Sized>(
        &mut self,
        input: &HandInput,
        ctx: &mut FrameContext<'_, P>,
        events: &mut Vec<GestureEvent>,
    ) {
        if input.pinch == PinchTransition::Started {
            self.armed = true;
        }
        if !input.pinching {
            self.armed = false;
            self.update_hover(input.hit.map(|hit| hit.target), events);
            return;
        }

        if !self.armed {
            // A held pinch that never captured can lose hover but not gain it.
            if let Some(current) = self.hovered() {
                if input.hit.map(|hit| hit.target) != Some(current) {
                    self.update_hover(None, events);
                }
            }
            return;
        }

        let Some(hit) = input.hit else {
            debug!(role = self.role.as_str(), "pinch started over empty space");
            self.armed = false;
            self.update_hover(None, events);
            return;
        };

        let Some(world_position) = ctx.targets.position(hit.target) else {
            self.armed = false;
            self.update_hover(None, events);
            return;
        };

        if !ctx.select_gate.try_accept(self.role, ctx.now_ms) {
            debug!(role = self.role.as_str(), target = %hit.target, "select debounced");
            self.update_hover(Some(hit.target), events);
            return;
        }

        if let Some(current) = self.hovered() {
            if current != hit.target {
                events.push(GestureEvent::HoverExit {
                    role: self.role,
                    target: current,
                });
            }
        }

        debug!(role = self.role.as_str(), target = %hit.target, "drag started");
        events.push(GestureEvent::SelectStart {
            role: self.role,
            target: hit.target,
            position: input.position,
            world_position,
        });
        self.state = GestureState::Dragging { target: hit.target };
        self.grab = Some(Grab {
            target: hit.target,
            anchor: hit.screen,
            depth: hit.depth,
            offset: Vec2::ZERO,
            world_position,
            engaged: ctx.drag_threshold_px <= 0.0,
        });
        self.armed = false;
    }

    fn update_hover(&mut self, hit: Option<TargetId>, events: &mut Vec<GestureEvent>) {
        let current = self.hovered();
        if current == hit {
            return;
        }
        if let Some(previous) = current {
            events.push(GestureEvent::HoverExit {
                role: self.role,
                target: previous,
            });
        }
        match hit {
            Some(target) => {
                events.push(GestureEvent::HoverEnter {
                    role: self.role,
                    target,
                });
                self.state = GestureState::Hovering { target };
            }
            None => self.state = GestureState::Idle,
        }
    }

    fn drag<P: Projector + ?Sized>(
        &mut self,
        target: TargetId,
        position: Point2,
        ctx: &mut FrameContext<'_, P>,
        events: &mut Vec<GestureEvent>,
    ) {
        let delta = self
            .last_position
            .map(|last| position - last)
            .unwrap_or(Vec2::ZERO);

        let mut moved_to = None;
        if let Some(grab) = self.grab.as_mut() {
            grab.offset += delta;
            if !grab.engaged {
                if grab.offset.length() <= ctx.drag_threshold_px {
                    return;
                }
                debug!(role = self.role.as_str(), %target, "drag engaged");
                grab.engaged = true;
            }
            let unprojected =
                ctx.projector
                    .unproject(grab.anchor + grab.offset, grab.depth, ctx.viewport);
            match unprojected {
                Some(world) if world.is_finite() => {
                    if ctx.targets.set_position(target, world) {
                        grab.world_position = world;
                        moved_to = Some(world);
                    }
                }
                _ => debug!(role = self.role.as_str(), %target, "unproject failed; target not moved"),
            }
        }

        events.push(GestureEvent::DragMove {
            role: self.role,
            target,
            delta,
            position,
            world_position: moved_to,
        });
    }

    fn drop_capture(&mut self, position: Point2, targets: &TargetSet, events: &mut Vec<GestureEvent>) {
        let Some(target) = self.captured() else {
            return;
        };
        let world_position = targets
            .position(target)
            .or_else(|| self.grab.map(|grab| grab.world_position))
            .unwrap_or_default();
        debug!(role = self.role.as_str(), %target, "dropped");
        events.push(GestureEvent::Dropped {
            role: self.role,
            target,
            position,
            world_position,
        });
        self.state = GestureState::Idle;
        self.grab = None;
    }
}
