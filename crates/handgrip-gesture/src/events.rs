use handgrip_base::TargetId;
use handgrip_geometry::{Point2, Vec2, Vec3};
use serde::Serialize;

use crate::debounce::Debouncer;
use crate::landmarks::HandRole;
use crate::pose::HandPose;

/// Everything the gesture layer reports to the application.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEvent {
    HandFound {
        role: HandRole,
    },
    HandLost {
        role: HandRole,
    },
    PinchStarted {
        role: HandRole,
        position: Point2,
    },
    /// `position` is `None` when the pinch ended because the hand vanished.
    PinchEnded {
        role: HandRole,
        position: Option<Point2>,
    },
    PoseChanged {
        role: HandRole,
        pose: HandPose,
    },
    HoverEnter {
        role: HandRole,
        target: TargetId,
    },
    HoverExit {
        role: HandRole,
        target: TargetId,
    },
    SelectStart {
        role: HandRole,
        target: TargetId,
        position: Point2,
        world_position: Vec3,
    },
    DragMove {
        role: HandRole,
        target: TargetId,
        delta: Vec2,
        position: Point2,
        /// Where the target was moved to; `None` if the camera could not
        /// unproject this frame.
        world_position: Option<Vec3>,
    },
    Dropped {
        role: HandRole,
        target: TargetId,
        position: Point2,
        world_position: Vec3,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    HandFound,
    HandLost,
    PinchStarted,
    PinchEnded,
    PoseChanged,
    HoverEnter,
    HoverExit,
    SelectStart,
    DragMove,
    Dropped,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::HandFound,
        EventKind::HandLost,
        EventKind::PinchStarted,
        EventKind::PinchEnded,
        EventKind::PoseChanged,
        EventKind::HoverEnter,
        EventKind::HoverExit,
        EventKind::SelectStart,
        EventKind::DragMove,
        EventKind::Dropped,
    ];
}

impl GestureEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::HandFound { .. } => EventKind::HandFound,
            Self::HandLost { .. } => EventKind::HandLost,
            Self::PinchStarted { .. } => EventKind::PinchStarted,
            Self::PinchEnded { .. } => EventKind::PinchEnded,
            Self::PoseChanged { .. } => EventKind::PoseChanged,
            Self::HoverEnter { .. } => EventKind::HoverEnter,
            Self::HoverExit { .. } => EventKind::HoverExit,
            Self::SelectStart { .. } => EventKind::SelectStart,
            Self::DragMove { .. } => EventKind::DragMove,
            Self::Dropped { .. } => EventKind::Dropped,
        }
    }

    pub fn role(&self) -> HandRole {
        match self {
            Self::HandFound { role }
            | Self::HandLost { role }
            | Self::PinchStarted { role, .. }
            | Self::PinchEnded { role, .. }
            | Self::PoseChanged { role, .. }
            | Self::HoverEnter { role, .. }
            | Self::HoverExit { role, .. }
            | Self::SelectStart { role, .. }
            | Self::DragMove { role, .. }
            | Self::Dropped { role, .. } => *role,
        }
    }

    pub fn target(&self) -> Option<TargetId> {
        match self {
            Self::HoverEnter { target, .. }
            | Self::HoverExit { target, .. }
            | Self::SelectStart { target, .. }
            | Self::DragMove { target, .. }
            | Self::Dropped { target, .. } => Some(*target),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&GestureEvent)>;

struct Subscription {
    id: SubscriptionId,
    kind: Option<EventKind>,
    debouncer: Option<Debouncer<EventKind>>,
    handler: Handler,
}

/// Typed publish/subscribe for gesture events.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&GestureEvent) + 'static) -> SubscriptionId {
        self.insert(None, None, Box::new(handler))
    }

    pub fn subscribe_kind(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&GestureEvent) + 'static,
    ) -> SubscriptionId {
        self.insert(Some(kind), None, Box::new(handler))
    }

    /// Like [`EventBus::subscribe_kind`], but events of `kind` arriving less
    /// than `interval_ms` after the last delivered one are dropped.
    pub fn subscribe_debounced(
        &mut self,
        kind: EventKind,
        interval_ms: f64,
        handler: impl FnMut(&GestureEvent) + 'static,
    ) -> SubscriptionId {
        self.insert(
            Some(kind),
            Some(Debouncer::new(interval_ms)),
            Box::new(handler),
        )
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() < before
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Delivers `events` in order and returns the number of handler calls.
    pub fn publish(&mut self, timestamp_ms: f64, events: &[GestureEvent]) -> usize {
        let mut delivered = 0;
        for event in events {
            let kind = event.kind();
            for sub in &mut self.subscriptions {
                if sub.kind.is_some_and(|wanted| wanted != kind) {
                    continue;
                }
                if let Some(debouncer) = &mut sub.debouncer {
                    if !debouncer.try_accept(kind, timestamp_ms) {
                        continue;
                    }
                }
                (sub.handler)(event);
                delivered += 1;
            }
        }
        delivered
    }

    fn insert(
        &mut self,
        kind: Option<EventKind>,
        debouncer: Option<Debouncer<EventKind>>,
        handler: Handler,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            kind,
            debouncer,
            handler,
        });
        id
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
