//! Hand landmarks in, hover/select/drag/drop events out.

pub mod debounce;
pub mod events;
pub mod landmarks;
pub mod machine;
pub mod pinch;
pub mod pose;
pub mod session;
pub mod smoother;
pub mod targets;

pub use debounce::Debouncer;
pub use events::{EventBus, EventKind, GestureEvent, SubscriptionId};
pub use hit_test::{Hit, ProjectionError, TIE_TOLERANCE_PX, hit_test};
pub use landmarks::{
    Frame, HandObservation, HandRole, LANDMARK_COUNT, Landmark, LandmarkError, LandmarkSet,
};
pub use machine::{GestureState, GestureStateKind, HandMachine};
pub use pinch::{PinchState, PinchTransition, pinch_distance};
pub use pose::{HandPose, classify_pose};
pub use session::{GestureSession, HandStatus};
pub use smoother::{LandmarkSmoother, smooth};
pub use targets::{Target, TargetSet};
