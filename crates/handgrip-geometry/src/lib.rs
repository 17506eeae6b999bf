pub mod camera;
pub mod math;
pub mod screen;

pub use camera::{CameraError, OrbitCamera, PerspectiveCamera, Projected, Projector, ScreenSpace};
pub use math::Vec3;
pub use screen::{Point2, Rect, Vec2, pos2, vec2};
