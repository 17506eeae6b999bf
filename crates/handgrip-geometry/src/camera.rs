use cgmath::{Deg, Matrix4, Point3, SquareMatrix, Vector3, Vector4, perspective};
use thiserror::Error;

use crate::math::Vec3;
use crate::screen::{Point2, Rect, pos2};

const ORBIT_NEAR: f64 = 1.0e-4;

/// A world point mapped into a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub screen: Point2,
    /// Camera-specific depth; feed it back to [`Projector::unproject`].
    pub depth: f64,
}

/// World to screen mapping supplied by the scene.
///
/// `project` returns `None` for points that are not visible (behind the
/// camera). `unproject` is the inverse at a given depth.
pub trait Projector {
    fn project(&self, world: Vec3, viewport: Rect) -> Option<Projected>;

    fn unproject(&self, screen: Point2, depth: f64, viewport: Rect) -> Option<Vec3>;
}

impl<P: Projector + ?Sized> Projector for &P {
    fn project(&self, world: Vec3, viewport: Rect) -> Option<Projected> {
        (**self).project(world, viewport)
    }

    fn unproject(&self, screen: Point2, depth: f64, viewport: Rect) -> Option<Vec3> {
        (**self).unproject(screen, depth, viewport)
    }
}

impl<P: Projector + ?Sized> Projector for Box<P> {
    fn project(&self, world: Vec3, viewport: Rect) -> Option<Projected> {
        (**self).project(world, viewport)
    }

    fn unproject(&self, screen: Point2, depth: f64, viewport: Rect) -> Option<Vec3> {
        (**self).unproject(screen, depth, viewport)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("invalid camera parameter: {0}")]
    InvalidParameter(String),
}

/// Maps world x/y straight to pixels relative to the viewport origin.
/// Used for flat overlays such as sidebar cards.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScreenSpace;

impl Projector for ScreenSpace {
    fn project(&self, world: Vec3, viewport: Rect) -> Option<Projected> {
        Some(Projected {
            screen: pos2(
                viewport.min.x + world.x as f32,
                viewport.min.y + world.y as f32,
            ),
            depth: world.z,
        })
    }

    fn unproject(&self, screen: Point2, depth: f64, viewport: Rect) -> Option<Vec3> {
        Some(Vec3::new(
            (screen.x - viewport.min.x) as f64,
            (screen.y - viewport.min.y) as f64,
            depth,
        ))
    }
}

#[derive(Clone, Copy, Debug)]
struct CameraBasis {
    pos: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
}

/// Orbit view whose screen scale follows the field of view and the
/// distance to the orbit target.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    target: Vec3,
    position: Vec3,
    up: Vec3,
    fov_deg: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let yaw: f64 = 0.6;
        let pitch: f64 = 0.35;
        let distance: f64 = 500.0;
        let forward =
            Vec3::new(yaw.cos() * pitch.cos(), yaw.sin() * pitch.cos(), pitch.sin()).normalized();
        let target = Vec3::ZERO;
        Self {
            target,
            position: target - forward * distance,
            up: default_up(forward),
            fov_deg: 60.0,
        }
    }
}

impl OrbitCamera {
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3, fov_deg: f64) -> Result<Self, CameraError> {
        if !(position.is_finite() && target.is_finite() && up.is_finite()) {
            return Err(CameraError::InvalidParameter(
                "camera vectors must be finite".to_string(),
            ));
        }
        if (target - position).length() <= f64::EPSILON {
            return Err(CameraError::InvalidParameter(
                "camera position and target coincide".to_string(),
            ));
        }
        if !(fov_deg > 0.0 && fov_deg < 180.0) {
            return Err(CameraError::InvalidParameter(
                "fov_deg must be in (0, 180)".to_string(),
            ));
        }
        Ok(Self {
            target,
            position,
            up,
            fov_deg,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f64 {
        (self.target - self.position).length()
    }

    fn forward(&self) -> Vec3 {
        let dir = self.target - self.position;
        if dir.length() <= f64::EPSILON {
            Vec3::new(0.0, 0.0, 1.0)
        } else {
            dir.normalized()
        }
    }

    fn basis(&self) -> CameraBasis {
        let forward = self.forward();
        let mut right = forward.cross(self.up);
        if right.length() <= 1.0e-6 {
            right = forward.cross(default_up(forward));
        }
        let right = right.normalized();
        let up = right.cross(forward).normalized();
        CameraBasis {
            pos: self.position,
            right,
            up,
            forward,
        }
    }

    fn view_scale(&self, viewport: Rect) -> f64 {
        let view_size = viewport.width().min(viewport.height()) as f64;
        let fov = self.fov_deg.to_radians();
        let persp = view_size / (2.0 * (fov * 0.5).tan());
        (persp / self.distance().max(1.0)).max(1.0e-6)
    }
}

impl Projector for OrbitCamera {
    fn project(&self, world: Vec3, viewport: Rect) -> Option<Projected> {
        let basis = self.basis();
        let rel = world - basis.pos;
        let camera = Vec3::new(
            rel.dot(basis.right),
            rel.dot(basis.up),
            rel.dot(basis.forward),
        );
        if camera.z <= ORBIT_NEAR {
            return None;
        }
        let scale = self.view_scale(viewport);
        let center = viewport.center();
        Some(Projected {
            screen: pos2(
                center.x + (camera.x * scale) as f32,
                center.y - (camera.y * scale) as f32,
            ),
            depth: camera.z,
        })
    }

    fn unproject(&self, screen: Point2, depth: f64, viewport: Rect) -> Option<Vec3> {
        if depth <= ORBIT_NEAR {
            return None;
        }
        let basis = self.basis();
        let scale = self.view_scale(viewport);
        let center = viewport.center();
        let dx = (screen.x - center.x) as f64 / scale;
        let dy = (center.y - screen.y) as f64 / scale;
        Some(basis.pos + basis.right * dx + basis.up * dy + basis.forward * depth)
    }
}

/// Pinhole camera with an OpenGL-style clip space; depth is NDC z.
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    eye: Vec3,
    target: Vec3,
    up: Vec3,
    fov_y_deg: f64,
    near: f64,
    far: f64,
}

impl PerspectiveCamera {
    pub fn new(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_deg: f64,
        near: f64,
        far: f64,
    ) -> Result<Self, CameraError> {
        if !(fov_y_deg > 0.0 && fov_y_deg < 180.0) {
            return Err(CameraError::InvalidParameter(
                "fov_y_deg must be in (0, 180)".to_string(),
            ));
        }
        if !(near > 0.0 && far > near && far.is_finite()) {
            return Err(CameraError::InvalidParameter(
                "clip planes must satisfy 0 < near < far".to_string(),
            ));
        }
        if (target - eye).length() <= f64::EPSILON || up.cross(target - eye).length() <= 1.0e-9 {
            return Err(CameraError::InvalidParameter(
                "eye, target and up must span a view".to_string(),
            ));
        }
        Ok(Self {
            eye,
            target,
            up,
            fov_y_deg,
            near,
            far,
        })
    }

    fn view_projection(&self, viewport: Rect) -> Option<Matrix4<f64>> {
        let aspect = viewport.width() as f64 / viewport.height() as f64;
        if !aspect.is_finite() || aspect <= 0.0 {
            return None;
        }
        let view = Matrix4::look_at_rh(
            Point3::new(self.eye.x, self.eye.y, self.eye.z),
            Point3::new(self.target.x, self.target.y, self.target.z),
            Vector3::new(self.up.x, self.up.y, self.up.z),
        );
        let proj = perspective(Deg(self.fov_y_deg), aspect, self.near, self.far);
        Some(proj * view)
    }
}

impl Projector for PerspectiveCamera {
    fn project(&self, world: Vec3, viewport: Rect) -> Option<Projected> {
        let clip = self.view_projection(viewport)? * Vector4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= f64::EPSILON {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let ndc_z = clip.z / clip.w;
        let x = viewport.min.x as f64 + (ndc_x + 1.0) * 0.5 * viewport.width() as f64;
        let y = viewport.min.y as f64 + (1.0 - ndc_y) * 0.5 * viewport.height() as f64;
        Some(Projected {
            screen: pos2(x as f32, y as f32),
            depth: ndc_z,
        })
    }

    fn unproject(&self, screen: Point2, depth: f64, viewport: Rect) -> Option<Vec3> {
        let inverse = self.view_projection(viewport)?.invert()?;
        let ndc_x = (screen.x - viewport.min.x) as f64 / viewport.width() as f64 * 2.0 - 1.0;
        let ndc_y = 1.0 - (screen.y - viewport.min.y) as f64 / viewport.height() as f64 * 2.0;
        let world = inverse * Vector4::new(ndc_x, ndc_y, depth, 1.0);
        if world.w.abs() <= f64::EPSILON {
            return None;
        }
        Some(Vec3::new(world.x / world.w, world.y / world.w, world.z / world.w))
    }
}

fn default_up(forward: Vec3) -> Vec3 {
    let mut up = Vec3::new(0.0, 0.0, 1.0);
    let mut right = forward.cross(up);
    if right.length() <= 1.0e-6 {
        up = Vec3::new(0.0, 1.0, 0.0);
        right = forward.cross(up);
    }
    let right = right.normalized();
    right.cross(forward).normalized()
}
