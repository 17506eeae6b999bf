use std::path::Path;

use anyhow::{Context, Result};
use handgrip_geometry::{OrbitCamera, PerspectiveCamera, Projector, ScreenSpace, Vec3};
use handgrip_gesture::TargetSet;
use serde::Deserialize;

/// Camera and targets the recorded frames are replayed against.
#[derive(Debug, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub camera: CameraSpec,
    #[serde(default)]
    pub targets: TargetSet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraSpec {
    #[default]
    Screen,
    Orbit {
        position: Vec3,
        #[serde(default)]
        target: Vec3,
        #[serde(default = "z_up")]
        up: Vec3,
        #[serde(default = "default_fov")]
        fov_deg: f64,
    },
    Perspective {
        eye: Vec3,
        #[serde(default)]
        target: Vec3,
        #[serde(default = "y_up")]
        up: Vec3,
        #[serde(default = "default_fov")]
        fov_y_deg: f64,
        #[serde(default = "default_near")]
        near: f64,
        #[serde(default = "default_far")]
        far: f64,
    },
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid scene {}", path.display()))
    }
}

impl CameraSpec {
    pub fn build(&self) -> Result<Box<dyn Projector>> {
        let projector: Box<dyn Projector> = match *self {
            Self::Screen => Box::new(ScreenSpace),
            Self::Orbit {
                position,
                target,
                up,
                fov_deg,
            } => Box::new(
                OrbitCamera::look_at(position, target, up, fov_deg)
                    .context("invalid orbit camera")?,
            ),
            Self::Perspective {
                eye,
                target,
                up,
                fov_y_deg,
                near,
                far,
            } => Box::new(
                PerspectiveCamera::new(eye, target, up, fov_y_deg, near, far)
                    .context("invalid perspective camera")?,
            ),
        };
        Ok(projector)
    }
}

fn z_up() -> Vec3 {
    Vec3::new(0.0, 0.0, 1.0)
}

fn y_up() -> Vec3 {
    Vec3::new(0.0, 1.0, 0.0)
}

fn default_fov() -> f64 {
    60.0
}

fn default_near() -> f64 {
    0.1
}

fn default_far() -> f64 {
    1000.0
}
