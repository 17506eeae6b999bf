use handgrip_base::TargetId;
use handgrip_geometry::Vec3;
use serde::{Deserialize, Serialize};

/// A manipulable scene object: a shape vertex, a card, a circuit part.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub id: TargetId,
    pub name: String,
    pub world_position: Vec3,
    /// Overrides the configured hit-test radius for this target.
    #[serde(default)]
    pub pick_radius_px: Option<f32>,
}

impl Target {
    pub fn new(name: impl Into<String>, world_position: Vec3) -> Self {
        Self {
            id: TargetId::new(),
            name: name.into(),
            world_position,
            pick_radius_px: None,
        }
    }

    pub fn with_pick_radius(mut self, radius_px: f32) -> Self {
        self.pick_radius_px = Some(radius_px);
        self
    }
}

/// Candidates in hit-test order. Earlier targets win ties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: Target) -> TargetId {
        let id = target.id;
        self.targets.push(target);
        id
    }

    pub fn remove(&mut self, id: TargetId) -> Option<Target> {
        let index = self.targets.iter().position(|target| target.id == id)?;
        Some(self.targets.remove(index))
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|target| target.id == id)
    }

    pub fn position(&self, id: TargetId) -> Option<Vec3> {
        self.get(id).map(|target| target.world_position)
    }

    pub fn set_position(&mut self, id: TargetId, position: Vec3) -> bool {
        match self.targets.iter_mut().find(|target| target.id == id) {
            Some(target) => {
                target.world_position = position;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl FromIterator<Target> for TargetSet {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        Self {
            targets: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}
