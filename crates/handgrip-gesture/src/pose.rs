use serde::Serialize;

use crate::landmarks::{LandmarkSet, index};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPose {
    #[default]
    Open,
    Fist,
}

const FINGERS: [(usize, usize); 4] = [
    (index::INDEX_TIP, index::INDEX_PIP),
    (index::MIDDLE_TIP, index::MIDDLE_PIP),
    (index::RING_TIP, index::RING_PIP),
    (index::PINKY_TIP, index::PINKY_PIP),
];

/// Folded digits needed for a fist, out of five.
const FIST_MIN_FOLDED: usize = 4;

/// A finger is folded when its tip sits below its PIP joint in image y. The
/// thumb is folded when its tip crosses its IP joint in image x. Four folded
/// digits out of five make a fist, so one loose finger does not break it.
pub fn classify_pose(set: &LandmarkSet) -> HandPose {
    let points = set.points();
    let fingers = FINGERS
        .iter()
        .filter(|&&(tip, pip)| points[tip].y > points[pip].y)
        .count();
    let thumb = usize::from(points[index::THUMB_TIP].x > points[index::THUMB_IP].x);
    if fingers + thumb >= FIST_MIN_FOLDED {
        HandPose::Fist
    } else {
        HandPose::Open
    }
}
