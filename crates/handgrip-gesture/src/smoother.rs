use crate::landmarks::{Landmark, LandmarkSet};

/// Exponential smoothing of one frame's landmarks against the previous
/// smoothed set. `alpha` is the weight given to the new sample.
///
/// A malformed `raw` set returns `previous` unchanged, so NaN or a short
/// array never reaches the caller.
pub fn smooth(raw: &[Landmark], previous: Option<&LandmarkSet>, alpha: f32) -> Option<LandmarkSet> {
    match LandmarkSet::from_slice(raw) {
        Ok(raw) => Some(blend(raw, previous, alpha)),
        Err(_) => previous.cloned(),
    }
}

fn blend(raw: LandmarkSet, previous: Option<&LandmarkSet>, alpha: f32) -> LandmarkSet {
    let Some(previous) = previous else {
        return raw;
    };
    let alpha = sanitize_alpha(alpha);
    let mut out = previous.clone();
    for (smoothed, sample) in out.points_mut().iter_mut().zip(raw.points()) {
        *smoothed = smoothed.lerp(sample, alpha);
    }
    out
}

fn sanitize_alpha(alpha: f32) -> f32 {
    if alpha.is_finite() {
        alpha.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Per-hand smoothing state that lives for as long as the hand is tracked.
#[derive(Clone, Debug)]
pub struct LandmarkSmoother {
    alpha: f32,
    current: Option<LandmarkSet>,
}

impl LandmarkSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            current: None,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn current(&self) -> Option<&LandmarkSet> {
        self.current.as_ref()
    }

    /// Feeds a raw frame; malformed frames leave the smoothed set as it was.
    pub fn update(&mut self, raw: &[Landmark]) -> Option<&LandmarkSet> {
        if let Some(next) = smooth(raw, self.current.as_ref(), self.alpha) {
            self.current = Some(next);
        }
        self.current.as_ref()
    }

    pub fn push(&mut self, raw: LandmarkSet) -> &LandmarkSet {
        let next = blend(raw, self.current.as_ref(), self.alpha);
        self.current.insert(next)
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LANDMARK_COUNT;

    fn uniform(x: f32, y: f32) -> Vec<Landmark> {
        vec![Landmark::new(x, y, 0.0); LANDMARK_COUNT]
    }

    #[test]
    fn first_observation_is_copied() {
        let raw = uniform(0.2, 0.7);
        let smoothed = smooth(&raw, None, 0.3);
        assert_eq!(smoothed.map(|set| set.points()[0]), Some(raw[0]));
    }

    #[test]
    fn blends_with_previous() {
        let previous = smooth(&uniform(0.0, 0.0), None, 0.5);
        let smoothed = smooth(&uniform(1.0, 0.5), previous.as_ref(), 0.25);
        let Some(smoothed) = smoothed else {
            panic!("expected smoothed set");
        };
        let point = smoothed.points()[10];
        assert!((point.x - 0.25).abs() < 1.0e-6);
        assert!((point.y - 0.125).abs() < 1.0e-6);
    }

    #[test]
    fn malformed_frame_returns_previous() {
        let previous = smooth(&uniform(0.4, 0.4), None, 0.3);

        let short = uniform(0.9, 0.9)[..5].to_vec();
        assert_eq!(smooth(&short, previous.as_ref(), 0.3), previous);

        let mut nan = uniform(0.9, 0.9);
        nan[8].y = f32::NAN;
        assert_eq!(smooth(&nan, previous.as_ref(), 0.3), previous);

        assert_eq!(smooth(&short, None, 0.3), None);
    }

    #[test]
    fn converges_monotonically_to_constant_input() {
        for alpha in [0.05_f32, 0.25, 0.3, 0.4, 1.0] {
            let mut smoother = LandmarkSmoother::new(alpha);
            smoother.update(&uniform(0.0, 0.0));

            let target = uniform(1.0, 1.0);
            let mut last_error = 1.0_f32;
            let frames = (10.0 / alpha).ceil() as usize;
            for _ in 0..frames {
                let Some(current) = smoother.update(&target) else {
                    panic!("smoother lost its state");
                };
                let error = 1.0 - current.points()[0].x;
                assert!(error <= last_error, "alpha {alpha}: error grew");
                assert!(error >= 0.0, "alpha {alpha}: overshoot");
                last_error = error;
            }
            assert!(last_error < 1.0e-3, "alpha {alpha}: error {last_error}");
        }
    }

    #[test]
    fn reset_forgets_history() {
        let mut smoother = LandmarkSmoother::new(0.3);
        smoother.update(&uniform(0.0, 0.0));
        smoother.reset();
        assert!(smoother.current().is_none());
        let current = smoother.update(&uniform(0.6, 0.6)).map(|set| set.points()[0]);
        assert_eq!(current, Some(Landmark::new(0.6, 0.6, 0.0)));
    }
}
