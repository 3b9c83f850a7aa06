//! Grid space to pixel space.

use crate::geometry::GridVector;

/// Pixels per grid unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionScale(f64);

impl ProjectionScale {
    /// Non-positive or non-finite factors are clamped to a tiny positive value
    /// so a collapsed container never yields a zero or negative scale.
    pub fn new(factor: f64) -> Self {
        if factor.is_finite() && factor > 0.0 {
            Self(factor)
        } else {
            Self(f64::MIN_POSITIVE)
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Largest uniform scale at which the whole board fits the viewport; the
/// looser axis is letterboxed.
pub fn compute_scale(viewport_width: f64, viewport_height: f64, board_width: u32, board_height: u32) -> ProjectionScale {
    let by_width = viewport_width / board_width.max(1) as f64;
    let by_height = viewport_height / board_height.max(1) as f64;
    ProjectionScale::new(by_width.min(by_height))
}

pub fn project_scalar(value: f64, scale: ProjectionScale) -> f64 {
    value * scale.get()
}

pub fn project_vector(v: GridVector, scale: ProjectionScale) -> (f64, f64) {
    (v.x * scale.get(), v.y * scale.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_viewport_with_matching_aspect() {
        let scale = compute_scale(800.0, 400.0, 30, 15).get();
        assert!((scale - 800.0 / 30.0).abs() < 1e-9);
        assert!((scale - 400.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn height_constrained() {
        assert_eq!(compute_scale(800.0, 300.0, 30, 15).get(), 20.0);
    }

    #[test]
    fn width_constrained() {
        assert_eq!(compute_scale(300.0, 900.0, 30, 15).get(), 10.0);
    }

    #[test]
    fn collapsed_viewport_stays_positive() {
        assert!(compute_scale(0.0, 0.0, 30, 15).get() > 0.0);
    }

    #[test]
    fn projection_multiplies_by_scale() {
        let scale = ProjectionScale::new(20.0);
        assert_eq!(project_scalar(1.5, scale), 30.0);
        assert_eq!(project_vector(GridVector::new(0.5, 2.0), scale), (10.0, 40.0));
    }
}
