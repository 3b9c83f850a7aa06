use std::ops;

use serde::{Deserialize, Serialize};

/// A point or displacement in grid space, one unit per board cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridVector {
    pub x: f64,
    pub y: f64,
}

impl GridVector {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Centre of the cell at integer coordinates `(x, y)`.
    pub fn cell_center(x: i32, y: i32) -> Self {
        Self::new(x as f64 + 0.5, y as f64 + 0.5)
    }
}

impl ops::Add for GridVector {
    type Output = GridVector;

    fn add(self, rhs: GridVector) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl ops::Sub for GridVector {
    type Output = GridVector;

    fn sub(self, rhs: GridVector) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl ops::Mul<f64> for GridVector {
    type Output = GridVector;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_center_sits_half_a_cell_in() {
        assert_eq!(GridVector::cell_center(0, 0), GridVector::new(0.5, 0.5));
        assert_eq!(GridVector::cell_center(3, 7), GridVector::new(3.5, 7.5));
    }

    #[test]
    fn arithmetic() {
        let a = GridVector::new(1.0, 2.0);
        let b = GridVector::new(0.5, -1.0);
        assert_eq!(a + b, GridVector::new(1.5, 1.0));
        assert_eq!(a - b, GridVector::new(0.5, 3.0));
        assert_eq!(b * 2.0, GridVector::new(1.0, -2.0));
    }
}
