use serde::{Deserialize, Serialize};

///Represents a point or direction on the map, in tile units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector2 {
    ///Value along the x-axis (columns).
    pub x: f64,
    ///Value along the y-axis (rows).
    pub y: f64,
}

impl Vector2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    ///Returns the magnitude of the vector.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    ///Returns the normalized vector.
    pub fn normalize(&self) -> Vector2 {
        let mag = self.magnitude();
        if mag == 0.0 {
            Vector2 { x: 0.0, y: 0.0 }
        } else {
            Vector2 {
                x: self.x / mag,
                y: self.y / mag,
            }
        }
    }

    ///Returns the scaled vector.
    pub fn scale(&self, scalar: f64) -> Vector2 {
        Vector2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    ///Returns the difference `self - other`.
    pub fn sub(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    ///Returns the Euclidean distance between two points.
    pub fn distance(&self, other: &Vector2) -> f64 {
        self.sub(other).magnitude()
    }

    ///Linear interpolation from `self` towards `other`; `t` is clamped to [0, 1].
    pub fn lerp(&self, other: &Vector2, t: f64) -> Vector2 {
        let t = t.clamp(0.0, 1.0);
        self.add(&other.sub(self).scale(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_distance() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(3.0, 4.0);
        assert_approx_eq!(a.distance(&b), 5.0);
        assert_approx_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn test_normalize_zero() {
        let v = Vector2::default().normalize();
        assert_eq!(v, Vector2::new(0.0, 0.0));
    }

    #[test]
    fn test_lerp_clamps() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(10.0, 0.0);
        assert_approx_eq!(a.lerp(&b, 0.25).x, 2.5);
        assert_approx_eq!(a.lerp(&b, 2.0).x, 10.0);
        assert_approx_eq!(a.lerp(&b, -1.0).x, 0.0);
    }
}
