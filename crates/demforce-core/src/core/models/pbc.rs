use nalgebra::Vector3;

/// Periodic boundary configuration of the simulation domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicBoundaries {
    pub enabled: [bool; 3],
    pub lower: Vector3<f64>,
    pub upper: Vector3<f64>,
}

impl Default for PeriodicBoundaries {
    fn default() -> Self {
        Self::disabled()
    }
}

impl PeriodicBoundaries {
    /// Number of scalars the configuration occupies in a flat parameter buffer.
    pub const FLAT_LEN: usize = 9;

    pub fn disabled() -> Self {
        Self {
            enabled: [false; 3],
            lower: Vector3::zeros(),
            upper: Vector3::zeros(),
        }
    }

    pub fn new(enabled: [bool; 3], lower: Vector3<f64>, upper: Vector3<f64>) -> Self {
        Self {
            enabled,
            lower,
            upper,
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled.iter().any(|&e| e)
    }

    /// Applies the minimum-image convention to a separation vector.
    pub fn minimum_image(&self, mut v: Vector3<f64>) -> Vector3<f64> {
        for axis in 0..3 {
            let length = self.upper[axis] - self.lower[axis];
            if self.enabled[axis] && length > 0.0 {
                v[axis] -= length * (v[axis] / length).round();
            }
        }
        v
    }

    /// Vector of a bond from its right end to its left end.
    #[inline]
    pub fn bond_vector(&self, right: &Vector3<f64>, left: &Vector3<f64>) -> Vector3<f64> {
        let v = left - right;
        if self.is_active() { self.minimum_image(v) } else { v }
    }

    pub fn to_flat(&self) -> [f64; Self::FLAT_LEN] {
        let flag = |e: bool| if e { 1.0 } else { 0.0 };
        [
            flag(self.enabled[0]),
            flag(self.enabled[1]),
            flag(self.enabled[2]),
            self.lower.x,
            self.lower.y,
            self.lower.z,
            self.upper.x,
            self.upper.y,
            self.upper.z,
        ]
    }

    pub fn from_flat(flat: &[f64]) -> Option<Self> {
        if flat.len() != Self::FLAT_LEN {
            return None;
        }
        Some(Self {
            enabled: [flat[0] != 0.0, flat[1] != 0.0, flat[2] != 0.0],
            lower: Vector3::new(flat[3], flat[4], flat[5]),
            upper: Vector3::new(flat[6], flat[7], flat[8]),
        })
    }
}
