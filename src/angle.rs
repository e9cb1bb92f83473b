use crate::Vec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// An angle in radians. Shape rotations keep their angle wrapped into `(-pi, pi]`
/// through [`Radians::normalized`].
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialOrd, PartialEq, Default)]
#[serde(from = "f64", into = "f64")]
#[repr(transparent)]
pub struct Radians(pub f64);

impl Radians {
    pub const ZERO: Self = Radians(0.0);
    pub const HALFPI: Self = Radians(std::f64::consts::FRAC_PI_2);
    pub const PI: Self = Radians(PI);
    pub const TAU: Self = Radians(TAU);

    #[inline]
    pub fn from_deg(deg: f64) -> Self {
        Self(deg * (PI / 180.0))
    }

    #[inline]
    pub fn to_degrees(self) -> f64 {
        self.0 * (180.0 / PI)
    }

    /// Wraps the angle into `(-pi, pi]`.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut a = self.0 % TAU;
        if a > PI {
            a -= TAU;
        } else if a <= -PI {
            a += TAU;
        }
        Self(a)
    }

    #[inline]
    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    #[inline]
    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    #[inline]
    pub fn vec2(self) -> Vec2 {
        Vec2 {
            x: self.0.cos(),
            y: self.0.sin(),
        }
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl Add for Radians {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Radians {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Radians {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Radians {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<f64> for Radians {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Neg for Radians {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl From<f64> for Radians {
    #[inline]
    fn from(v: f64) -> Self {
        Self(v)
    }
}

impl From<Radians> for f64 {
    #[inline]
    fn from(v: Radians) -> Self {
        v.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_range() {
        // wrapping stays in (-pi, pi] for arbitrary accumulations
        let mut a = Radians::ZERO;
        for _ in 0..100 {
            a = (a + Radians(1.9)).normalized();
            assert!(a.0 > -PI && a.0 <= PI);
        }
    }

    #[test]
    fn test_normalized_boundary() {
        assert_eq!(Radians(PI).normalized().0, PI);
        assert_eq!(Radians(-PI).normalized().0, PI);
        assert!((Radians(3.0 * PI).normalized().0 - PI).abs() < 1e-12);
    }
}
