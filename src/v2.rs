use crate::Radians;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// 2D vector over f64. Value type: every transform returns a new vector.
#[derive(Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Debug for Vec2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("V2(")?;
        Display::fmt(&self.x, f)?;
        f.write_str(", ")?;
        Display::fmt(&self.y, f)?;
        f.write_str(")")
    }
}

impl Display for Vec2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

#[inline]
pub const fn vec2(x: f64, y: f64) -> Vec2 {
    Vec2 { x, y }
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const X: Self = Self { x: 1.0, y: 0.0 };
    pub const Y: Self = Self { x: 0.0, y: 1.0 };
    pub const XY: Self = Self { x: 1.0, y: 1.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v }
    }

    /// Vector rotated 90 degrees clockwise: [1, 0] -> [0, -1].
    #[inline]
    pub fn perpendicular(self) -> Self {
        Self {
            x: self.y,
            y: -self.x,
        }
    }

    #[inline]
    pub fn magnitude(self) -> f64 {
        self.magnitude2().sqrt()
    }

    #[inline]
    pub fn magnitude2(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    #[inline]
    pub fn cross(self, rhs: Self) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }

    #[inline]
    pub fn perp_dot(self, rhs: Self) -> f64 {
        self.dot(rhs.perpendicular())
    }

    #[inline]
    pub fn distance2(self, rhs: Self) -> f64 {
        (self - rhs).magnitude2()
    }

    #[inline]
    pub fn distance(self, rhs: Self) -> f64 {
        (self - rhs).magnitude()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// True when both components are within 1e-4 of zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x.abs() < 1e-4 && self.y.abs() < 1e-4
    }

    /// Length-1 version of self, or self unchanged when shorter than 1e-8.
    /// The guard keeps the SAT kernel free of divisions by zero.
    #[inline]
    pub fn unit(self) -> Self {
        let m = self.magnitude();
        if m < 1e-8 {
            self
        } else {
            self / m
        }
    }

    #[inline]
    pub fn try_normalize(self) -> Option<Self> {
        let m = self.magnitude();
        if m > f64::EPSILON {
            Some(self / m)
        } else {
            None
        }
    }

    #[inline]
    pub fn normalize(self) -> Self {
        let m = self.magnitude();
        self / m
    }

    #[inline]
    pub fn normalize_to(self, v: f64) -> Self {
        let m = self.magnitude();
        self * (v / m)
    }

    #[inline]
    pub fn dir_dist(self) -> Option<(Self, f64)> {
        let m = self.magnitude();
        if m > 0.0 {
            Some((self / m, m))
        } else {
            None
        }
    }

    /// Unsigned angle between self and other, in `[0, pi]`. Undefined for a
    /// zero-length operand.
    #[inline]
    pub fn angle(self, other: Self) -> f64 {
        self.unit().dot(other.unit()).clamp(-1.0, 1.0).acos()
    }

    #[inline]
    pub fn from_angle(angle: Radians) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    /// Rotates self by `cossin` interpreted as (cos a, sin a), counter-clockwise.
    #[inline]
    pub fn rotated_by(self, cossin: Self) -> Self {
        self.x * cossin - self.y * cossin.perpendicular()
    }

    /// Rotates self by angle in radians, counter-clockwise.
    #[inline]
    pub fn rotated(self, angle: Radians) -> Self {
        self.rotated_by(vec2(angle.cos(), angle.sin()))
    }

    #[inline]
    pub fn lerp(self, other: Self, coeff: f64) -> Self {
        self * (1.0 - coeff) + other * coeff
    }

    /// Spherical-linear interpolation between self and other, both assumed unit length.
    /// Falls back to [`Vec2::lerp`] when the great-circle angle is degenerate.
    pub fn slerp(self, other: Self, coeff: f64) -> Self {
        let omega = self.dot(other).clamp(-1.0, 1.0).acos();
        let sin_omega = omega.sin();
        if sin_omega.abs() < 1e-8 {
            return self.lerp(other, coeff);
        }
        self * (((1.0 - coeff) * omega).sin() / sin_omega)
            + other * ((coeff * omega).sin() / sin_omega)
    }

    /// Reflects self across the plane described by `normal`: v - 2(v.n)n.
    #[inline]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * (2.0 * self.dot(normal))
    }

    #[inline]
    pub fn cap_magnitude(self, max: f64) -> Self {
        let m = self.magnitude();
        if m > max {
            self * max / m
        } else {
            self
        }
    }

    /// Shortens self by `m` world units, flooring at zero length.
    #[inline]
    pub fn sub_magnitude(self, m: f64) -> Self {
        let mag = self.magnitude();
        if mag > m {
            self * ((mag - m) / mag)
        } else {
            Self::ZERO
        }
    }

    /// Sign-preserving enlargement: each component whose absolute value exceeds
    /// `min` grows by `margin` away from zero.
    #[inline]
    pub fn expand(self, margin: f64, min: f64) -> Self {
        let e = |v: f64| {
            if v.abs() > min {
                v + margin * v.signum()
            } else {
                v
            }
        };
        Self {
            x: e(self.x),
            y: e(self.y),
        }
    }

    /// Snaps both components to the nearest multiple of `period`.
    #[inline]
    pub fn snap(self, period: f64) -> Self {
        Self {
            x: (self.x / period).round() * period,
            y: (self.y / period).round() * period,
        }
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }

    #[inline]
    pub fn floor(self) -> Self {
        Self {
            x: self.x.floor(),
            y: self.y.floor(),
        }
    }

    #[inline]
    pub fn sign(self) -> Self {
        Self {
            x: self.x.signum(),
            y: self.y.signum(),
        }
    }

    #[inline]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() < 1e-6 && (self.y - other.y).abs() < 1e-6
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    #[inline]
    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self * rhs.x,
            y: self * rhs.y,
        }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Mul<Vec2> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x * rhs.x,
            y: self.y * rhs.y,
        }
    }
}

impl MulAssign<Vec2> for Vec2 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs
    }
}

impl MulAssign<f64> for Vec2 {
    #[inline]
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn div(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}

impl Div<Vec2> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x / rhs.x,
            y: self.y / rhs.y,
        }
    }
}

impl DivAssign<f64> for Vec2 {
    #[inline]
    fn div_assign(&mut self, rhs: f64) {
        self.x /= rhs;
        self.y /= rhs;
    }
}

impl Neg for Vec2 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl std::iter::Sum for Vec2 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let mut z = Vec2::ZERO;
        for x in iter {
            z += x;
        }
        z
    }
}

impl<'a> std::iter::Sum<&'a Vec2> for Vec2 {
    fn sum<I: Iterator<Item = &'a Vec2>>(iter: I) -> Self {
        let mut z = Vec2::ZERO;
        for &x in iter {
            z += x;
        }
        z
    }
}

impl From<(f64, f64)> for Vec2 {
    #[inline]
    fn from(v: (f64, f64)) -> Self {
        Self { x: v.0, y: v.1 }
    }
}

impl From<Vec2> for (f64, f64) {
    #[inline]
    fn from(v: Vec2) -> Self {
        (v.x, v.y)
    }
}

impl From<[f64; 2]> for Vec2 {
    #[inline]
    fn from(v: [f64; 2]) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

impl From<Vec2> for [f64; 2] {
    #[inline]
    fn from(v: Vec2) -> Self {
        [v.x, v.y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotate() {
        let v = vec2(1.0, 0.0);
        assert!(vec2(0.0, 1.0).approx_eq(v.rotated(Radians(FRAC_PI_2))));
    }

    #[test]
    fn test_angle_is_unsigned() {
        assert!((Vec2::X.angle(Vec2::Y) - FRAC_PI_2).abs() < 1e-12);
        assert!((Vec2::Y.angle(Vec2::X) - FRAC_PI_2).abs() < 1e-12);
        assert!(Vec2::X.angle(vec2(3.0, 0.0)).abs() < 1e-12);
        assert!((Vec2::X.angle(-Vec2::X) - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_unit_zero_guard() {
        let v = vec2(0.0, 0.0);
        assert_eq!(v.unit(), v);
        assert!(vec2(3.0, 4.0).unit().approx_eq(vec2(0.6, 0.8)));
    }

    #[test]
    fn test_sub_magnitude() {
        assert!(vec2(10.0, 0.0).sub_magnitude(4.0).approx_eq(vec2(6.0, 0.0)));
        assert_eq!(vec2(1.0, 0.0).sub_magnitude(5.0), Vec2::ZERO);
    }

    #[test]
    fn test_reflect() {
        let v = vec2(1.0, -1.0);
        assert!(v.reflect(vec2(0.0, 1.0)).approx_eq(vec2(1.0, 1.0)));
    }

    #[test]
    fn test_slerp_endpoints() {
        let a = vec2(1.0, 0.0);
        let b = vec2(0.0, 1.0);
        assert!(a.slerp(b, 0.0).approx_eq(a));
        assert!(a.slerp(b, 1.0).approx_eq(b));
        let mid = a.slerp(b, 0.5);
        assert!((mid.magnitude() - 1.0).abs() < 1e-9);
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!(mid.approx_eq(vec2(s, s)));
    }

    #[test]
    fn test_expand() {
        assert!(vec2(2.0, 0.5)
            .expand(1.0, 1.0)
            .approx_eq(vec2(3.0, 0.5)));
        assert!(vec2(-2.0, -0.5)
            .expand(1.0, 1.0)
            .approx_eq(vec2(-3.0, -0.5)));
    }

    #[test]
    fn test_snap() {
        assert!(vec2(12.4, -7.6).snap(5.0).approx_eq(vec2(10.0, -10.0)));
    }
}
