use crate::{vec2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, the broad-phase proxy of every shape.
///
/// Invariant: `ll.x <= ur.x` and `ll.y <= ur.y`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct AABB {
    pub ll: Vec2,
    pub ur: Vec2,
}

impl AABB {
    #[inline]
    pub const fn new(ll: Vec2, ur: Vec2) -> Self {
        AABB { ll, ur }
    }

    /// The smallest `AABB` containing both points, in any order.
    #[inline]
    pub fn enclosing(a: Vec2, b: Vec2) -> Self {
        AABB {
            ll: a.min(b),
            ur: a.max(b),
        }
    }

    #[inline]
    pub fn centered(pos: Vec2, size: Vec2) -> Self {
        AABB {
            ll: pos - size * 0.5,
            ur: pos + size * 0.5,
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self {
            ll: Vec2::ZERO,
            ur: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn w(&self) -> f64 {
        self.ur.x - self.ll.x
    }

    #[inline]
    pub fn h(&self) -> f64 {
        self.ur.y - self.ll.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.ll * 0.5 + self.ur * 0.5
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.w() * self.h()
    }

    #[inline]
    pub fn union(self, other: AABB) -> AABB {
        AABB {
            ll: self.ll.min(other.ll),
            ur: self.ur.max(other.ur),
        }
    }

    #[inline]
    pub fn expand(self, w: f64) -> Self {
        Self {
            ll: self.ll - Vec2::splat(w),
            ur: self.ur + Vec2::splat(w),
        }
    }

    #[inline]
    pub fn translated(self, by: Vec2) -> Self {
        Self {
            ll: self.ll + by,
            ur: self.ur + by,
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.ll.x && p.y >= self.ll.y && p.x <= self.ur.x && p.y <= self.ur.y
    }

    #[inline]
    pub fn contains_aabb(&self, other: &AABB) -> bool {
        self.contains(other.ll) && self.contains(other.ur)
    }

    #[inline]
    pub fn intersects(&self, b: &AABB) -> bool {
        let a = self;
        let x =
            f64::abs((a.ll.x + a.ur.x) - (b.ll.x + b.ur.x)) <= (a.ur.x - a.ll.x + b.ur.x - b.ll.x);
        let y =
            f64::abs((a.ll.y + a.ur.y) - (b.ll.y + b.ur.y)) <= (a.ur.y - a.ll.y + b.ur.y - b.ll.y);

        x & y
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.ll,
            vec2(self.ur.x, self.ll.y),
            self.ur,
            vec2(self.ll.x, self.ur.y),
        ]
    }
}
