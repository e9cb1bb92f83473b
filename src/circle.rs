use crate::{Vec2, AABB};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Bounds are the square `[center - r, center + r]`.
    #[inline]
    pub fn bbox(&self) -> AABB {
        AABB {
            ll: self.center - Vec2::splat(self.radius),
            ur: self.center + Vec2::splat(self.radius),
        }
    }

    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        (self.center - other.center).magnitude2() < (self.radius + other.radius).powi(2)
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.center.distance2(p) <= self.radius * self.radius
    }

    #[inline]
    pub fn contains_circle(&self, other: &Self) -> bool {
        self.center.distance(other.center) + other.radius <= self.radius
    }

    /// Minimum translation to move self out of other, pointing from other toward
    /// self. `None` when the circles do not overlap; concentric circles push
    /// along +X.
    pub fn mtv(&self, other: &Self) -> Option<Vec2> {
        let axis = self.center - other.center;
        let overlap = (self.radius + other.radius) - axis.magnitude();
        if overlap <= 0.0 {
            return None;
        }
        let dir = axis.try_normalize().unwrap_or(Vec2::X);
        Some(dir * overlap)
    }

    /// Contact point on self's boundary facing other, paired with other's
    /// outward normal direction at the contact.
    pub(crate) fn contact_with(&self, other: &Self) -> (Vec2, Vec2) {
        let dir = (self.center - other.center)
            .try_normalize()
            .unwrap_or(Vec2::X);
        (self.center - dir * self.radius, dir)
    }
}
