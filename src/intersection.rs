use crate::{ShapeHandle, Vec2};

/// A single contact point with a surface normal.
///
/// The normal always belongs to the *counterpart's* surface at the contact:
/// the other polygon's edge normal, or the other circle's outward boundary
/// normal. Line casts follow the same rule, tagging each crossing with the
/// normal of the surface it crossed.
#[derive(Copy, Clone, Debug)]
pub struct Intersection {
    pub point: Vec2,
    pub normal: Vec2,
}

/// Contact data for one overlapping pair, as delivered to query callbacks.
///
/// `mtv` is the smallest vector by which the calling shape must move to cease
/// overlap (for line casts: the displacement from the cast start to the nearest
/// contact). `center` is the arithmetic mean of the contact points. `other` is
/// the counterpart shape when the test ran inside a [`crate::Space`].
#[derive(Clone, Debug)]
pub struct IntersectionSet {
    pub intersections: Vec<Intersection>,
    pub center: Vec2,
    pub mtv: Vec2,
    pub other: Option<ShapeHandle>,
}

impl IntersectionSet {
    pub(crate) fn new(intersections: Vec<Intersection>, fallback_center: Vec2, mtv: Vec2) -> Self {
        let center = if intersections.is_empty() {
            fallback_center
        } else {
            intersections.iter().map(|i| i.point).sum::<Vec2>() / intersections.len() as f64
        };
        Self {
            intersections,
            center,
            mtv,
            other: None,
        }
    }

    /// Folds another set for the same counterpart into self: contacts
    /// accumulate, the smaller-magnitude MTV wins.
    pub(crate) fn merge(&mut self, other: IntersectionSet) {
        if other.mtv.magnitude2() < self.mtv.magnitude2() {
            self.mtv = other.mtv;
        }
        self.intersections.extend(other.intersections);
        if !self.intersections.is_empty() {
            self.center = self.intersections.iter().map(|i| i.point).sum::<Vec2>()
                / self.intersections.len() as f64;
        }
    }
}
