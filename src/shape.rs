use crate::{
    vec2, Circle, ConvexPolygon, Error, Intersection, IntersectionSet, Radians, Tags, Vec2, AABB,
};
use serde::{Deserialize, Serialize};
use std::ops::Neg;

/// Convex collision primitive: a circle or a convex polygon.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle(Circle),
    Polygon(ConvexPolygon),
}

/// A tagged convex primitive. Created detached; ownership moves into a
/// [`crate::Space`] on `add` and comes back on `remove`.
///
/// Mutators that exist only for one variant (rotation, scale, radius) are
/// no-ops on the other, mirroring the polymorphic surface of the primitives.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Shape {
    kind: ShapeKind,
    tags: Tags,
}

impl Shape {
    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Self::from_kind(ShapeKind::Circle(Circle::new(vec2(x, y), radius)))
    }

    pub fn polygon(x: f64, y: f64, flat_points: &[f64]) -> Result<Self, Error> {
        Ok(Self::from_kind(ShapeKind::Polygon(ConvexPolygon::new(
            x,
            y,
            flat_points,
        )?)))
    }

    pub fn rectangle(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::from_kind(ShapeKind::Polygon(ConvexPolygon::rectangle(cx, cy, w, h)))
    }

    pub fn rectangle_from_top_left(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::from_kind(ShapeKind::Polygon(ConvexPolygon::rectangle_from_top_left(
            x, y, w, h,
        )))
    }

    pub fn rectangle_from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::from_kind(ShapeKind::Polygon(ConvexPolygon::rectangle_from_corners(
            x1, y1, x2, y2,
        )))
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::from_kind(ShapeKind::Polygon(ConvexPolygon::line(x1, y1, x2, y2)))
    }

    fn from_kind(kind: ShapeKind) -> Self {
        Self {
            kind,
            tags: Tags::NONE,
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    #[inline]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    #[inline]
    pub fn tags(&self) -> Tags {
        self.tags
    }

    #[inline]
    pub fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }

    #[inline]
    pub fn set_tags(&mut self, tags: Tags) {
        self.tags = tags;
    }

    #[inline]
    pub fn as_circle(&self) -> Option<&Circle> {
        match &self.kind {
            ShapeKind::Circle(c) => Some(c),
            ShapeKind::Polygon(_) => None,
        }
    }

    #[inline]
    pub fn as_polygon(&self) -> Option<&ConvexPolygon> {
        match &self.kind {
            ShapeKind::Polygon(p) => Some(p),
            ShapeKind::Circle(_) => None,
        }
    }

    #[inline]
    pub fn as_polygon_mut(&mut self) -> Option<&mut ConvexPolygon> {
        match &mut self.kind {
            ShapeKind::Polygon(p) => Some(p),
            ShapeKind::Circle(_) => None,
        }
    }

    #[inline]
    pub fn as_circle_mut(&mut self) -> Option<&mut Circle> {
        match &mut self.kind {
            ShapeKind::Circle(c) => Some(c),
            ShapeKind::Polygon(_) => None,
        }
    }

    pub fn position(&self) -> Vec2 {
        match &self.kind {
            ShapeKind::Circle(c) => c.center,
            ShapeKind::Polygon(p) => p.position(),
        }
    }

    pub fn set_position(&mut self, pos: Vec2) {
        match &mut self.kind {
            ShapeKind::Circle(c) => c.center = pos,
            ShapeKind::Polygon(p) => p.set_position(pos),
        }
    }

    pub fn translate(&mut self, by: Vec2) {
        self.set_position(self.position() + by);
    }

    /// No-op for circles.
    pub fn set_rotation(&mut self, rotation: Radians) {
        if let ShapeKind::Polygon(p) = &mut self.kind {
            p.set_rotation(rotation);
        }
    }

    /// No-op for circles.
    pub fn rotate(&mut self, by: Radians) {
        if let ShapeKind::Polygon(p) = &mut self.kind {
            p.rotate(by);
        }
    }

    /// No-op for circles.
    pub fn set_scale(&mut self, scale: Vec2) {
        if let ShapeKind::Polygon(p) = &mut self.kind {
            p.set_scale(scale);
        }
    }

    /// No-op for polygons.
    pub fn set_radius(&mut self, radius: f64) {
        if let ShapeKind::Circle(c) = &mut self.kind {
            c.radius = radius;
        }
    }

    pub fn bbox(&self) -> AABB {
        match &self.kind {
            ShapeKind::Circle(c) => c.bbox(),
            ShapeKind::Polygon(p) => p.bbox(),
        }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        match &self.kind {
            ShapeKind::Circle(c) => c.contains_point(p),
            ShapeKind::Polygon(poly) => poly.contains_point(p),
        }
    }

    /// Minimum translation to move self out of `other`; `None` when separated.
    pub fn mtv(&self, other: &Shape) -> Option<Vec2> {
        match (&self.kind, &other.kind) {
            (ShapeKind::Polygon(a), ShapeKind::Polygon(b)) => a.mtv(b),
            (ShapeKind::Polygon(a), ShapeKind::Circle(b)) => a.mtv_circle(b),
            (ShapeKind::Circle(a), ShapeKind::Polygon(b)) => b.mtv_circle(a).map(Neg::neg),
            (ShapeKind::Circle(a), ShapeKind::Circle(b)) => a.mtv(b),
        }
    }

    /// Full narrow-phase test: MTV plus contact points with per-point normals.
    /// `None` when the shapes do not overlap.
    pub fn intersection(&self, other: &Shape) -> Option<IntersectionSet> {
        let mtv = self.mtv(other)?;
        let fallback = (self.position() + other.position()) * 0.5;

        let contacts = match (&self.kind, &other.kind) {
            (ShapeKind::Polygon(a), ShapeKind::Polygon(b)) => polygon_contacts(a, b),
            (ShapeKind::Polygon(a), ShapeKind::Circle(b)) => polygon_circle_contacts(a, b),
            (ShapeKind::Circle(a), ShapeKind::Polygon(b)) => circle_polygon_contacts(a, b),
            (ShapeKind::Circle(a), ShapeKind::Circle(b)) => {
                let (point, normal) = a.contact_with(b);
                vec![Intersection { point, normal }]
            }
        };

        Some(IntersectionSet::new(contacts, fallback, mtv))
    }

    /// True when self lies fully inside `other`.
    pub fn contained_by(&self, other: &Shape) -> bool {
        match (&self.kind, &other.kind) {
            (ShapeKind::Polygon(a), ShapeKind::Polygon(b)) => a.contained_by(b),
            (ShapeKind::Circle(a), ShapeKind::Polygon(b)) => b.contains_circle(a),
            (ShapeKind::Polygon(a), ShapeKind::Circle(b)) => {
                a.transformed().into_iter().all(|p| b.contains_point(p))
            }
            (ShapeKind::Circle(a), ShapeKind::Circle(b)) => b.contains_circle(a),
        }
    }
}

/// Contact points of two overlapping polygons: every edge of `a` against every
/// edge of `b`, each crossing tagged with the normal of `b`'s edge.
fn polygon_contacts(a: &ConvexPolygon, b: &ConvexPolygon) -> Vec<Intersection> {
    let mut out = vec![];
    let b_edges = b.edges();
    for ea in a.edges() {
        for eb in &b_edges {
            if let Some(point) = ea.segment.intersection_point(&eb.segment) {
                out.push(Intersection {
                    point,
                    normal: eb.normal,
                });
            }
        }
    }
    out
}

fn polygon_circle_contacts(a: &ConvexPolygon, c: &Circle) -> Vec<Intersection> {
    let mut out = vec![];
    for e in a.edges() {
        for point in e.segment.circle_intersection_points(c) {
            out.push(Intersection {
                point,
                normal: (point - c.center).unit(),
            });
        }
    }
    out
}

fn circle_polygon_contacts(c: &Circle, b: &ConvexPolygon) -> Vec<Intersection> {
    let mut out = vec![];
    for e in b.edges() {
        for point in e.segment.circle_intersection_points(c) {
            out.push(Intersection {
                point,
                normal: e.normal,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_rect_contacts() {
        // coincident edge overlap produces the two corner-region contacts
        let a = Shape::rectangle(0.0, 0.0, 10.0, 10.0);
        let b = Shape::rectangle(6.0, 0.0, 10.0, 10.0);
        let set = a.intersection(&b).unwrap();
        assert!(set.mtv.approx_eq(vec2(-4.0, 0.0)));
        assert_eq!(set.intersections.len(), 2);
        let mut ys: Vec<f64> = set.intersections.iter().map(|i| i.point.y).collect();
        ys.sort_by(|p, q| p.partial_cmp(q).unwrap());
        assert!((set.intersections[0].point.x - 1.0).abs() < 0.2);
        assert!((ys[0] + 5.0).abs() < 0.2);
        assert!((ys[1] - 5.0).abs() < 0.2);
        assert!((set.center.x - 1.0).abs() < 0.2);
    }

    #[test]
    fn test_existence_symmetry() {
        let a = Shape::rectangle(0.0, 0.0, 10.0, 10.0);
        let b = Shape::circle(8.0, 0.0, 5.0);
        assert_eq!(
            a.intersection(&b).is_some(),
            b.intersection(&a).is_some()
        );
        let far = Shape::circle(30.0, 0.0, 5.0);
        assert_eq!(
            a.intersection(&far).is_some(),
            far.intersection(&a).is_some()
        );
    }

    #[test]
    fn test_circle_polygon_mtv_sign() {
        let rect = Shape::rectangle(0.0, 0.0, 10.0, 10.0);
        let circle = Shape::circle(8.0, 0.0, 5.0);
        // the circle must move right to leave the rectangle
        assert!(circle.mtv(&rect).unwrap().approx_eq(vec2(2.0, 0.0)));
        assert!(rect.mtv(&circle).unwrap().approx_eq(vec2(-2.0, 0.0)));
    }

    #[test]
    fn test_containment_yields_set() {
        // no edge crossings, but an MTV and a fallback center
        let big = Shape::rectangle(0.0, 0.0, 20.0, 20.0);
        let small = Shape::rectangle(1.0, 0.0, 2.0, 2.0);
        let set = small.intersection(&big).unwrap();
        assert!(set.intersections.is_empty());
        assert!(!set.mtv.is_zero());
        assert!(set.center.approx_eq(vec2(0.5, 0.0)));
    }

    #[test]
    fn test_line_vs_rect_is_degenerate() {
        // a zero-thickness segment has no extent along its own normal, so SAT
        // reports separation; segments are meant to be hit through line casts
        let line = Shape::line(-10.0, 0.0, 10.0, 0.0);
        let rect = Shape::rectangle(0.0, 3.0, 10.0, 10.0);
        assert!(line.intersection(&rect).is_none());
    }

    #[test]
    fn test_mutators_ignore_wrong_kind() {
        let mut c = Shape::circle(0.0, 0.0, 5.0);
        c.rotate(Radians(1.0));
        c.set_scale(vec2(2.0, 2.0));
        assert_eq!(c.bbox().w(), 10.0);
        c.set_radius(2.0);
        assert_eq!(c.bbox().w(), 4.0);

        let mut r = Shape::rectangle(0.0, 0.0, 4.0, 4.0);
        r.set_radius(100.0);
        assert_eq!(r.bbox().w(), 4.0);
    }
}
