use crate::{minmax, vec2, Circle, Error, Radians, Segment, Vec2, AABB};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Directed edge of a transformed polygon with its outward normal.
///
/// With clockwise winding (screen coordinates, Y down) the normal
/// `(v.y, -v.x).unit()` points outward.
#[derive(Copy, Clone, Debug)]
pub struct Edge {
    pub segment: Segment,
    pub normal: Vec2,
}

/// Extent of a shape projected onto an axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    pub min: f64,
    pub max: f64,
}

impl Projection {
    /// Overlap length with `other`; zero or negative means separated.
    #[inline]
    pub fn overlap(self, other: Projection) -> f64 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// True when `other` lies fully inside self.
    #[inline]
    pub fn contains(self, other: Projection) -> bool {
        other.min >= self.min && other.max <= self.max
    }
}

/// Convex polygon (also used for axis-aligned rectangles and, with two points
/// and `closed == false`, line segments).
///
/// Vertices are stored in local space, by convention clockwise on screen. The
/// world transform scales, rotates by `-rotation`, then translates by `position`.
/// Local-space bounds are cached and recomputed on any geometry change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConvexPolygon {
    position: Vec2,
    points: Vec<Vec2>,
    scale: Vec2,
    rotation: Radians,
    closed: bool,
    local_bounds: AABB,
}

impl ConvexPolygon {
    /// Polygon at `(x, y)` from a flat `[x0, y0, x1, y1, ..]` coordinate list.
    pub fn new(x: f64, y: f64, flat_points: &[f64]) -> Result<Self, Error> {
        let points = flat_to_points(flat_points)?;
        if points.len() < 2 {
            return Err(Error::NotEnoughPoints(points.len()));
        }
        let mut p = Self {
            position: vec2(x, y),
            points,
            scale: Vec2::XY,
            rotation: Radians::ZERO,
            closed: true,
            local_bounds: AABB::zero(),
        };
        p.update_bounds();
        Ok(p)
    }

    /// Centre-anchored axis-aligned rectangle.
    pub fn rectangle(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        let (hw, hh) = (w * 0.5, h * 0.5);
        let mut p = Self {
            position: vec2(cx, cy),
            points: vec![
                vec2(-hw, -hh),
                vec2(hw, -hh),
                vec2(hw, hh),
                vec2(-hw, hh),
            ],
            scale: Vec2::XY,
            rotation: Radians::ZERO,
            closed: true,
            local_bounds: AABB::zero(),
        };
        p.update_bounds();
        p
    }

    pub fn rectangle_from_top_left(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::rectangle(x + w * 0.5, y + h * 0.5, w, h)
    }

    pub fn rectangle_from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let bb = AABB::enclosing(vec2(x1, y1), vec2(x2, y2));
        let c = bb.center();
        Self::rectangle(c.x, c.y, bb.w(), bb.h())
    }

    /// Two-vertex open polygon centred at the segment midpoint.
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let a = vec2(x1, y1);
        let b = vec2(x2, y2);
        let mid = (a + b) * 0.5;
        let mut p = Self {
            position: mid,
            points: vec![a - mid, b - mid],
            scale: Vec2::XY,
            rotation: Radians::ZERO,
            closed: false,
            local_bounds: AABB::zero(),
        };
        p.update_bounds();
        p
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn set_position(&mut self, pos: Vec2) {
        self.position = pos;
    }

    #[inline]
    pub fn translate(&mut self, by: Vec2) {
        self.position += by;
    }

    #[inline]
    pub fn rotation(&self) -> Radians {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Radians) {
        self.rotation = rotation.normalized();
        self.update_bounds();
    }

    pub fn rotate(&mut self, by: Radians) {
        self.set_rotation(self.rotation + by);
    }

    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.update_bounds();
    }

    #[inline]
    pub fn closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Appends local-space vertices from a flat coordinate list.
    /// The polygon is left unmodified on error.
    pub fn add_points(&mut self, flat_points: &[f64]) -> Result<(), Error> {
        let added = flat_to_points(flat_points)?;
        self.points.extend(added);
        self.update_bounds();
        Ok(())
    }

    pub fn set_points(&mut self, points: Vec<Vec2>) -> Result<(), Error> {
        if points.len() < 2 {
            return Err(Error::NotEnoughPoints(points.len()));
        }
        self.points = points;
        self.update_bounds();
        Ok(())
    }

    /// Cached local bounds translated by position.
    #[inline]
    pub fn bbox(&self) -> AABB {
        self.local_bounds.translated(self.position)
    }

    #[inline]
    fn to_world(&self, p: Vec2) -> Vec2 {
        (p * self.scale).rotated(-self.rotation) + self.position
    }

    /// Fresh array of world-space vertices.
    pub fn transformed(&self) -> Vec<Vec2> {
        self.points.iter().map(|&p| self.to_world(p)).collect()
    }

    /// Directed edges of the transformed polygon. Open polylines with more than
    /// two points have no closing edge.
    pub fn edges(&self) -> Vec<Edge> {
        let pts = self.transformed();
        let n = pts.len();
        if n < 2 {
            return vec![];
        }
        let count = if self.closed && n > 2 { n } else { n - 1 };
        (0..count)
            .map(|i| {
                let src = pts[i];
                let dst = pts[(i + 1) % n];
                Edge {
                    segment: Segment::new(src, dst),
                    normal: (dst - src).perpendicular().unit(),
                }
            })
            .collect()
    }

    /// One outward edge normal per edge.
    pub fn sat_axes(&self) -> Vec<Vec2> {
        self.edges().into_iter().map(|e| e.normal).collect()
    }

    /// Projects every transformed vertex onto `axis.unit()`.
    pub fn project(&self, axis: Vec2) -> Projection {
        let axis = axis.unit();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for p in self.transformed() {
            let d = p.dot(axis);
            min = min.min(d);
            max = max.max(d);
        }
        Projection { min, max }
    }

    pub fn closest_vertex(&self, to: Vec2) -> Vec2 {
        self.transformed()
            .into_iter()
            .min_by_key(|p| OrderedFloat(p.distance2(to)))
            .unwrap_or(self.position)
    }

    /// Minimum translation to move self out of `other`, pointing in the direction
    /// self must move. `None` when a separating axis exists.
    pub fn mtv(&self, other: &ConvexPolygon) -> Option<Vec2> {
        let mut smallest = f64::INFINITY;
        let mut best = Vec2::ZERO;

        for axis in self.sat_axes().into_iter().chain(other.sat_axes()) {
            let ov = self.project(axis).overlap(other.project(axis));
            if ov <= 0.0 {
                return None;
            }
            if ov < smallest {
                smallest = ov;
                best = axis;
            }
        }

        let delta = self.bbox().center() - other.bbox().center();
        if best.dot(delta) < 0.0 {
            best = -best;
        }
        Some(best * smallest)
    }

    /// Polygon/circle MTV, same sign convention as [`ConvexPolygon::mtv`].
    /// The first axis tested joins the circle centre to the closest vertex.
    pub fn mtv_circle(&self, circle: &Circle) -> Option<Vec2> {
        let mut axes = Vec::with_capacity(self.points.len() + 1);
        if let Some(first) = (circle.center - self.closest_vertex(circle.center)).try_normalize() {
            axes.push(first);
        }
        axes.extend(self.sat_axes());

        let mut smallest = f64::INFINITY;
        let mut best = Vec2::ZERO;

        for axis in axes {
            let a = self.project(axis);
            let c = circle.center.dot(axis);
            let b = Projection {
                min: c - circle.radius,
                max: c + circle.radius,
            };
            let ov = a.overlap(b);
            if ov <= 0.0 {
                return None;
            }
            if ov < smallest {
                smallest = ov;
                best = axis;
            }
        }

        let delta = self.bbox().center() - circle.center;
        if best.dot(delta) < 0.0 {
            best = -best;
        }
        Some(best * smallest)
    }

    /// SAT containment: every projection of self fits inside other's.
    pub fn contained_by(&self, other: &ConvexPolygon) -> bool {
        for axis in self.sat_axes().into_iter().chain(other.sat_axes()) {
            if !other.project(axis).contains(self.project(axis)) {
                return false;
            }
        }
        true
    }

    /// True when the circle lies fully inside the polygon: the centre is inside
    /// and every edge line is at least `radius` away.
    pub fn contains_circle(&self, circle: &Circle) -> bool {
        if !self.closed || !self.contains_point(circle.center) {
            return false;
        }
        self.edges().iter().all(|e| {
            (circle.center - e.segment.src).dot(e.normal) <= -circle.radius
        })
    }

    /// Crossing-number point test on the transformed polygon.
    /// Always false for open polylines.
    pub fn contains_point(&self, p: Vec2) -> bool {
        if !self.closed || self.points.len() < 3 {
            return false;
        }
        let pts = self.transformed();
        let nvert = pts.len();

        let mut j = nvert - 1;
        let mut c = false;

        for i in 0..nvert {
            let verti = pts[i];
            let vertj = pts[j];
            let off = vertj - verti;

            let vip = p - verti;
            let vjp = p - vertj;

            if ((vip.y < 0.0) != (vjp.y < 0.0))
                && (vip.x * off.y.abs() < off.x * vip.y * off.y.signum())
            {
                c = !c;
            }
            j = i;
        }
        c
    }

    /// Negates every local X and reverses vertex order to preserve winding
    /// (and therefore outward normals).
    pub fn flip_h(&mut self) {
        for p in &mut self.points {
            p.x = -p.x;
        }
        self.points.reverse();
        self.update_bounds();
    }

    /// Negates every local Y and reverses vertex order to preserve winding.
    pub fn flip_v(&mut self) {
        for p in &mut self.points {
            p.y = -p.y;
        }
        self.points.reverse();
        self.update_bounds();
    }

    /// Moves the local centroid to the origin, compensating `position` so the
    /// transformed polygon is unchanged.
    pub fn recenter_points(&mut self) {
        let mean = self.points.iter().sum::<Vec2>() / (self.points.len() as f64);
        for p in &mut self.points {
            *p -= mean;
        }
        self.position += (mean * self.scale).rotated(-self.rotation);
        self.update_bounds();
    }

    pub fn barycenter(&self) -> Vec2 {
        self.transformed().iter().sum::<Vec2>() / (self.points.len() as f64)
    }

    fn update_bounds(&mut self) {
        let local: Vec<Vec2> = self
            .points
            .iter()
            .map(|&p| (p * self.scale).rotated(-self.rotation))
            .collect();
        self.local_bounds = match minmax(&local) {
            Some((min, max)) => AABB::new(min, max),
            None => AABB::zero(),
        };
    }
}

fn flat_to_points(flat: &[f64]) -> Result<Vec<Vec2>, Error> {
    if flat.len() % 2 != 0 {
        return Err(Error::OddCoordinates(flat.len()));
    }
    if flat.len() < 2 {
        return Err(Error::NotEnoughPoints(0));
    }
    Ok(flat.chunks_exact(2).map(|c| vec2(c[0], c[1])).collect())
}
