//! User-facing collision queries: segment casts, shape casts, and per-shape
//! intersection sweeps. All scratch state is per call, so callbacks may issue
//! further queries on the same space.

use crate::{
    Intersection, IntersectionSet, Segment, Shape, ShapeHandle, ShapeIterator, ShapeKind, Space,
    Vec2,
};
use fnv::{FnvHashMap, FnvHashSet};
use ordered_float::OrderedFloat;

// an edge faces the cast direction when its outward normal has at least this
// much alignment with it
const LEADING_EDGE_DOT: f64 = 0.01;

/// Settings for [`line_test`]: a single segment cast from `start` to `end`.
pub struct LineTestSettings<I, F> {
    pub start: Vec2,
    pub end: Vec2,
    /// Candidate shapes, e.g. `&space` or a [`crate::CellSelection`].
    pub test_against: I,
    /// Called once per hit shape in ascending distance from `start`; return
    /// false to stop.
    pub on_intersect: F,
    /// Shape to skip, usually the caster itself.
    pub calling_shape: Option<ShapeHandle>,
}

/// Casts a segment against every shape of the iterator and reports one
/// [`IntersectionSet`] per hit shape, nearest first. Returns true when
/// anything was hit, even if the callback stopped early.
///
/// The set's `mtv` is the displacement from `start` to the nearest contact on
/// that shape, so `|mtv|` is the hit distance.
pub fn line_test<O, I, F>(settings: LineTestSettings<I, F>) -> bool
where
    I: ShapeIterator<O>,
    F: FnMut(&IntersectionSet, usize, usize) -> bool,
{
    let LineTestSettings {
        start,
        end,
        test_against,
        mut on_intersect,
        calling_shape,
    } = settings;

    let seg = Segment::new(start, end);
    let mut hits: Vec<IntersectionSet> = vec![];
    test_against.for_each_shape(&mut |h, shape| {
        if Some(h) == calling_shape {
            return true;
        }
        if let Some(mut set) = cast_segment(&seg, shape) {
            set.other = Some(h);
            hits.push(set);
        }
        true
    });

    deliver_sorted(&mut hits, &mut on_intersect)
}

/// Settings for [`Space::intersection_test`]: "who am I touching?".
pub struct IntersectionTestSettings<I, F> {
    pub test_against: I,
    /// Called once per overlapping shape; return false to stop.
    pub on_intersect: F,
}

/// Settings for [`Space::shape_line_test`]: rays of length `|vector|` cast
/// from the calling shape's surface along `vector`.
pub struct ShapeLineTestSettings<I, F> {
    /// Direction and reach of every cast.
    pub vector: Vec2,
    pub test_against: I,
    /// Called once per hit shape in ascending `|mtv|`; return false to stop.
    pub on_intersect: F,
    /// Extra displacement applied to every cast origin.
    pub start_offset: Vec2,
    /// Cast from every vertex instead of only the leading-edge vertices.
    pub include_all_points: bool,
    /// Restrict casting to these edge indices of the calling polygon.
    pub edges: Option<Vec<usize>>,
}

impl<I, F> ShapeLineTestSettings<I, F> {
    pub fn new(vector: Vec2, test_against: I, on_intersect: F) -> Self {
        Self {
            vector,
            test_against,
            on_intersect,
            start_offset: Vec2::ZERO,
            include_all_points: false,
            edges: None,
        }
    }
}

impl<O> Space<O> {
    /// Computes `calling.intersection(other)` for every candidate and hands
    /// each non-empty set to the callback. Returns true when at least one
    /// overlap was found.
    pub fn intersection_test<I, F>(
        &self,
        h: ShapeHandle,
        settings: IntersectionTestSettings<I, F>,
    ) -> bool
    where
        I: ShapeIterator<O>,
        F: FnMut(&IntersectionSet) -> bool,
    {
        let Some(calling) = self.get(h) else {
            return false;
        };
        let IntersectionTestSettings {
            test_against,
            mut on_intersect,
        } = settings;

        let mut any = false;
        test_against.for_each_shape(&mut |other_h, other| {
            if other_h == h {
                return true;
            }
            match calling.intersection(other) {
                Some(mut set) => {
                    set.other = Some(other_h);
                    any = true;
                    on_intersect(&set)
                }
                None => true,
            }
        });
        any
    }

    /// Casts rays along `settings.vector` from the calling shape and merges
    /// the hits so every other shape appears at most once, nearest first.
    ///
    /// Ray origins are the vertices of the shape's leading edges (outward
    /// normal aligned with the cast direction), pulled half a unit inward
    /// along their edge so a ray does not graze the neighbouring edge. Each
    /// origin is then pushed back by one unit of the cast direction, plus
    /// `start_offset`, so the ray starts just outside the surface. Circles
    /// cast a single ray from their centre.
    pub fn shape_line_test<I, F>(&self, h: ShapeHandle, settings: ShapeLineTestSettings<I, F>) -> bool
    where
        I: ShapeIterator<O>,
        F: FnMut(&IntersectionSet, usize, usize) -> bool,
    {
        let Some(calling) = self.get(h) else {
            return false;
        };
        let ShapeLineTestSettings {
            vector,
            test_against,
            mut on_intersect,
            start_offset,
            include_all_points,
            edges,
        } = settings;

        let sources = cast_sources(calling, vector, include_all_points, edges.as_deref());

        let mut merged: Vec<IntersectionSet> = vec![];
        let mut by_other: FnvHashMap<ShapeHandle, usize> = FnvHashMap::default();
        for source in sources {
            let start = source - vector.unit() - start_offset;
            let seg = Segment::new(start, start + vector);
            test_against.for_each_shape(&mut |other_h, other| {
                if other_h == h {
                    return true;
                }
                if let Some(mut set) = cast_segment(&seg, other) {
                    set.other = Some(other_h);
                    match by_other.get(&other_h) {
                        Some(&i) => merged[i].merge(set),
                        None => {
                            by_other.insert(other_h, merged.len());
                            merged.push(set);
                        }
                    }
                }
                true
            });
        }

        deliver_sorted(&mut merged, &mut on_intersect)
    }
}

/// All contacts of a segment with one shape, or `None` when it misses.
fn cast_segment(seg: &Segment, shape: &Shape) -> Option<IntersectionSet> {
    let mut contacts: Vec<Intersection> = vec![];
    match shape.kind() {
        ShapeKind::Polygon(p) => {
            for edge in p.edges() {
                if let Some(point) = seg.intersection_point(&edge.segment) {
                    contacts.push(Intersection {
                        point,
                        normal: edge.normal,
                    });
                }
            }
        }
        ShapeKind::Circle(c) => {
            for point in seg.circle_intersection_points(c) {
                contacts.push(Intersection {
                    point,
                    normal: (point - c.center).unit(),
                });
            }
        }
    }
    if contacts.is_empty() {
        return None;
    }

    let nearest = contacts
        .iter()
        .map(|i| i.point)
        .min_by_key(|p| OrderedFloat(p.distance2(seg.src)))?;
    Some(IntersectionSet::new(contacts, seg.src, nearest - seg.src))
}

/// Ray origins on the calling shape's surface for a cast along `vector`.
fn cast_sources(
    calling: &Shape,
    vector: Vec2,
    include_all_points: bool,
    edge_indices: Option<&[usize]>,
) -> Vec<Vec2> {
    let poly = match calling.kind() {
        ShapeKind::Circle(c) => return vec![c.center],
        ShapeKind::Polygon(p) => p,
    };
    if include_all_points {
        return poly.transformed();
    }

    let mut seen: FnvHashSet<(u64, u64)> = FnvHashSet::default();
    let mut sources = vec![];
    let mut push = |p: Vec2| {
        if seen.insert((p.x.to_bits(), p.y.to_bits())) {
            sources.push(p);
        }
    };
    for (i, edge) in poly.edges().iter().enumerate() {
        if let Some(wanted) = edge_indices {
            if !wanted.contains(&i) {
                continue;
            }
        }
        if edge.normal.dot(vector) <= LEADING_EDGE_DOT {
            continue;
        }
        let along = edge.segment.vec().unit() * 0.5;
        push(edge.segment.src + along);
        push(edge.segment.dst - along);
    }
    sources
}

/// Sorts by ascending `|mtv|` and feeds the callback. True iff non-empty.
fn deliver_sorted(
    hits: &mut [IntersectionSet],
    on_intersect: &mut dyn FnMut(&IntersectionSet, usize, usize) -> bool,
) -> bool {
    hits.sort_by_key(|s| OrderedFloat(s.mtv.magnitude2()));
    let count = hits.len();
    for (i, set) in hits.iter().enumerate() {
        if !on_intersect(set, i, count) {
            break;
        }
    }
    count > 0
}
