use crate::{CellSelection, Shape, ShapeHandle, Space, Tags, Vec2};
use ordered_float::OrderedFloat;

/// Anything that can hand out shapes one by one: a whole [`Space`], a
/// [`CellSelection`], or a [`BoundCollection`].
pub trait ShapeIterator<O> {
    fn space(&self) -> &Space<O>;

    /// Visits shapes until exhausted or `f` returns false.
    fn for_each_shape(&self, f: &mut dyn FnMut(ShapeHandle, &Shape) -> bool);
}

impl<'a, O> ShapeIterator<O> for &'a Space<O> {
    fn space(&self) -> &Space<O> {
        self
    }

    fn for_each_shape(&self, f: &mut dyn FnMut(ShapeHandle, &Shape) -> bool) {
        Space::for_each_shape(self, |h, s, _, _| f(h, s));
    }
}

enum Source<'a, O> {
    Cells(CellSelection<'a, O>),
    Handles(&'a Space<O>, &'a [ShapeHandle]),
}

/// Lazy chain of predicates over a shape source. Predicates are only evaluated
/// when a terminal (`shapes`, `first`, `count`, ...) runs, in the order they
/// were added.
pub struct ShapeFilter<'a, O = ()> {
    source: Source<'a, O>,
    #[allow(clippy::type_complexity)]
    predicates: Vec<Box<dyn Fn(ShapeHandle, &Shape) -> bool + 'a>>,
}

impl<'a, O> ShapeFilter<'a, O> {
    pub(crate) fn from_cells(sel: CellSelection<'a, O>) -> Self {
        Self {
            source: Source::Cells(sel),
            predicates: vec![],
        }
    }

    pub(crate) fn from_handles(space: &'a Space<O>, handles: &'a [ShapeHandle]) -> Self {
        Self {
            source: Source::Handles(space, handles),
            predicates: vec![],
        }
    }

    /// Keep shapes sharing at least one bit with `tags`.
    pub fn by_tags(mut self, tags: Tags) -> Self {
        self.predicates
            .push(Box::new(move |_, s| s.tags().has(tags)));
        self
    }

    pub fn not_by_tags(mut self, tags: Tags) -> Self {
        self.predicates
            .push(Box::new(move |_, s| !s.tags().has(tags)));
        self
    }

    /// Keep shapes whose position lies within `[min, max]` of `point`.
    pub fn by_distance(mut self, point: Vec2, min: f64, max: f64) -> Self {
        self.predicates.push(Box::new(move |_, s| {
            let d = s.position().distance(point);
            d >= min && d <= max
        }));
        self
    }

    pub fn by_func(mut self, f: impl Fn(ShapeHandle, &Shape) -> bool + 'a) -> Self {
        self.predicates.push(Box::new(f));
        self
    }

    /// Drop the given shapes.
    pub fn not(mut self, excluded: &[ShapeHandle]) -> Self {
        let excluded = excluded.to_vec();
        self.predicates
            .push(Box::new(move |h, _| !excluded.contains(&h)));
        self
    }

    /// Visits every shape passing all predicates; stops when `f` returns false.
    pub fn for_each(&self, mut f: impl FnMut(ShapeHandle, &Shape) -> bool) {
        let mut wrapped = |h: ShapeHandle, s: &Shape| {
            if self.predicates.iter().all(|p| p(h, s)) {
                f(h, s)
            } else {
                true
            }
        };
        match &self.source {
            Source::Cells(sel) => sel.for_each(wrapped),
            Source::Handles(space, handles) => {
                for &h in *handles {
                    let Some(s) = space.get(h) else { continue };
                    if !wrapped(h, s) {
                        return;
                    }
                }
            }
        }
    }

    /// Collects all passing shapes.
    pub fn shapes(&self) -> ShapeCollection {
        let mut out = ShapeCollection::default();
        self.for_each(|h, _| {
            out.push(h);
            true
        });
        out
    }

    pub fn first(&self) -> Option<ShapeHandle> {
        let mut out = None;
        self.for_each(|h, _| {
            out = Some(h);
            false
        });
        out
    }

    pub fn last(&self) -> Option<ShapeHandle> {
        let mut out = None;
        self.for_each(|h, _| {
            out = Some(h);
            true
        });
        out
    }

    pub fn count(&self) -> usize {
        let mut n = 0;
        self.for_each(|_, _| {
            n += 1;
            true
        });
        n
    }
}

impl<'a, O> ShapeIterator<O> for ShapeFilter<'a, O> {
    fn space(&self) -> &Space<O> {
        match &self.source {
            Source::Cells(sel) => sel.space(),
            Source::Handles(space, _) => space,
        }
    }

    fn for_each_shape(&self, f: &mut dyn FnMut(ShapeHandle, &Shape) -> bool) {
        self.for_each(f);
    }
}

/// A flat, ordered list of shape handles collected from a query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeCollection {
    handles: Vec<ShapeHandle>,
}

impl ShapeCollection {
    pub(crate) fn push(&mut self, h: ShapeHandle) {
        self.handles.push(h);
    }

    #[inline]
    pub fn handles(&self) -> &[ShapeHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn contains(&self, h: ShapeHandle) -> bool {
        self.handles.contains(&h)
    }

    pub fn iter(&self) -> impl Iterator<Item = ShapeHandle> + '_ {
        self.handles.iter().copied()
    }

    /// Stable ascending sort by squared distance of each shape's position to
    /// `point`. Handles no longer in the space sort last.
    pub fn sort_by_distance<O>(&mut self, space: &Space<O>, point: Vec2) {
        self.handles.sort_by_key(|&h| {
            OrderedFloat(
                space
                    .get(h)
                    .map_or(f64::INFINITY, |s| s.position().distance2(point)),
            )
        });
    }

    /// Pairs the handles with their space so the collection can feed queries
    /// and filters.
    pub fn bind<'a, O>(&'a self, space: &'a Space<O>) -> BoundCollection<'a, O> {
        BoundCollection {
            space,
            handles: &self.handles,
        }
    }
}

impl FromIterator<ShapeHandle> for ShapeCollection {
    fn from_iter<T: IntoIterator<Item = ShapeHandle>>(iter: T) -> Self {
        Self {
            handles: iter.into_iter().collect(),
        }
    }
}

/// A [`ShapeCollection`] borrowed alongside its [`Space`].
#[derive(Copy, Clone)]
pub struct BoundCollection<'a, O = ()> {
    space: &'a Space<O>,
    handles: &'a [ShapeHandle],
}

impl<'a, O> BoundCollection<'a, O> {
    pub fn for_each(&self, mut f: impl FnMut(ShapeHandle, &Shape) -> bool) {
        for &h in self.handles {
            let Some(s) = self.space.get(h) else { continue };
            if !f(h, s) {
                return;
            }
        }
    }

    pub fn filter_shapes(self) -> ShapeFilter<'a, O> {
        ShapeFilter::from_handles(self.space, self.handles)
    }
}

impl<'a, O> ShapeIterator<O> for BoundCollection<'a, O> {
    fn space(&self) -> &Space<O> {
        self.space
    }

    fn for_each_shape(&self, f: &mut dyn FnMut(ShapeHandle, &Shape) -> bool) {
        self.for_each(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{vec2, TagRegistry};

    fn world() -> (Space<&'static str>, Tags, Tags) {
        let mut reg = TagRegistry::new();
        let solid = reg.tag("solid").unwrap();
        let sensor = reg.tag("sensor").unwrap();

        let mut space: Space<&'static str> = Space::new(100.0, 100.0, 10.0, 10.0);
        space.add(Shape::rectangle(15.0, 15.0, 4.0, 4.0).with_tags(solid), "wall");
        space.add(Shape::circle(25.0, 15.0, 3.0).with_tags(sensor), "zone");
        space.add(
            Shape::rectangle(35.0, 15.0, 4.0, 4.0).with_tags(solid | sensor),
            "door",
        );
        (space, solid, sensor)
    }

    #[test]
    fn test_filter_by_tags() {
        let (space, solid, sensor) = world();

        let sel = space.cell_selection(0, 0, 9, 9);
        assert_eq!(sel.filter_shapes().by_tags(solid).count(), 2);
        assert_eq!(sel.filter_shapes().not_by_tags(sensor).count(), 1);
        assert_eq!(
            sel.filter_shapes().by_tags(solid).by_tags(sensor).count(),
            1
        );
    }

    #[test]
    fn test_filter_by_distance_and_func() {
        let (space, _, _) = world();
        let sel = space.cell_selection(0, 0, 9, 9);

        let near = sel
            .filter_shapes()
            .by_distance(vec2(15.0, 15.0), 0.0, 12.0)
            .shapes();
        assert_eq!(near.len(), 2);

        let doors = sel
            .filter_shapes()
            .by_func(|h, _| space.data(h) == Some(&"door"))
            .shapes();
        assert_eq!(doors.len(), 1);
        assert_eq!(space.data(doors.handles()[0]), Some(&"door"));
    }

    #[test]
    fn test_filter_not() {
        let (space, _, _) = world();
        let sel = space.cell_selection(0, 0, 9, 9);
        let first = sel.filter_shapes().first().unwrap();
        let rest = sel.filter_shapes().not(&[first]).shapes();
        assert_eq!(rest.len(), 2);
        assert!(!rest.contains(first));
    }

    #[test]
    fn test_first_last_lazy() {
        let (space, _, _) = world();
        let sel = space.cell_selection(0, 0, 9, 9);
        let f = sel.filter_shapes();
        assert_ne!(f.first(), f.last());
        assert_eq!(f.count(), 3);
        assert!(space
            .cell_selection(5, 5, 9, 9)
            .filter_shapes()
            .first()
            .is_none());
    }

    #[test]
    fn test_sort_by_distance_and_bind() {
        let (space, _, _) = world();
        let mut all = space.cell_selection(0, 0, 9, 9).filter_shapes().shapes();
        all.sort_by_distance(&space, vec2(40.0, 15.0));
        let names: Vec<_> = all.iter().filter_map(|h| space.data(h)).collect();
        assert_eq!(names, [&"door", &"zone", &"wall"]);

        let solid_near = all
            .bind(&space)
            .filter_shapes()
            .by_distance(vec2(40.0, 15.0), 0.0, 20.0)
            .shapes();
        assert_eq!(solid_near.len(), 2);
    }

    #[test]
    fn test_whole_space_iterator() {
        let (space, _, _) = world();
        let mut n = 0;
        ShapeIterator::for_each_shape(&&space, &mut |_, _| {
            n += 1;
            true
        });
        assert_eq!(n, 3);
    }
}
