use crate::{Shape, ShapeFilter, ShapeHandle, ShapeIterator, Space};
use fnv::FnvHashSet;

/// A single grid cell: its coordinates and the shapes whose bounds overlap it.
///
/// Insertion preserves first-seen order and never duplicates a shape;
/// unregistering swap-removes.
#[derive(Clone, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    shapes: Vec<ShapeHandle>,
}

impl Cell {
    pub(crate) fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            shapes: Vec::new(),
        }
    }

    #[inline]
    pub fn shapes(&self) -> &[ShapeHandle] {
        &self.shapes
    }

    #[inline]
    pub fn occupied(&self) -> bool {
        !self.shapes.is_empty()
    }

    pub fn contains(&self, h: ShapeHandle) -> bool {
        self.shapes.contains(&h)
    }

    pub(crate) fn register(&mut self, h: ShapeHandle) {
        if !self.shapes.contains(&h) {
            self.shapes.push(h);
        }
    }

    pub(crate) fn unregister(&mut self, h: ShapeHandle) {
        if let Some(p) = self.shapes.iter().position(|&x| x == h) {
            self.shapes.swap_remove(p);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.shapes.clear();
    }
}

/// A rectangle of cells, iterated row-major. A shape spanning several selected
/// cells is yielded exactly once; `exclude` drops the selecting shape itself.
#[derive(Copy, Clone)]
pub struct CellSelection<'a, O> {
    space: &'a Space<O>,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub exclude: Option<ShapeHandle>,
}

impl<'a, O> CellSelection<'a, O> {
    pub(crate) fn new(
        space: &'a Space<O>,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        exclude: Option<ShapeHandle>,
    ) -> Self {
        Self {
            space,
            start_x,
            start_y,
            end_x,
            end_y,
            exclude,
        }
    }

    /// Visits each distinct shape in the selection; stops when `f` returns false.
    pub fn for_each(&self, mut f: impl FnMut(ShapeHandle, &Shape) -> bool) {
        // per-call dedup set keeps queries reentrant from within callbacks
        let mut seen: FnvHashSet<ShapeHandle> = FnvHashSet::default();
        for y in self.start_y..=self.end_y {
            for x in self.start_x..=self.end_x {
                let Some(cell) = self.space.cell(x, y) else {
                    continue;
                };
                for &h in cell.shapes() {
                    if Some(h) == self.exclude || !seen.insert(h) {
                        continue;
                    }
                    let Some(shape) = self.space.get(h) else {
                        continue;
                    };
                    if !f(h, shape) {
                        return;
                    }
                }
            }
        }
    }

    /// Starts a lazy predicate chain over the selected shapes.
    pub fn filter_shapes(self) -> ShapeFilter<'a, O> {
        ShapeFilter::from_cells(self)
    }
}

impl<'a, O> ShapeIterator<O> for CellSelection<'a, O> {
    fn space(&self) -> &Space<O> {
        self.space
    }

    fn for_each_shape(&self, f: &mut dyn FnMut(ShapeHandle, &Shape) -> bool) {
        self.for_each(f);
    }
}

#[cfg(test)]
mod tests {
    use crate::Shape;
    use crate::Space;

    #[test]
    fn test_selection_uniqueness() {
        let mut space: Space<()> = Space::new(100.0, 100.0, 10.0, 10.0);
        // spans cells (0..=2, 0..=2)
        let big = space.add(Shape::rectangle(15.0, 15.0, 28.0, 28.0), ());

        let sel = space.cell_selection(0, 0, 3, 3);
        let mut count = 0;
        sel.for_each(|h, _| {
            assert_eq!(h, big);
            count += 1;
            true
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn test_selection_exclude_and_stop() {
        let mut space: Space<()> = Space::new(100.0, 100.0, 10.0, 10.0);
        let a = space.add(Shape::rectangle(15.0, 15.0, 4.0, 4.0), ());
        let _b = space.add(Shape::rectangle(15.0, 25.0, 4.0, 4.0), ());
        let _c = space.add(Shape::rectangle(25.0, 15.0, 4.0, 4.0), ());

        let sel = space.select_touching_cells(a, 1);
        let mut seen = vec![];
        sel.for_each(|h, _| {
            seen.push(h);
            true
        });
        assert_eq!(seen.len(), 2);
        assert!(!seen.contains(&a));

        let mut visits = 0;
        sel.for_each(|_, _| {
            visits += 1;
            false
        });
        assert_eq!(visits, 1);
    }
}
