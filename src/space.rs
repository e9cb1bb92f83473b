use crate::{vec2, Cell, CellSelection, Radians, Shape, ShapeCollection, Tags, Vec2};
use fnv::FnvHashSet;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable unique identifier of a shape inside a [`Space`]. Returned by
    /// `add` and used for lookups, mutation, and queries.
    pub struct ShapeHandle;
}

pub(crate) struct StoredShape<O> {
    pub shape: Shape,
    pub obj: O,
    // cells currently overlapped by the shape's bounds
    pub touching: Vec<(i32, i32)>,
}

// Excludes the exclusive upper boundary when mapping bounds to cells, so a
// shape ending exactly on a cell edge does not register one cell too far.
const UPPER_EPS: f64 = 1e-9;

/// Uniform grid of cells over a rectangular world region.
///
/// The space owns its shapes (an arena keyed by [`ShapeHandle`]); cells hold
/// handles, shapes hold the cell coordinates they touch, so there is no cyclic
/// ownership. Every mutation through the space re-registers the shape with the
/// cells its bounds overlap. Shapes whose bounds fall entirely outside the grid
/// touch no cell but stay owned by the space.
///
/// ```rust
/// use flat_collide::{Shape, Space, vec2};
///
/// let mut space: Space<u32> = Space::new(640.0, 480.0, 16.0, 16.0);
/// let player = space.add(Shape::rectangle(32.0, 32.0, 16.0, 16.0), 0);
/// let wall = space.add(Shape::rectangle(40.0, 32.0, 16.0, 16.0), 1);
///
/// // resolve the overlap by moving the player out of the wall
/// let set = space.get(player).unwrap().intersection(space.get(wall).unwrap()).unwrap();
/// space.translate(player, set.mtv);
///
/// let a = space.get(player).unwrap();
/// assert!(a.intersection(space.get(wall).unwrap()).is_none());
/// assert_eq!(a.position(), vec2(24.0, 32.0));
/// ```
pub struct Space<O = ()> {
    cells: Vec<Cell>,
    width: i32,
    height: i32,
    cell_width: f64,
    cell_height: f64,
    shapes: SlotMap<ShapeHandle, StoredShape<O>>,
}

impl<O> Space<O> {
    /// Grid of `floor(space_w / cell_w) x floor(space_h / cell_h)` cells.
    pub fn new(space_w: f64, space_h: f64, cell_w: f64, cell_h: f64) -> Self {
        assert!(
            cell_w > 0.0 && cell_h > 0.0,
            "cell size ({cell_w}x{cell_h}) must be positive"
        );
        let width = (space_w / cell_w).floor() as i32;
        let height = (space_h / cell_h).floor() as i32;
        let cells = (0..width * height)
            .map(|i| Cell::new(i % width.max(1), i / width.max(1)))
            .collect();
        Self {
            cells,
            width,
            height,
            cell_width: cell_w,
            cell_height: cell_h,
            shapes: SlotMap::with_key(),
        }
    }

    /// Moves the shape into the space and registers it with every cell its
    /// bounds overlap.
    pub fn add(&mut self, shape: Shape, obj: O) -> ShapeHandle {
        let h = self.shapes.insert(StoredShape {
            shape,
            obj,
            touching: vec![],
        });
        self.register(h);
        h
    }

    /// Unregisters the shape from its cells and hands ownership back.
    /// `None` when the handle is not (or no longer) in this space.
    pub fn remove(&mut self, h: ShapeHandle) -> Option<(Shape, O)> {
        self.unregister(h);
        self.shapes.remove(h).map(|s| (s.shape, s.obj))
    }

    pub fn remove_all(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.shapes.clear();
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    #[inline]
    pub fn get(&self, h: ShapeHandle) -> Option<&Shape> {
        self.shapes.get(h).map(|s| &s.shape)
    }

    #[inline]
    pub fn data(&self, h: ShapeHandle) -> Option<&O> {
        self.shapes.get(h).map(|s| &s.obj)
    }

    #[inline]
    pub fn data_mut(&mut self, h: ShapeHandle) -> Option<&mut O> {
        self.shapes.get_mut(h).map(|s| &mut s.obj)
    }

    pub fn handles(&self) -> impl Iterator<Item = ShapeHandle> + '_ {
        self.shapes.keys()
    }

    /// Visits every shape with its index and the total count; stops when the
    /// callback returns false.
    pub fn for_each_shape(&self, mut f: impl FnMut(ShapeHandle, &Shape, usize, usize) -> bool) {
        let count = self.shapes.len();
        for (i, (h, s)) in self.shapes.iter().enumerate() {
            if !f(h, &s.shape, i, count) {
                return;
            }
        }
    }

    /// Cells the shape's bounds currently overlap.
    pub fn touching_cells(&self, h: ShapeHandle) -> &[(i32, i32)] {
        self.shapes.get(h).map(|s| s.touching.as_slice()).unwrap_or(&[])
    }

    /// Applies `f` to the shape, then re-registers it from its new bounds.
    /// Returns false when the handle is stale.
    pub fn modify(&mut self, h: ShapeHandle, f: impl FnOnce(&mut Shape)) -> bool {
        match self.shapes.get_mut(h) {
            Some(s) => f(&mut s.shape),
            None => return false,
        }
        self.unregister(h);
        self.register(h);
        true
    }

    pub fn set_position(&mut self, h: ShapeHandle, pos: Vec2) -> bool {
        self.modify(h, |s| s.set_position(pos))
    }

    pub fn translate(&mut self, h: ShapeHandle, by: Vec2) -> bool {
        self.modify(h, |s| s.translate(by))
    }

    pub fn set_rotation(&mut self, h: ShapeHandle, rotation: Radians) -> bool {
        self.modify(h, |s| s.set_rotation(rotation))
    }

    pub fn rotate(&mut self, h: ShapeHandle, by: Radians) -> bool {
        self.modify(h, |s| s.rotate(by))
    }

    pub fn set_scale(&mut self, h: ShapeHandle, scale: Vec2) -> bool {
        self.modify(h, |s| s.set_scale(scale))
    }

    pub fn set_radius(&mut self, h: ShapeHandle, radius: f64) -> bool {
        self.modify(h, |s| s.set_radius(radius))
    }

    pub fn set_tags(&mut self, h: ShapeHandle, tags: Tags) -> bool {
        // tags do not move the shape, no re-registration needed
        match self.shapes.get_mut(h) {
            Some(s) => {
                s.shape.set_tags(tags);
                true
            }
            None => false,
        }
    }

    /// Grid width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get((y * self.width + x) as usize)
    }

    /// World position to cell coordinates (unclipped).
    #[inline]
    pub fn world_to_space(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.cell_width).floor() as i32,
            (y / self.cell_height).floor() as i32,
        )
    }

    /// Cell origin (not centre) in world units.
    #[inline]
    pub fn space_to_world(&self, cx: i32, cy: i32) -> Vec2 {
        vec2(cx as f64 * self.cell_width, cy as f64 * self.cell_height)
    }

    /// Cells crossed by the straight line between the centres of the start and
    /// end cells, start first and end last. Empty when either endpoint is
    /// outside the grid.
    ///
    /// Traversal is DDA-style: half a cell along the dominant axis per step,
    /// half a cell scaled by the slope ratio along the other, alternating and
    /// starting with the dominant axis.
    pub fn cells_in_line(&self, sx: i32, sy: i32, ex: i32, ey: i32) -> Vec<(i32, i32)> {
        if self.cell(sx, sy).is_none() || self.cell(ex, ey).is_none() {
            return vec![];
        }
        let mut out = vec![(sx, sy)];
        if (sx, sy) == (ex, ey) {
            return out;
        }

        let dx = (ex - sx) as f64;
        let dy = (ey - sy) as f64;
        let (step_x, step_y, x_first) = if dx.abs() >= dy.abs() {
            (
                0.5 * self.cell_width * dx.signum(),
                0.5 * self.cell_height * (dy / dx.abs()),
                true,
            )
        } else {
            (
                0.5 * self.cell_width * (dx / dy.abs()),
                0.5 * self.cell_height * dy.signum(),
                false,
            )
        };

        let mut p = self.space_to_world(sx, sy)
            + vec2(self.cell_width * 0.5, self.cell_height * 0.5);
        let mut current = (sx, sy);
        let mut x_turn = x_first;

        // four half-steps per dominant-axis cell, plus slack
        let limit = 4 * (dx.abs() + dy.abs()) as i32 + 8;
        for _ in 0..limit {
            if x_turn {
                p.x += step_x;
            } else {
                p.y += step_y;
            }
            x_turn = !x_turn;

            let c = self.world_to_space(p.x, p.y);
            if c != current && self.cell(c.0, c.1).is_some() {
                current = c;
                out.push(c);
                if c == (ex, ey) {
                    break;
                }
            }
        }
        out
    }

    /// Distinct shapes in the cell rectangle `[cx, cx+w) x [cy, cy+h)`,
    /// optionally restricted to those matching `tags`.
    pub fn check_cells(
        &self,
        cx: i32,
        cy: i32,
        w: i32,
        h: i32,
        tags: Option<Tags>,
    ) -> ShapeCollection {
        let mut seen: FnvHashSet<ShapeHandle> = FnvHashSet::default();
        let mut out = ShapeCollection::default();
        for y in cy..cy + h {
            for x in cx..cx + w {
                let Some(cell) = self.cell(x, y) else {
                    continue;
                };
                for &sh in cell.shapes() {
                    if !seen.insert(sh) {
                        continue;
                    }
                    if let Some(t) = tags {
                        let matched = self.get(sh).is_some_and(|s| s.tags().has(t));
                        if !matched {
                            continue;
                        }
                    }
                    out.push(sh);
                }
            }
        }
        out
    }

    /// Arbitrary cell-rectangle selection (inclusive coordinates).
    pub fn cell_selection(&self, start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> CellSelection<'_, O> {
        CellSelection::new(self, start_x, start_y, end_x, end_y, None)
    }

    /// Selection of the shape's cell footprint, expanded by `radius` cells in
    /// every direction, excluding the shape itself.
    pub fn select_touching_cells(&self, h: ShapeHandle, radius: i32) -> CellSelection<'_, O> {
        let bb = match self.get(h) {
            Some(s) => s.bbox(),
            None => return CellSelection::new(self, 0, 0, -1, -1, None),
        };
        let (cx0, cy0, cx1, cy1) = self.bounds_to_cells(bb.ll, bb.ur);
        CellSelection::new(
            self,
            cx0 - radius,
            cy0 - radius,
            cx1 + radius,
            cy1 + radius,
            Some(h),
        )
    }

    fn bounds_to_cells(&self, ll: Vec2, ur: Vec2) -> (i32, i32, i32, i32) {
        let (cx0, cy0) = self.world_to_space(ll.x, ll.y);
        let (cx1, cy1) = self.world_to_space(ur.x - UPPER_EPS, ur.y - UPPER_EPS);
        (cx0, cy0, cx1.max(cx0), cy1.max(cy0))
    }

    fn register(&mut self, h: ShapeHandle) {
        let bb = match self.shapes.get(h) {
            Some(s) => s.shape.bbox(),
            None => return,
        };
        let (cx0, cy0, cx1, cy1) = self.bounds_to_cells(bb.ll, bb.ur);

        let mut touching = vec![];
        for y in cy0.max(0)..=cy1.min(self.height - 1) {
            for x in cx0.max(0)..=cx1.min(self.width - 1) {
                self.cells[(y * self.width + x) as usize].register(h);
                touching.push((x, y));
            }
        }
        self.shapes[h].touching = touching;
    }

    fn unregister(&mut self, h: ShapeHandle) {
        let touching = match self.shapes.get_mut(h) {
            Some(s) => std::mem::take(&mut s.touching),
            None => return,
        };
        for (x, y) in touching {
            self.cells[(y * self.width + x) as usize].unregister(h);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touching_sorted<O>(space: &Space<O>, h: ShapeHandle) -> Vec<(i32, i32)> {
        let mut t = space.touching_cells(h).to_vec();
        t.sort_unstable();
        t
    }

    #[test]
    fn test_grid_dimensions() {
        let space: Space = Space::new(100.0, 60.0, 10.0, 10.0);
        assert_eq!((space.width(), space.height()), (10, 6));
        assert!(space.cell(9, 5).is_some());
        assert!(space.cell(10, 5).is_none());
        assert!(space.cell(-1, 0).is_none());
    }

    #[test]
    fn test_world_space_transforms() {
        let space: Space = Space::new(100.0, 100.0, 10.0, 20.0);
        assert_eq!(space.world_to_space(25.0, 45.0), (2, 2));
        assert_eq!(space.world_to_space(-0.1, 0.0), (-1, 0));
        assert_eq!(space.space_to_world(2, 2), vec2(20.0, 40.0));
    }

    #[test]
    fn test_membership_under_rotation() {
        let mut space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        let h = space.add(Shape::rectangle(15.0, 15.0, 8.0, 8.0), ());
        assert_eq!(touching_sorted(&space, h), vec![(1, 1)]);
        assert!(space.cell(1, 1).unwrap().contains(h));

        space.set_rotation(h, Radians::from_deg(45.0));
        let expect: Vec<(i32, i32)> = (0..3)
            .flat_map(|x| (0..3).map(move |y| (x, y)))
            .collect();
        let mut expect = expect;
        expect.sort_unstable();
        assert_eq!(touching_sorted(&space, h), expect);

        space.set_rotation(h, Radians::ZERO);
        assert_eq!(touching_sorted(&space, h), vec![(1, 1)]);
        assert!(!space.cell(0, 0).unwrap().contains(h));
    }

    #[test]
    fn test_membership_under_scale() {
        let mut space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        let h = space.add(Shape::rectangle(15.0, 15.0, 8.0, 8.0), ());
        assert_eq!(touching_sorted(&space, h), vec![(1, 1)]);

        // x3 blows the 8x8 box up to 24x24, bounds [3, 27] on both axes
        space.set_scale(h, Vec2::splat(3.0));
        let mut expect: Vec<(i32, i32)> = (0..3)
            .flat_map(|x| (0..3).map(move |y| (x, y)))
            .collect();
        expect.sort_unstable();
        assert_eq!(touching_sorted(&space, h), expect);

        space.set_scale(h, Vec2::XY);
        assert_eq!(touching_sorted(&space, h), vec![(1, 1)]);
    }

    #[test]
    fn test_exclusive_upper_boundary() {
        let mut space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        // bounds [10, 20]: exactly on cell edges, must stay in cell 1 only
        let h = space.add(Shape::rectangle(15.0, 15.0, 10.0, 10.0), ());
        assert_eq!(touching_sorted(&space, h), vec![(1, 1)]);
    }

    #[test]
    fn test_out_of_grid_shape() {
        let mut space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        let h = space.add(Shape::rectangle(200.0, 200.0, 8.0, 8.0), ());
        assert!(space.touching_cells(h).is_empty());
        assert_eq!(space.len(), 1);

        space.set_position(h, vec2(5.0, 5.0));
        assert_eq!(touching_sorted(&space, h), vec![(0, 0)]);
    }

    #[test]
    fn test_remove_clears_cells() {
        let mut space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        let h = space.add(Shape::rectangle(15.0, 15.0, 28.0, 28.0), ());
        assert!(space.cell(0, 0).unwrap().occupied());
        let (shape, ()) = space.remove(h).unwrap();
        assert_eq!(shape.position(), vec2(15.0, 15.0));
        assert!(space.is_empty());
        for y in 0..space.height() {
            for x in 0..space.width() {
                assert!(!space.cell(x, y).unwrap().occupied());
            }
        }
        assert!(space.remove(h).is_none());
    }

    #[test]
    fn test_no_duplicates_in_cells() {
        let mut space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        let h = space.add(Shape::rectangle(15.0, 15.0, 8.0, 8.0), ());
        for _ in 0..10 {
            space.translate(h, vec2(0.5, 0.0));
        }
        for y in 0..space.height() {
            for x in 0..space.width() {
                let cell = space.cell(x, y).unwrap();
                let n = cell.shapes().iter().filter(|&&s| s == h).count();
                assert!(n <= 1);
            }
        }
    }

    #[test]
    fn test_membership_matches_bounds() {
        // touching cells are exactly the in-bounds cells whose
        // rectangle intersects the shape's bounds
        let mut space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        let h = space.add(Shape::circle(33.0, 47.0, 12.0), ());
        space.translate(h, vec2(11.3, -7.9));
        space.set_radius(h, 17.0);

        let bb = space.get(h).unwrap().bbox();
        let mut expect = vec![];
        for y in 0..space.height() {
            for x in 0..space.width() {
                let cell_bb = crate::AABB::new(
                    space.space_to_world(x, y),
                    space.space_to_world(x + 1, y + 1),
                );
                // strict overlap, ignoring edge-exact touching
                if cell_bb.ll.x < bb.ur.x
                    && cell_bb.ur.x > bb.ll.x
                    && cell_bb.ll.y < bb.ur.y
                    && cell_bb.ur.y > bb.ll.y
                {
                    expect.push((x, y));
                }
            }
        }
        expect.sort_unstable();
        assert_eq!(touching_sorted(&space, h), expect);
    }

    #[test]
    fn test_cells_in_line() {
        let space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        assert_eq!(
            space.cells_in_line(0, 0, 3, 2),
            vec![(0, 0), (1, 0), (1, 1), (2, 1), (3, 1), (3, 2)]
        );
    }

    #[test]
    fn test_cells_in_line_axis_aligned() {
        let space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        assert_eq!(
            space.cells_in_line(2, 3, 5, 3),
            vec![(2, 3), (3, 3), (4, 3), (5, 3)]
        );
        assert_eq!(space.cells_in_line(4, 4, 4, 4), vec![(4, 4)]);
        assert_eq!(
            space.cells_in_line(0, 3, 0, 0),
            vec![(0, 3), (0, 2), (0, 1), (0, 0)]
        );
    }

    #[test]
    fn test_cells_in_line_outside() {
        let space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        assert!(space.cells_in_line(-1, 0, 3, 3).is_empty());
        assert!(space.cells_in_line(0, 0, 10, 3).is_empty());
    }

    #[test]
    fn test_check_cells_tags() {
        let mut reg = crate::TagRegistry::new();
        let solid = reg.tag("solid").unwrap();
        let sensor = reg.tag("sensor").unwrap();

        let mut space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        let a = space.add(Shape::rectangle(15.0, 15.0, 4.0, 4.0).with_tags(solid), ());
        let b = space.add(Shape::rectangle(25.0, 15.0, 4.0, 4.0).with_tags(sensor), ());
        let _far = space.add(Shape::rectangle(85.0, 85.0, 4.0, 4.0).with_tags(solid), ());

        let all = space.check_cells(0, 0, 4, 4, None);
        assert_eq!(all.len(), 2);
        let solids = space.check_cells(0, 0, 4, 4, Some(solid));
        assert_eq!(solids.handles(), &[a]);
        let either = space.check_cells(0, 0, 4, 4, Some(solid | sensor));
        assert_eq!(either.len(), 2);
        assert!(either.contains(b));
    }

    #[test]
    fn test_remove_all() {
        let mut space: Space = Space::new(100.0, 100.0, 10.0, 10.0);
        space.add(Shape::circle(15.0, 15.0, 4.0), ());
        space.add(Shape::circle(35.0, 15.0, 4.0), ());
        space.remove_all();
        assert!(space.is_empty());
        assert!(!space.cell(1, 1).unwrap().occupied());
    }
}
