#![deny(
    rustdoc::all,
    rust_2018_compatibility,
    rust_2018_idioms,
    nonstandard_style,
    unused,
    future_incompatible,
    unused_extern_crates,
    clippy::all,
    clippy::doc_markdown,
    clippy::wildcard_imports
)]
#![allow(
    clippy::collapsible_else_if,
    clippy::manual_range_contains,
    clippy::too_many_arguments,
    clippy::must_use_candidate,
    missing_copy_implementations,
    missing_debug_implementations
)]
//!
//! `flat_collide` is a 2D collision library for real-time applications.
//!
//! It couples a broad phase (a uniform grid of cells, each knowing the shapes whose
//! axis-aligned bounds overlap it) with a narrow phase (a Separating Axis Theorem kernel
//! for convex polygons and circles, producing contact points, normals, and minimum
//! translation vectors).
//!
//! Shapes are owned by a [`Space`] once added; the returned [`ShapeHandle`] is used for
//! lookups, mutation (which re-registers the shape with the cells it touches), and
//! queries. The library never integrates physics: it reports contacts and MTVs and
//! leaves resolution to the caller.
//!

mod aabb;
mod angle;
mod cell;
mod circle;
mod error;
mod filter;
mod intersection;
mod polygon;
mod query;
mod segment;
mod shape;
mod space;
mod tags;
mod v2;

pub use aabb::AABB;
pub use angle::Radians;
pub use cell::{Cell, CellSelection};
pub use circle::Circle;
pub use error::Error;
pub use filter::{BoundCollection, ShapeCollection, ShapeFilter, ShapeIterator};
pub use intersection::{Intersection, IntersectionSet};
pub use polygon::{ConvexPolygon, Edge, Projection};
pub use query::{
    line_test, IntersectionTestSettings, LineTestSettings, ShapeLineTestSettings,
};
pub use segment::Segment;
pub use shape::{Shape, ShapeKind};
pub use space::{ShapeHandle, Space};
pub use tags::{TagRegistry, Tags};
pub use v2::{vec2, Vec2};

/// Componentwise min and max over a set of points. `None` on an empty slice.
pub fn minmax(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let mut min: Vec2 = *points.first()?;
    let mut max: Vec2 = min;

    for &v in &points[1..] {
        min = min.min(v);
        max = max.max(v);
    }

    Some((min, max))
}
