//! Geometric primitives for diagram layout.
//!
//! # Overview
//!
//! This module provides the plane-geometry value types the layout engine and
//! the connector router compute with:
//!
//! - [`Point`]: A position in diagram coordinates
//! - [`Size`]: A width/height extent
//! - [`Rect`]: An axis-aligned rectangle, stored as lower-left corner + size
//! - [`Circle`]: A center + radius, used for terminator markers
//! - [`Side`]: One of the four rectangle sides
//!
//! All types are plain `Copy` values with pure accessors; none of them knows
//! about the canvas it will eventually be drawn on. Only linear arithmetic is
//! used here.
//!
//! # Coordinate System
//!
//! Diagram coordinates are y-up: the origin is the lower-left corner of the
//! canvas and y grows upward, so "top" means larger y. Backends that target a
//! y-down device space (such as SVG) perform the flip themselves.
//!
//! ```text
//! y
//! ^
//! |   +--------------+  <- max_y (top)
//! |   |              |
//! |   |     Rect     |
//! |   |              |
//! |   +--------------+  <- min_y (bottom)
//! |   ^
//! |   origin (lower-left corner)
//! +------------------------> x
//! ```

use serde::{Deserialize, Serialize};

/// A point in diagram coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point at the given coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x coordinate.
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y coordinate.
    pub fn y(self) -> f64 {
        self.y
    }

    /// Returns this point moved by the given deltas.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns the point halfway between `self` and `other`.
    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Returns the Euclidean distance to `other`.
    pub fn distance_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A width/height extent in diagram units.
///
/// Extents are expected to be non-negative; [`Size::is_empty`] reports
/// whether either extent is zero (or negative, which degenerate inputs can
/// produce before validation rejects them).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    /// Creates a new size with the given extents.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width.
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height.
    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns `true` if either extent is zero or negative.
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// One of the four sides of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The top edge (largest y).
    Top,
    /// The bottom edge (smallest y).
    Bottom,
    /// The left edge (smallest x).
    Left,
    /// The right edge (largest x).
    Right,
}

impl Side {
    /// Returns a human-readable name for this side.
    pub fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Returns the side facing this one.
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// An axis-aligned rectangle in diagram coordinates.
///
/// A `Rect` is stored as its lower-left corner plus a [`Size`]. All edge
/// accessors derive from those two fields, so a `Rect` is always consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    origin: Point,
    size: Size,
}

impl Rect {
    /// Creates a rectangle from its lower-left corner and extents.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Creates a rectangle centered on the given point.
    pub fn new_from_center(center: Point, size: Size) -> Self {
        Self {
            origin: Point::new(
                center.x() - size.width() / 2.0,
                center.y() - size.height() / 2.0,
            ),
            size,
        }
    }

    /// Returns the lower-left corner.
    pub fn origin(self) -> Point {
        self.origin
    }

    /// Returns the extents.
    pub fn size(self) -> Size {
        self.size
    }

    /// Returns the width.
    pub fn width(self) -> f64 {
        self.size.width()
    }

    /// Returns the height.
    pub fn height(self) -> f64 {
        self.size.height()
    }

    /// Returns the smallest x coordinate (left edge).
    pub fn min_x(self) -> f64 {
        self.origin.x()
    }

    /// Returns the largest x coordinate (right edge).
    pub fn max_x(self) -> f64 {
        self.origin.x() + self.size.width()
    }

    /// Returns the smallest y coordinate (bottom edge).
    pub fn min_y(self) -> f64 {
        self.origin.y()
    }

    /// Returns the largest y coordinate (top edge).
    pub fn max_y(self) -> f64 {
        self.origin.y() + self.size.height()
    }

    /// Returns the center point.
    pub fn center(self) -> Point {
        Point::new(
            self.origin.x() + self.size.width() / 2.0,
            self.origin.y() + self.size.height() / 2.0,
        )
    }

    /// Returns the midpoint of the top edge.
    pub fn top_center(self) -> Point {
        self.anchor(Side::Top, 0.5)
    }

    /// Returns the midpoint of the bottom edge.
    pub fn bottom_center(self) -> Point {
        self.anchor(Side::Bottom, 0.5)
    }

    /// Returns the midpoint of the left edge.
    pub fn left_center(self) -> Point {
        self.anchor(Side::Left, 0.5)
    }

    /// Returns the midpoint of the right edge.
    pub fn right_center(self) -> Point {
        self.anchor(Side::Right, 0.5)
    }

    /// Returns the point a fraction of the way along the given side.
    ///
    /// The fraction is measured left-to-right for [`Side::Top`] and
    /// [`Side::Bottom`], and bottom-to-top for [`Side::Left`] and
    /// [`Side::Right`]. A fraction of `0.5` is the side's midpoint. Callers
    /// pass fractions in `[0, 1]`; values outside that range land outside the
    /// side, which connector anchoring never asks for.
    pub fn anchor(self, side: Side, fraction: f64) -> Point {
        match side {
            Side::Top => Point::new(self.min_x() + self.width() * fraction, self.max_y()),
            Side::Bottom => Point::new(self.min_x() + self.width() * fraction, self.min_y()),
            Side::Left => Point::new(self.min_x(), self.min_y() + self.height() * fraction),
            Side::Right => Point::new(self.max_x(), self.min_y() + self.height() * fraction),
        }
    }

    /// Returns this rectangle moved by the given deltas.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            origin: self.origin.translate(dx, dy),
            size: self.size,
        }
    }

    /// Returns this rectangle shrunk by `amount` on every side.
    ///
    /// Extents are clamped at zero, so a large inset yields a degenerate
    /// rectangle rather than a negative one.
    pub fn inset(self, amount: f64) -> Self {
        Self::new(
            self.min_x() + amount,
            self.min_y() + amount,
            (self.width() - 2.0 * amount).max(0.0),
            (self.height() - 2.0 * amount).max(0.0),
        )
    }

    /// Returns `true` if the interiors of `self` and `other` intersect.
    ///
    /// Rectangles that merely share an edge or a corner do NOT overlap; the
    /// comparisons are strict. Degenerate rectangles (zero width or height)
    /// have no interior and overlap nothing.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.size.is_empty() || other.size.is_empty() {
            return false;
        }
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    ///
    /// Containment is closed: a rectangle touching the boundary from the
    /// inside still counts as contained.
    pub fn contains(&self, other: &Rect) -> bool {
        self.min_x() <= other.min_x()
            && other.max_x() <= self.max_x()
            && self.min_y() <= other.min_y()
            && other.max_y() <= self.max_y()
    }

    /// Returns `true` if the point lies inside `self` or on its boundary.
    pub fn contains_point(&self, point: Point) -> bool {
        self.min_x() <= point.x()
            && point.x() <= self.max_x()
            && self.min_y() <= point.y()
            && point.y() <= self.max_y()
    }
}

/// A circle in diagram coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Circle {
    center: Point,
    radius: f64,
}

impl Circle {
    /// Creates a circle from its center and radius.
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Returns the center point.
    pub fn center(self) -> Point {
        self.center
    }

    /// Returns the radius.
    pub fn radius(self) -> f64 {
        self.radius
    }

    /// Returns the smallest rectangle enclosing this circle.
    ///
    /// Overlap checks treat circles by their bounding rectangle, which is
    /// conservative in exactly the safe direction.
    pub fn bounding_rect(self) -> Rect {
        Rect::new(
            self.center.x() - self.radius,
            self.center.y() - self.radius,
            2.0 * self.radius,
            2.0 * self.radius,
        )
    }
}
