//! Geometric primitives for the annotation surface.
//!
//! All coordinates are document-local (top-left origin, CSS-pixel units, the
//! same space the content blocks are positioned in). Every operation here is
//! pure and stateless; the interaction layer drives them from pointer events.

use serde::{Deserialize, Serialize};

/// Minimum overlap, in document units, for an intersection to count.
///
/// Blocks that merely touch a selection edge are excluded from extraction.
pub const INTERSECT_EPSILON: f32 = 1.0;

/// Minimum width/height a resize may produce, in document units.
pub const MIN_RESIZE_EXTENT: f32 = 1.0;

/// A 2D point in document space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_lasso::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in document space.
///
/// Invariant: a normalized rectangle has `w >= 0` and `h >= 0`. Zero-area
/// rectangles are valid transient states (a drag that has not moved yet) but
/// are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of rectangle
    pub w: f32,
    /// Height of rectangle
    pub h: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_lasso::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.w, 100.0);
    /// assert_eq!(rect.h, 50.0);
    /// ```
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build a normalized rectangle from two arbitrary corner points.
    ///
    /// The result is anchored at the component-wise minimum, so dragging from
    /// bottom-right to top-left yields the same rectangle as the reverse drag.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_lasso::geometry::{Point, Rect};
    ///
    /// let rect = Rect::normalize(Point::new(50.0, 50.0), Point::new(10.0, 10.0));
    /// assert_eq!(rect, Rect::new(10.0, 10.0, 40.0, 40.0));
    /// ```
    pub fn normalize(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    /// Re-anchor this rectangle so width and height are non-negative.
    pub fn normalized(&self) -> Self {
        Self::normalize(
            Point::new(self.x, self.y),
            Point::new(self.x + self.w, self.y + self.h),
        )
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// True when the rectangle has no usable area.
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Check if this rectangle contains a point (edges inclusive).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Compute the overlap of two rectangles.
    ///
    /// Returns `None` unless the overlap exceeds `epsilon` in both axes, so
    /// edge-touching rectangles do not intersect under the default policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_lasso::geometry::{Rect, INTERSECT_EPSILON};
    ///
    /// let a = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// let b = Rect::new(0.0, 40.0, 100.0, 30.0);
    /// let i = a.intersect(&b, INTERSECT_EPSILON).unwrap();
    /// assert_eq!(i, Rect::new(0.0, 40.0, 100.0, 10.0));
    ///
    /// // Edge contact only: overlap height is zero.
    /// let c = Rect::new(0.0, 50.0, 100.0, 30.0);
    /// assert!(a.intersect(&c, INTERSECT_EPSILON).is_none());
    /// ```
    pub fn intersect(&self, other: &Rect, epsilon: f32) -> Option<Rect> {
        let ix = self.left().max(other.left());
        let iy = self.top().max(other.top());
        let iw = self.right().min(other.right()) - ix;
        let ih = self.bottom().min(other.bottom()) - iy;
        if iw <= epsilon || ih <= epsilon {
            None
        } else {
            Some(Rect::new(ix, iy, iw, ih))
        }
    }

    /// Compute the bounding box of this rectangle and another.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Bounding box of a set of rectangles; `None` for an empty set.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_lasso::geometry::Rect;
    ///
    /// let rects = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(20.0, 5.0, 10.0, 10.0)];
    /// let bounds = Rect::union_all(rects.iter().copied()).unwrap();
    /// assert_eq!(bounds, Rect::new(0.0, 0.0, 30.0, 15.0));
    /// assert!(Rect::union_all(std::iter::empty()).is_none());
    /// ```
    pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
        rects.into_iter().reduce(|acc, r| acc.union(&r))
    }

    /// Compute the area of the rectangle.
    pub fn area(&self) -> f32 {
        self.w * self.h
    }
}

/// One of the eight compass-direction resize handles on a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// Top-left corner
    NorthWest,
    /// Top edge midpoint
    North,
    /// Top-right corner
    NorthEast,
    /// Right edge midpoint
    East,
    /// Bottom-right corner
    SouthEast,
    /// Bottom edge midpoint
    South,
    /// Bottom-left corner
    SouthWest,
    /// Left edge midpoint
    West,
}

impl Handle {
    /// All eight handles, in the clockwise order they are laid out on screen.
    pub const ALL: [Handle; 8] = [
        Handle::NorthWest,
        Handle::North,
        Handle::NorthEast,
        Handle::East,
        Handle::SouthEast,
        Handle::South,
        Handle::SouthWest,
        Handle::West,
    ];

    /// True when dragging this handle moves the top edge.
    pub fn moves_top(&self) -> bool {
        matches!(self, Handle::NorthWest | Handle::North | Handle::NorthEast)
    }

    /// True when dragging this handle moves the bottom edge.
    pub fn moves_bottom(&self) -> bool {
        matches!(self, Handle::SouthWest | Handle::South | Handle::SouthEast)
    }

    /// True when dragging this handle moves the left edge.
    pub fn moves_left(&self) -> bool {
        matches!(self, Handle::NorthWest | Handle::West | Handle::SouthWest)
    }

    /// True when dragging this handle moves the right edge.
    pub fn moves_right(&self) -> bool {
        matches!(self, Handle::NorthEast | Handle::East | Handle::SouthEast)
    }

    /// Parse the short compass form used by the presentation layer ("nw", "se", ...).
    pub fn from_compass(s: &str) -> Option<Handle> {
        match s {
            "nw" => Some(Handle::NorthWest),
            "n" => Some(Handle::North),
            "ne" => Some(Handle::NorthEast),
            "e" => Some(Handle::East),
            "se" => Some(Handle::SouthEast),
            "s" => Some(Handle::South),
            "sw" => Some(Handle::SouthWest),
            "w" => Some(Handle::West),
            _ => None,
        }
    }

    /// The short compass form ("nw", "se", ...).
    pub fn compass(&self) -> &'static str {
        match self {
            Handle::NorthWest => "nw",
            Handle::North => "n",
            Handle::NorthEast => "ne",
            Handle::East => "e",
            Handle::SouthEast => "se",
            Handle::South => "s",
            Handle::SouthWest => "sw",
            Handle::West => "w",
        }
    }
}

/// Apply a handle drag of `(dx, dy)` to `original`.
///
/// The drag is always expressed relative to the rectangle as it was when the
/// handle was grabbed, never cumulatively, so repeated pointer-move events do
/// not compound rounding drift. The edge opposite the handle never moves, and
/// width/height are clamped to [`MIN_RESIZE_EXTENT`] so a drag can never turn
/// the rectangle inside out.
///
/// # Examples
///
/// ```
/// use exam_lasso::geometry::{resize, Handle, Rect};
///
/// let original = Rect::new(0.0, 0.0, 100.0, 100.0);
/// assert_eq!(
///     resize(&original, Handle::SouthEast, 20.0, -5.0),
///     Rect::new(0.0, 0.0, 120.0, 95.0)
/// );
/// assert_eq!(
///     resize(&original, Handle::NorthWest, 10.0, 10.0),
///     Rect::new(10.0, 10.0, 90.0, 90.0)
/// );
/// ```
pub fn resize(original: &Rect, handle: Handle, dx: f32, dy: f32) -> Rect {
    let mut out = *original;
    if handle.moves_right() {
        out.w = (original.w + dx).max(MIN_RESIZE_EXTENT);
    }
    if handle.moves_bottom() {
        out.h = (original.h + dy).max(MIN_RESIZE_EXTENT);
    }
    if handle.moves_left() {
        out.x = original.x + dx;
        out.w = (original.w - dx).max(MIN_RESIZE_EXTENT);
    }
    if handle.moves_top() {
        out.y = original.y + dy;
        out.h = (original.h - dy).max(MIN_RESIZE_EXTENT);
    }
    out
}
