//! Geometric primitives for glyph placement.
//!
//! Coordinates are floating-point page units (points). Unless a function
//! says otherwise, rectangles live in the page's native bottom-up frame
//! with `y` at the bottom edge.

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in page space (bottom-up, `y` is the bottom edge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of the left edge
    pub x: f32,
    /// Y coordinate of the bottom edge
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Check if this rectangle fully contains another.
    pub fn contains(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.bottom() >= self.bottom()
            && other.top() <= self.top()
    }

    /// Check if this rectangle intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.bottom() < other.top()
            && self.top() > other.bottom()
    }

    /// Compute the union of this rectangle with another.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.bottom().min(other.bottom());
        let x1 = self.right().max(other.right());
        let y1 = self.top().max(other.top());
        Rect::from_points(x0, y0, x1, y1)
    }
}

/// Map a point from a page's stored (unrotated) frame into the frame the
/// viewer displays under the page's `/Rotate` value.
///
/// `width` and `height` are the stored page dimensions. Rotations are
/// clockwise multiples of 90 degrees; any other value is treated as 0.
/// The 90 and 270 mappings are inverses of each other:
/// `rotate_point(rotate_point(p, 90, w, h), 270, h, w) == p`.
pub fn rotate_point(p: Point, rotation: i32, width: f32, height: f32) -> Point {
    match rotation.rem_euclid(360) {
        90 => Point::new(p.y, width - p.x),
        180 => Point::new(width - p.x, height - p.y),
        270 => Point::new(height - p.y, p.x),
        _ => p,
    }
}

/// Page dimensions after applying a rotation (90/270 swap the axes).
pub fn rotated_extent(rotation: i32, width: f32, height: f32) -> (f32, f32) {
    match rotation.rem_euclid(360) {
        90 | 270 => (height, width),
        _ => (width, height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 20.0);
        assert_eq!(r.top(), 70.0);
    }

    #[test]
    fn test_rect_from_points() {
        let r = Rect::from_points(10.0, 20.0, 110.0, 70.0);
        assert_eq!(r.width, 100.0);
        assert_eq!(r.height, 50.0);
    }

    #[test]
    fn test_rect_contains() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(10.0, 10.0, 50.0, 50.0);
        let crossing = Rect::new(90.0, 90.0, 50.0, 50.0);

        assert!(outer.contains(&inner));
        assert!(!outer.contains(&crossing));
        assert!(!inner.contains(&outer));
        // A rect contains itself
        assert!(outer.contains(&outer));
    }

    #[test]
    fn test_rect_union() {
        let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
        let r2 = Rect::new(25.0, 25.0, 50.0, 50.0);
        let union = r1.union(&r2);
        assert_eq!(union.x, 0.0);
        assert_eq!(union.y, 0.0);
        assert_eq!(union.right(), 75.0);
        assert_eq!(union.top(), 75.0);
    }

    #[test]
    fn test_rotate_identity() {
        let p = Point::new(72.0, 700.0);
        assert_eq!(rotate_point(p, 0, 612.0, 792.0), p);
        assert_eq!(rotate_point(p, 360, 612.0, 792.0), p);
    }

    #[test]
    fn test_rotate_90_270_round_trip() {
        let p = Point::new(72.0, 700.0);
        let (w, h) = (612.0, 792.0);
        let q = rotate_point(p, 90, w, h);
        // The 90-degree frame swaps the axes, so the inverse runs with
        // swapped dimensions.
        let (w2, h2) = rotated_extent(90, w, h);
        let back = rotate_point(q, 270, w2, h2);
        assert!((back.x - p.x).abs() < 1e-4);
        assert!((back.y - p.y).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_180_twice_is_identity() {
        let p = Point::new(100.0, 200.0);
        let q = rotate_point(p, 180, 612.0, 792.0);
        let back = rotate_point(q, 180, 612.0, 792.0);
        assert_eq!(back, p);
    }

    #[test]
    fn test_rotated_extent() {
        assert_eq!(rotated_extent(0, 612.0, 792.0), (612.0, 792.0));
        assert_eq!(rotated_extent(90, 612.0, 792.0), (792.0, 612.0));
        assert_eq!(rotated_extent(180, 612.0, 792.0), (612.0, 792.0));
        assert_eq!(rotated_extent(270, 612.0, 792.0), (792.0, 612.0));
    }
}
