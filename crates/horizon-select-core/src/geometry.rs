//! Viewport geometry for measured elements.
//!
//! All values are CSS pixels in viewport coordinates: `y` grows downward and
//! the viewport's top edge is `0.0`.

/// A point in viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The viewport origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };
}

/// A bounding box as reported by layout, relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle from origin and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// Empty rectangle at the origin; what a detached element measures as.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    #[inline]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// The same box with its height replaced, keeping the top edge.
    #[inline]
    pub fn with_height(&self, height: f32) -> Self {
        Self {
            origin: self.origin,
            size: Size::new(self.size.width, height),
        }
    }

    /// The same box with its height replaced, keeping the bottom edge.
    #[inline]
    pub fn with_height_from_bottom(&self, height: f32) -> Self {
        Self {
            origin: Point::new(self.origin.x, self.bottom() - height),
            size: Size::new(self.size.width, height),
        }
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
    }

    #[test]
    fn test_rect_with_height_keeps_top() {
        let rect = Rect::new(0.0, 300.0, 80.0, 10.0).with_height(120.0);
        assert_eq!(rect.top(), 300.0);
        assert_eq!(rect.bottom(), 420.0);
    }

    #[test]
    fn test_rect_with_height_from_bottom() {
        let rect = Rect::new(0.0, 300.0, 80.0, 100.0).with_height_from_bottom(40.0);
        assert_eq!(rect.top(), 360.0);
        assert_eq!(rect.bottom(), 400.0);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(5.0, 5.0)));
        assert!(!rect.contains(Point::new(10.0, 5.0)));
    }
}
