#![forbid(unsafe_code)]

//! Pixel-space geometry primitives carried in snapshots and events.

use serde::{Deserialize, Serialize};

/// A point in widget coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Size {
    /// Create a size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A rectangle: origin plus extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The origin of this rectangle.
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The extent of this rectangle.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// True when either dimension is zero or negative.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_accessors() {
        let r = Rect::new(1, 2, 30, 40);
        assert_eq!(r.origin(), Point::new(1, 2));
        assert_eq!(r.size(), Size::new(30, 40));
        assert!(!r.is_empty());
        assert!(Rect::new(0, 0, 0, 10).is_empty());
    }

    #[test]
    fn rect_serializes_flat() {
        let r = Rect::new(1, 2, 3, 4);
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["x"], 1);
        assert_eq!(json["height"], 4);
    }
}
