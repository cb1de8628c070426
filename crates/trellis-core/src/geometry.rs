//! Basic geometry and color types for layout computation.
//!
//! This module provides the fundamental value types used throughout the
//! layout engine, along with pixel-grid rounding helpers so hairlines and
//! frame edges land on device pixels at any scale factor.

use serde::{Deserialize, Serialize};

/// A point in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
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

    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Translate the point by the given amount.
    #[inline]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// A size in 2D space (width and height).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
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

    /// Check if the size has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<(f32, f32)> for Size {
    fn from((width, height): (f32, f32)) -> Self {
        Self { width, height }
    }
}

/// A rectangle defined by origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
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

    /// Create a rectangle centered at a point.
    #[inline]
    pub fn from_center(center: Point, size: Size) -> Self {
        Self {
            origin: Point {
                x: center.x - size.width / 2.0,
                y: center.y - size.height / 2.0,
            },
            size,
        }
    }

    /// Empty rectangle at origin.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    /// Left edge x coordinate.
    #[inline]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    /// Top edge y coordinate.
    #[inline]
    pub fn top(&self) -> f32 {
        self.origin.y
    }

    /// Right edge x coordinate.
    #[inline]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    /// Bottom edge y coordinate.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// Width of the rectangle.
    #[inline]
    pub fn width(&self) -> f32 {
        self.size.width
    }

    /// Height of the rectangle.
    #[inline]
    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// Center point of the rectangle.
    #[inline]
    pub fn center(&self) -> Point {
        Point {
            x: self.origin.x + self.size.width / 2.0,
            y: self.origin.y + self.size.height / 2.0,
        }
    }

    /// Check if the rectangle is empty (zero or negative size).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Check if the vertical extent of the rectangle contains a y coordinate.
    #[inline]
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top() && y < self.bottom()
    }

    /// Compute the intersection of two rectangles.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Check whether two rectangles overlap.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Compute the union (bounding box) of two rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Offset the rectangle by the given amount.
    #[inline]
    pub fn offset(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            origin: Point {
                x: self.origin.x + dx,
                y: self.origin.y + dy,
            },
            size: self.size,
        }
    }

    /// Round the rectangle's edges to the device pixel grid.
    ///
    /// Edges are rounded individually (rather than origin and size) so that
    /// rectangles sharing an edge before snapping still share it afterwards.
    pub fn snapped(&self, scale: f32) -> Rect {
        let left = snap(self.left(), scale);
        let top = snap(self.top(), scale);
        let right = snap(self.right(), scale);
        let bottom = snap(self.bottom(), scale);
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Round a coordinate to the nearest device pixel for the given scale factor.
///
/// A scale of 0 or below is treated as 1.0.
#[inline]
pub fn snap(value: f32, scale: f32) -> f32 {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    (value * scale).round() / scale
}

/// The thickness of a one-device-pixel hairline at the given scale factor.
#[inline]
pub fn hairline(scale: f32) -> f32 {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    1.0 / scale
}

/// Edge insets describing distances from each edge of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeInsets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl EdgeInsets {
    /// Create new edge insets.
    #[inline]
    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Insets with the same value on all edges.
    #[inline]
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            left: value,
            bottom: value,
            right: value,
        }
    }

    /// Zero insets.
    pub const ZERO: Self = Self::uniform(0.0);

    /// The combined horizontal (left + right) inset.
    #[inline]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// The combined vertical (top + bottom) inset.
    #[inline]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Shrink a rectangle by these insets.
    ///
    /// The result is clamped to zero size if the insets exceed the rectangle.
    pub fn inset(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.left() + self.left,
            rect.top() + self.top,
            (rect.width() - self.horizontal()).max(0.0),
            (rect.height() - self.vertical()).max(0.0),
        )
    }
}

/// An RGBA color with non-premultiplied alpha.
///
/// The layout engine stores colors on behalf of the host renderer; it never
/// blends them itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new color from RGBA components (0.0-1.0 range).
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB components.
    #[inline]
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque color from 8-bit RGB components.
    #[inline]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Create a color from 8-bit RGBA components (0-255 range).
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Create a color from a hex string (e.g., "#FF0000" or "#FF0000FF").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let len = hex.len();

        if len != 6 && len != 8 {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        let a = if len == 8 {
            u8::from_str_radix(&hex[6..8], 16).ok()?
        } else {
            255
        };

        Some(Self::from_rgba8(r, g, b, a))
    }

    /// Return a new color with modified alpha.
    #[inline]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { a: alpha, ..self }
    }

    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb(1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb(0.0, 0.0, 0.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 40.0);
        assert_eq!(rect.bottom(), 60.0);
        assert_eq!(rect.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(9.9, 9.9)));
        assert!(!rect.contains(Point::new(10.0, 5.0)));
        assert!(!rect.contains(Point::new(-0.1, 5.0)));
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 20.0, 5.0, 5.0);

        assert_eq!(a.intersect(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert!(a.intersects(&b));
        assert_eq!(a.intersect(&c), None);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 10.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 30.0, 15.0));
    }

    #[test]
    fn test_snap_to_pixel_grid() {
        assert_eq!(snap(10.3, 1.0), 10.0);
        assert_eq!(snap(10.5, 1.0), 11.0);
        assert_eq!(snap(10.3, 2.0), 10.5);
        // Degenerate scale falls back to 1.0
        assert_eq!(snap(10.6, 0.0), 11.0);
    }

    #[test]
    fn test_snapped_rects_share_edges() {
        let scale = 2.0;
        let top = Rect::new(0.0, 0.0, 100.0, 33.333);
        let bottom = Rect::new(0.0, 33.333, 100.0, 33.333);
        assert_eq!(top.snapped(scale).bottom(), bottom.snapped(scale).top());
    }

    #[test]
    fn test_hairline() {
        assert_eq!(hairline(1.0), 1.0);
        assert_eq!(hairline(2.0), 0.5);
    }

    #[test]
    fn test_edge_insets() {
        let insets = EdgeInsets::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(insets.horizontal(), 6.0);
        assert_eq!(insets.vertical(), 4.0);

        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(insets.inset(rect), Rect::new(2.0, 1.0, 94.0, 46.0));
    }

    #[test]
    fn test_edge_insets_clamp_to_zero() {
        let insets = EdgeInsets::uniform(60.0);
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inset = insets.inset(rect);
        assert_eq!(inset.width(), 0.0);
        assert_eq!(inset.height(), 0.0);
    }

    #[test]
    fn test_color_from_hex() {
        let red = Color::from_hex("#FF0000").unwrap();
        assert_eq!(red, Color::from_rgb(1.0, 0.0, 0.0));

        let translucent = Color::from_hex("00FF0080").unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);

        assert!(Color::from_hex("#12345").is_none());
    }

    #[test]
    fn test_color_with_alpha() {
        let color = Color::WHITE.with_alpha(0.5);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.a, 0.5);
    }
}
