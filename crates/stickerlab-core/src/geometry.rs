//! Coordinate mapping between image space and display space.
//!
//! The editor shows a native-resolution image inside a container of
//! arbitrary size under a fit-inside, preserve-aspect layout. Every piece
//! of overlay state (strokes, text positions, the crop rectangle) is stored
//! in image space; pointer input is converted exactly once, at the input
//! boundary, using the [`DisplayGeometry`] computed for the current layout
//! pass. This is what keeps the exported raster independent of the size at
//! which editing happened.
//!
//! # Coordinate System
//!
//! - Image space: origin at the image's top-left corner, units are native
//!   image pixels
//! - Screen space: origin at the container's top-left corner, units are
//!   display points

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from coordinate-mapping setup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    /// The image or the container has a zero-sized dimension. This happens
    /// before the first real layout pass; callers defer conversion until a
    /// non-zero layout has occurred.
    #[error("cannot map coordinates for a zero-sized image or container")]
    InvalidGeometry,
}

/// A 2D point. Whether it is in image space or screen space depends on
/// context; conversion goes through [`DisplayGeometry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A 2D extent (width and height).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero or negative.
    pub fn is_degenerate(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// The center point of a rectangle of this size anchored at the origin.
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full-bounds rectangle for `size`, anchored at the origin.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True if `rect` lies entirely within `self`.
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        rect.x >= self.x
            && rect.y >= self.y
            && rect.right() <= self.right()
            && rect.bottom() <= self.bottom()
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.y >= self.y && p.x <= self.right() && p.y <= self.bottom()
    }
}

/// The fit-inside layout of an image within a display container.
///
/// Derived state, recomputed per layout pass and never persisted. The image
/// is scaled uniformly so it fits entirely inside the container (the larger
/// relative dimension is clamped to the container's matching dimension) and
/// is centered within it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    image: Size,
    container: Size,
    display: Size,
    offset: Point,
}

impl DisplayGeometry {
    /// Compute the layout of `image` inside `container`.
    ///
    /// Fails with [`GeometryError::InvalidGeometry`] when either size has a
    /// zero dimension; callers must not attempt conversion until a non-zero
    /// layout pass has occurred.
    pub fn new(image: Size, container: Size) -> Result<Self, GeometryError> {
        if image.is_degenerate() || container.is_degenerate() {
            return Err(GeometryError::InvalidGeometry);
        }

        let image_aspect = image.width / image.height;
        let container_aspect = container.width / container.height;

        let display = if image_aspect > container_aspect {
            // Image is relatively wider: clamp width to the container
            Size::new(container.width, container.width / image_aspect)
        } else {
            // Image is relatively taller (or aspects match): clamp height
            Size::new(container.height * image_aspect, container.height)
        };

        let offset = Point::new(
            (container.width - display.width) / 2.0,
            (container.height - display.height) / 2.0,
        );

        Ok(Self {
            image,
            container,
            display,
            offset,
        })
    }

    /// The on-screen size of the displayed image.
    pub fn display_size(&self) -> Size {
        self.display
    }

    /// The top-left corner of the displayed image within the container.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// The container size this layout was computed for.
    pub fn container(&self) -> Size {
        self.container
    }

    /// Convert a screen-space point to image space.
    pub fn to_image(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset.x) * self.image.width / self.display.width,
            (screen.y - self.offset.y) * self.image.height / self.display.height,
        )
    }

    /// Convert an image-space point to screen space.
    pub fn to_screen(&self, image: Point) -> Point {
        Point::new(
            image.x * self.display.width / self.image.width + self.offset.x,
            image.y * self.display.height / self.image.height + self.offset.y,
        )
    }

    /// Convert a screen-space drag delta to an image-space delta.
    ///
    /// Deltas are direction vectors, so the centering offset does not apply.
    pub fn delta_to_image(&self, delta: Point) -> Point {
        Point::new(
            delta.x * self.image.width / self.display.width,
            delta.y * self.image.height / self.display.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_image_clamps_width() {
        let geo = DisplayGeometry::new(Size::new(200.0, 100.0), Size::new(100.0, 100.0)).unwrap();
        assert_eq!(geo.display_size(), Size::new(100.0, 50.0));
        assert_eq!(geo.offset(), Point::new(0.0, 25.0));
    }

    #[test]
    fn test_tall_image_clamps_height() {
        let geo = DisplayGeometry::new(Size::new(100.0, 200.0), Size::new(100.0, 100.0)).unwrap();
        assert_eq!(geo.display_size(), Size::new(50.0, 100.0));
        assert_eq!(geo.offset(), Point::new(25.0, 0.0));
    }

    #[test]
    fn test_matching_aspect_fills_container() {
        let geo = DisplayGeometry::new(Size::new(500.0, 250.0), Size::new(100.0, 50.0)).unwrap();
        assert_eq!(geo.display_size(), Size::new(100.0, 50.0));
        assert_eq!(geo.offset(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_zero_container_rejected() {
        let result = DisplayGeometry::new(Size::new(100.0, 100.0), Size::new(0.0, 50.0));
        assert_eq!(result.unwrap_err(), GeometryError::InvalidGeometry);
    }

    #[test]
    fn test_zero_image_rejected() {
        let result = DisplayGeometry::new(Size::new(0.0, 0.0), Size::new(100.0, 50.0));
        assert_eq!(result.unwrap_err(), GeometryError::InvalidGeometry);
    }

    #[test]
    fn test_round_trip_center() {
        let geo = DisplayGeometry::new(Size::new(3000.0, 2000.0), Size::new(390.0, 700.0)).unwrap();
        let p = Point::new(1500.0, 1000.0);
        let back = geo.to_image(geo.to_screen(p));
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);
    }

    #[test]
    fn test_offset_centers_display() {
        let geo = DisplayGeometry::new(Size::new(100.0, 100.0), Size::new(300.0, 500.0)).unwrap();
        let off = geo.offset();
        let disp = geo.display_size();
        assert_eq!(off.x * 2.0 + disp.width, 300.0);
        assert_eq!(off.y * 2.0 + disp.height, 500.0);
    }

    #[test]
    fn test_delta_ignores_offset() {
        let geo = DisplayGeometry::new(Size::new(200.0, 200.0), Size::new(100.0, 150.0)).unwrap();
        // Display is 100x100, offset (0, 25); a 10pt screen delta is 20 image px
        let d = geo.delta_to_image(Point::new(10.0, 10.0));
        assert!((d.x - 20.0).abs() < 1e-9);
        assert!((d.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_containment() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains_rect(&Rect::new(10.0, 10.0, 50.0, 50.0)));
        assert!(outer.contains_rect(&outer));
        assert!(!outer.contains_rect(&Rect::new(60.0, 60.0, 50.0, 50.0)));
        assert!(!outer.contains_rect(&Rect::new(-1.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_point_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
