//! Interactive crop/pad adjustment and its two terminal raster operations.
//!
//! The engine is a small state machine: the session holds `Option<CropState>`
//! (Idle = `None`); entering crop mode creates an active state whose rect
//! covers the full image, and the state is consumed by apply or discarded by
//! cancel. Inside the active state, corner-handle dragging and padding are
//! mutually exclusive adjustments: a non-zero padding makes the handles
//! inert, and a moved rect makes the padding slider inert.
//!
//! # Coordinate System
//!
//! The crop rect is axis-aligned and lives in image space. Handle drags
//! arrive as image-space deltas (the session converts screen deltas at the
//! input boundary). Apply rounds the rect to whole pixels.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};
use crate::raster::Raster;
use crate::Color;

/// The four corner handles of the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CropHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl CropHandle {
    /// All handles, in a fixed order for hit-testing and display.
    pub const ALL: [CropHandle; 4] = [
        CropHandle::TopLeft,
        CropHandle::TopRight,
        CropHandle::BottomLeft,
        CropHandle::BottomRight,
    ];
}

/// Active crop-mode state: an image-space rect plus a padding amount.
///
/// Exactly one of the two terminal actions applies: a non-zero padding
/// produces a padded image and the rect is ignored; a zero padding produces
/// the sub-raster selected by the rect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropState {
    /// Image-space crop rectangle.
    pub rect: Rect,
    /// Uniform border width; > 0 switches the state into pad mode.
    pub padding: f64,
    bounds: Size,
}

impl CropState {
    /// Enter crop mode: the rect starts at the full image bounds.
    pub fn begin(image: Size) -> Self {
        Self {
            rect: Rect::from_size(image),
            padding: 0.0,
            bounds: image,
        }
    }

    /// True while the corner handles respond to drags.
    pub fn handles_active(&self) -> bool {
        self.padding == 0.0
    }

    /// True once the rect differs from the full image bounds.
    fn rect_adjusted(&self) -> bool {
        self.rect != Rect::from_size(self.bounds)
    }

    /// Image-space position of a corner handle.
    pub fn handle_position(&self, handle: CropHandle) -> Point {
        match handle {
            CropHandle::TopLeft => Point::new(self.rect.x, self.rect.y),
            CropHandle::TopRight => Point::new(self.rect.right(), self.rect.y),
            CropHandle::BottomLeft => Point::new(self.rect.x, self.rect.bottom()),
            CropHandle::BottomRight => Point::new(self.rect.right(), self.rect.bottom()),
        }
    }

    /// Drag a corner handle by an image-space delta, moving the two edges
    /// nearest that corner.
    ///
    /// The update is all-or-nothing: unless the resulting rect keeps both
    /// dimensions at least `min_size` and stays inside the image bounds,
    /// the prior rect is retained and false is returned. Drags are also
    /// rejected while padding is non-zero.
    pub fn drag_handle(&mut self, handle: CropHandle, delta: Point, min_size: f64) -> bool {
        if !self.handles_active() {
            return false;
        }

        let mut r = self.rect;
        match handle {
            CropHandle::TopLeft => {
                r.x += delta.x;
                r.y += delta.y;
                r.width -= delta.x;
                r.height -= delta.y;
            }
            CropHandle::TopRight => {
                r.y += delta.y;
                r.width += delta.x;
                r.height -= delta.y;
            }
            CropHandle::BottomLeft => {
                r.x += delta.x;
                r.width -= delta.x;
                r.height += delta.y;
            }
            CropHandle::BottomRight => {
                r.width += delta.x;
                r.height += delta.y;
            }
        }

        let fits = r.width >= min_size
            && r.height >= min_size
            && Rect::from_size(self.bounds).contains_rect(&r);
        if fits {
            self.rect = r;
        }
        fits
    }

    /// Set the padding amount, clamped to `[0, max_padding]`.
    ///
    /// Inert (returns false) once the rect has been adjusted away from the
    /// full bounds: padding and rect cropping are alternative terminal
    /// actions, never combined.
    pub fn set_padding(&mut self, amount: f64, max_padding: f64) -> bool {
        if self.rect_adjusted() {
            return false;
        }
        self.padding = amount.clamp(0.0, max_padding);
        true
    }

    /// Run the terminal operation and produce the replacement image.
    pub fn apply(&self, image: &Raster, fill: Color) -> Raster {
        if self.padding > 0.0 {
            pad_raster(image, self.padding.round() as u32, fill)
        } else {
            crop_raster(image, self.rect)
        }
    }
}

/// Extract the sub-raster selected by an image-space `rect`.
///
/// The rect is rounded to whole pixels and clamped to the image bounds;
/// the output is at least 1x1. A full-bounds rect returns a copy.
pub fn crop_raster(image: &Raster, rect: Rect) -> Raster {
    let px_left = (rect.x.round().max(0.0) as u32).min(image.width.saturating_sub(1));
    let px_top = (rect.y.round().max(0.0) as u32).min(image.height.saturating_sub(1));
    let px_right = ((rect.right().round().max(0.0)) as u32).min(image.width);
    let px_bottom = ((rect.bottom().round().max(0.0)) as u32).min(image.height);

    let out_width = px_right.saturating_sub(px_left).max(1);
    let out_height = px_bottom.saturating_sub(px_top).max(1);

    let mut output = vec![0u8; (out_width * out_height * 3) as usize];

    // Copy pixel data row by row
    for y in 0..out_height {
        let src_y = px_top + y;
        let src_start = ((src_y * image.width + px_left) * 3) as usize;
        let dst_start = (y * out_width * 3) as usize;
        let len = (out_width * 3) as usize;
        output[dst_start..dst_start + len].copy_from_slice(&image.pixels[src_start..src_start + len]);
    }

    Raster::new(out_width, out_height, output)
}

/// Produce a new raster sized `(w + 2p, h + 2p)` filled with `fill`, with
/// the original image drawn centered at offset `(p, p)`.
pub fn pad_raster(image: &Raster, padding: u32, fill: Color) -> Raster {
    let out_width = image.width + 2 * padding;
    let out_height = image.height + 2 * padding;

    let mut out = Raster::filled(out_width, out_height, fill);

    for y in 0..image.height {
        let src_start = ((y * image.width) * 3) as usize;
        let dst_start = (((y + padding) * out_width + padding) * 3) as usize;
        let len = (image.width * 3) as usize;
        out.pixels[dst_start..dst_start + len]
            .copy_from_slice(&image.pixels[src_start..src_start + len]);
    }

    out
}


// ============================================================================
// Property-Based Tests
// ============================================================================
