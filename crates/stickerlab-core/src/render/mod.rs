//! Export compositing: background image + drawing layer + text overlays.
//!
//! The compositor is a deterministic, pure function of the session state.
//! It always renders at the image's native pixel dimensions, regardless of
//! the size at which editing happened: strokes are rescaled from their
//! capture surface, and text positions are already image-space.
//!
//! # Layer Order
//!
//! 1. Background image at origin
//! 2. Freehand strokes, in capture order
//! 3. Text overlays, in insertion order (painter's algorithm - later
//!    overlays draw on top)

mod stroke;
mod text;

pub use stroke::rasterize_strokes;
pub use text::{GlyphBackend, TextBackend, TextRaster};

use thiserror::Error;

use crate::overlay::{DrawingLayer, TextOverlay};
use crate::raster::Raster;
use crate::EditorOptions;

/// Largest canvas dimension the compositor will allocate.
pub const MAX_CANVAS_DIM: u32 = 16_384;

/// Errors from export compositing.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The image has a zero dimension; there is nothing to render.
    #[error("cannot compose a zero-sized canvas")]
    EmptyCanvas,

    /// The output would exceed the canvas allocation limit.
    #[error("output canvas {width}x{height} exceeds the {max}px limit")]
    CanvasTooLarge { width: u32, height: u32, max: u32 },
}

/// Compose the final raster for export.
///
/// Fails with [`ExportError`] before allocating anything when the canvas
/// would be degenerate or pathologically large; the caller must not
/// persist a partial result.
pub fn compose(
    image: &Raster,
    drawing: &DrawingLayer,
    texts: &[TextOverlay],
    backend: &dyn TextBackend,
    options: &EditorOptions,
) -> Result<Raster, ExportError> {
    if image.is_empty() {
        return Err(ExportError::EmptyCanvas);
    }
    if image.width > MAX_CANVAS_DIM || image.height > MAX_CANVAS_DIM {
        return Err(ExportError::CanvasTooLarge {
            width: image.width,
            height: image.height,
            max: MAX_CANVAS_DIM,
        });
    }

    let mut canvas = image.clone();

    rasterize_strokes(&mut canvas, drawing);

    for overlay in texts {
        text::draw_text_overlay(&mut canvas, overlay, backend, options);
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::Color;

    /// Backend that rasterizes every character as a solid square,
    /// sidestepping font files in tests.
    struct BlockBackend;

    impl TextBackend for BlockBackend {
        fn rasterize(&self, text: &str, font_size: f64) -> Option<TextRaster> {
            let chars = text.chars().filter(|c| !c.is_whitespace()).count() as u32;
            if chars == 0 {
                return None;
            }
            let width = chars * font_size as u32;
            let height = font_size as u32;
            Some(TextRaster {
                width,
                height,
                coverage: vec![1.0; (width * height) as usize],
            })
        }
    }

    fn options() -> EditorOptions {
        EditorOptions::default()
    }

    #[test]
    fn test_compose_empty_state_is_background_copy() {
        let img = Raster::filled(20, 20, Color::new(10, 20, 30));
        let drawing = DrawingLayer::new(img.size());
        let out = compose(&img, &drawing, &[], &BlockBackend, &options()).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_compose_rejects_zero_canvas() {
        let img = Raster::new(0, 0, vec![]);
        let drawing = DrawingLayer::new(Size::new(1.0, 1.0));
        let err = compose(&img, &drawing, &[], &BlockBackend, &options()).unwrap_err();
        assert!(matches!(err, ExportError::EmptyCanvas));
    }

    #[test]
    fn test_compose_rejects_pathological_canvas() {
        // A 1px-tall canvas keeps the test allocation small
        let img = Raster {
            width: MAX_CANVAS_DIM + 1,
            height: 1,
            pixels: vec![0; ((MAX_CANVAS_DIM + 1) * 3) as usize],
        };
        let drawing = DrawingLayer::new(img.size());
        let err = compose(&img, &drawing, &[], &BlockBackend, &options()).unwrap_err();
        assert!(matches!(err, ExportError::CanvasTooLarge { .. }));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let img = Raster::filled(40, 40, Color::new(0, 0, 128));
        let mut drawing = DrawingLayer::new(img.size());
        drawing.append(
            vec![Point::new(5.0, 5.0), Point::new(35.0, 35.0)],
            Color::new(255, 0, 0),
            4.0,
        );
        let texts = vec![crate::overlay::TextOverlay {
            id: uuid::Uuid::new_v4(),
            text: "A".into(),
            position: Point::new(20.0, 20.0),
            font_size: 8.0,
            color: Color::WHITE,
            rotation: 0.0,
            scale: 1.0,
        }];

        let a = compose(&img, &drawing, &texts, &BlockBackend, &options()).unwrap();
        let b = compose(&img, &drawing, &texts, &BlockBackend, &options()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_later_overlay_draws_on_top() {
        let img = Raster::filled(60, 60, Color::new(0, 0, 0));
        let drawing = DrawingLayer::new(img.size());
        let mut opts = options();
        // Disable the outline so the test reads the fill colors directly
        opts.text_outline_width = 0.0;

        let bottom = crate::overlay::TextOverlay {
            id: uuid::Uuid::new_v4(),
            text: "A".into(),
            position: Point::new(30.0, 30.0),
            font_size: 10.0,
            color: Color::new(0, 255, 0),
            rotation: 0.0,
            scale: 1.0,
        };
        let top = crate::overlay::TextOverlay {
            id: uuid::Uuid::new_v4(),
            text: "B".into(),
            position: Point::new(30.0, 30.0),
            font_size: 10.0,
            color: Color::new(255, 0, 0),
            rotation: 0.0,
            scale: 1.0,
        };

        let out = compose(
            &img,
            &drawing,
            &[bottom, top],
            &BlockBackend,
            &opts,
        )
        .unwrap();

        // Both blocks fully overlap at the center; the later one wins
        assert_eq!(out.pixel(30, 30), Color::new(255, 0, 0));
    }

    #[test]
    fn test_strokes_render_under_text() {
        let img = Raster::filled(40, 40, Color::BLACK);
        let mut drawing = DrawingLayer::new(img.size());
        drawing.append(
            vec![Point::new(0.0, 20.0), Point::new(40.0, 20.0)],
            Color::new(0, 0, 255),
            6.0,
        );
        let mut opts = options();
        opts.text_outline_width = 0.0;
        let texts = vec![crate::overlay::TextOverlay {
            id: uuid::Uuid::new_v4(),
            text: "X".into(),
            position: Point::new(20.0, 20.0),
            font_size: 6.0,
            color: Color::WHITE,
            rotation: 0.0,
            scale: 1.0,
        }];

        let out = compose(&img, &drawing, &texts, &BlockBackend, &opts).unwrap();

        // Text covers the stroke at the center...
        assert_eq!(out.pixel(20, 20), Color::WHITE);
        // ...while the stroke still shows away from the text block
        assert_eq!(out.pixel(2, 20), Color::new(0, 0, 255));
    }
}
