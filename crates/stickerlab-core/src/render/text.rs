//! Text overlay rendering.
//!
//! Glyph rasterization is a capability of the rendering backend, behind
//! the [`TextBackend`] trait: the compositor only consumes per-pixel
//! coverage. [`GlyphBackend`] is the bundled `ab_glyph` implementation;
//! embedders supply the font bytes (no font files ship with the crate).
//!
//! Exported text is drawn centered on the overlay position with a
//! fixed-width dark outline behind the fill, so captions stay legible
//! against arbitrary backgrounds.

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};

use crate::overlay::TextOverlay;
use crate::raster::Raster;
use crate::EditorOptions;

/// A rasterized block of text: per-pixel coverage over a tight bounding
/// box. Coverage is in [0, 1], row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRaster {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<f32>,
}

/// Rendering-backend seam for text rasterization.
pub trait TextBackend {
    /// Rasterize `text` at `font_size`, or return `None` when there is
    /// nothing to draw (empty or whitespace-only text).
    fn rasterize(&self, text: &str, font_size: f64) -> Option<TextRaster>;
}

/// `ab_glyph`-backed text rasterization with kerning and multiline
/// support. Lines are centered horizontally, matching how captions are
/// laid out on screen.
pub struct GlyphBackend {
    font: FontArc,
}

impl GlyphBackend {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    /// Load a font from raw TTF/OTF bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ab_glyph::InvalidFont> {
        Ok(Self {
            font: FontArc::try_from_vec(bytes)?,
        })
    }
}

impl TextBackend for GlyphBackend {
    fn rasterize(&self, text: &str, font_size: f64) -> Option<TextRaster> {
        let font_size = font_size as f32;
        let scaled = self.font.as_scaled(font_size);
        let ascent = scaled.ascent();
        let line_height = scaled.height();

        // Lay out all lines, each centered about x = 0
        let mut glyphs: Vec<(GlyphId, f32, f32)> = Vec::new();
        for (line_idx, line) in text.split('\n').enumerate() {
            let mut cursor = 0.0f32;
            let mut last: Option<GlyphId> = None;
            let mut line_glyphs = Vec::new();

            for ch in line.chars() {
                let id = self.font.glyph_id(ch);
                if let Some(prev) = last {
                    cursor += scaled.kern(prev, id);
                }
                line_glyphs.push((id, cursor));
                cursor += scaled.h_advance(id);
                last = Some(id);
            }

            let offset = -cursor * 0.5;
            let baseline = ascent + line_idx as f32 * line_height;
            for (id, x) in line_glyphs {
                glyphs.push((id, x + offset, baseline));
            }
        }

        let outlined: Vec<_> = glyphs
            .into_iter()
            .filter_map(|(id, x, y)| {
                self.font
                    .outline_glyph(id.with_scale_and_position(font_size, point(x, y)))
            })
            .collect();
        if outlined.is_empty() {
            return None;
        }

        // Tight bounds over all outlined glyphs
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for glyph in &outlined {
            let b = glyph.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }

        let width = (max_x - min_x).ceil() as u32;
        let height = (max_y - min_y).ceil() as u32;
        if width == 0 || height == 0 {
            return None;
        }

        let mut coverage = vec![0.0f32; (width * height) as usize];
        for glyph in &outlined {
            let b = glyph.px_bounds();
            let gx = (b.min.x - min_x).round() as i64;
            let gy = (b.min.y - min_y).round() as i64;
            glyph.draw(|px, py, cov| {
                let x = gx + i64::from(px);
                let y = gy + i64::from(py);
                if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                    let idx = (y as u32 * width + x as u32) as usize;
                    coverage[idx] = coverage[idx].max(cov);
                }
            });
        }

        Some(TextRaster {
            width,
            height,
            coverage,
        })
    }
}

/// Render one overlay onto the canvas: dark outline first, fill on top,
/// centered on the overlay's image-space position.
pub(crate) fn draw_text_overlay(
    canvas: &mut Raster,
    overlay: &TextOverlay,
    backend: &dyn TextBackend,
    options: &EditorOptions,
) {
    let Some(raster) = backend.rasterize(&overlay.text, overlay.font_size) else {
        return;
    };

    let left = (overlay.position.x - f64::from(raster.width) / 2.0).round() as i64;
    let top = (overlay.position.y - f64::from(raster.height) / 2.0).round() as i64;

    let outline = options.text_outline_width.round() as u32;
    if outline > 0 {
        let dilated = dilate(&raster, outline);
        let r = i64::from(outline);
        blend_coverage(canvas, &dilated, left - r, top - r, options.outline_color);
    }

    blend_coverage(canvas, &raster, left, top, overlay.color);
}

/// Blend a coverage raster onto the canvas at (`left`, `top`).
fn blend_coverage(canvas: &mut Raster, raster: &TextRaster, left: i64, top: i64, color: crate::Color) {
    for y in 0..raster.height {
        for x in 0..raster.width {
            let cov = raster.coverage[(y * raster.width + x) as usize];
            if cov > 0.0 {
                canvas.blend_pixel(left + i64::from(x), top + i64::from(y), color, cov);
            }
        }
    }
}

/// Morphological dilation by a disc of `radius` pixels, expanding the
/// bounding box so the outline is never clipped by the text bounds.
fn dilate(src: &TextRaster, radius: u32) -> TextRaster {
    let r = i64::from(radius);
    let width = src.width + 2 * radius;
    let height = src.height + 2 * radius;
    let mut coverage = vec![0.0f32; (width * height) as usize];

    for y in 0..i64::from(height) {
        for x in 0..i64::from(width) {
            let mut best = 0.0f32;
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy > r * r {
                        continue;
                    }
                    let sx = x - r + dx;
                    let sy = y - r + dy;
                    if sx >= 0 && sy >= 0 && (sx as u32) < src.width && (sy as u32) < src.height {
                        best = best.max(src.coverage[(sy as u32 * src.width + sx as u32) as usize]);
                    }
                }
            }
            coverage[(y as u32 * width + x as u32) as usize] = best;
        }
    }

    TextRaster {
        width,
        height,
        coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::Color;

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

    fn overlay(text: &str, x: f64, y: f64, font_size: f64, color: Color) -> TextOverlay {
        TextOverlay {
            id: uuid::Uuid::new_v4(),
            text: text.into(),
            position: Point::new(x, y),
            font_size,
            color,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    #[test]
    fn test_text_centered_on_position() {
        let mut canvas = Raster::filled(40, 40, Color::BLACK);
        let mut opts = EditorOptions::default();
        opts.text_outline_width = 0.0;

        // 10x10 block centered at (20, 20) covers 15..25
        draw_text_overlay(
            &mut canvas,
            &overlay("A", 20.0, 20.0, 10.0, Color::WHITE),
            &BlockBackend,
            &opts,
        );

        assert_eq!(canvas.pixel(20, 20), Color::WHITE);
        assert_eq!(canvas.pixel(15, 15), Color::WHITE);
        assert_eq!(canvas.pixel(24, 24), Color::WHITE);
        assert_eq!(canvas.pixel(14, 20), Color::BLACK);
        assert_eq!(canvas.pixel(25, 20), Color::BLACK);
    }

    #[test]
    fn test_outline_rings_the_fill() {
        let mut canvas = Raster::filled(40, 40, Color::new(0, 0, 200));
        let mut opts = EditorOptions::default();
        opts.text_outline_width = 3.0;

        draw_text_overlay(
            &mut canvas,
            &overlay("A", 20.0, 20.0, 10.0, Color::WHITE),
            &BlockBackend,
            &opts,
        );

        // Fill at the center, outline just outside the block edge
        assert_eq!(canvas.pixel(20, 20), Color::WHITE);
        assert_eq!(canvas.pixel(13, 20), Color::BLACK);
        assert_eq!(canvas.pixel(20, 13), Color::BLACK);
        // Beyond the outline, background survives
        assert_eq!(canvas.pixel(5, 20), Color::new(0, 0, 200));
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut canvas = Raster::filled(20, 20, Color::BLACK);
        draw_text_overlay(
            &mut canvas,
            &overlay("", 10.0, 10.0, 10.0, Color::WHITE),
            &BlockBackend,
            &EditorOptions::default(),
        );
        assert_eq!(canvas, Raster::filled(20, 20, Color::BLACK));
    }

    #[test]
    fn test_text_clipped_at_canvas_edge() {
        let mut canvas = Raster::filled(20, 20, Color::BLACK);
        let mut opts = EditorOptions::default();
        opts.text_outline_width = 0.0;

        // Block centered near the corner spills off-canvas without panicking
        draw_text_overlay(
            &mut canvas,
            &overlay("A", 1.0, 1.0, 10.0, Color::WHITE),
            &BlockBackend,
            &opts,
        );
        assert_eq!(canvas.pixel(1, 1), Color::WHITE);
    }

    #[test]
    fn test_dilate_expands_box_and_fills_ring() {
        let src = TextRaster {
            width: 1,
            height: 1,
            coverage: vec![1.0],
        };
        let out = dilate(&src, 2);
        assert_eq!(out.width, 5);
        assert_eq!(out.height, 5);
        // Center and axis neighbors within the disc
        assert_eq!(out.coverage[(2 * 5 + 2) as usize], 1.0);
        assert_eq!(out.coverage[(2 * 5 + 0) as usize], 1.0);
        assert_eq!(out.coverage[0], 0.0); // corner is outside the disc
    }

    #[test]
    fn test_whitespace_only_text_is_none() {
        assert!(BlockBackend.rasterize("", 32.0).is_none());
        assert!(BlockBackend.rasterize(" \n ", 32.0).is_none());
    }
}
