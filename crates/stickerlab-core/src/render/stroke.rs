//! Freehand stroke rasterization.
//!
//! Strokes are stamped as anti-aliased discs along each polyline segment.
//! Coverage accumulates with `max`, not addition, so overlapping stamps
//! within one stroke never stack opacity; the finished coverage map is
//! blended onto the canvas in a single pass per stroke.

use crate::geometry::Point;
use crate::overlay::DrawingLayer;
use crate::raster::Raster;

/// Render every stroke of `layer` onto `canvas`.
///
/// Stroke coordinates and widths are scaled from the layer's capture
/// surface to the canvas size, so a stroke drawn on a small on-screen
/// canvas lands in the right place on the native-resolution export.
pub fn rasterize_strokes(canvas: &mut Raster, layer: &DrawingLayer) {
    if layer.is_empty() || layer.surface.is_degenerate() || canvas.is_empty() {
        return;
    }

    let sx = f64::from(canvas.width) / layer.surface.width;
    let sy = f64::from(canvas.height) / layer.surface.height;

    let mut coverage = vec![0.0f32; canvas.pixel_count() as usize];

    for stroke in &layer.strokes {
        coverage.fill(0.0);

        // Widths scale with the mean axis ratio; the capture surface and
        // the image share an aspect in the common case, where sx == sy
        let radius = (stroke.width * 0.5 * (sx + sy) * 0.5).max(0.5);
        let points: Vec<Point> = stroke
            .points
            .iter()
            .map(|p| Point::new(p.x * sx, p.y * sy))
            .collect();

        if points.len() == 1 {
            stamp_disc(&mut coverage, canvas.width, canvas.height, points[0], radius);
        } else {
            for seg in points.windows(2) {
                stamp_segment(&mut coverage, canvas.width, canvas.height, seg[0], seg[1], radius);
            }
        }

        for y in 0..canvas.height {
            for x in 0..canvas.width {
                let cov = coverage[(y * canvas.width + x) as usize];
                if cov > 0.0 {
                    canvas.blend_pixel(i64::from(x), i64::from(y), stroke.color, cov);
                }
            }
        }
    }
}

/// Stamp discs along the segment `a`-`b` at sub-radius spacing.
fn stamp_segment(coverage: &mut [f32], width: u32, height: u32, a: Point, b: Point, radius: f64) {
    let length = a.distance(b);
    let step = (radius * 0.5).max(0.5);
    let count = (length / step).ceil() as usize;

    if count == 0 {
        stamp_disc(coverage, width, height, a, radius);
        return;
    }

    for i in 0..=count {
        let t = i as f64 / count as f64;
        let center = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
        stamp_disc(coverage, width, height, center, radius);
    }
}

/// Stamp one disc into the coverage map with a one-pixel soft edge,
/// keeping the max of existing and new coverage.
fn stamp_disc(coverage: &mut [f32], width: u32, height: u32, center: Point, radius: f64) {
    let x0 = (center.x - radius - 1.0).floor().max(0.0) as u32;
    let y0 = (center.y - radius - 1.0).floor().max(0.0) as u32;
    let x1 = ((center.x + radius + 1.0).ceil() as i64).clamp(0, i64::from(width)) as u32;
    let y1 = ((center.y + radius + 1.0).ceil() as i64).clamp(0, i64::from(height)) as u32;

    for py in y0..y1 {
        for px in x0..x1 {
            let d = center.distance(Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5));
            let cov = (radius - d + 0.5).clamp(0.0, 1.0) as f32;
            if cov > 0.0 {
                let idx = (py * width + px) as usize;
                coverage[idx] = coverage[idx].max(cov);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::Color;

    fn layer(surface: f64) -> DrawingLayer {
        DrawingLayer::new(Size::new(surface, surface))
    }

    #[test]
    fn test_empty_layer_leaves_canvas_untouched() {
        let mut canvas = Raster::filled(10, 10, Color::BLACK);
        rasterize_strokes(&mut canvas, &layer(10.0));
        assert_eq!(canvas, Raster::filled(10, 10, Color::BLACK));
    }

    #[test]
    fn test_horizontal_stroke_paints_its_path() {
        let mut canvas = Raster::filled(40, 40, Color::BLACK);
        let mut l = layer(40.0);
        l.append(
            vec![Point::new(5.0, 20.0), Point::new(35.0, 20.0)],
            Color::new(255, 0, 0),
            6.0,
        );
        rasterize_strokes(&mut canvas, &l);

        // On the path: fully covered
        assert_eq!(canvas.pixel(20, 20), Color::new(255, 0, 0));
        assert_eq!(canvas.pixel(10, 20), Color::new(255, 0, 0));
        // Far corner stays background
        assert_eq!(canvas.pixel(0, 0), Color::BLACK);
        assert_eq!(canvas.pixel(39, 39), Color::BLACK);
    }

    #[test]
    fn test_single_point_stroke_is_a_dot() {
        let mut canvas = Raster::filled(20, 20, Color::BLACK);
        let mut l = layer(20.0);
        l.append(vec![Point::new(10.0, 10.0)], Color::WHITE, 4.0);
        rasterize_strokes(&mut canvas, &l);

        assert_eq!(canvas.pixel(10, 10), Color::WHITE);
        assert_eq!(canvas.pixel(0, 0), Color::BLACK);
    }

    #[test]
    fn test_strokes_scale_from_capture_surface() {
        // Captured on a 50x50 surface, exported at 100x100
        let mut canvas = Raster::filled(100, 100, Color::BLACK);
        let mut l = layer(50.0);
        l.append(vec![Point::new(25.0, 25.0)], Color::WHITE, 4.0);
        rasterize_strokes(&mut canvas, &l);

        // Lands at the scaled position, not the captured one
        assert_eq!(canvas.pixel(50, 50), Color::WHITE);
        assert_eq!(canvas.pixel(25, 25), Color::BLACK);
    }

    #[test]
    fn test_overlapping_stamps_do_not_stack() {
        // A zig-zag that crosses itself; max-coverage keeps the color flat
        let mut canvas = Raster::filled(30, 30, Color::new(100, 100, 100));
        let mut l = layer(30.0);
        l.append(
            vec![
                Point::new(5.0, 15.0),
                Point::new(25.0, 15.0),
                Point::new(5.0, 15.0),
            ],
            Color::new(200, 0, 0),
            4.0,
        );
        rasterize_strokes(&mut canvas, &l);

        assert_eq!(canvas.pixel(15, 15), Color::new(200, 0, 0));
    }

    #[test]
    fn test_stroke_clipped_at_canvas_edge() {
        let mut canvas = Raster::filled(10, 10, Color::BLACK);
        let mut l = layer(10.0);
        l.append(
            vec![Point::new(-5.0, 5.0), Point::new(5.0, 5.0)],
            Color::WHITE,
            2.0,
        );
        rasterize_strokes(&mut canvas, &l);

        // In-bounds part painted, no panic for the out-of-bounds part
        assert_eq!(canvas.pixel(2, 5), Color::WHITE);
    }

    #[test]
    fn test_later_stroke_draws_over_earlier() {
        let mut canvas = Raster::filled(20, 20, Color::BLACK);
        let mut l = layer(20.0);
        l.append(
            vec![Point::new(0.0, 10.0), Point::new(20.0, 10.0)],
            Color::new(255, 0, 0),
            4.0,
        );
        l.append(
            vec![Point::new(10.0, 0.0), Point::new(10.0, 20.0)],
            Color::new(0, 255, 0),
            4.0,
        );
        rasterize_strokes(&mut canvas, &l);

        assert_eq!(canvas.pixel(10, 10), Color::new(0, 255, 0));
    }
}
