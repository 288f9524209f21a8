//! Overlay state: the freehand drawing layer and text overlays.
//!
//! Text positions are stored in image space. Strokes are recorded against
//! the drawing surface size that was current when they were captured; the
//! compositor rescales them to the native image size at export time. The
//! store has no notion of display geometry; conversion happens before
//! coordinates get here.
//!
//! Mutations are immediately visible to the compositor on its next render;
//! there is no buffering between a write and a read.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Size};
use crate::Color;

/// A single freehand stroke: a polyline with a color and width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Points in drawing-surface coordinates, in capture order.
    pub points: Vec<Point>,
    pub color: Color,
    /// Stroke width in drawing-surface units.
    pub width: f64,
}

impl Stroke {
    pub fn new(points: Vec<Point>, color: Color, width: f64) -> Self {
        Self {
            points,
            color,
            width,
        }
    }

    /// True if any segment of the polyline passes within `radius` of `p`.
    /// A single-point stroke is treated as a dot.
    pub fn passes_near(&self, p: Point, radius: f64) -> bool {
        match self.points.len() {
            0 => false,
            1 => self.points[0].distance(p) <= radius,
            _ => self
                .points
                .windows(2)
                .any(|seg| segment_distance(seg[0], seg[1], p) <= radius),
        }
    }
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(a: Point, b: Point, p: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return a.distance(p);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    Point::new(a.x + t * dx, a.y + t * dy).distance(p)
}

/// The freehand drawing layer: an ordered sequence of strokes.
///
/// `surface` is the size of the drawing surface the strokes were captured
/// at. When the session image is later replaced by crop or pad, the layer
/// keeps its original surface, and export stretches the strokes by
/// `image_size / surface`, matching how the capture canvas behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingLayer {
    /// Capture-time drawing surface size.
    pub surface: Size,
    /// Strokes in capture order.
    pub strokes: Vec<Stroke>,
}

impl DrawingLayer {
    pub fn new(surface: Size) -> Self {
        Self {
            surface,
            strokes: Vec::new(),
        }
    }

    /// Append a finished stroke.
    pub fn append(&mut self, points: Vec<Point>, color: Color, width: f64) {
        if points.is_empty() {
            return;
        }
        self.strokes.push(Stroke::new(points, color, width));
    }

    /// Remove every stroke that passes within `radius` of `p`.
    /// Returns the number of strokes removed.
    pub fn erase_at(&mut self, p: Point, radius: f64) -> usize {
        let before = self.strokes.len();
        self.strokes.retain(|s| !s.passes_near(p, radius));
        before - self.strokes.len()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

/// A text caption overlay.
///
/// `position` is the center of the rendered text block, in image space.
/// `rotation` and `scale` are recorded for gesture state but are not
/// applied at export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub id: Uuid,
    pub text: String,
    pub position: Point,
    pub font_size: f64,
    pub color: Color,
    pub rotation: f64,
    pub scale: f64,
}

/// A partial update for a text overlay. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextEdit {
    pub text: Option<String>,
    pub position: Option<Point>,
    pub font_size: Option<f64>,
    pub color: Option<Color>,
    pub rotation: Option<f64>,
    pub scale: Option<f64>,
}

/// Holds the drawing layer and the list of text overlays for one session.
///
/// Insertion order of text overlays is display order: later overlays draw
/// on top at export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStore {
    pub drawing: DrawingLayer,
    texts: Vec<TextOverlay>,
}

impl OverlayStore {
    /// Create an empty store whose drawing layer captures at `surface`.
    pub fn new(surface: Size) -> Self {
        Self {
            drawing: DrawingLayer::new(surface),
            texts: Vec::new(),
        }
    }

    /// Add a text overlay at `position` and return its id.
    pub fn add_text(
        &mut self,
        text: impl Into<String>,
        position: Point,
        font_size: f64,
        color: Color,
    ) -> Uuid {
        let overlay = TextOverlay {
            id: Uuid::new_v4(),
            text: text.into(),
            position,
            font_size,
            color,
            rotation: 0.0,
            scale: 1.0,
        };
        let id = overlay.id;
        self.texts.push(overlay);
        id
    }

    /// Merge the supplied fields into the overlay with `id`.
    /// Returns false (a silent no-op) when the id is absent.
    pub fn update_text(&mut self, id: Uuid, edit: TextEdit) -> bool {
        let Some(overlay) = self.texts.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if let Some(text) = edit.text {
            overlay.text = text;
        }
        if let Some(position) = edit.position {
            overlay.position = position;
        }
        if let Some(font_size) = edit.font_size {
            overlay.font_size = font_size;
        }
        if let Some(color) = edit.color {
            overlay.color = color;
        }
        if let Some(rotation) = edit.rotation {
            overlay.rotation = rotation;
        }
        if let Some(scale) = edit.scale {
            overlay.scale = scale;
        }
        true
    }

    /// Remove the overlay with `id`. Returns false when absent.
    pub fn remove_text(&mut self, id: Uuid) -> bool {
        let before = self.texts.len();
        self.texts.retain(|t| t.id != id);
        self.texts.len() != before
    }

    pub fn text(&self, id: Uuid) -> Option<&TextOverlay> {
        self.texts.iter().find(|t| t.id == id)
    }

    /// All overlays in display order (first = bottom).
    pub fn texts(&self) -> &[TextOverlay] {
        &self.texts
    }

    /// Append a finished stroke to the drawing layer.
    pub fn append_stroke(&mut self, points: Vec<Point>, color: Color, width: f64) {
        self.drawing.append(points, color, width);
    }

    /// Discard all strokes.
    pub fn clear_drawing(&mut self) {
        self.drawing.clear();
    }
}
