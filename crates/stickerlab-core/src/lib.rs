//! Stickerlab Core - Sticker editing and export engine
//!
//! This crate provides the editing core for turning a photo into a
//! decorated sticker: coordinate mapping between image space and the
//! on-screen display, overlay state (freehand strokes and text captions),
//! interactive crop/pad, and deterministic export compositing at the
//! image's native resolution.
//!
//! The entry point is [`session::EditorSession`] (or the [`open_editor`]
//! convenience). Image acquisition and persistence are collaborator
//! concerns: the session takes a decoded [`Raster`] in and hands the
//! composed raster to a [`session::StickerStore`] on save.

pub mod crop;
pub mod geometry;
pub mod overlay;
pub mod raster;
pub mod render;
pub mod session;
pub mod tool;

pub use crop::{crop_raster, pad_raster, CropHandle, CropState};
pub use geometry::{DisplayGeometry, GeometryError, Point, Rect, Size};
pub use overlay::{DrawingLayer, OverlayStore, Stroke, TextEdit, TextOverlay};
pub use raster::Raster;
pub use render::{compose, ExportError, GlyphBackend, TextBackend, TextRaster};
pub use session::{
    open_editor, EditorSession, ExportSnapshot, PersistenceError, SaveError, StickerRecord,
    StickerStore,
};
pub use tool::{PointerPhase, Tool};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Editing policy values for a session.
///
/// The defaults match the shipped editor; embedders can tune them at
/// session creation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EditorOptions {
    /// Smallest crop rectangle edge, in image-space units.
    pub min_crop_size: f64,
    /// Upper bound for the uniform padding amount.
    pub max_padding: f64,
    /// Border fill used by the pad operation.
    pub padding_fill: Color,
    /// Font size for newly created text overlays.
    pub default_font_size: f64,
    /// Color for newly created text overlays.
    pub default_text_color: Color,
    /// Width of the dark outline drawn behind exported text (0 disables).
    pub text_outline_width: f64,
    /// Outline color.
    pub outline_color: Color,
    /// Starting brush color for a new session.
    pub default_brush_color: Color,
    /// Starting brush width for a new session.
    pub default_brush_width: f64,
    /// Pointer distance within which an eraser pass removes a stroke,
    /// in image-space units.
    pub eraser_radius: f64,
    /// Screen-space distance within which a pointer-down grabs a crop
    /// handle.
    pub handle_hit_radius: f64,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            min_crop_size: 50.0,
            max_padding: 200.0,
            padding_fill: Color::WHITE,
            default_font_size: 32.0,
            default_text_color: Color::WHITE,
            text_outline_width: 3.0,
            outline_color: Color::BLACK,
            default_brush_color: Color::BLACK,
            default_brush_width: 4.0,
            eraser_radius: 16.0,
            handle_hit_radius: 24.0,
        }
    }
}

impl EditorOptions {
    /// Create options with the default values.
    pub fn new() -> Self {
        Self::default()
    }
}
