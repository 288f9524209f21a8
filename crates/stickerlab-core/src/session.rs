//! The editor session: owns the image and overlay state, routes pointer
//! input to the active tool, and drives export and save.
//!
//! All mutation happens synchronously on the caller's thread. Export can be
//! offloaded by taking an [`ExportSnapshot`] (a frozen copy of everything
//! the compositor reads) and rendering it on a worker while the session
//! keeps accepting input. Persistence is a collaborator behind the
//! [`StickerStore`] trait; a save always creates a new record and never
//! overwrites the source image.

use chrono::Utc;
use log::{debug, info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::crop::{CropHandle, CropState};
use crate::geometry::{DisplayGeometry, GeometryError, Point, Size};
use crate::overlay::{DrawingLayer, OverlayStore, TextEdit, TextOverlay};
use crate::raster::Raster;
use crate::render::{compose, ExportError, TextBackend};
use crate::tool::{PointerPhase, Tool, ToolState};
use crate::{Color, EditorOptions};

/// Record returned by the persistence collaborator for a saved sticker.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StickerRecord {
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Error reported by the persistence collaborator. The message is surfaced
/// to the user as-is.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PersistenceError {
    pub message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Persistence collaborator. Implementations append a new record per call;
/// there is no overwrite path.
pub trait StickerStore {
    fn save(&mut self, image: &Raster, suggested_name: &str) -> Result<StickerRecord, PersistenceError>;
}

/// Errors from the save path. Either way the in-memory edit state is left
/// untouched, so the user can retry.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("save failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Open an editing session for a decoded image.
pub fn open_editor(image: Raster) -> EditorSession {
    EditorSession::open(image)
}

/// An interactive editing session over one image.
pub struct EditorSession {
    image: Raster,
    overlays: OverlayStore,
    crop: Option<CropState>,
    tools: ToolState,
    viewport: Option<DisplayGeometry>,
    options: EditorOptions,
    filename_hint: Option<String>,

    brush_color: Color,
    brush_width: f64,
    selected_text: Option<Uuid>,

    // In-flight pointer gesture
    active_stroke: Option<Vec<Point>>,
    active_handle: Option<CropHandle>,
    last_pointer: Option<Point>,
}

impl EditorSession {
    pub fn open(image: Raster) -> Self {
        Self::with_options(image, None, EditorOptions::default())
    }

    /// Open a session with a filename hint (used to derive save names) and
    /// explicit options.
    pub fn with_options(
        image: Raster,
        filename_hint: Option<String>,
        options: EditorOptions,
    ) -> Self {
        let surface = image.size();
        Self {
            image,
            overlays: OverlayStore::new(surface),
            crop: None,
            tools: ToolState::new(),
            viewport: None,
            brush_color: options.default_brush_color,
            brush_width: options.default_brush_width,
            options,
            filename_hint,
            selected_text: None,
            active_stroke: None,
            active_handle: None,
            last_pointer: None,
        }
    }

    pub fn image(&self) -> &Raster {
        &self.image
    }

    pub fn overlays(&self) -> &OverlayStore {
        &self.overlays
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Record the container size from a layout pass. Until this succeeds
    /// once, pointer input cannot be converted and is ignored.
    pub fn set_viewport(&mut self, container: Size) -> Result<(), GeometryError> {
        self.viewport = Some(DisplayGeometry::new(self.image.size(), container)?);
        Ok(())
    }

    pub fn viewport(&self) -> Option<&DisplayGeometry> {
        self.viewport.as_ref()
    }

    // ------------------------------------------------------------------
    // Tools
    // ------------------------------------------------------------------

    pub fn tool(&self) -> Tool {
        self.tools.current()
    }

    /// Switch the active tool.
    ///
    /// Entering `Crop` starts a crop session over the full image; leaving
    /// it by selecting any other tool discards the crop state. Selecting
    /// `Text` is a prompt trigger: the tool reverts on [`Self::add_text`].
    pub fn select_tool(&mut self, tool: Tool) {
        if self.tools.current() == Tool::Crop && tool != Tool::Crop {
            self.cancel_crop();
        }
        self.tools.select(tool);
        if tool == Tool::Crop {
            self.crop = Some(CropState::begin(self.image.size()));
            debug!("crop session started at full bounds");
        }
        self.active_stroke = None;
        self.active_handle = None;
    }

    pub fn brush_color(&self) -> Color {
        self.brush_color
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.brush_color = color;
    }

    pub fn brush_width(&self) -> f64 {
        self.brush_width
    }

    pub fn set_brush_width(&mut self, width: f64) {
        self.brush_width = width.max(0.1);
    }

    // ------------------------------------------------------------------
    // Text overlays
    // ------------------------------------------------------------------

    /// Add a text overlay at the image-space center of the current image
    /// and return its id. Reverts the tool to its prior value: the text
    /// tool selects where the *next* overlay goes, it is not a property of
    /// existing overlays.
    pub fn add_text(&mut self, text: impl Into<String>) -> Uuid {
        let center = self.image.size().center();
        let id = self.overlays.add_text(
            text,
            center,
            self.options.default_font_size,
            self.options.default_text_color,
        );
        if self.tools.current() == Tool::Text {
            self.tools.revert();
        }
        debug!("text overlay {id} added at image center");
        id
    }

    /// Merge the supplied fields into an overlay; absent ids are a silent
    /// no-op (returns false).
    pub fn update_text(&mut self, id: Uuid, edit: TextEdit) -> bool {
        self.overlays.update_text(id, edit)
    }

    pub fn remove_text(&mut self, id: Uuid) -> bool {
        if self.selected_text == Some(id) {
            self.selected_text = None;
        }
        self.overlays.remove_text(id)
    }

    pub fn select_text(&mut self, id: Uuid) -> bool {
        if self.overlays.text(id).is_some() {
            self.selected_text = Some(id);
            true
        } else {
            false
        }
    }

    pub fn deselect_text(&mut self) {
        self.selected_text = None;
    }

    pub fn selected_text(&self) -> Option<Uuid> {
        self.selected_text
    }

    /// Move an overlay to a screen-space point (drag gesture). Ignored
    /// until a viewport exists.
    pub fn drag_text(&mut self, id: Uuid, screen: Point) -> bool {
        let Some(geo) = self.viewport else {
            return false;
        };
        self.overlays.update_text(
            id,
            TextEdit {
                position: Some(geo.to_image(screen)),
                ..Default::default()
            },
        )
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Append a finished stroke directly (bypassing pointer routing).
    pub fn append_stroke(&mut self, points: Vec<Point>, color: Color, width: f64) {
        self.overlays.append_stroke(points, color, width);
    }

    pub fn clear_drawing(&mut self) {
        self.overlays.clear_drawing();
    }

    // ------------------------------------------------------------------
    // Pointer routing
    // ------------------------------------------------------------------

    /// Route a pointer event to the active tool's handler.
    ///
    /// Conversion to image space happens here, once, at the input
    /// boundary. Events are dropped until a viewport layout pass has
    /// occurred. Tools without pointer behavior (`None`, `Text`) ignore
    /// events entirely.
    pub fn handle_pointer(&mut self, phase: PointerPhase, screen: Point) {
        let Some(geo) = self.viewport else {
            return;
        };
        match self.tools.current() {
            Tool::Brush => self.pointer_brush(phase, geo.to_image(screen)),
            Tool::Eraser => self.pointer_eraser(phase, geo.to_image(screen)),
            Tool::Crop => self.pointer_crop(phase, screen, geo),
            Tool::None | Tool::Text => {}
        }
    }

    fn pointer_brush(&mut self, phase: PointerPhase, p: Point) {
        match phase {
            PointerPhase::Down => {
                self.active_stroke = Some(vec![p]);
            }
            PointerPhase::Move => {
                if let Some(stroke) = self.active_stroke.as_mut() {
                    stroke.push(p);
                }
            }
            PointerPhase::Up => {
                if let Some(mut stroke) = self.active_stroke.take() {
                    stroke.push(p);
                    self.overlays
                        .append_stroke(stroke, self.brush_color, self.brush_width);
                }
            }
        }
    }

    fn pointer_eraser(&mut self, phase: PointerPhase, p: Point) {
        if matches!(phase, PointerPhase::Down | PointerPhase::Move) {
            let removed = self
                .overlays
                .drawing
                .erase_at(p, self.options.eraser_radius);
            if removed > 0 {
                debug!("eraser removed {removed} stroke(s)");
            }
        }
    }

    fn pointer_crop(&mut self, phase: PointerPhase, screen: Point, geo: DisplayGeometry) {
        let Some(crop) = self.crop.as_mut() else {
            return;
        };
        match phase {
            PointerPhase::Down => {
                if crop.handles_active() {
                    let hit_radius = self.options.handle_hit_radius;
                    self.active_handle = CropHandle::ALL.into_iter().find(|&h| {
                        geo.to_screen(crop.handle_position(h)).distance(screen) <= hit_radius
                    });
                    self.last_pointer = Some(screen);
                }
            }
            PointerPhase::Move => {
                if let (Some(handle), Some(last)) = (self.active_handle, self.last_pointer) {
                    let delta =
                        geo.delta_to_image(Point::new(screen.x - last.x, screen.y - last.y));
                    crop.drag_handle(handle, delta, self.options.min_crop_size);
                    self.last_pointer = Some(screen);
                }
            }
            PointerPhase::Up => {
                self.active_handle = None;
                self.last_pointer = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Crop / pad
    // ------------------------------------------------------------------

    pub fn crop_state(&self) -> Option<&CropState> {
        self.crop.as_ref()
    }

    /// Set the padding amount on the active crop session. Clamped to the
    /// configured maximum; inert once the rect has been adjusted.
    pub fn set_padding(&mut self, amount: f64) -> bool {
        let max = self.options.max_padding;
        match self.crop.as_mut() {
            Some(crop) => crop.set_padding(amount, max),
            None => false,
        }
    }

    /// Commit the crop session: replace the image with the cropped or
    /// padded result and return to idle.
    ///
    /// Existing stroke and text coordinates are intentionally left in
    /// their original spaces; see the module docs in [`crate::overlay`].
    pub fn apply_crop(&mut self) {
        let Some(state) = self.crop.take() else {
            return;
        };
        let next = state.apply(&self.image, self.options.padding_fill);
        info!(
            "crop applied: {}x{} -> {}x{} (padding {})",
            self.image.width, self.image.height, next.width, next.height, state.padding
        );
        self.image = next;
        self.tools.select(Tool::None);
        self.active_handle = None;

        // The display layout depends on the image size; recompute for the
        // same container
        if let Some(geo) = self.viewport.take() {
            self.viewport = DisplayGeometry::new(self.image.size(), geo.container()).ok();
        }
    }

    /// Discard the crop session, leaving the image unchanged.
    pub fn cancel_crop(&mut self) {
        if self.crop.take().is_some() {
            debug!("crop session cancelled");
        }
        self.active_handle = None;
    }

    // ------------------------------------------------------------------
    // Export / save
    // ------------------------------------------------------------------

    /// Compose the final raster at native resolution.
    pub fn export(&self, backend: &dyn TextBackend) -> Result<Raster, ExportError> {
        compose(
            &self.image,
            &self.overlays.drawing,
            self.overlays.texts(),
            backend,
            &self.options,
        )
    }

    /// Freeze a consistent copy of everything the compositor reads, for
    /// rendering on a worker thread.
    pub fn snapshot(&self) -> ExportSnapshot {
        ExportSnapshot {
            image: self.image.clone(),
            drawing: self.overlays.drawing.clone(),
            texts: self.overlays.texts().to_vec(),
            options: self.options.clone(),
        }
    }

    /// Export and hand the raster to the persistence collaborator.
    ///
    /// The suggested name is `<stem>_edited_<timestamp>` when the session
    /// has a filename hint, `edited_<timestamp>` otherwise. On failure the
    /// in-memory state is untouched and the user may retry.
    pub fn export_and_save(
        &self,
        backend: &dyn TextBackend,
        store: &mut dyn StickerStore,
    ) -> Result<StickerRecord, SaveError> {
        let raster = self.export(backend)?;
        let name = self.derived_filename();
        match store.save(&raster, &name) {
            Ok(record) => {
                info!("saved sticker {} ({}x{})", record.filename, record.width, record.height);
                Ok(record)
            }
            Err(err) => {
                warn!("save failed: {err}");
                Err(err.into())
            }
        }
    }

    fn derived_filename(&self) -> String {
        let timestamp = Utc::now().timestamp();
        match &self.filename_hint {
            Some(hint) => {
                let stem = hint.rsplit_once('.').map_or(hint.as_str(), |(stem, _)| stem);
                format!("{stem}_edited_{timestamp}")
            }
            None => format!("edited_{timestamp}"),
        }
    }
}

/// A frozen copy of the compositor's inputs, safe to move to a worker.
#[derive(Debug, Clone)]
pub struct ExportSnapshot {
    image: Raster,
    drawing: DrawingLayer,
    texts: Vec<TextOverlay>,
    options: EditorOptions,
}

impl ExportSnapshot {
    /// Render the snapshot. Pure: repeated calls yield identical rasters.
    pub fn render(&self, backend: &dyn TextBackend) -> Result<Raster, ExportError> {
        compose(
            &self.image,
            &self.drawing,
            &self.texts,
            backend,
            &self.options,
        )
    }
}
