//! One open design dialog: the surface, its history, the stroke engine, the
//! tool configuration and the view transform, driven by host UI events.

use image::{DynamicImage, GenericImageView, RgbaImage};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::canvas::{FitRect, Surface};
use crate::components::history::{HistoryManager, Snapshot, SnapshotKind};
use crate::components::tools::{StrokeEngine, Tool, ToolProperties};
use crate::config::EditorConfig;
use crate::error::{ConfigError, Result};
use crate::io;
use crate::view::{Point, ViewTransform, Viewport};

/// Artwork used to seed the surface.
pub enum BaseImage<'a> {
    /// Encoded bytes in any supported raster format.
    Bytes(&'a [u8]),
    /// A base64 `data:image/...` URL, as stored on design records.
    DataUrl(&'a str),
    /// An already decoded image.
    Image(DynamicImage),
}

pub struct EditorSession {
    pub id: Uuid,
    config: EditorConfig,
    surface: Surface,
    history: HistoryManager,
    engine: StrokeEngine,
    tools: ToolProperties,
    view: ViewTransform,
    viewport: Viewport,
}

impl EditorSession {
    /// Open a session on a blank surface.
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        let background = config.background_color()?;
        let tools = ToolProperties::from_config(&config.brush)?;

        let surface = Surface::new(config.width, config.height, background);
        let history = HistoryManager::new(
            Snapshot::capture(SnapshotKind::Initial, &surface),
            config.max_history,
            config.max_history_bytes,
        );
        let session = Self {
            id: Uuid::new_v4(),
            view: ViewTransform::new(&config.zoom),
            viewport: Viewport::new(config.display_width, config.display_height),
            surface,
            history,
            engine: StrokeEngine::new(),
            tools,
            config,
        };
        log::info!(
            "Design session {} opened ({}x{})",
            session.id,
            session.surface.width(),
            session.surface.height()
        );
        Ok(session)
    }

    /// Open a session seeded with `base`. If the image cannot be decoded the
    /// error is returned and no session is created; use
    /// [`EditorSession::load_base_image`] on an open session to keep a blank
    /// surface on failure instead.
    pub fn with_base_image(config: EditorConfig, base: BaseImage<'_>) -> Result<Self> {
        let mut session = Self::new(config)?;
        session.load_base_image(base)?;
        Ok(session)
    }

    /// Replace the surface with `base`, fitted and centred over the
    /// background, and restart history from it.
    ///
    /// On a decode failure the surface is reset to blank, history restarts
    /// from the blank surface, and the error is returned. The session stays
    /// usable either way.
    pub fn load_base_image(&mut self, base: BaseImage<'_>) -> Result<FitRect> {
        if self.engine.end().is_some() {
            log::debug!("Session {}: stroke discarded by base image load", self.id);
        }

        let decoded = match base {
            BaseImage::Bytes(bytes) => io::decode_image(bytes),
            BaseImage::DataUrl(url) => io::decode_data_url(url).and_then(|b| io::decode_image(&b)),
            BaseImage::Image(image) => Ok(image),
        };

        match decoded {
            Ok(image) => {
                let fit = self.surface.composite_fitted(&image);
                self.history
                    .reset(Snapshot::capture(SnapshotKind::Initial, &self.surface));
                log::info!(
                    "Session {}: base image {}x{} placed at ({}, {}) as {}x{}",
                    self.id,
                    image.width(),
                    image.height(),
                    fit.x,
                    fit.y,
                    fit.width,
                    fit.height
                );
                Ok(fit)
            }
            Err(e) => {
                log::warn!("Session {}: base image rejected, starting blank: {}", self.id, e);
                self.surface.clear();
                self.history
                    .reset(Snapshot::capture(SnapshotKind::Initial, &self.surface));
                Err(e)
            }
        }
    }

    // ---- pointer input (view coordinates) ---------------------------------

    /// Map a view-space pointer position to surface coordinates using the
    /// zoom as it is right now.
    pub fn to_surface(&self, pos: Point) -> Point {
        self.view
            .screen_to_surface(pos, &self.viewport, (self.surface.width(), self.surface.height()))
    }

    /// Returns `true` if a stroke started. Inactive tools are ignored.
    pub fn pointer_down(&mut self, pos: Point) -> bool {
        let pos = self.to_surface(pos);
        self.begin_stroke(pos)
    }

    pub fn pointer_move(&mut self, pos: Point) {
        if self.engine.is_drawing() {
            let pos = self.to_surface(pos);
            self.stroke_to(pos);
        }
    }

    /// Returns `true` if a stroke was committed to history.
    pub fn pointer_up(&mut self) -> bool {
        self.end_stroke()
    }

    /// Leaving the surface finishes the stroke exactly like a release.
    pub fn pointer_leave(&mut self) -> bool {
        self.end_stroke()
    }

    // ---- strokes (surface coordinates) ------------------------------------

    /// Start a stroke with the current tool. A stroke still in progress is
    /// committed first.
    pub fn begin_stroke(&mut self, pos: Point) -> bool {
        self.end_stroke();
        let Some(kind) = self.tools.stroke_kind() else {
            log::debug!("Session {}: {} tool is not active", self.id, self.tools.tool.label());
            return false;
        };
        self.engine.begin(&mut self.surface, kind, pos);
        true
    }

    pub fn stroke_to(&mut self, pos: Point) {
        self.engine.extend(&mut self.surface, pos);
    }

    pub fn end_stroke(&mut self) -> bool {
        match self.engine.end() {
            Some(kind) => {
                self.history
                    .push(Snapshot::capture(kind.snapshot_kind(), &self.surface));
                true
            }
            None => false,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.engine.is_drawing()
    }

    // ---- commands ----------------------------------------------------------

    /// Revert to the previous history entry. No-op at the first entry.
    pub fn undo(&mut self) -> Option<SnapshotKind> {
        self.end_stroke();
        self.history.undo(&mut self.surface)
    }

    /// Re-apply the next history entry. No-op at the newest entry.
    pub fn redo(&mut self) -> Option<SnapshotKind> {
        self.end_stroke();
        self.history.redo(&mut self.surface)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Fill with the background and record it as an undoable entry.
    pub fn clear(&mut self) {
        self.end_stroke();
        self.surface.clear();
        self.history
            .push(Snapshot::capture(SnapshotKind::Clear, &self.surface));
        log::debug!("Session {}: cleared", self.id);
    }

    // ---- export ------------------------------------------------------------

    /// Copy of the current pixels.
    pub fn export_image(&self) -> RgbaImage {
        self.surface.snapshot_pixels()
    }

    pub fn export_png(&self) -> Result<Vec<u8>> {
        let png = io::encode_png(self.surface.pixels())?;
        log::debug!("Session {}: exported {} PNG bytes", self.id, png.len());
        Ok(png)
    }

    /// `data:image/png;base64,...`, ready for upload.
    pub fn export_data_url(&self) -> Result<String> {
        Ok(io::png_data_url(&self.export_png()?))
    }

    /// Write the PNG to `path` (the dialog's download action).
    pub fn save_png(&self, path: &Path) -> Result<()> {
        io::write_file(&self.export_png()?, path)?;
        log::info!("Session {}: saved {}", self.id, path.display());
        Ok(())
    }

    // ---- view --------------------------------------------------------------

    pub fn zoom(&self) -> f32 {
        self.view.zoom()
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.view.reset_zoom();
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.view.set_zoom(zoom);
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// The surface resampled to its on-screen size at the current zoom.
    pub fn render_view(&mut self) -> Arc<RgbaImage> {
        let (w, h) = self.view.displayed_size(&self.viewport);
        self.surface
            .display_image(w.round().max(1.0) as u32, h.round().max(1.0) as u32)
    }

    // ---- tool configuration -----------------------------------------------

    pub fn tools(&self) -> &ToolProperties {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolProperties {
        &mut self.tools
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tools.tool = tool;
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.tools.set_size(size);
    }

    pub fn set_color_hex(&mut self, hex: &str) -> std::result::Result<(), ConfigError> {
        self.tools.set_color_hex(hex)
    }

    // ---- inspection --------------------------------------------------------

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        log::info!(
            "Design session {} closed ({} history entries)",
            self.id,
            self.history.len()
        );
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("id", &self.id)
            .field("size", &(self.surface.width(), self.surface.height()))
            .field("history", &(self.history.cursor(), self.history.len()))
            .field("zoom", &self.view.zoom())
            .field("tool", &self.tools.tool)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CanvasError;

    fn small_config() -> EditorConfig {
        EditorConfig {
            width: 60,
            height: 120,
            display_width: 60.0,
            display_height: 120.0,
            ..EditorConfig::default()
        }
    }

    #[test]
    fn inactive_tool_does_not_touch_history() {
        let mut session = EditorSession::new(small_config()).unwrap();
        session.set_tool(Tool::Text);
        assert!(!session.pointer_down(Point::new(30.0, 60.0)));
        session.pointer_move(Point::new(40.0, 60.0));
        assert!(!session.pointer_up());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn pointer_down_while_drawing_commits_previous_stroke() {
        let mut session = EditorSession::new(small_config()).unwrap();
        session.set_zoom(1.0);
        session.pointer_down(Point::new(10.0, 10.0));
        session.pointer_down(Point::new(20.0, 20.0));
        session.pointer_up();
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn undo_mid_stroke_commits_then_reverts() {
        let mut session = EditorSession::new(small_config()).unwrap();
        session.set_zoom(1.0);
        let blank = session.export_image();
        session.pointer_down(Point::new(10.0, 10.0));
        session.pointer_move(Point::new(30.0, 10.0));
        assert_eq!(session.undo(), Some(SnapshotKind::BrushStroke));
        assert_eq!(session.export_image(), blank);
        assert!(session.can_redo());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EditorConfig {
            width: 0,
            ..EditorConfig::default()
        };
        assert!(matches!(EditorSession::new(config), Err(CanvasError::Config(_))));
    }

    #[test]
    fn render_view_follows_zoom() {
        let mut session = EditorSession::new(small_config()).unwrap();
        assert_eq!(session.render_view().dimensions(), (30, 60));
        session.zoom_in();
        assert_eq!(session.render_view().dimensions(), (45, 90));
    }
}
