//! Drawing-canvas core for the phone-case design dialog.
//!
//! An [`EditorSession`] owns one fixed-size raster surface, its linear undo
//! history, the brush/eraser stroke engine and a presentational zoom. The
//! host UI feeds it pointer events and tool changes and receives a finished
//! PNG (or `data:` URL) to upload.

pub mod canvas;
pub mod components;
pub mod config;
pub mod error;
pub mod io;
pub mod logger;
pub mod session;
pub mod view;

pub use canvas::{FitRect, Surface};
pub use components::history::{HistoryManager, Snapshot, SnapshotKind};
pub use components::tools::{StrokeKind, Tool, ToolProperties};
pub use config::EditorConfig;
pub use error::{CanvasError, ConfigError};
pub use session::{BaseImage, EditorSession};
pub use view::{Point, ViewTransform, Viewport};
