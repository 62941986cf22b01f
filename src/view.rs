//! View transform: zoom and the mapping between view space (pointer
//! coordinates from the host UI) and surface pixel space.
//!
//! The transform is purely presentational. Nothing here touches surface
//! pixels or history.

use crate::config::ZoomConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Where the host draws the surface: the view-space centre of the displayed
/// surface and its size at zoom 1.0. The surface is scaled about its centre,
/// so the on-screen origin moves with the zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: Point,
    pub base_width: f32,
    pub base_height: f32,
}

impl Viewport {
    /// A viewport whose unzoomed top-left corner sits at view origin.
    pub fn new(base_width: f32, base_height: f32) -> Self {
        Self {
            center: Point::new(base_width / 2.0, base_height / 2.0),
            base_width,
            base_height,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
    min: f32,
    max: f32,
    default: f32,
    step: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(&ZoomConfig::default())
    }
}

impl ViewTransform {
    pub fn new(config: &ZoomConfig) -> Self {
        Self {
            zoom: config.default.clamp(config.min, config.max),
            min: config.min,
            max: config.max,
            default: config.default,
            step: config.step,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Zoom rounded to a whole percentage, for labels.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.step);
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(self.default);
    }

    /// Multiply the zoom (e.g. a wheel or pinch gesture).
    pub fn apply_zoom(&mut self, zoom_factor: f32) {
        self.set_zoom(self.zoom * zoom_factor);
    }

    /// Out-of-range and non-finite values are clamped silently.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = if zoom.is_finite() {
            zoom.clamp(self.min, self.max)
        } else if zoom == f32::INFINITY {
            self.max
        } else {
            self.min
        };
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < self.max
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > self.min
    }

    /// On-screen size of the surface at the current zoom.
    pub fn displayed_size(&self, viewport: &Viewport) -> (f32, f32) {
        (viewport.base_width * self.zoom, viewport.base_height * self.zoom)
    }

    /// View-space top-left of the displayed surface.
    pub fn displayed_origin(&self, viewport: &Viewport) -> Point {
        let (w, h) = self.displayed_size(viewport);
        Point::new(viewport.center.x - w / 2.0, viewport.center.y - h / 2.0)
    }

    /// `(pointer - origin) * (surface_size / displayed_size)`. Recomputed from
    /// the current zoom on every call. Points outside the surface are
    /// returned unclamped; stroke rendering clips them.
    pub fn screen_to_surface(&self, pos: Point, viewport: &Viewport, surface_size: (u32, u32)) -> Point {
        let origin = self.displayed_origin(viewport);
        let (dw, dh) = self.displayed_size(viewport);
        let sx = surface_size.0 as f32 / dw;
        let sy = surface_size.1 as f32 / dh;
        Point::new((pos.x - origin.x) * sx, (pos.y - origin.y) * sy)
    }

    /// Inverse of [`ViewTransform::screen_to_surface`].
    pub fn surface_to_screen(&self, pos: Point, viewport: &Viewport, surface_size: (u32, u32)) -> Point {
        let origin = self.displayed_origin(viewport);
        let (dw, dh) = self.displayed_size(viewport);
        Point::new(
            origin.x + pos.x * dw / surface_size.0 as f32,
            origin.y + pos.y * dh / surface_size.1 as f32,
        )
    }
}
