use image::{GrayImage, Luma, Rgba, RgbaImage};

use crate::canvas::Surface;
use crate::components::colors::{BLACK, TRANSPARENT, blend_over, parse_hex_color};
use crate::components::history::SnapshotKind;
use crate::config::BrushConfig;
use crate::error::ConfigError;
use crate::view::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    /// Declared for the toolbar; not wired to the stroke engine yet.
    Circle,
    Rectangle,
    Text,
}

impl Tool {
    pub fn all() -> &'static [Tool] {
        &[Tool::Brush, Tool::Eraser, Tool::Circle, Tool::Rectangle, Tool::Text]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Circle => "Circle",
            Tool::Rectangle => "Rectangle",
            Tool::Text => "Text",
        }
    }

    /// Whether pointer input with this tool produces a stroke.
    pub fn is_active(&self) -> bool {
        matches!(self, Tool::Brush | Tool::Eraser)
    }
}

/// Tool configuration edited by the host UI. Read once at stroke start.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolProperties {
    pub tool: Tool,
    size: f32,
    color: Rgba<u8>,
    min_size: f32,
    max_size: f32,
}

impl Default for ToolProperties {
    fn default() -> Self {
        Self {
            tool: Tool::Brush,
            size: 5.0,
            color: BLACK,
            min_size: 1.0,
            max_size: 50.0,
        }
    }
}

impl ToolProperties {
    pub fn from_config(config: &BrushConfig) -> Result<Self, ConfigError> {
        let min_size = config.min_size;
        let max_size = config.max_size.max(min_size);
        Ok(Self {
            tool: Tool::Brush,
            size: config.default_size.clamp(min_size, max_size),
            color: parse_hex_color(&config.default_color)?,
            min_size,
            max_size,
        })
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Clamped to the configured size range.
    pub fn set_size(&mut self, size: f32) {
        if size.is_finite() {
            self.size = size.clamp(self.min_size, self.max_size);
        }
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.color = color;
    }

    pub fn set_color_hex(&mut self, hex: &str) -> Result<(), ConfigError> {
        self.color = parse_hex_color(hex)?;
        Ok(())
    }

    /// Resolve the active tool into a concrete stroke, or `None` for tools
    /// that don't paint.
    pub fn stroke_kind(&self) -> Option<StrokeKind> {
        match self.tool {
            Tool::Brush => Some(StrokeKind::Brush {
                width: self.size,
                color: self.color,
            }),
            Tool::Eraser => Some(StrokeKind::Eraser { width: self.size }),
            Tool::Circle | Tool::Rectangle | Tool::Text => None,
        }
    }
}

/// A stroke's paint parameters, fixed for its whole duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokeKind {
    /// Source-over in `color`.
    Brush { width: f32, color: Rgba<u8> },
    /// Destination-out: covered pixels become fully transparent.
    Eraser { width: f32 },
}

impl StrokeKind {
    pub fn width(&self) -> f32 {
        match *self {
            StrokeKind::Brush { width, .. } | StrokeKind::Eraser { width } => width,
        }
    }

    pub fn snapshot_kind(&self) -> SnapshotKind {
        match self {
            StrokeKind::Brush { .. } => SnapshotKind::BrushStroke,
            StrokeKind::Eraser { .. } => SnapshotKind::EraserStroke,
        }
    }
}

// ============================================================================
// STROKE ENGINE — Idle → Drawing → Idle
// ============================================================================

enum StrokeState {
    Idle,
    Drawing {
        kind: StrokeKind,
        last: Point,
        /// Surface pixels at stroke start. Covered pixels are always
        /// recomposited from here, so overlapping dabs never build up.
        before: RgbaImage,
        /// Highest coverage (0–255) reached per pixel during this stroke.
        coverage: GrayImage,
    },
}

pub struct StrokeEngine {
    state: StrokeState,
}

impl Default for StrokeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeEngine {
    pub fn new() -> Self {
        Self {
            state: StrokeState::Idle,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// Start a stroke at `pos` (surface coordinates) and stamp the first dab,
    /// so a tap with no movement still leaves a dot.
    pub fn begin(&mut self, surface: &mut Surface, kind: StrokeKind, pos: Point) {
        let before = surface.snapshot_pixels();
        let mut coverage = GrayImage::new(surface.width(), surface.height());
        stamp_circle(surface, &before, &mut coverage, kind, pos);
        surface.mark_dirty();
        self.state = StrokeState::Drawing {
            kind,
            last: pos,
            before,
            coverage,
        };
    }

    /// Extend the stroke with a segment from the last point to `pos`.
    /// Ignored while idle.
    pub fn extend(&mut self, surface: &mut Surface, pos: Point) {
        let StrokeState::Drawing {
            kind,
            last,
            before,
            coverage,
        } = &mut self.state
        else {
            return;
        };
        draw_line(surface, before, coverage, *kind, *last, pos);
        *last = pos;
        surface.mark_dirty();
    }

    /// Finish the stroke. Returns the stroke that was finished, or `None` if
    /// no stroke was in progress.
    pub fn end(&mut self) -> Option<StrokeKind> {
        match std::mem::replace(&mut self.state, StrokeState::Idle) {
            StrokeState::Drawing { kind, .. } => Some(kind),
            StrokeState::Idle => None,
        }
    }
}

/// Dense 1px stepping between the endpoints with a round dab at every step.
/// Round dabs give round caps and joins.
fn draw_line(
    surface: &mut Surface,
    before: &RgbaImage,
    coverage: &mut GrayImage,
    kind: StrokeKind,
    start: Point,
    end: Point,
) {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let distance = (dx * dx + dy * dy).sqrt();

    if !distance.is_finite() {
        return;
    }
    if distance < 0.1 {
        stamp_circle(surface, before, coverage, kind, end);
        return;
    }

    let steps = distance.ceil() as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        stamp_circle(surface, before, coverage, kind, Point::new(start.x + dx * t, start.y + dy * t));
    }
}

/// Paint one anti-aliased round dab of diameter `kind.width()` centred on
/// `center`. Coverage falls off linearly over the one pixel straddling the
/// circle's edge, measured from each pixel centre.
fn stamp_circle(
    surface: &mut Surface,
    before: &RgbaImage,
    coverage: &mut GrayImage,
    kind: StrokeKind,
    center: Point,
) {
    let (width, height) = (surface.width(), surface.height());
    let radius = kind.width() / 2.0;
    if !(radius > 0.0) || !center.x.is_finite() || !center.y.is_finite() {
        return;
    }
    let reach = radius + 0.5;

    let min_x = (center.x - reach).floor().max(0.0);
    let min_y = (center.y - reach).floor().max(0.0);
    let max_x = (center.x + reach).ceil().min(width as f32 - 1.0);
    let max_y = (center.y + reach).ceil().min(height as f32 - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }
    let (min_x, min_y, max_x, max_y) = (min_x as u32, min_y as u32, max_x as u32, max_y as u32);

    for y in min_y..=max_y {
        let fy = y as f32 + 0.5 - center.y;
        for x in min_x..=max_x {
            let fx = x as f32 + 0.5 - center.x;
            let dist = (fx * fx + fy * fy).sqrt();
            let cov = ((reach - dist).clamp(0.0, 1.0) * 255.0).round() as u8;
            if cov == 0 || cov <= coverage.get_pixel(x, y)[0] {
                continue;
            }
            coverage.put_pixel(x, y, Luma([cov]));
            let base = *before.get_pixel(x, y);
            surface.put_pixel(x, y, paint_pixel(base, kind, cov));
        }
    }
}

/// Composite one stroke of coverage `cov` over the pre-stroke pixel.
fn paint_pixel(base: Rgba<u8>, kind: StrokeKind, cov: u8) -> Rgba<u8> {
    match kind {
        StrokeKind::Brush { color, .. } => {
            let alpha = (color[3] as u32 * cov as u32 + 127) / 255;
            blend_over(base, Rgba([color[0], color[1], color[2], alpha as u8]))
        }
        StrokeKind::Eraser { .. } => {
            let alpha = (base[3] as u32 * (255 - cov as u32) + 127) / 255;
            if alpha == 0 {
                TRANSPARENT
            } else {
                Rgba([base[0], base[1], base[2], alpha as u8])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::colors::WHITE;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn brush(width: f32) -> StrokeKind {
        StrokeKind::Brush { width, color: RED }
    }

    #[test]
    fn inactive_tools_have_no_stroke() {
        let mut props = ToolProperties::default();
        for tool in Tool::all() {
            props.tool = *tool;
            assert_eq!(props.stroke_kind().is_some(), tool.is_active(), "{}", tool.label());
        }
    }

    #[test]
    fn size_is_clamped_to_range() {
        let mut props = ToolProperties::from_config(&BrushConfig::default()).unwrap();
        assert_eq!(props.size(), 5.0);
        props.set_size(500.0);
        assert_eq!(props.size(), 50.0);
        props.set_size(0.0);
        assert_eq!(props.size(), 1.0);
        props.set_size(f32::NAN);
        assert_eq!(props.size(), 1.0);
    }

    #[test]
    fn set_color_hex_rejects_invalid() {
        let mut props = ToolProperties::default();
        props.set_color_hex("#FF0000").unwrap();
        assert_eq!(props.color(), RED);
        assert!(props.set_color_hex("red").is_err());
        assert_eq!(props.color(), RED);
    }

    #[test]
    fn tap_paints_a_dot_inside_the_width_neighbourhood() {
        let mut surface = Surface::new(40, 40, WHITE);
        let mut engine = StrokeEngine::new();
        engine.begin(&mut surface, brush(5.0), Point::new(20.0, 20.0));
        assert!(engine.is_drawing());
        assert_eq!(engine.end(), Some(brush(5.0)));
        assert!(!engine.is_drawing());

        assert_eq!(surface.get_pixel(20, 20), RED);
        for (x, y, p) in surface.pixels().enumerate_pixels() {
            if *p != WHITE {
                assert!((x as f32 - 20.0).abs() <= 3.0 && (y as f32 - 20.0).abs() <= 3.0);
            }
        }
    }

    #[test]
    fn thin_stroke_is_still_visible() {
        let mut surface = Surface::new(10, 10, WHITE);
        let mut engine = StrokeEngine::new();
        engine.begin(&mut surface, brush(1.0), Point::new(4.0, 4.0));
        engine.end();
        for (x, y) in [(3, 3), (4, 3), (3, 4), (4, 4)] {
            assert_ne!(surface.get_pixel(x, y), WHITE);
        }
    }

    #[test]
    fn horizontal_segment_paints_a_band() {
        let mut surface = Surface::new(300, 200, WHITE);
        let mut engine = StrokeEngine::new();
        engine.begin(&mut surface, brush(5.0), Point::new(100.0, 100.0));
        engine.extend(&mut surface, Point::new(200.0, 100.0));
        engine.end();

        for x in [100, 150, 200] {
            for y in 98..=101 {
                assert_eq!(surface.get_pixel(x, y), RED, "({x}, {y})");
            }
            // Anti-aliased edge rows
            assert_ne!(surface.get_pixel(x, 97), WHITE);
            assert_ne!(surface.get_pixel(x, 97), RED);
            assert_ne!(surface.get_pixel(x, 102), WHITE);
            assert_eq!(surface.get_pixel(x, 96), WHITE);
            assert_eq!(surface.get_pixel(x, 103), WHITE);
        }
        assert_eq!(surface.get_pixel(90, 100), WHITE);
        assert_eq!(surface.get_pixel(210, 100), WHITE);
    }

    #[test]
    fn translucent_brush_does_not_accumulate_within_a_stroke() {
        let mut surface = Surface::new(50, 20, WHITE);
        let mut engine = StrokeEngine::new();
        let kind = StrokeKind::Brush {
            width: 6.0,
            color: Rgba([0, 0, 0, 128]),
        };
        engine.begin(&mut surface, kind, Point::new(10.0, 10.0));
        engine.extend(&mut surface, Point::new(40.0, 10.0));
        engine.extend(&mut surface, Point::new(10.0, 10.0));
        engine.end();
        let a = surface.get_pixel(10, 10);
        let b = surface.get_pixel(25, 10);
        assert_eq!(a, b);
        assert!(a[0] > 100 && a[0] < 140);
    }

    #[test]
    fn eraser_clears_to_transparent() {
        let mut surface = Surface::new(20, 20, WHITE);
        let mut engine = StrokeEngine::new();
        engine.begin(&mut surface, StrokeKind::Eraser { width: 4.0 }, Point::new(10.0, 10.0));
        engine.extend(&mut surface, Point::new(15.0, 10.0));
        assert_eq!(engine.end().map(|k| k.snapshot_kind()), Some(SnapshotKind::EraserStroke));
        assert_eq!(surface.get_pixel(12, 10), TRANSPARENT);
        assert_eq!(surface.get_pixel(12, 2), WHITE);
    }

    #[test]
    fn off_surface_segments_are_clipped() {
        let mut surface = Surface::new(20, 20, WHITE);
        let mut engine = StrokeEngine::new();
        engine.begin(&mut surface, brush(4.0), Point::new(-30.0, -30.0));
        engine.extend(&mut surface, Point::new(-10.0, 50.0));
        engine.extend(&mut surface, Point::new(10.0, 10.0));
        engine.end();
        assert_eq!(surface.get_pixel(10, 10), RED);
    }

    #[test]
    fn extend_and_end_while_idle_are_noops() {
        let mut surface = Surface::new(10, 10, WHITE);
        let mut engine = StrokeEngine::new();
        engine.extend(&mut surface, Point::new(5.0, 5.0));
        assert_eq!(engine.end(), None);
        assert!(surface.pixels().pixels().all(|p| *p == WHITE));
    }
}
