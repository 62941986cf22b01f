use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use rayon::prelude::*;
use std::sync::Arc;

// ============================================================================
// SURFACE — the single raster bitmap edited by a session
// ============================================================================

/// Placement of a base image inside the surface: uniform scale plus the
/// top-left offset of the scaled image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitRect {
    pub scale: f32,
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Scale `(img_w, img_h)` uniformly so it fits entirely inside
/// `(surface_w, surface_h)`, centred. Aspect ratio is preserved; nothing is
/// cropped. Small images are scaled up.
pub fn fit_centered(img_w: u32, img_h: u32, surface_w: u32, surface_h: u32) -> FitRect {
    let scale = (surface_w as f32 / img_w.max(1) as f32).min(surface_h as f32 / img_h.max(1) as f32);
    let width = ((img_w as f32 * scale).round() as u32).clamp(1, surface_w);
    let height = ((img_h as f32 * scale).round() as u32).clamp(1, surface_h);
    FitRect {
        scale,
        x: ((surface_w - width) / 2) as i64,
        y: ((surface_h - height) / 2) as i64,
        width,
        height,
    }
}

pub struct Surface {
    width: u32,
    height: u32,
    background: Rgba<u8>,
    pixels: RgbaImage,
    /// Bumped on every pixel modification; keys the display cache.
    generation: u64,
    /// Display-resolution copy, rebuilt lazily by [`Surface::display_image`].
    lod_cache: Option<LodCache>,
}

struct LodCache {
    generation: u64,
    width: u32,
    height: u32,
    image: Arc<RgbaImage>,
}

impl Surface {
    /// Allocate a `width`×`height` surface filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        let mut surface = Self {
            width,
            height,
            background,
            pixels: RgbaImage::new(width, height),
            generation: 0,
            lod_cache: None,
        };
        surface.clear();
        surface
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Rgba<u8> {
        self.background
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reset every pixel to the background colour.
    pub fn clear(&mut self) {
        let bg = self.background.0;
        self.pixels
            .par_chunks_exact_mut(4)
            .for_each(|px| px.copy_from_slice(&bg));
        self.mark_dirty();
    }

    /// Clear to the background, then draw `image` fitted and centred over it.
    pub fn composite_fitted(&mut self, image: &DynamicImage) -> FitRect {
        let fit = fit_centered(image.width(), image.height(), self.width, self.height);
        let src = image.to_rgba8();
        let scaled = if (fit.width, fit.height) == src.dimensions() {
            src
        } else {
            imageops::resize(&src, fit.width, fit.height, FilterType::Triangle)
        };
        self.clear();
        imageops::overlay(&mut self.pixels, &scaled, fit.x, fit.y);
        self.mark_dirty();
        fit
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Rgba<u8>) {
        self.pixels.put_pixel(x, y, pixel);
    }

    /// Overwrite the whole buffer with `pixels`. Dimensions must match.
    pub fn restore(&mut self, pixels: &RgbaImage) {
        debug_assert_eq!(pixels.dimensions(), (self.width, self.height));
        self.pixels.copy_from_slice(pixels.as_raw());
        self.mark_dirty();
    }

    /// Copy of the current buffer, for history snapshots and export.
    pub fn snapshot_pixels(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Invalidate cached renders (call after any pixel modification).
    pub fn mark_dirty(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.lod_cache = None;
    }

    /// Return the surface resampled to `width`×`height`, generating it lazily.
    /// The result is cached until the pixels change or a different size is
    /// requested.
    pub fn display_image(&mut self, width: u32, height: u32) -> Arc<RgbaImage> {
        let (width, height) = (width.max(1), height.max(1));
        if let Some(ref cached) = self.lod_cache
            && cached.generation == self.generation
            && (cached.width, cached.height) == (width, height)
        {
            return Arc::clone(&cached.image);
        }
        let image = if (width, height) == (self.width, self.height) {
            self.pixels.clone()
        } else {
            imageops::resize(&self.pixels, width, height, FilterType::Triangle)
        };
        let arc = Arc::new(image);
        self.lod_cache = Some(LodCache {
            generation: self.generation,
            width,
            height,
            image: Arc::clone(&arc),
        });
        arc
    }

    /// Bytes held by the live buffer.
    pub fn memory_bytes(&self) -> usize {
        self.pixels.as_raw().len()
    }
}
