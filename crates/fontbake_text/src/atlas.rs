//! Glyph atlas packing
//!
//! Packs a full set of rasterized glyphs into one single-channel bitmap.
//! Packing starts from a fixed square size and, whenever the glyphs do not
//! fit, grows the bitmap along one axis (alternating width and height) and
//! retries from scratch. Nothing from a failed attempt is reused.

use crate::packer::SkylinePacker;
use crate::source::RasterizedGlyph;
use crate::texture::FilterMode;
use crate::{Result, TextError};

/// Default starting atlas edge in pixels
pub const DEFAULT_INITIAL_SIZE: u32 = 512;

/// Default growth per failed attempt in pixels
pub const DEFAULT_GROWTH_STEP: u32 = 512;

/// Default maximum atlas edge in pixels (common GPU texture limit)
pub const DEFAULT_MAX_DIMENSION: u32 = 16384;

/// Atlas packing configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasConfig {
    /// Width and height of the first packing attempt
    pub initial_size: u32,
    /// Pixels added to one axis after each failed attempt
    pub growth_step: u32,
    /// Largest width or height the atlas may grow to
    pub max_dimension: u32,
    /// Empty pixels kept to the right of and below every glyph
    pub padding: u32,
    /// Sampling filter requested for the atlas texture
    pub filter: FilterMode,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_SIZE,
            growth_step: DEFAULT_GROWTH_STEP,
            max_dimension: DEFAULT_MAX_DIMENSION,
            padding: 1,
            filter: FilterMode::Linear,
        }
    }
}

impl AtlasConfig {
    pub fn with_initial_size(mut self, size: u32) -> Self {
        self.initial_size = size;
        self
    }

    pub fn with_growth_step(mut self, step: u32) -> Self {
        self.growth_step = step;
        self
    }

    pub fn with_max_dimension(mut self, max: u32) -> Self {
        self.max_dimension = max;
        self
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }
}

/// Axis grown after a failed packing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowAxis {
    Width,
    Height,
}

impl GrowAxis {
    fn flip(self) -> Self {
        match self {
            Self::Width => Self::Height,
            Self::Height => Self::Width,
        }
    }
}

/// Glyph rectangle inside the atlas, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AtlasRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl AtlasRect {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Normalized UV bounds (u_min, v_min, u_max, v_max) within an atlas of the given size
    pub fn uv_bounds(&self, atlas_width: u32, atlas_height: u32) -> [f32; 4] {
        let iw = 1.0 / atlas_width as f32;
        let ih = 1.0 / atlas_height as f32;
        [
            self.x0 as f32 * iw,
            self.y0 as f32 * ih,
            self.x1 as f32 * iw,
            self.y1 as f32 * ih,
        ]
    }
}

/// Single-channel atlas bitmap
#[derive(Debug, Clone)]
pub struct AtlasBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl AtlasBitmap {
    /// Allocate a zeroed bitmap, failing instead of aborting when memory is short.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(TextError::AllocationFailure { width, height })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| TextError::AllocationFailure { width, height })?;
        pixels.resize(len, 0);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw intensity values, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Intensity at `(x, y)`
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Copy a `width` x `height` row-major bitmap to `(x, y)`.
    fn blit(&mut self, x: u32, y: u32, width: u32, height: u32, src: &[u8]) {
        let stride = self.width as usize;
        let w = width as usize;
        for row in 0..height as usize {
            let src_start = row * w;
            let Some(src_row) = src.get(src_start..src_start + w) else {
                break;
            };
            let dst_start = (y as usize + row) * stride + x as usize;
            self.pixels[dst_start..dst_start + w].copy_from_slice(src_row);
        }
    }

    /// Expand to RGBA8 with every channel set to the intensity value.
    ///
    /// White glyphs with premultiplied alpha, so vertex color tints uniformly.
    pub fn to_rgba(&self) -> Result<Vec<u8>> {
        let mut rgba = Vec::new();
        rgba.try_reserve_exact(self.pixels.len() * 4)
            .map_err(|_| TextError::AllocationFailure {
                width: self.width,
                height: self.height,
            })?;
        for &value in &self.pixels {
            rgba.extend_from_slice(&[value; 4]);
        }
        Ok(rgba)
    }
}

/// Result of a successful packing run
#[derive(Debug, Clone)]
pub struct PackedAtlas {
    /// Atlas bitmap with every glyph blitted in
    pub bitmap: AtlasBitmap,
    /// One rectangle per input glyph, in input order
    pub rects: Vec<AtlasRect>,
    /// Every attempted (width, height), the last one being the bitmap size
    pub attempts: Vec<(u32, u32)>,
}

impl PackedAtlas {
    /// Number of packing attempts that failed before the final one
    pub fn retries(&self) -> usize {
        self.attempts.len().saturating_sub(1)
    }
}

/// Pack-and-retry atlas builder
#[derive(Debug, Clone, Default)]
pub struct AtlasPacker {
    config: AtlasConfig,
}

impl AtlasPacker {
    pub fn new(config: AtlasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Pack `glyphs` into the smallest atlas this growth policy reaches.
    pub fn pack(&self, glyphs: &[RasterizedGlyph]) -> Result<PackedAtlas> {
        let padding = self.config.padding;
        let sizes: Vec<(u32, u32)> = glyphs
            .iter()
            .map(|g| {
                if g.is_empty() {
                    (0, 0)
                } else {
                    (g.width + padding, g.height + padding)
                }
            })
            .collect();

        let max = self.config.max_dimension;
        let mut width = self.config.initial_size.max(1);
        let mut height = width;
        if width > max {
            return Err(TextError::AtlasTooLarge { width, height, max });
        }

        let mut axis = GrowAxis::Width;
        let mut attempts = Vec::new();

        let positions = loop {
            attempts.push((width, height));
            let mut packer = SkylinePacker::new(width, height);
            if let Some(positions) = packer.pack_all(&sizes) {
                break positions;
            }

            let step = self.config.growth_step.max(1);
            match axis {
                GrowAxis::Width => width = width.saturating_add(step),
                GrowAxis::Height => height = height.saturating_add(step),
            }
            if width > max || height > max {
                return Err(TextError::AtlasTooLarge { width, height, max });
            }
            tracing::debug!(
                "Atlas attempt {} did not fit {} glyphs, growing {:?} to {}x{}",
                attempts.len(),
                glyphs.len(),
                axis,
                width,
                height
            );
            axis = axis.flip();
        };

        let mut bitmap = AtlasBitmap::new(width, height)?;
        let mut rects = Vec::with_capacity(glyphs.len());
        for (glyph, &(x, y)) in glyphs.iter().zip(&positions) {
            if glyph.is_empty() {
                rects.push(AtlasRect::default());
                continue;
            }
            bitmap.blit(x, y, glyph.width, glyph.height, &glyph.bitmap);
            rects.push(AtlasRect {
                x0: x,
                y0: y,
                x1: x + glyph.width,
                y1: y + glyph.height,
            });
        }

        tracing::debug!(
            "Packed {} glyphs into {}x{} atlas after {} attempt(s)",
            glyphs.len(),
            width,
            height,
            attempts.len()
        );

        Ok(PackedAtlas {
            bitmap,
            rects,
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, value: u8) -> RasterizedGlyph {
        RasterizedGlyph {
            bitmap: vec![value; (width * height) as usize],
            width,
            height,
            bearing_x: 0.0,
            bearing_y: height as f32,
            advance: width as f32,
        }
    }

    #[test]
    fn test_small_set_fits_first_attempt() {
        let packer = AtlasPacker::default();
        let glyphs = vec![solid(10, 12, 200), solid(8, 8, 100)];
        let packed = packer.pack(&glyphs).unwrap();

        assert_eq!(packed.attempts, vec![(512, 512)]);
        assert_eq!(packed.retries(), 0);
        assert_eq!(packed.bitmap.dimensions(), (512, 512));
        assert_eq!(packed.rects.len(), 2);
        assert_eq!(packed.rects[0].width(), 10);
        assert_eq!(packed.rects[0].height(), 12);
    }

    #[test]
    fn test_glyph_pixels_are_blitted() {
        let packer = AtlasPacker::default();
        let glyphs = vec![solid(4, 4, 77), solid(6, 3, 9)];
        let packed = packer.pack(&glyphs).unwrap();

        for (glyph, rect) in glyphs.iter().zip(&packed.rects) {
            let value = glyph.bitmap[0];
            for y in rect.y0..rect.y1 {
                for x in rect.x0..rect.x1 {
                    assert_eq!(packed.bitmap.get(x, y), Some(value));
                }
            }
        }
    }

    #[test]
    fn test_empty_glyph_gets_empty_rect() {
        let packer = AtlasPacker::default();
        let glyphs = vec![RasterizedGlyph::empty(5.0), solid(3, 3, 1)];
        let packed = packer.pack(&glyphs).unwrap();

        assert!(packed.rects[0].is_empty());
        assert_eq!(packed.rects[0], AtlasRect::default());
        assert!(!packed.rects[1].is_empty());
    }

    #[test]
    fn test_growth_alternates_width_then_height() {
        let config = AtlasConfig::default()
            .with_initial_size(64)
            .with_growth_step(64)
            .with_padding(0);
        // Sixteen 32x32 glyphs need 128x128.
        let glyphs: Vec<_> = (0..16).map(|_| solid(32, 32, 255)).collect();
        let packed = AtlasPacker::new(config).pack(&glyphs).unwrap();

        assert_eq!(packed.attempts, vec![(64, 64), (128, 64), (128, 128)]);
        assert_eq!(packed.bitmap.dimensions(), (128, 128));
    }

    #[test]
    fn test_attempt_sizes_grow_monotonically() {
        let config = AtlasConfig::default()
            .with_initial_size(32)
            .with_growth_step(16);
        let glyphs: Vec<_> = (0..40).map(|i| solid(10 + i % 5, 14, 1)).collect();
        let packed = AtlasPacker::new(config).pack(&glyphs).unwrap();

        assert!(packed.retries() > 0);
        for pair in packed.attempts.windows(2) {
            let ((w0, h0), (w1, h1)) = (pair[0], pair[1]);
            assert!(w1 >= w0 && h1 >= h0);
            assert!(w1 * h1 > w0 * h0);
        }
        for &(w, h) in &packed.attempts {
            assert!(w >= 32 && h >= 32);
        }
    }

    #[test]
    fn test_oversized_glyph_grows_until_it_fits() {
        let config = AtlasConfig::default()
            .with_initial_size(16)
            .with_growth_step(16)
            .with_padding(0);
        let packed = AtlasPacker::new(config).pack(&[solid(40, 20, 3)]).unwrap();

        let (w, h) = packed.bitmap.dimensions();
        assert!(w >= 40 && h >= 20);
    }

    #[test]
    fn test_growth_cap_fails_loudly() {
        let config = AtlasConfig::default()
            .with_initial_size(64)
            .with_growth_step(64)
            .with_max_dimension(128);
        let glyphs = vec![solid(200, 10, 1)];
        let err = AtlasPacker::new(config).pack(&glyphs).unwrap_err();

        assert!(matches!(err, TextError::AtlasTooLarge { max: 128, .. }));
    }

    #[test]
    fn test_initial_size_over_cap_fails() {
        let config = AtlasConfig::default()
            .with_initial_size(1024)
            .with_max_dimension(512);
        let err = AtlasPacker::new(config).pack(&[solid(1, 1, 1)]).unwrap_err();
        assert!(matches!(err, TextError::AtlasTooLarge { .. }));
    }

    #[test]
    fn test_rgba_replicates_intensity() {
        let mut bitmap = AtlasBitmap::new(2, 1).unwrap();
        bitmap.blit(0, 0, 2, 1, &[10, 250]);

        let rgba = bitmap.to_rgba().unwrap();
        assert_eq!(rgba, vec![10, 10, 10, 10, 250, 250, 250, 250]);
    }

    #[test]
    fn test_uv_bounds_normalize_by_atlas_size() {
        let rect = AtlasRect {
            x0: 128,
            y0: 64,
            x1: 256,
            y1: 128,
        };
        assert_eq!(rect.uv_bounds(512, 256), [0.25, 0.25, 0.5, 0.5]);
    }

    #[test]
    fn test_allocation_overflow_is_reported() {
        let err = AtlasBitmap::new(u32::MAX, u32::MAX);
        assert!(matches!(err, Err(TextError::AllocationFailure { .. })));
    }
}
