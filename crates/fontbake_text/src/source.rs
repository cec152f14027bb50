//! Font source abstraction
//!
//! The atlas packer and layout engine only need three things from a font:
//! a pixel-height scale, per-glyph bitmaps at a scale, and raw kerning
//! advances. [`FontSource`] captures exactly that so that any parser or
//! rasterizer can back a [`FontAsset`](crate::FontAsset).

/// Single-channel glyph bitmap with placement metrics
///
/// All metrics are in pixels at the scale the glyph was rasterized with.
/// The bitmap's top-left corner sits at `(pen_x + bearing_x, baseline - bearing_y)`.
#[derive(Debug, Clone, Default)]
pub struct RasterizedGlyph {
    /// 8-bit coverage values, row-major, `width * height` bytes
    pub bitmap: Vec<u8>,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Horizontal bearing (offset from pen position to left edge)
    pub bearing_x: f32,
    /// Vertical bearing (offset from baseline up to top edge)
    pub bearing_y: f32,
    /// Horizontal advance to next pen position
    pub advance: f32,
}

impl RasterizedGlyph {
    /// Glyph with an advance but no visible pixels (space, control characters)
    pub fn empty(advance: f32) -> Self {
        Self {
            advance,
            ..Self::default()
        }
    }

    /// Whether the glyph has no pixels to pack
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A parsed font that can rasterize glyphs and report kerning
pub trait FontSource {
    /// Scale that maps font units to pixels so that ascent minus descent
    /// spans `pixel_height` pixels.
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32;

    /// Rasterize the glyph for `codepoint` at `scale` pixels per font unit.
    ///
    /// Codepoints the font does not cover rasterize as the font's fallback
    /// glyph rather than failing.
    fn rasterize(&mut self, codepoint: char, scale: f32) -> RasterizedGlyph;

    /// Raw kerning adjustment in font units when `second` follows `first`
    fn kerning_advance(&self, first: char, second: char) -> i32;

    /// Every ordered pair of `codepoints` with a non-zero kerning advance.
    ///
    /// Includes self pairs. Backends that pay a per-query setup cost override
    /// this to amortize it; the result must match querying
    /// [`kerning_advance`](Self::kerning_advance) pair by pair.
    fn kerning_pairs(&self, codepoints: &[char]) -> Vec<(char, char, i32)> {
        let mut pairs = Vec::new();
        for &first in codepoints {
            for &second in codepoints {
                let kern = self.kerning_advance(first, second);
                if kern != 0 {
                    pairs.push((first, second, kern));
                }
            }
        }
        pairs
    }
}

impl<S: FontSource + ?Sized> FontSource for &mut S {
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32 {
        (**self).scale_for_pixel_height(pixel_height)
    }

    fn rasterize(&mut self, codepoint: char, scale: f32) -> RasterizedGlyph {
        (**self).rasterize(codepoint, scale)
    }

    fn kerning_advance(&self, first: char, second: char) -> i32 {
        (**self).kerning_advance(first, second)
    }

    fn kerning_pairs(&self, codepoints: &[char]) -> Vec<(char, char, i32)> {
        (**self).kerning_pairs(codepoints)
    }
}
