//! Deterministic font source for unit tests

use crate::source::{FontSource, RasterizedGlyph};
use rustc_hash::FxHashMap;
use std::cell::Cell;

/// Units per em of the mock font
pub const UNITS_PER_EM: f32 = 1000.0;

/// Mock font whose glyphs are solid boxes.
///
/// Ascent 800 and descent -200 font units, so `scale_for_pixel_height(px)`
/// is `px / 1000`. Every glyph except space is a 500x700 unit box with a
/// 600 unit advance; space is empty with a 250 unit advance.
pub struct BoxFont {
    kerning: FxHashMap<(char, char), i32>,
    kerning_queries: Cell<usize>,
    rasterized: usize,
}

impl BoxFont {
    pub fn new() -> Self {
        Self {
            kerning: FxHashMap::default(),
            kerning_queries: Cell::new(0),
            rasterized: 0,
        }
    }

    pub fn with_kerning(mut self, first: char, second: char, units: i32) -> Self {
        self.kerning.insert((first, second), units);
        self
    }

    /// Number of `kerning_advance` calls made so far
    pub fn kerning_queries(&self) -> usize {
        self.kerning_queries.get()
    }

    /// Number of glyphs rasterized so far
    pub fn rasterized(&self) -> usize {
        self.rasterized
    }

    /// Coverage value written into every pixel of `codepoint`'s box
    pub fn fill_value(codepoint: char) -> u8 {
        0x80 | (codepoint as u32 & 0x7f) as u8
    }
}

impl FontSource for BoxFont {
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32 {
        pixel_height / UNITS_PER_EM
    }

    fn rasterize(&mut self, codepoint: char, scale: f32) -> RasterizedGlyph {
        self.rasterized += 1;
        if codepoint == ' ' {
            return RasterizedGlyph::empty(250.0 * scale);
        }
        let width = ((500.0 * scale).round() as u32).max(1);
        let height = ((700.0 * scale).round() as u32).max(1);
        RasterizedGlyph {
            bitmap: vec![Self::fill_value(codepoint); (width * height) as usize],
            width,
            height,
            bearing_x: 40.0 * scale,
            bearing_y: height as f32,
            advance: 600.0 * scale,
        }
    }

    fn kerning_advance(&self, first: char, second: char) -> i32 {
        self.kerning_queries.set(self.kerning_queries.get() + 1);
        self.kerning.get(&(first, second)).copied().unwrap_or(0)
    }
}
