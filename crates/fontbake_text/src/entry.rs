//! Font entries
//!
//! An entry is one font rendered at one pixel size and oversampling factor:
//! its own atlas texture, glyph table and kerning map. [`FontEntryBuilder`]
//! runs the whole bake: rasterize, pack, measure, kern, upload.

use crate::atlas::{AtlasConfig, AtlasPacker};
use crate::glyph_table::{GlyphTable, KerningMap, PackedGlyph};
use crate::layout::TextLayoutEngine;
use crate::quad::{Color, QuadSink};
use crate::source::{FontSource, RasterizedGlyph};
use crate::texture::{PixelFormat, TextureDescriptor, TextureFactory};
use crate::{Result, TextError};
use rustc_hash::FxHashSet;

/// Options for baking one entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryOptions {
    /// Pixel height (ascent to descent)
    pub size: f32,
    /// Rasterization multiplier applied on both axes, at least 1
    pub oversampling: u32,
    /// Whether to build the pairwise kerning map
    pub kerning: bool,
}

impl EntryOptions {
    /// Options for `size` with no oversampling and kerning enabled
    pub fn new(size: f32) -> Self {
        Self {
            size,
            oversampling: 1,
            kerning: true,
        }
    }

    pub fn with_oversampling(mut self, oversampling: u32) -> Self {
        self.oversampling = oversampling;
        self
    }

    pub fn with_kerning(mut self, kerning: bool) -> Self {
        self.kerning = kerning;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(TextError::InvalidEntry(format!(
                "size must be a positive number, got {}",
                self.size
            )));
        }
        if self.oversampling == 0 {
            return Err(TextError::InvalidEntry(
                "oversampling must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One baked font size
#[derive(Debug, Clone)]
pub struct FontEntry<T> {
    size: f32,
    scale_factor: f32,
    oversampling: u32,
    table: GlyphTable,
    texture: T,
    atlas_width: u32,
    atlas_height: u32,
    pack_attempts: usize,
}

impl<T> FontEntry<T> {
    /// Requested pixel height
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Font units to pixels, used to convert kerning adjustments
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn oversampling(&self) -> u32 {
        self.oversampling
    }

    pub fn table(&self) -> &GlyphTable {
        &self.table
    }

    pub fn codepoints(&self) -> &[char] {
        self.table.codepoints()
    }

    pub fn glyph(&self, codepoint: char) -> Option<&PackedGlyph> {
        self.table.glyph(codepoint)
    }

    pub fn kerning(&self) -> &KerningMap {
        self.table.kerning()
    }

    /// Kerning adjustment in pixels when `second` follows `first`
    pub fn kerning_px(&self, first: char, second: char) -> f32 {
        match self.table.kerning().get(first, second) {
            0 => 0.0,
            kern => kern as f32 * self.scale_factor,
        }
    }

    pub fn texture(&self) -> &T {
        &self.texture
    }

    /// Atlas size in pixels, used for UV normalization
    pub fn atlas_dimensions(&self) -> (u32, u32) {
        (self.atlas_width, self.atlas_height)
    }

    /// Number of packing attempts the atlas took
    pub fn pack_attempts(&self) -> usize {
        self.pack_attempts
    }

    /// Lay out `text` on a single line starting at `(x, y)`.
    pub fn layout<'a>(
        &'a self,
        text: &'a str,
        x: f32,
        y: f32,
        color: Color,
    ) -> TextLayoutEngine<'a, T> {
        TextLayoutEngine::new(self, text, x, y, color)
    }

    /// Push every quad of `text` into `sink`, returning the final pen x.
    pub fn draw(&self, text: &str, x: f32, y: f32, color: Color, sink: &mut impl QuadSink) -> f32 {
        let mut layout = self.layout(text, x, y, color);
        for quad in layout.by_ref() {
            sink.push_quad(quad);
        }
        layout.pen_x()
    }

    /// Horizontal distance the pen travels over `text`
    pub fn measure(&self, text: &str) -> f32 {
        self.layout(text, 0.0, 0.0, Color::WHITE).finish()
    }
}

/// Bakes entries from a font source
pub struct FontEntryBuilder<'a, S: ?Sized> {
    source: &'a mut S,
    config: &'a AtlasConfig,
}

impl<'a, S: FontSource + ?Sized> FontEntryBuilder<'a, S> {
    pub fn new(source: &'a mut S, config: &'a AtlasConfig) -> Self {
        Self { source, config }
    }

    /// Bake `codepoints` at `options` and upload the atlas through `textures`.
    pub fn build<F: TextureFactory>(
        self,
        name: &str,
        codepoints: &[char],
        options: &EntryOptions,
        textures: &mut F,
    ) -> Result<FontEntry<F::Texture>> {
        options.validate()?;
        let codepoints = dedup_codepoints(codepoints);
        if codepoints.is_empty() {
            return Err(TextError::InvalidEntry(format!(
                "entry '{}' has no codepoints",
                name
            )));
        }

        let scale_factor = self.source.scale_for_pixel_height(options.size);
        let raster_scale = scale_factor * options.oversampling as f32;

        let rasterized: Vec<RasterizedGlyph> = codepoints
            .iter()
            .map(|&cp| self.source.rasterize(cp, raster_scale))
            .collect();

        let packed = AtlasPacker::new(self.config.clone()).pack(&rasterized)?;

        let glyphs: Vec<PackedGlyph> = packed
            .rects
            .iter()
            .zip(&rasterized)
            .map(|(&rect, glyph)| PackedGlyph::from_raster(rect, glyph, options.oversampling))
            .collect();
        drop(rasterized);

        let kerning = if options.kerning {
            KerningMap::build(&*self.source, &codepoints)
        } else {
            KerningMap::new()
        };

        let table = GlyphTable::new(codepoints, glyphs, kerning)?;

        let (atlas_width, atlas_height) = packed.bitmap.dimensions();
        let pixels = packed.bitmap.to_rgba()?;
        drop(packed.bitmap);

        let texture = textures.create_texture(&TextureDescriptor {
            label: name,
            format: PixelFormat::Rgba8,
            width: atlas_width,
            height: atlas_height,
            pixels: &pixels,
            filter: self.config.filter,
        })?;

        tracing::debug!(
            "Baked entry '{}': {} glyphs at {}px (x{}), {}x{} atlas, {} kerning pairs",
            name,
            table.len(),
            options.size,
            options.oversampling,
            atlas_width,
            atlas_height,
            table.kerning().len()
        );

        Ok(FontEntry {
            size: options.size,
            scale_factor,
            oversampling: options.oversampling,
            table,
            texture,
            atlas_width,
            atlas_height,
            pack_attempts: packed.attempts.len(),
        })
    }
}

/// Keep the first occurrence of every codepoint, in order.
fn dedup_codepoints(codepoints: &[char]) -> Vec<char> {
    let mut seen = FxHashSet::default();
    let mut unique = Vec::with_capacity(codepoints.len());
    for &cp in codepoints {
        if seen.insert(cp) {
            unique.push(cp);
        } else {
            tracing::warn!("Dropping duplicate codepoint U+{:04X}", cp as u32);
        }
    }
    unique
}
