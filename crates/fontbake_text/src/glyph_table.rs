//! Per-entry glyph metrics and kerning
//!
//! A [`GlyphTable`] keeps the requested codepoints in order, an index-aligned
//! list of [`PackedGlyph`]s and a sparse [`KerningMap`]. It is built once when
//! an entry is created and only read afterwards.

use crate::atlas::AtlasRect;
use crate::source::{FontSource, RasterizedGlyph};
use crate::{Result, TextError};
use rustc_hash::FxHashMap;

/// Packed glyph geometry in nominal-size pixels
///
/// `x0..x1`, `y0..y1` locate the glyph in the atlas. The offsets place the
/// glyph's quad relative to the pen position on the baseline, y growing
/// downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PackedGlyph {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    pub xoff: f32,
    pub yoff: f32,
    pub xoff2: f32,
    pub yoff2: f32,
    /// Pen advance in pixels
    pub advance: f32,
}

impl PackedGlyph {
    /// Combine an atlas rectangle with the metrics of a glyph rasterized at
    /// `oversampling` times the nominal scale.
    pub fn from_raster(rect: AtlasRect, glyph: &RasterizedGlyph, oversampling: u32) -> Self {
        let inv = 1.0 / oversampling.max(1) as f32;
        let xoff = glyph.bearing_x * inv;
        let yoff = -glyph.bearing_y * inv;
        Self {
            x0: rect.x0,
            y0: rect.y0,
            x1: rect.x1,
            y1: rect.y1,
            xoff,
            yoff,
            xoff2: xoff + glyph.width as f32 * inv,
            yoff2: yoff + glyph.height as f32 * inv,
            advance: glyph.advance * inv,
        }
    }

    pub fn rect(&self) -> AtlasRect {
        AtlasRect {
            x0: self.x0,
            y0: self.y0,
            x1: self.x1,
            y1: self.y1,
        }
    }
}

/// Sparse kerning adjustments keyed by ordered codepoint pair
///
/// Values are raw font units; only non-zero pairs are stored, and `(a, b)`
/// is independent of `(b, a)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KerningMap {
    pairs: FxHashMap<(char, char), i32>,
}

impl KerningMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query every ordered pair of `codepoints` against `source`.
    pub fn build<S: FontSource + ?Sized>(source: &S, codepoints: &[char]) -> Self {
        let map = Self::from_pairs(source.kerning_pairs(codepoints));
        tracing::debug!(
            "Kerning scan over {} codepoints found {} pairs",
            codepoints.len(),
            map.len()
        );
        map
    }

    /// Collect pairs, dropping zero adjustments
    pub fn from_pairs(pairs: impl IntoIterator<Item = (char, char, i32)>) -> Self {
        let pairs = pairs
            .into_iter()
            .filter(|&(_, _, kern)| kern != 0)
            .map(|(first, second, kern)| ((first, second), kern))
            .collect();
        Self { pairs }
    }

    /// Adjustment in font units, zero for pairs not in the map
    pub fn get(&self, first: char, second: char) -> i32 {
        self.pairs.get(&(first, second)).copied().unwrap_or(0)
    }

    pub fn contains(&self, first: char, second: char) -> bool {
        self.pairs.contains_key(&(first, second))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, char, i32)> + '_ {
        self.pairs
            .iter()
            .map(|(&(first, second), &kern)| (first, second, kern))
    }
}

/// Codepoint to glyph table for one font entry
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphTable {
    codepoints: Vec<char>,
    glyphs: Vec<PackedGlyph>,
    index: FxHashMap<char, usize>,
    kerning: KerningMap,
}

impl GlyphTable {
    /// Build a table from index-aligned codepoints and glyphs.
    ///
    /// Codepoints must be unique; if one repeats, lookups resolve to its
    /// first position.
    pub fn new(
        codepoints: Vec<char>,
        glyphs: Vec<PackedGlyph>,
        kerning: KerningMap,
    ) -> Result<Self> {
        if codepoints.len() != glyphs.len() {
            return Err(TextError::InvalidEntry(format!(
                "{} codepoints but {} glyphs",
                codepoints.len(),
                glyphs.len()
            )));
        }

        let mut index = FxHashMap::default();
        index.reserve(codepoints.len());
        for (i, &cp) in codepoints.iter().enumerate() {
            index.entry(cp).or_insert(i);
        }

        Ok(Self {
            codepoints,
            glyphs,
            index,
            kerning,
        })
    }

    /// Position of `codepoint` in the requested order
    pub fn index_of(&self, codepoint: char) -> Option<usize> {
        self.index.get(&codepoint).copied()
    }

    pub fn glyph(&self, codepoint: char) -> Option<&PackedGlyph> {
        self.index_of(codepoint).map(|i| &self.glyphs[i])
    }

    pub fn contains(&self, codepoint: char) -> bool {
        self.index.contains_key(&codepoint)
    }

    pub fn codepoints(&self) -> &[char] {
        &self.codepoints
    }

    pub fn glyphs(&self) -> &[PackedGlyph] {
        &self.glyphs
    }

    pub fn kerning(&self) -> &KerningMap {
        &self.kerning
    }

    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
    }
}
