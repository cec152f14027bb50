//! TrueType/OpenType font source
//!
//! [`TtfFont`] reads vertical metrics, the character map and pair kerning
//! (GPOS pair adjustments, then the legacy `kern` table) with ttf-parser, and
//! rasterizes outlines with swash. The font bytes
//! are either owned by the font (loaded from a file or handed over as a
//! `Vec`) or borrowed from the caller for as long as the font lives.

use crate::source::{FontSource, RasterizedGlyph};
use crate::{Result, TextError};
use std::borrow::Cow;
use std::path::Path;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::Format;
use ttf_parser::gpos::{PairAdjustment, PositioningSubtable};
use ttf_parser::{Face, GlyphId};

/// Font face backed by raw TTF/OTF bytes
pub struct TtfFont<'a> {
    data: Cow<'a, [u8]>,
    face_index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    /// Swash scale context (caches scaling state)
    scale_context: ScaleContext,
}

impl std::fmt::Debug for TtfFont<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfFont")
            .field("bytes", &self.data.len())
            .field("owned", &matches!(self.data, Cow::Owned(_)))
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl TtfFont<'static> {
    /// Take ownership of font bytes
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_cow(Cow::Owned(data), 0)
    }

    /// Take ownership of font bytes, selecting a face in a collection
    pub fn from_bytes_with_index(data: Vec<u8>, face_index: u32) -> Result<Self> {
        Self::from_cow(Cow::Owned(data), face_index)
    }

    /// Read and parse a font file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| TextError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Read {} bytes of font data from {}", data.len(), path.display());
        Self::from_bytes(data)
    }
}

impl<'a> TtfFont<'a> {
    /// Borrow caller-owned font bytes; they are never freed by the font
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        Self::from_cow(Cow::Borrowed(data), 0)
    }

    /// Borrow caller-owned font bytes, selecting a face in a collection
    pub fn from_slice_with_index(data: &'a [u8], face_index: u32) -> Result<Self> {
        Self::from_cow(Cow::Borrowed(data), face_index)
    }

    fn from_cow(data: Cow<'a, [u8]>, face_index: u32) -> Result<Self> {
        let (units_per_em, ascender, descender) = {
            let face = Face::parse(&data, face_index)
                .map_err(|e| TextError::FontLoad(format!("face {}: {}", face_index, e)))?;
            (face.units_per_em(), face.ascender(), face.descender())
        };
        if swash::FontRef::from_index(&data, face_index as usize).is_none() {
            return Err(TextError::FontLoad(format!(
                "face {} cannot be rasterized",
                face_index
            )));
        }
        if ascender == descender {
            return Err(TextError::FontLoad(
                "font has zero vertical extent".to_string(),
            ));
        }

        Ok(Self {
            data,
            face_index,
            units_per_em,
            ascender,
            descender,
            scale_context: ScaleContext::new(),
        })
    }

    /// Raw font bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the bytes are owned by this font rather than borrowed
    pub fn owns_data(&self) -> bool {
        matches!(self.data, Cow::Owned(_))
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    pub fn descender(&self) -> i16 {
        self.descender
    }

    /// Whether the character map covers `codepoint`
    pub fn has_glyph(&self, codepoint: char) -> bool {
        self.face()
            .and_then(|face| face.glyph_index(codepoint))
            .is_some()
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.face_index).ok()
    }
}

/// Horizontal kerning for a glyph pair, GPOS first, then the `kern` table
fn face_kerning(face: &Face<'_>, left: GlyphId, right: GlyphId) -> i32 {
    gpos_kerning(face, left, right)
        .or_else(|| kern_table_kerning(face, left, right))
        .unwrap_or(0)
}

/// First non-zero advance from a GPOS pair adjustment covering the pair
fn gpos_kerning(face: &Face<'_>, left: GlyphId, right: GlyphId) -> Option<i32> {
    let gpos = face.tables().gpos?;
    gpos.lookups
        .into_iter()
        .flat_map(|lookup| lookup.subtables.into_iter::<PositioningSubtable<'_>>())
        .find_map(|subtable| match subtable {
            PositioningSubtable::Pair(pair) => pair_advance(&pair, left, right),
            _ => None,
        })
}

fn pair_advance(pair: &PairAdjustment<'_>, left: GlyphId, right: GlyphId) -> Option<i32> {
    let index = pair.coverage().get(left)?;
    let (first, _) = match pair {
        PairAdjustment::Format1 { sets, .. } => sets.get(index)?.get(right)?,
        PairAdjustment::Format2 {
            classes, matrix, ..
        } => matrix.get((classes.0.get(left), classes.1.get(right)))?,
    };
    // A zero record leaves the pair to later lookups
    (first.x_advance != 0).then_some(i32::from(first.x_advance))
}

/// First horizontal `kern` subtable that has the pair
fn kern_table_kerning(face: &Face<'_>, left: GlyphId, right: GlyphId) -> Option<i32> {
    face.tables()
        .kern?
        .subtables
        .into_iter()
        .filter(|subtable| subtable.horizontal && !subtable.variable)
        .find_map(|subtable| subtable.glyphs_kerning(left, right))
        .map(i32::from)
}

impl FontSource for TtfFont<'_> {
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32 {
        pixel_height / (self.ascender as f32 - self.descender as f32)
    }

    fn rasterize(&mut self, codepoint: char, scale: f32) -> RasterizedGlyph {
        let Some(font) = swash::FontRef::from_index(&self.data, self.face_index as usize) else {
            return RasterizedGlyph::default();
        };

        let glyph_id = font.charmap().map(codepoint);
        if glyph_id == 0 {
            tracing::warn!(
                "Font has no glyph for U+{:04X}, using the fallback glyph",
                codepoint as u32
            );
        }

        // swash sizes are pixels per em
        let ppem = scale * self.units_per_em as f32;
        let advance = font.glyph_metrics(&[]).advance_width(glyph_id) * scale;

        let mut scaler = self.scale_context.builder(font).size(ppem).build();
        let image = Render::new(&[
            Source::ColorOutline(0),
            Source::ColorBitmap(StrikeWith::BestFit),
            Source::Outline,
        ])
        .format(Format::Alpha)
        .render(&mut scaler, glyph_id);

        match image {
            Some(img) if img.placement.width > 0 && img.placement.height > 0 => {
                tracing::trace!(
                    "Rasterized U+{:04X} as {}x{}",
                    codepoint as u32,
                    img.placement.width,
                    img.placement.height
                );
                RasterizedGlyph {
                    bitmap: img.data,
                    width: img.placement.width,
                    height: img.placement.height,
                    bearing_x: img.placement.left as f32,
                    bearing_y: img.placement.top as f32,
                    advance,
                }
            }
            // Empty glyph (like space) - no bitmap but has advance
            _ => RasterizedGlyph::empty(advance),
        }
    }

    fn kerning_advance(&self, first: char, second: char) -> i32 {
        let Some(face) = self.face() else {
            return 0;
        };
        match (face.glyph_index(first), face.glyph_index(second)) {
            (Some(left), Some(right)) => face_kerning(&face, left, right),
            _ => 0,
        }
    }

    fn kerning_pairs(&self, codepoints: &[char]) -> Vec<(char, char, i32)> {
        let Some(face) = self.face() else {
            return Vec::new();
        };
        if face.tables().gpos.is_none() && face.tables().kern.is_none() {
            return Vec::new();
        }

        let glyphs: Vec<(char, GlyphId)> = codepoints
            .iter()
            .filter_map(|&cp| face.glyph_index(cp).map(|gid| (cp, gid)))
            .collect();

        let mut pairs = Vec::new();
        for &(first, left) in &glyphs {
            for &(second, right) in &glyphs {
                let kern = face_kerning(&face, left, right);
                if kern != 0 {
                    pairs.push((first, second, kern));
                }
            }
        }
        pairs
    }
}
