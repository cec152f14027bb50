//! Glyph atlas baking and text layout for fontbake
//!
//! This crate provides:
//! - Font loading and glyph rasterization (TTF/OTF via ttf-parser and swash)
//! - Skyline packing of glyph bitmaps into a growable atlas
//! - Per-entry glyph tables with sparse pairwise kerning
//! - Single-line text layout producing UV-mapped quads for a batch renderer
//!
//! # Example
//!
//! ```ignore
//! use fontbake_text::{charset, Color, CpuTextureFactory, EntryOptions, FontAsset};
//!
//! let mut font = FontAsset::from_file("Raleway-Regular.ttf")?;
//! let mut textures = CpuTextureFactory::new();
//!
//! let texture = font.create_entry(
//!     "body",
//!     &charset::ascii_printable(),
//!     EntryOptions::new(32.0).with_oversampling(2),
//!     &mut textures,
//! )?;
//!
//! let mut quads = Vec::new();
//! font.draw_string("body", "Rendering fonts!", 620.0, 560.0, Color::WHITE, &mut quads)?;
//! ```

pub mod asset;
pub mod atlas;
pub mod charset;
pub mod entry;
pub mod font;
pub mod glyph_table;
pub mod layout;
pub mod packer;
pub mod quad;
pub mod source;
pub mod texture;

#[cfg(test)]
pub(crate) mod testing;

pub use asset::{FontAsset, SharedFontAsset};
pub use atlas::{AtlasBitmap, AtlasConfig, AtlasPacker, AtlasRect, GrowAxis, PackedAtlas};
pub use entry::{EntryOptions, FontEntry, FontEntryBuilder};
pub use font::TtfFont;
pub use glyph_table::{GlyphTable, KerningMap, PackedGlyph};
pub use layout::TextLayoutEngine;
pub use packer::SkylinePacker;
pub use quad::{Color, QuadCommand, QuadSink};
pub use source::{FontSource, RasterizedGlyph};
pub use texture::{
    CpuTexture, CpuTextureFactory, FilterMode, PixelFormat, TextureDescriptor, TextureFactory,
};

use std::path::PathBuf;
use thiserror::Error;

/// Text baking and layout errors
#[derive(Error, Debug)]
pub enum TextError {
    #[error("Failed to load font: {0}")]
    FontLoad(String),

    #[error("Failed to read font file {}: {source}", path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot allocate a {width}x{height} atlas bitmap")]
    AllocationFailure { width: u32, height: u32 },

    #[error("Atlas would grow to {width}x{height}, beyond the {max}px limit")]
    AtlasTooLarge { width: u32, height: u32, max: u32 },

    #[error("Unknown font entry: {0}")]
    UnknownEntry(String),

    #[error("Invalid font entry: {0}")]
    InvalidEntry(String),

    #[error("Failed to create texture: {0}")]
    TextureCreation(String),

    #[error("Invalid charset: {0}")]
    InvalidCharset(String),

    #[cfg(feature = "png")]
    #[error("Failed to export atlas image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TextError>;
