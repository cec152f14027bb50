//! Single-line text layout
//!
//! Walks a string left to right against a baked [`FontEntry`], yielding one
//! [`QuadCommand`] per visible glyph. The walk is lazy: nothing is allocated
//! and quads are produced as the iterator is pulled.
//!
//! Rules, per character:
//! - characters missing from the entry are skipped without moving the pen
//! - space advances the pen but never produces a quad
//! - after advancing, the kerning adjustment for (current, next) is applied
//!
//! Positions are not snapped to whole pixels.

use crate::entry::FontEntry;
use crate::quad::{Color, QuadCommand};
use std::iter::Peekable;
use std::str::Chars;

/// Lazy quad iterator over one string
pub struct TextLayoutEngine<'a, T> {
    entry: &'a FontEntry<T>,
    chars: Peekable<Chars<'a>>,
    pen_x: f32,
    baseline_y: f32,
    color: Color,
}

impl<'a, T> TextLayoutEngine<'a, T> {
    /// Start a layout of `text` with the pen at `(x, y)` on the baseline.
    pub fn new(entry: &'a FontEntry<T>, text: &'a str, x: f32, y: f32, color: Color) -> Self {
        Self {
            entry,
            chars: text.chars().peekable(),
            pen_x: x,
            baseline_y: y,
            color,
        }
    }

    /// Current pen x position
    pub fn pen_x(&self) -> f32 {
        self.pen_x
    }

    /// Drain the remaining characters and return the final pen x.
    pub fn finish(mut self) -> f32 {
        for _ in self.by_ref() {}
        self.pen_x
    }
}

impl<T> Iterator for TextLayoutEngine<'_, T> {
    type Item = QuadCommand;

    fn next(&mut self) -> Option<QuadCommand> {
        let (atlas_width, atlas_height) = self.entry.atlas_dimensions();

        loop {
            let ch = self.chars.next()?;
            let Some(&glyph) = self.entry.glyph(ch) else {
                tracing::trace!("Skipping U+{:04X}: not in entry", ch as u32);
                continue;
            };

            let quad = (ch != ' ').then(|| {
                let [u0, v0, u1, v1] = glyph.rect().uv_bounds(atlas_width, atlas_height);
                QuadCommand {
                    uv_min: [u0, v0],
                    uv_max: [u1, v1],
                    dest_min: [self.pen_x + glyph.xoff, self.baseline_y + glyph.yoff],
                    dest_max: [self.pen_x + glyph.xoff2, self.baseline_y + glyph.yoff2],
                    color: self.color,
                }
            });

            self.pen_x += glyph.advance;
            if let Some(&next) = self.chars.peek() {
                self.pen_x += self.entry.kerning_px(ch, next);
            }

            if quad.is_some() {
                return quad;
            }
        }
    }
}
