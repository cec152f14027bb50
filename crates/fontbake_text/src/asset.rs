//! Font assets
//!
//! A [`FontAsset`] is one font source plus any number of named entries, each
//! baked at its own size. Entries are created up front and then drawn by
//! name; the asset owns them and drops them with itself.

use crate::atlas::AtlasConfig;
use crate::entry::{EntryOptions, FontEntry, FontEntryBuilder};
use crate::font::TtfFont;
use crate::layout::TextLayoutEngine;
use crate::quad::{Color, QuadSink};
use crate::source::FontSource;
use crate::texture::TextureFactory;
use crate::{Result, TextError};
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A font source and its baked entries
pub struct FontAsset<S, T> {
    source: S,
    config: AtlasConfig,
    entries: FxHashMap<String, FontEntry<T>>,
}

impl<S: std::fmt::Debug, T> std::fmt::Debug for FontAsset<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAsset")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Clone> FontAsset<TtfFont<'static>, T> {
    /// Load a font from owned bytes; they are freed with the asset.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self::new(TtfFont::from_bytes(data)?))
    }

    /// Load a font file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(TtfFont::from_file(path)?))
    }
}

impl<'a, T: Clone> FontAsset<TtfFont<'a>, T> {
    /// Load a font from caller-owned bytes, which must outlive the asset.
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        Ok(Self::new(TtfFont::from_slice(data)?))
    }
}

impl<S: FontSource, T: Clone> FontAsset<S, T> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, AtlasConfig::default())
    }

    pub fn with_config(source: S, config: AtlasConfig) -> Self {
        Self {
            source,
            config,
            entries: FxHashMap::default(),
        }
    }

    /// Bake `codepoints` at `options` and store the result under `name`.
    ///
    /// An existing entry with the same name is replaced. On error the asset
    /// is left unchanged. Returns the new atlas texture.
    pub fn create_entry<F>(
        &mut self,
        name: &str,
        codepoints: &[char],
        options: EntryOptions,
        textures: &mut F,
    ) -> Result<T>
    where
        F: TextureFactory<Texture = T>,
    {
        let entry = FontEntryBuilder::new(&mut self.source, &self.config).build(
            name,
            codepoints,
            &options,
            textures,
        )?;
        let texture = entry.texture().clone();

        if self.entries.insert(name.to_string(), entry).is_some() {
            tracing::debug!("Replaced font entry '{}'", name);
        }
        Ok(texture)
    }

    /// Atlas texture of an entry
    pub fn texture(&self, name: &str) -> Result<T> {
        self.entry(name).map(|entry| entry.texture().clone())
    }

    pub fn entry(&self, name: &str) -> Result<&FontEntry<T>> {
        self.entries
            .get(name)
            .ok_or_else(|| TextError::UnknownEntry(name.to_string()))
    }

    /// Push the quads of `text` drawn with entry `name` into `sink`.
    ///
    /// Returns the pen x after the last character.
    pub fn draw_string(
        &self,
        name: &str,
        text: &str,
        x: f32,
        y: f32,
        color: Color,
        sink: &mut impl QuadSink,
    ) -> Result<f32> {
        Ok(self.entry(name)?.draw(text, x, y, color, sink))
    }

    /// Lazy layout of `text` with entry `name`
    pub fn layout<'a>(
        &'a self,
        name: &str,
        text: &'a str,
        x: f32,
        y: f32,
        color: Color,
    ) -> Result<TextLayoutEngine<'a, T>> {
        Ok(self.entry(name)?.layout(text, x, y, color))
    }

    /// Width of `text` drawn with entry `name`
    pub fn measure(&self, name: &str, text: &str) -> Result<f32> {
        Ok(self.entry(name)?.measure(text))
    }

    pub fn remove_entry(&mut self, name: &str) -> Option<FontEntry<T>> {
        self.entries.remove(name)
    }

    pub fn contains_entry(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entry names, sorted
    pub fn entry_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Font asset behind a mutex, shareable across threads
pub struct SharedFontAsset<S, T> {
    inner: Arc<Mutex<FontAsset<S, T>>>,
}

impl<S, T> Clone for SharedFontAsset<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: FontSource, T: Clone> SharedFontAsset<S, T> {
    pub fn new(asset: FontAsset<S, T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(asset)),
        }
    }

    /// Lock the asset for direct access.
    ///
    /// A panic in another holder does not lose the asset: entries are only
    /// inserted once fully built, so the data behind a poisoned lock is
    /// still consistent.
    pub fn lock(&self) -> MutexGuard<'_, FontAsset<S, T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_entry<F>(
        &self,
        name: &str,
        codepoints: &[char],
        options: EntryOptions,
        textures: &mut F,
    ) -> Result<T>
    where
        F: TextureFactory<Texture = T>,
    {
        self.lock().create_entry(name, codepoints, options, textures)
    }

    pub fn texture(&self, name: &str) -> Result<T> {
        self.lock().texture(name)
    }

    pub fn draw_string(
        &self,
        name: &str,
        text: &str,
        x: f32,
        y: f32,
        color: Color,
        sink: &mut impl QuadSink,
    ) -> Result<f32> {
        self.lock().draw_string(name, text, x, y, color, sink)
    }

    pub fn measure(&self, name: &str, text: &str) -> Result<f32> {
        self.lock().measure(name, text)
    }
}
