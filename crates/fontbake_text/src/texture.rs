//! Texture creation boundary
//!
//! Baked atlases leave this crate through a [`TextureFactory`]. A graphics
//! backend implements it to upload the RGBA pixels and hand back its own
//! texture handle; [`CpuTextureFactory`] keeps the pixels in memory instead.

use crate::Result;
use std::sync::Arc;

/// Pixel layout of the uploaded atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8 bits per channel, RGBA order
    #[default]
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
        }
    }
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Linear,
    Nearest,
}

/// Everything a backend needs to create the atlas texture
#[derive(Debug, Clone, Copy)]
pub struct TextureDescriptor<'a> {
    /// Debug label (the entry name)
    pub label: &'a str,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    /// Tightly packed rows, `width * height * bytes_per_pixel` bytes
    pub pixels: &'a [u8],
    pub filter: FilterMode,
}

/// Creates texture objects from baked atlas pixels
pub trait TextureFactory {
    /// Handle stored in the font entry and returned to callers
    type Texture: Clone;

    fn create_texture(&mut self, descriptor: &TextureDescriptor<'_>) -> Result<Self::Texture>;
}

/// Atlas texture kept in CPU memory
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTexture {
    pub label: String,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub filter: FilterMode,
    pub pixels: Vec<u8>,
}

impl CpuTexture {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Write the texture to a PNG file
    #[cfg(feature = "png")]
    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let expected = self.width as usize * self.height as usize * self.format.bytes_per_pixel();
        if self.pixels.len() != expected {
            return Err(crate::TextError::TextureCreation(format!(
                "pixel buffer does not match {}x{}",
                self.width, self.height
            )));
        }
        image::save_buffer(
            path.as_ref(),
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;
        tracing::debug!("Saved atlas '{}' to {}", self.label, path.as_ref().display());
        Ok(())
    }
}

/// Factory producing shared in-memory textures
#[derive(Debug, Default)]
pub struct CpuTextureFactory {
    created: usize,
}

impl CpuTextureFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of textures created so far
    pub fn created(&self) -> usize {
        self.created
    }
}

impl TextureFactory for CpuTextureFactory {
    type Texture = Arc<CpuTexture>;

    fn create_texture(&mut self, descriptor: &TextureDescriptor<'_>) -> Result<Self::Texture> {
        let expected = descriptor.width as usize
            * descriptor.height as usize
            * descriptor.format.bytes_per_pixel();
        if descriptor.pixels.len() != expected {
            return Err(crate::TextError::TextureCreation(format!(
                "'{}' has {} bytes, expected {} for {}x{}",
                descriptor.label,
                descriptor.pixels.len(),
                expected,
                descriptor.width,
                descriptor.height
            )));
        }

        self.created += 1;
        Ok(Arc::new(CpuTexture {
            label: descriptor.label.to_string(),
            format: descriptor.format,
            width: descriptor.width,
            height: descriptor.height,
            filter: descriptor.filter,
            pixels: descriptor.pixels.to_vec(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextError;

    #[test]
    fn test_cpu_factory_copies_pixels() {
        let mut factory = CpuTextureFactory::new();
        let pixels = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let texture = factory
            .create_texture(&TextureDescriptor {
                label: "body",
                format: PixelFormat::Rgba8,
                width: 2,
                height: 1,
                pixels: &pixels,
                filter: FilterMode::Linear,
            })
            .unwrap();

        assert_eq!(texture.dimensions(), (2, 1));
        assert_eq!(texture.pixels, pixels.to_vec());
        assert_eq!(texture.label, "body");
        assert_eq!(factory.created(), 1);
    }

    #[test]
    fn test_cpu_factory_rejects_short_buffer() {
        let mut factory = CpuTextureFactory::new();
        let err = factory
            .create_texture(&TextureDescriptor {
                label: "bad",
                format: PixelFormat::Rgba8,
                width: 4,
                height: 4,
                pixels: &[0; 3],
                filter: FilterMode::Nearest,
            })
            .unwrap_err();

        assert!(matches!(err, TextError::TextureCreation(_)));
        assert_eq!(factory.created(), 0);
    }

    #[cfg(feature = "png")]
    fn texture(width: u32, height: u32, pixels: Vec<u8>) -> CpuTexture {
        CpuTexture {
            label: "atlas".to_string(),
            format: PixelFormat::Rgba8,
            width,
            height,
            filter: FilterMode::Linear,
            pixels,
        }
    }

    #[test]
    #[cfg(feature = "png")]
    fn test_save_png_writes_pixels() {
        let pixels = vec![10, 10, 10, 10, 200, 200, 200, 200];
        let path = std::env::temp_dir()
            .join(format!("fontbake_atlas_{}.png", std::process::id()));

        texture(2, 1, pixels.clone()).save_png(&path).unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();
        let _ = std::fs::remove_file(&path);

        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.into_raw(), pixels);
    }

    #[test]
    #[cfg(feature = "png")]
    fn test_save_png_rejects_short_buffer() {
        let path = std::env::temp_dir().join("fontbake_never_written.png");
        let err = texture(4, 4, vec![0; 8]).save_png(&path).unwrap_err();

        assert!(matches!(err, TextError::TextureCreation(_)));
        assert!(!path.exists());
    }
}
