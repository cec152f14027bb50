//! End-to-end baking and layout against a synthetic font

use fontbake_text::{
    AtlasConfig, AtlasPacker, Color, CpuTexture, CpuTextureFactory, EntryOptions, FontAsset,
    FontSource, RasterizedGlyph, TextError,
};
use std::sync::Arc;

/// Every glyph is a filled 500x700 unit box on a 1000 unit em.
///
/// Kerning is defined for a handful of Latin pairs only.
struct SyntheticFont;

impl SyntheticFont {
    fn raster(codepoint: char, scale: f32) -> RasterizedGlyph {
        if codepoint.is_whitespace() {
            return RasterizedGlyph::empty(300.0 * scale);
        }
        let width = ((500.0 * scale).round() as u32).max(1);
        let height = ((700.0 * scale).round() as u32).max(1);
        RasterizedGlyph {
            bitmap: vec![0xff; (width * height) as usize],
            width,
            height,
            bearing_x: 50.0 * scale,
            bearing_y: height as f32,
            advance: 600.0 * scale,
        }
    }
}

impl FontSource for SyntheticFont {
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32 {
        pixel_height / 1000.0
    }

    fn rasterize(&mut self, codepoint: char, scale: f32) -> RasterizedGlyph {
        Self::raster(codepoint, scale)
    }

    fn kerning_advance(&self, first: char, second: char) -> i32 {
        match (first, second) {
            ('A', 'V') | ('V', 'A') => -80,
            ('T', 'o') => -60,
            ('L', 'T') => -90,
            ('f', 'f') => 20,
            _ => 0,
        }
    }
}

type Asset = FontAsset<SyntheticFont, Arc<CpuTexture>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("fontbake_text=debug")
        .with_test_writer()
        .try_init();
}

fn latin() -> Vec<char> {
    (' '..='~').collect()
}

#[test]
fn test_many_large_glyphs_grow_atlas_alternately() {
    init_tracing();
    let scale = SyntheticFont.scale_for_pixel_height(200.0);
    let codepoints: Vec<char> = (0x4E00u32..0x4E00 + 2000).filter_map(char::from_u32).collect();
    assert_eq!(codepoints.len(), 2000);
    let glyphs: Vec<RasterizedGlyph> = codepoints
        .iter()
        .map(|&cp| SyntheticFont::raster(cp, scale))
        .collect();

    let packed = AtlasPacker::new(AtlasConfig::default()).pack(&glyphs).unwrap();

    assert!(packed.retries() > 0);
    assert_eq!(packed.attempts[0], (512, 512));
    for (i, pair) in packed.attempts.windows(2).enumerate() {
        let ((w0, h0), (w1, h1)) = (pair[0], pair[1]);
        if i % 2 == 0 {
            assert_eq!((w1, h1), (w0 + 512, h0), "attempt {} should widen", i + 1);
        } else {
            assert_eq!((w1, h1), (w0, h0 + 512), "attempt {} should heighten", i + 1);
        }
    }

    let (width, height) = packed.bitmap.dimensions();
    assert_eq!(*packed.attempts.last().unwrap(), (width, height));
    assert!(width == height || width == height + 512);
    assert!(width as u64 * height as u64 >= 2000 * 101 * 141);

    // Every glyph lands inside the atlas without overlapping another
    let mut rects = packed.rects.clone();
    rects.sort_by_key(|r| (r.y0, r.x0));
    for rect in &rects {
        assert_eq!((rect.width(), rect.height()), (100, 140));
        assert!(rect.x1 <= width && rect.y1 <= height);
    }
    for (i, a) in rects.iter().enumerate() {
        for b in rects[i + 1..].iter().take_while(|b| b.y0 < a.y1) {
            let overlap = a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1;
            assert!(!overlap, "{:?} overlaps {:?}", a, b);
        }
    }
}

#[test]
fn test_growth_cap_reports_atlas_too_large() {
    init_tracing();
    let scale = SyntheticFont.scale_for_pixel_height(200.0);
    let glyphs: Vec<RasterizedGlyph> = (0..200)
        .map(|_| SyntheticFont::raster('X', scale))
        .collect();

    let config = AtlasConfig::default().with_max_dimension(1024);
    let err = AtlasPacker::new(config).pack(&glyphs).unwrap_err();
    assert!(matches!(err, TextError::AtlasTooLarge { max: 1024, .. }));
}

#[test]
fn test_kerning_map_holds_only_nonzero_pairs() {
    let mut asset = Asset::new(SyntheticFont);
    let mut textures = CpuTextureFactory::new();
    asset
        .create_entry("latin", &latin(), EntryOptions::new(24.0), &mut textures)
        .unwrap();

    let kerning = asset.entry("latin").unwrap().kerning();
    assert_eq!(kerning.len(), 5);
    assert_eq!(kerning.get('A', 'V'), -80);
    assert_eq!(kerning.get('f', 'f'), 20);
    assert_eq!(kerning.get('o', 'T'), 0);
    assert!(kerning.iter().all(|(_, _, kern)| kern != 0));
}

#[test]
fn test_texture_is_rgba_of_atlas() {
    let mut asset = Asset::new(SyntheticFont);
    let mut textures = CpuTextureFactory::new();
    let texture = asset
        .create_entry("latin", &latin(), EntryOptions::new(24.0), &mut textures)
        .unwrap();

    let entry = asset.entry("latin").unwrap();
    let (width, height) = entry.atlas_dimensions();
    assert_eq!(texture.dimensions(), (width, height));
    assert_eq!(texture.pixels.len(), (width * height * 4) as usize);

    let glyph = entry.glyph('M').unwrap();
    let offset = ((glyph.y0 * width + glyph.x0) * 4) as usize;
    assert_eq!(&texture.pixels[offset..offset + 4], &[0xff; 4]);
    // The space glyph has no pixels in the atlas
    assert!(entry.glyph(' ').unwrap().rect().is_empty());
}

#[test]
fn test_repeated_entry_creation_is_deterministic() {
    let mut asset = Asset::new(SyntheticFont);
    let mut textures = CpuTextureFactory::new();
    let options = EntryOptions::new(40.0);
    let first = asset
        .create_entry("a", &latin(), options, &mut textures)
        .unwrap();
    let second = asset
        .create_entry("b", &latin(), options, &mut textures)
        .unwrap();

    let (a, b) = (asset.entry("a").unwrap(), asset.entry("b").unwrap());
    assert_eq!(a.table(), b.table());
    assert!(!a.kerning().is_empty());
    assert_eq!(a.atlas_dimensions(), b.atlas_dimensions());
    assert_eq!(a.pack_attempts(), b.pack_attempts());

    // Same pixels, but each entry owns its own texture
    assert_eq!(textures.created(), 2);
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(a.texture(), &first));
    assert!(Arc::ptr_eq(b.texture(), &second));
    assert_eq!(first.pixels, second.pixels);
    assert_eq!(first.dimensions(), second.dimensions());
}

#[test]
fn test_draw_string_is_idempotent() {
    let mut asset = Asset::new(SyntheticFont);
    let mut textures = CpuTextureFactory::new();
    let options = EntryOptions::new(32.0).with_oversampling(2);
    asset
        .create_entry("latin", &latin(), options, &mut textures)
        .unwrap();

    let text = "AVAST, To LT! ff";
    let mut first = Vec::new();
    let mut second = Vec::new();
    let pen_a = asset
        .draw_string("latin", text, 620.0, 560.0, Color::WHITE, &mut first)
        .unwrap();
    let pen_b = asset
        .draw_string("latin", text, 620.0, 560.0, Color::WHITE, &mut second)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(pen_a, pen_b);
    // One quad per non-space character
    assert_eq!(first.len(), text.chars().filter(|&c| c != ' ').count());
}

#[test]
fn test_kerned_pairs_shift_following_glyphs() {
    let mut asset = Asset::new(SyntheticFont);
    let mut textures = CpuTextureFactory::new();
    asset
        .create_entry("kerned", &latin(), EntryOptions::new(100.0), &mut textures)
        .unwrap();
    asset
        .create_entry(
            "plain",
            &latin(),
            EntryOptions::new(100.0).with_kerning(false),
            &mut textures,
        )
        .unwrap();

    let kerned = asset.measure("kerned", "AVA").unwrap();
    let plain = asset.measure("plain", "AVA").unwrap();
    // Two -80 unit pairs at 0.1 px per unit
    assert!((plain - kerned - 16.0).abs() < 1e-3);
}
