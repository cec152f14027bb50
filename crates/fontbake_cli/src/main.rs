//! fontbake - bake glyph atlases from a font file and inspect text layout
//!
//! Commands:
//!   bake    build every entry in fontbake.toml and write PNG atlases
//!   layout  lay out one string and print its quads
//!   init    write a default fontbake.toml

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fontbake_text::{charset, Color, CpuTextureFactory, EntryOptions, FontAsset};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::{BakeConfig, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "fontbake", version, about = "Bake glyph atlases and lay out text")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake every configured entry and write one PNG atlas per entry
    Bake {
        /// TTF/OTF font file
        font: PathBuf,
        /// Config file or directory holding fontbake.toml
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
        /// Output directory for atlas images
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Lay out a single line of text and print its quads
    Layout {
        /// TTF/OTF font file
        font: PathBuf,
        /// Text to lay out
        #[arg(long)]
        text: String,
        /// Pixel height
        #[arg(long, default_value_t = 32.0)]
        size: f32,
        /// Rasterization multiplier
        #[arg(long, default_value_t = 1)]
        oversampling: u32,
        /// Skip kerning
        #[arg(long)]
        no_kerning: bool,
        /// Pen start x
        #[arg(short, default_value_t = 0.0)]
        x: f32,
        /// Baseline y
        #[arg(short, default_value_t = 0.0)]
        y: f32,
    },

    /// Write a default fontbake.toml
    Init {
        /// Target file or directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Bake {
            font,
            config,
            output,
        } => cmd_bake(&font, &config, &output),
        Commands::Layout {
            font,
            text,
            size,
            oversampling,
            no_kerning,
            x,
            y,
        } => {
            let options = EntryOptions::new(size)
                .with_oversampling(oversampling)
                .with_kerning(!no_kerning);
            cmd_layout(&font, &text, options, x, y)
        }
        Commands::Init { path } => cmd_init(&path),
    }
}

fn cmd_bake(font_path: &Path, config_path: &Path, output: &Path) -> Result<()> {
    let config = BakeConfig::load(config_path)?;
    let mut asset = FontAsset::with_config(
        fontbake_text::TtfFont::from_file(font_path)
            .with_context(|| format!("Failed to load {}", font_path.display()))?,
        config.atlas.to_atlas_config(),
    );
    let mut textures = CpuTextureFactory::new();

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    for entry_config in &config.entries {
        let codepoints = entry_config.codepoints()?;
        tracing::info!(
            "Baking '{}' ({} codepoints at {}px)",
            entry_config.name,
            codepoints.len(),
            entry_config.size
        );

        let texture = asset
            .create_entry(
                &entry_config.name,
                &codepoints,
                entry_config.options(),
                &mut textures,
            )
            .with_context(|| format!("Failed to bake entry '{}'", entry_config.name))?;

        let png_path = output.join(format!("{}.png", entry_config.name));
        texture
            .save_png(&png_path)
            .with_context(|| format!("Failed to write {}", png_path.display()))?;

        let entry = asset.entry(&entry_config.name)?;
        let (width, height) = entry.atlas_dimensions();
        println!(
            "{:<16} {:>5}x{:<5} {:>2} attempt(s) {:>6} glyphs {:>6} kerning pairs -> {}",
            entry_config.name,
            width,
            height,
            entry.pack_attempts(),
            entry.table().len(),
            entry.kerning().len(),
            png_path.display()
        );
    }

    Ok(())
}

fn cmd_layout(font_path: &Path, text: &str, options: EntryOptions, x: f32, y: f32) -> Result<()> {
    let mut asset = FontAsset::from_file(font_path)
        .with_context(|| format!("Failed to load {}", font_path.display()))?;
    let mut textures = CpuTextureFactory::new();

    let mut codepoints = charset::ascii_printable();
    codepoints.extend(text.chars().filter(|c| !c.is_ascii()));
    codepoints.sort_unstable();
    codepoints.dedup();

    asset.create_entry("layout", &codepoints, options, &mut textures)?;

    let mut layout = asset.layout("layout", text, x, y, Color::WHITE)?;
    for (i, quad) in layout.by_ref().enumerate() {
        println!(
            "{:>4}  dest ({:>8.2}, {:>8.2})-({:>8.2}, {:>8.2})  uv ({:.4}, {:.4})-({:.4}, {:.4})",
            i,
            quad.dest_min[0],
            quad.dest_min[1],
            quad.dest_max[0],
            quad.dest_max[1],
            quad.uv_min[0],
            quad.uv_min[1],
            quad.uv_max[0],
            quad.uv_max[1]
        );
    }
    let pen_x = layout.pen_x();
    println!("pen x: {:.2} (width {:.2})", pen_x, pen_x - x);

    Ok(())
}

fn cmd_init(path: &Path) -> Result<()> {
    let config_path = if path.is_dir() {
        path.join(CONFIG_FILE)
    } else {
        path.to_path_buf()
    };

    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    fs::write(&config_path, BakeConfig::default().to_toml()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    tracing::info!("Wrote {}", config_path.display());
    Ok(())
}
