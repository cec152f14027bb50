//! fontbake configuration file handling

use anyhow::{Context, Result};
use fontbake_text::{charset, AtlasConfig, EntryOptions, FilterMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file name
pub const CONFIG_FILE: &str = "fontbake.toml";

/// Top-level configuration (fontbake.toml)
#[derive(Debug, Deserialize, Serialize)]
pub struct BakeConfig {
    #[serde(default)]
    pub atlas: AtlasSection,
    #[serde(default, rename = "entry")]
    pub entries: Vec<EntryConfig>,
}

/// Atlas packing settings
#[derive(Debug, Deserialize, Serialize)]
pub struct AtlasSection {
    #[serde(default = "default_initial_size")]
    pub initial_size: u32,
    #[serde(default = "default_growth_step")]
    pub growth_step: u32,
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    #[serde(default = "default_padding")]
    pub padding: u32,
    #[serde(default)]
    pub filter: FilterSetting,
}

fn default_initial_size() -> u32 {
    fontbake_text::atlas::DEFAULT_INITIAL_SIZE
}

fn default_growth_step() -> u32 {
    fontbake_text::atlas::DEFAULT_GROWTH_STEP
}

fn default_max_dimension() -> u32 {
    fontbake_text::atlas::DEFAULT_MAX_DIMENSION
}

fn default_padding() -> u32 {
    1
}

impl Default for AtlasSection {
    fn default() -> Self {
        Self {
            initial_size: default_initial_size(),
            growth_step: default_growth_step(),
            max_dimension: default_max_dimension(),
            padding: default_padding(),
            filter: FilterSetting::default(),
        }
    }
}

impl AtlasSection {
    pub fn to_atlas_config(&self) -> AtlasConfig {
        AtlasConfig::default()
            .with_initial_size(self.initial_size)
            .with_growth_step(self.growth_step)
            .with_max_dimension(self.max_dimension)
            .with_padding(self.padding)
            .with_filter(self.filter.into())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSetting {
    #[default]
    Linear,
    Nearest,
}

impl From<FilterSetting> for FilterMode {
    fn from(setting: FilterSetting) -> Self {
        match setting {
            FilterSetting::Linear => FilterMode::Linear,
            FilterSetting::Nearest => FilterMode::Nearest,
        }
    }
}

/// One entry to bake
#[derive(Debug, Deserialize, Serialize)]
pub struct EntryConfig {
    pub name: String,
    #[serde(default = "default_size")]
    pub size: f32,
    #[serde(default = "default_oversampling")]
    pub oversampling: u32,
    #[serde(default = "default_true")]
    pub kerning: bool,
    /// `"ascii"` or a range list such as `"32-126,0x400-0x4FF"`
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Extra literal characters appended to the charset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chars: Option<String>,
}

fn default_size() -> f32 {
    32.0
}

fn default_oversampling() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_charset() -> String {
    "ascii".to_string()
}

impl EntryConfig {
    pub fn new(name: &str, size: f32) -> Self {
        Self {
            name: name.to_string(),
            size,
            oversampling: default_oversampling(),
            kerning: true,
            charset: default_charset(),
            chars: None,
        }
    }

    pub fn options(&self) -> EntryOptions {
        EntryOptions::new(self.size)
            .with_oversampling(self.oversampling)
            .with_kerning(self.kerning)
    }

    /// Resolve the charset and extra characters into codepoints
    pub fn codepoints(&self) -> Result<Vec<char>> {
        let mut codepoints = match self.charset.trim() {
            "ascii" => charset::ascii_printable(),
            "" => Vec::new(),
            ranges => charset::parse_ranges(ranges)
                .with_context(|| format!("Invalid charset for entry '{}'", self.name))?,
        };
        if let Some(chars) = &self.chars {
            codepoints.extend(chars.chars());
        }
        Ok(codepoints)
    }
}

impl BakeConfig {
    /// Load configuration from a file, or from fontbake.toml in a directory
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            anyhow::bail!(
                "No config found at {}. Run `fontbake init` to create one.",
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: BakeConfig = toml::from_str(content)?;
        if config.entries.is_empty() {
            anyhow::bail!("Config defines no [[entry]] tables");
        }
        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            atlas: AtlasSection::default(),
            entries: vec![EntryConfig::new("body", 32.0), EntryConfig::new("title", 64.0)],
        }
    }
}
