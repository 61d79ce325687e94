//! Site configuration module.
//!
//! Handles loading and validating `config.toml`. Every key is optional; a
//! missing file means stock defaults, which reproduce the classic layout:
//!
//! ```text
//! comics/
//! ├── dates.yaml              # date index: "2024-01-01: first-comic"
//! ├── first-comic/
//! │   ├── comic.md            # title line + image/caption pairs
//! │   ├── 01.png
//! │   └── 02.png
//! └── ...
//! built/                      # generated site
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! dates_file = "comics/dates.yaml"
//! comics_dir = "comics"
//! output_dir = "built"
//! comic_file = "comic.md"
//! site_title = "Comics"
//! # stylesheet = "theme/style.css"   # copied verbatim instead of the default
//!
//! [colors.light]
//! background = "#fdfcf8"
//! ...
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// YAML file mapping publication dates to comic folder names.
    pub dates_file: PathBuf,
    /// Directory holding one folder per comic.
    pub comics_dir: PathBuf,
    /// Where the generated site is written.
    pub output_dir: PathBuf,
    /// Markdown file name looked up inside each comic folder.
    pub comic_file: String,
    /// Appended to every page title.
    pub site_title: String,
    /// Optional stylesheet copied verbatim to `style.css`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<PathBuf>,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            dates_file: PathBuf::from("comics/dates.yaml"),
            comics_dir: PathBuf::from("comics"),
            output_dir: PathBuf::from("built"),
            comic_file: "comic.md".to_string(),
            site_title: "Comics".to_string(),
            stylesheet: None,
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, path) in [
            ("dates_file", &self.dates_file),
            ("comics_dir", &self.comics_dir),
            ("output_dir", &self.output_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.comic_file.is_empty()
            || self.comic_file.contains('/')
            || self.comic_file.contains('\\')
        {
            return Err(ConfigError::Validation(
                "comic_file must be a plain file name".into(),
            ));
        }
        Ok(())
    }

    /// Directory that receives copied comic images, relative to the pages.
    pub fn assets_dir(&self) -> PathBuf {
        self.output_dir.join(ASSETS_DIR)
    }
}

/// Name of the asset directory beside the generated pages.
pub const ASSETS_DIR: &str = "comics";

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Narration captions, archive dates and disabled navigation.
    pub text_muted: String,
    /// Panel borders.
    pub border: String,
    pub link: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fdfcf8".to_string(),
            text: "#111111".to_string(),
            text_muted: "#6b6b6b".to_string(),
            border: "#222222".to_string(),
            link: "#1a4d8f".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#121212".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#9a9a9a".to_string(),
            border: "#dddddd".to_string(),
            link: "#8fb8ff".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Load config from the given `config.toml` path.
///
/// A missing file yields the stock defaults. Values present in the file
/// override the defaults key by key.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# comic-site configuration
# ========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# YAML mapping of publication date (YYYY-MM-DD) to comic folder name.
dates_file = "comics/dates.yaml"

# One folder per comic, each holding the markdown file and its images.
comics_dir = "comics"

# Generated site. Pages land here, images under <output_dir>/comics/.
output_dir = "built"

# Markdown file looked up inside every comic folder.
comic_file = "comic.md"

# Appended to every page title.
site_title = "Comics"

# Copy this stylesheet verbatim instead of the built-in one.
# stylesheet = "theme/style.css"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fdfcf8"
text = "#111111"
text_muted = "#6b6b6b"    # Narration, archive, disabled navigation
border = "#222222"        # Panel borders
link = "#1a4d8f"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#121212"
text = "#eeeeee"
text_muted = "#9a9a9a"
border = "#dddddd"
link = "#8fb8ff"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
    )
}
