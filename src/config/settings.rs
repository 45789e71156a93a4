use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{CardError, CardResult};
use crate::render::encode::DEFAULT_JPEG_QUALITY;
use crate::render::strategy::DEFAULT_RENDERER;
use crate::text::fonts::FontDescriptor;

/// Route the card endpoint is mounted on unless configured otherwise.
pub const DEFAULT_MOUNT_PATH: &str = "/__og_image__";

/// Runtime configuration, read from JSON with camelCase keys.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CardConfig {
    /// Directory holding generated cards. Purged on startup.
    pub cache_dir: PathBuf,
    /// Static asset root that image paths on the page resolve against.
    pub public_dir: PathBuf,
    pub fonts: Vec<FontDescriptor>,
    /// Preferred family for all card text.
    pub font_family: Option<String>,
    /// Caption printed at the top of every card.
    pub fixed_text: String,
    /// Name of the renderer in the registry.
    pub renderer: String,
    pub width: u32,
    pub height: u32,
    pub jpeg_quality: u8,
    pub mount_path: String,
    /// Ignore cached cards and render every request.
    pub force_regenerate: bool,
    /// Outbound page fetch timeout; no timeout when absent.
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".cache/og-image"),
            public_dir: PathBuf::from("public"),
            fonts: Vec::new(),
            font_family: None,
            fixed_text: String::new(),
            renderer: DEFAULT_RENDERER.to_string(),
            width: Canvas::CARD.width,
            height: Canvas::CARD.height,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            force_regenerate: false,
            fetch_timeout_ms: None,
        }
    }
}

impl CardConfig {
    pub fn from_path(path: &Path) -> CardResult<Self> {
        let f = std::fs::File::open(path)
            .with_context(|| format!("open config '{}'", path.display()))?;
        Self::from_reader(f)
    }

    pub fn from_reader(reader: impl Read) -> CardResult<Self> {
        let cfg: Self = serde_json::from_reader(reader).context("parse config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> CardResult<()> {
        self.canvas()?;
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CardError::validation("jpegQuality must be in 1..=100"));
        }
        if !self.mount_path.starts_with('/') || self.mount_path.len() < 2 {
            return Err(CardError::validation(
                "mountPath must start with '/' and name a route",
            ));
        }
        if self.renderer.trim().is_empty() {
            return Err(CardError::validation("renderer must not be empty"));
        }
        if self.fetch_timeout_ms == Some(0) {
            return Err(CardError::validation("fetchTimeoutMs must be > 0"));
        }
        for font in &self.fonts {
            if font.path.as_os_str().is_empty() {
                return Err(CardError::validation("font path must not be empty"));
            }
        }
        Ok(())
    }

    pub fn canvas(&self) -> CardResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
