use crate::light_types::{LightCategory, LightTypeRegistry};
use crate::persistence::PersistenceCodec;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/lights.json";

#[derive(Debug, Clone, Deserialize)]
pub struct LightManagerConfig {
    /// Where light files are written; the per-user data directory when unset.
    #[serde(default)]
    pub save_directory: Option<PathBuf>,
    #[serde(default = "LightManagerConfig::default_category")]
    pub default_category: LightCategory,
    /// Categories offered by the registry, in reconciliation order.
    #[serde(default = "LightManagerConfig::default_categories")]
    pub categories: Vec<LightCategory>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub save_directory: Option<PathBuf>,
    pub default_category: Option<LightCategory>,
}

impl LightManagerConfig {
    const fn default_category() -> LightCategory {
        LightCategory::Point
    }

    fn default_categories() -> Vec<LightCategory> {
        LightCategory::ALL.to_vec()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        cfg.validate().with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(cfg)
    }

    /// The default category must be one the registry offers, or every
    /// create without an explicit category would fail.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            bail!("no light categories configured");
        }
        if !self.categories.contains(&self.default_category) {
            bail!(
                "default category '{}' is not among the configured categories",
                self.default_category.display_name()
            );
        }
        Ok(())
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(error = ?err, "config load failed; falling back to defaults");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.save_directory {
            self.save_directory = Some(dir.clone());
        }
        if let Some(category) = overrides.default_category {
            self.default_category = category;
        }
    }

    pub fn resolved_directory(&self) -> PathBuf {
        self.save_directory.clone().unwrap_or_else(PersistenceCodec::default_directory)
    }

    pub fn registry(&self) -> LightTypeRegistry {
        LightTypeRegistry::with_categories(self.categories.iter().copied())
    }

    pub fn codec(&self) -> PersistenceCodec {
        PersistenceCodec::new(self.resolved_directory())
    }
}

impl Default for LightManagerConfig {
    fn default() -> Self {
        Self {
            save_directory: None,
            default_category: Self::default_category(),
            categories: Self::default_categories(),
        }
    }
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.save_directory.is_none() && self.default_category.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.save_directory.is_some() {
            fields.push("save_directory");
        }
        if self.default_category.is_some() {
            fields.push("default_category");
        }
        fields
    }
}
