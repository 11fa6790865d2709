use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::assets::ingest::UploadPolicy;
use crate::deck::templates::{self, INITIAL_TEMPLATE};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "deckbuilder";

/// Upper bound accepted for either upload cap, in MiB.
const MAX_CAP_MB: u64 = 1024;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_max_mb: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_max_mb: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Template the first slide of a new deck is built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_template: Option<String>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `deckbuilder config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values a hand-edited file may carry but `set` never writes.
    pub fn validate(&self) -> Result<()> {
        if let Some(assets) = &self.assets {
            for (key, cap) in [
                ("assets.image_max_mb", assets.image_max_mb),
                ("assets.knowledge_max_mb", assets.knowledge_max_mb),
            ] {
                if let Some(mb) = cap {
                    check_cap(key, mb)?;
                }
            }
        }
        if let Some(template) = self.defaults.as_ref().and_then(|d| d.initial_template.as_deref())
        {
            if templates::find(template).is_none() {
                anyhow::bail!("Invalid defaults.initial_template: {template}.");
            }
        }
        Ok(())
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::debug!("Using default config: {e}");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents =
            format!("# Deckbuilder configuration: https://github.com/mklab-se/deckbuilder\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "assets.image_max_mb" => {
                self.assets
                    .get_or_insert_with(AssetsConfig::default)
                    .image_max_mb = Some(parse_cap(key, value)?);
            }
            "assets.knowledge_max_mb" => {
                self.assets
                    .get_or_insert_with(AssetsConfig::default)
                    .knowledge_max_mb = Some(parse_cap(key, value)?);
            }
            "defaults.initial_template" => {
                if templates::find(value).is_none() {
                    let valid: Vec<&str> = templates::catalog().iter().map(|t| t.id).collect();
                    anyhow::bail!(
                        "Invalid initial_template: {value}. Must be one of: {}.",
                        valid.join(", ")
                    );
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .initial_template = Some(value.to_string());
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: assets.image_max_mb, assets.knowledge_max_mb, defaults.initial_template"
            ),
        }
        Ok(())
    }

    /// Upload caps with unset keys filled from the built-in defaults and
    /// every cap held to `1..=MAX_CAP_MB`.
    pub fn upload_policy(&self) -> UploadPolicy {
        let defaults = UploadPolicy::default();
        let assets = self.assets.clone().unwrap_or_default();
        UploadPolicy {
            image_max_mb: assets
                .image_max_mb
                .unwrap_or(defaults.image_max_mb)
                .clamp(1, MAX_CAP_MB),
            knowledge_max_mb: assets
                .knowledge_max_mb
                .unwrap_or(defaults.knowledge_max_mb)
                .clamp(1, MAX_CAP_MB),
        }
    }

    pub fn initial_template(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.initial_template.as_deref())
            .unwrap_or(INITIAL_TEMPLATE)
    }

    /// Every key with its effective value, for `config show`.
    pub fn effective(&self) -> Self {
        let policy = self.upload_policy();
        Self {
            assets: Some(AssetsConfig {
                image_max_mb: Some(policy.image_max_mb),
                knowledge_max_mb: Some(policy.knowledge_max_mb),
            }),
            defaults: Some(DefaultsConfig {
                initial_template: Some(self.initial_template().to_string()),
            }),
        }
    }
}

fn parse_cap(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(mb) => check_cap(key, mb),
        Err(_) => anyhow::bail!(
            "Invalid {key}: {value}. Must be a whole number of megabytes between 1 and {MAX_CAP_MB}."
        ),
    }
}

fn check_cap(key: &str, mb: u64) -> Result<u64> {
    if !(1..=MAX_CAP_MB).contains(&mb) {
        anyhow::bail!(
            "Invalid {key}: {mb}. Must be a whole number of megabytes between 1 and {MAX_CAP_MB}."
        );
    }
    Ok(mb)
}
