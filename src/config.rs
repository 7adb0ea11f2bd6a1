use crate::canvas::{DEFAULT_HEIGHT, DEFAULT_STROKE_WIDTH, DEFAULT_WIDTH};
use crate::client::{DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE};
use crate::log_debug;
use crate::orchestrator::Settings;
use crate::payload::default_scratch_dir;
use crate::prompt::DEFAULT_LANGUAGE;
use crate::session::Credential;

use anyhow::{Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration structure for Sketchboard
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    /// API key; the environment variable takes precedence
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Model used for chat completions (analysis, formulas, stories)
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used for image generation
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Size requested from the image endpoint
    #[serde(default = "default_image_size")]
    pub image_size: String,
    /// Language the model is asked to answer in
    #[serde(default = "default_language")]
    pub language: String,
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where transient images are written; defaults to the system temp dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
    #[serde(default)]
    pub canvas: CanvasConfig,
}

/// Canvas defaults for the board
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub stroke_width: u32,
    pub stroke_color: String,
    pub background: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_color: crate::canvas::DEFAULT_STROKE_COLOR.to_string(),
            background: crate::canvas::DEFAULT_BACKGROUND.to_string(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_image_size() -> String {
    DEFAULT_IMAGE_SIZE.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            image_model: default_image_model(),
            image_size: default_image_size(),
            language: default_language(),
            base_url: default_base_url(),
            scratch_dir: None,
            canvas: CanvasConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration from the file, or defaults when there is none
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let config = if config_path.exists() {
            Self::from_toml(&fs::read_to_string(&config_path)?)?
        } else {
            Self::default()
        };
        log_debug!("Configuration loaded from {}", config_path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            anyhow!("Invalid configuration file format: {e}. Please check your config.toml for syntax errors.")
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the configuration to the file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        fs::write(&config_path, self.to_toml()?)?;
        log_debug!("Configuration saved to {}", config_path.display());
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("sketchboard");
        fs::create_dir_all(&path)?;
        path.push("config.toml");
        Ok(path)
    }

    /// Update the configuration with new values
    pub fn update(
        &mut self,
        api_key: Option<String>,
        model: Option<String>,
        image_model: Option<String>,
        image_size: Option<String>,
        language: Option<String>,
        base_url: Option<String>,
    ) -> bool {
        let mut changed = false;
        for (slot, value) in [
            (&mut self.api_key, api_key),
            (&mut self.model, model),
            (&mut self.image_model, image_model),
            (&mut self.image_size, image_size),
            (&mut self.language, language),
            (&mut self.base_url, base_url),
        ] {
            if let Some(value) = value
                && *slot != value
            {
                *slot = value;
                changed = true;
            }
        }
        log_debug!("Configuration updated (changed: {})", changed);
        changed
    }

    /// Resolve the credential: explicit value, then environment, then config file
    pub fn credential(&self, explicit: Option<&str>) -> Credential {
        let from_env = std::env::var(API_KEY_ENV).ok();
        Credential::resolve([explicit, from_env.as_deref(), Some(self.api_key.as_str())])
    }

    /// Settings handed to the orchestrator
    pub fn settings(&self) -> Settings {
        Settings {
            chat_model: self.model.clone(),
            image_model: self.image_model.clone(),
            image_size: self.image_size.clone(),
            language: self.language.clone(),
            scratch_dir: self.scratch_dir.clone().unwrap_or_else(default_scratch_dir),
        }
    }
}
