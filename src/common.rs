use crate::canvas::Canvas;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Clone, Default, Debug)]
pub struct CommonParams {
    /// Override the chat model
    #[arg(long, help = "Override the chat model for this run")]
    pub model: Option<String>,

    /// Language for answers
    #[arg(long = "lang", help = "Language the model should answer in (e.g. Spanish, English)")]
    pub language: Option<String>,
}

impl CommonParams {
    /// Apply per-run overrides; nothing is saved
    pub fn apply_to_config(&self, config: &mut Config) -> bool {
        let mut changes_made = false;

        if let Some(model) = &self.model
            && config.model != *model
        {
            config.model.clone_from(model);
            changes_made = true;
        }

        if let Some(language) = &self.language
            && config.language != *language
        {
            config.language.clone_from(language);
            changes_made = true;
        }

        changes_made
    }
}

/// Where the image for a one-shot command comes from
#[derive(Args, Clone, Default, Debug)]
pub struct ImageParams {
    /// Sketch file (JSON strokes) rendered on a canvas
    #[arg(long, help = "Sketch file with strokes (JSON)", conflicts_with = "image")]
    pub sketch: Option<PathBuf>,

    /// Photo or scan to upload
    #[arg(long, help = "PNG or JPEG image to upload")]
    pub image: Option<PathBuf>,
}

impl ImageParams {
    pub fn is_empty(&self) -> bool {
        self.sketch.is_none() && self.image.is_none()
    }

    /// Load the sketch into a canvas; a missing sketch yields a blank canvas
    pub fn load_canvas(&self) -> Result<Canvas> {
        match &self.sketch {
            Some(path) => Ok(Canvas::load(path)?),
            None => Ok(Canvas::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_config() {
        let mut config = Config::default();
        let params = CommonParams {
            model: Some("gpt-4o".to_string()),
            language: None,
        };
        assert!(params.apply_to_config(&mut config));
        assert_eq!(config.model, "gpt-4o");
        assert!(!params.apply_to_config(&mut config));
    }
}
