//! Task modes and enhancement styles.
//!
//! Single source of truth for what each mode needs and which endpoint it calls.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The task the user picked
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum Mode {
    #[default]
    #[strum(to_string = "sketch-analysis", serialize = "analyze", serialize = "sketch")]
    SketchAnalysis,
    #[strum(to_string = "formula-solving", serialize = "solve", serialize = "formula")]
    FormulaSolving,
    #[strum(to_string = "image-enhancement", serialize = "enhance", serialize = "image")]
    ImageEnhancement,
    #[strum(to_string = "story-generation", serialize = "story", serialize = "narrate")]
    StoryGeneration,
}

/// Remote endpoint family a mode talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ChatCompletion,
    ImageGeneration,
}

impl Mode {
    pub const ALL: &'static [Mode] = &[
        Mode::SketchAnalysis,
        Mode::FormulaSolving,
        Mode::ImageEnhancement,
        Mode::StoryGeneration,
    ];

    pub const fn endpoint(self) -> Endpoint {
        match self {
            Self::ImageEnhancement => Endpoint::ImageGeneration,
            Self::SketchAnalysis | Self::FormulaSolving | Self::StoryGeneration => {
                Endpoint::ChatCompletion
            }
        }
    }

    /// Whether the mode sends an image along with its instruction
    pub const fn requires_image(self) -> bool {
        matches!(self, Self::SketchAnalysis | Self::FormulaSolving)
    }

    /// Completion budget for chat modes
    pub const fn max_tokens(self) -> Option<u32> {
        match self {
            Self::SketchAnalysis | Self::StoryGeneration => Some(500),
            Self::FormulaSolving => Some(800),
            Self::ImageEnhancement => None,
        }
    }

    /// Human-facing label with an emoji, as shown in menus
    pub const fn label(self) -> &'static str {
        match self {
            Self::SketchAnalysis => "🖌️  Analyze sketch",
            Self::FormulaSolving => "🔢 Solve formula",
            Self::ImageEnhancement => "🎨 Enhance image",
            Self::StoryGeneration => "📚 Children's story",
        }
    }
}

/// Art style applied when generating an enhanced image
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum EnhanceStyle {
    #[default]
    Realistic,
    Cartoon,
    Anime,
    Watercolor,
    DigitalArt,
}

impl EnhanceStyle {
    pub const ALL: &'static [EnhanceStyle] = &[
        EnhanceStyle::Realistic,
        EnhanceStyle::Cartoon,
        EnhanceStyle::Anime,
        EnhanceStyle::Watercolor,
        EnhanceStyle::DigitalArt,
    ];

    /// Phrase spliced into the image-generation prompt
    pub const fn phrase(self) -> &'static str {
        match self {
            Self::Realistic => "a photorealistic image with natural lighting and fine detail",
            Self::Cartoon => "a colorful cartoon illustration with bold outlines",
            Self::Anime => "an anime-style illustration with expressive shading",
            Self::Watercolor => "a soft watercolor painting with gentle color washes",
            Self::DigitalArt => "a polished piece of digital art with vibrant colors",
        }
    }
}
