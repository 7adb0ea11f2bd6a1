use crate::mode::{EnhanceStyle, Mode};

/// Default language the model is asked to answer in
pub const DEFAULT_LANGUAGE: &str = "Spanish";

/// Where the story idea comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorySource {
    /// Free text typed by the user
    Idea(String),
    /// The description produced by the last sketch analysis
    FromAnalysis,
}

/// Everything a prompt may splice in besides the mode itself
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub language: &'a str,
    pub story: Option<&'a StorySource>,
    pub description: Option<&'a str>,
    pub style: EnhanceStyle,
}

impl Default for PromptContext<'_> {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE,
            story: None,
            description: None,
            style: EnhanceStyle::default(),
        }
    }
}

pub fn sketch_analysis_prompt(language: &str) -> String {
    format!("Briefly describe the image in {language}.")
}

pub fn formula_prompt(language: &str) -> String {
    format!(
        "Recognize the mathematical formula in this image, write it in mathematical notation and solve it step by step. Answer in {language}."
    )
}

pub fn story_from_idea_prompt(language: &str, idea: &str) -> String {
    format!(
        "Write a short, creative and entertaining children's story in {language} about: {}",
        idea.trim()
    )
}

pub fn story_from_description_prompt(language: &str, description: &str) -> String {
    format!(
        "Write a short, creative and entertaining children's story in {language} inspired by this drawing description: {}",
        description.trim()
    )
}

pub fn enhancement_prompt(style: EnhanceStyle, description: &str) -> String {
    format!(
        "Turn this hand-drawn sketch into {}. The sketch shows: {}",
        style.phrase(),
        description.trim()
    )
}

/// Build the instruction text for a mode.
///
/// Returns `None` when the mode needs context that is not present: a story without
/// any source, a story that reuses an analysis that has not happened, or an
/// enhancement with no description to work from.
pub fn build_prompt(mode: Mode, context: &PromptContext<'_>) -> Option<String> {
    let description = context.description.filter(|d| !d.trim().is_empty());
    match mode {
        Mode::SketchAnalysis => Some(sketch_analysis_prompt(context.language)),
        Mode::FormulaSolving => Some(formula_prompt(context.language)),
        Mode::StoryGeneration => match context.story? {
            StorySource::Idea(idea) if !idea.trim().is_empty() => {
                Some(story_from_idea_prompt(context.language, idea))
            }
            StorySource::Idea(_) => None,
            StorySource::FromAnalysis => {
                description.map(|d| story_from_description_prompt(context.language, d))
            }
        },
        Mode::ImageEnhancement => description.map(|d| enhancement_prompt(context.style, d)),
    }
}
