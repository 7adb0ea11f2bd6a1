use crate::mode::Mode;
use rand::prelude::*;

const SKETCH_MESSAGES: &[&str] = &[
    "🔍 Studying every line of your sketch...",
    "🖍️ Tracing the strokes back to an idea...",
    "👀 Squinting at the doodle from every angle...",
    "🧩 Piecing the shapes together...",
];

const FORMULA_MESSAGES: &[&str] = &[
    "🧮 Recognizing the formula and solving it...",
    "📐 Lining up the terms...",
    "✏️ Working it out step by step...",
    "🔢 Carrying the ones...",
];

const ENHANCE_MESSAGES: &[&str] = &[
    "🎨 Mixing the paints...",
    "🖼️ Framing a brand-new picture...",
    "✨ Giving the sketch a glow-up...",
];

const STORY_MESSAGES: &[&str] = &[
    "📖 Opening a fresh storybook...",
    "🐉 Waking up the characters...",
    "🌙 Dreaming up a bedtime tale...",
    "🏰 Building the castle of the story...",
];

/// Random waiting line for the spinner while a call is in flight
pub fn get_waiting_message(mode: Mode) -> &'static str {
    let pool = match mode {
        Mode::SketchAnalysis => SKETCH_MESSAGES,
        Mode::FormulaSolving => FORMULA_MESSAGES,
        Mode::ImageEnhancement => ENHANCE_MESSAGES,
        Mode::StoryGeneration => STORY_MESSAGES,
    };
    let mut rng = rand::rng();
    pool.choose(&mut rng).copied().unwrap_or("Working on it...")
}

/// Heading printed above a result
pub const fn result_heading(mode: Mode) -> &'static str {
    match mode {
        Mode::SketchAnalysis => "📝 Description",
        Mode::FormulaSolving => "✏️  Solution",
        Mode::ImageEnhancement => "🖼️  Enhanced image",
        Mode::StoryGeneration => "📖 Your story",
    }
}

pub const ABOUT: &str = "Sketchboard lets you describe drawings, recognize and solve handwritten math formulas, turn a sketch into a styled image and write children's stories, all with a hosted multimodal model.";
