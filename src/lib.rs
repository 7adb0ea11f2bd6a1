//! Sketchboard - AI-powered sketch board
//!
//! This library turns freehand canvases and uploaded images into requests for a hosted
//! multimodal model: sketch descriptions, solved formulas, children's stories and
//! enhanced images.

// Allow certain clippy warnings that are either stylistic or from external dependencies
#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::future_not_send)] // Generic model futures borrow the orchestrator
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine
#![allow(clippy::too_many_arguments)] // Some functions legitimately need many params

pub mod board;
pub mod canvas;
pub mod cli;
pub mod client;
pub mod commands;
pub mod common;
pub mod config;
pub mod logger;
pub mod messages;
pub mod mode;
pub mod orchestrator;
pub mod payload;
pub mod prompt;
pub mod session;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use canvas::Canvas;
pub use client::{OpenAiClient, RemoteModel};
pub use config::Config;
pub use mode::{EnhanceStyle, Mode};
pub use orchestrator::{ActionError, ActionInput, Orchestrator, Outcome, Settings};
pub use payload::{ImagePayload, ImageSource};
pub use prompt::StorySource;
pub use session::{Credential, Phase, Session};
