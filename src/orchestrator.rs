//! Request orchestrator: gather input, build the prompt, call the model, record the result.
//!
//! Every action runs to completion before the next one is accepted. Preconditions
//! (credential, input, prior analysis) are checked before any network I/O, and every
//! failure leaves the session back in [`Phase::Idle`].

use crate::client::{ChatRequest, ImageRequest, RemoteError, RemoteModel};
use crate::mode::{EnhanceStyle, Mode};
use crate::payload::{self, CaptureError, ImagePayload, ImageSource};
use crate::prompt::{self, PromptContext, StorySource};
use crate::session::{Credential, Phase, Session};
use crate::{log_debug, log_info, log_warn};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Please enter your OpenAI API key to use the board")]
    MissingCredential,

    #[error("{0}")]
    MissingInput(String),

    #[error("Analyze a sketch first; its description is reused for this action")]
    NeedsAnalysis,

    #[error(transparent)]
    Capture(CaptureError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl From<CaptureError> for ActionError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::NoSource => Self::MissingInput(err.to_string()),
            other => Self::Capture(other),
        }
    }
}

impl ActionError {
    /// Informational conditions are shown as hints rather than errors
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::NeedsAnalysis)
    }
}

/// Model and language settings for remote calls
#[derive(Debug, Clone)]
pub struct Settings {
    pub chat_model: String,
    pub image_model: String,
    pub image_size: String,
    pub language: String,
    pub scratch_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chat_model: crate::client::DEFAULT_CHAT_MODEL.to_string(),
            image_model: crate::client::DEFAULT_IMAGE_MODEL.to_string(),
            image_size: crate::client::DEFAULT_IMAGE_SIZE.to_string(),
            language: prompt::DEFAULT_LANGUAGE.to_string(),
            scratch_dir: payload::default_scratch_dir(),
        }
    }
}

/// Inputs gathered for one triggered action
#[derive(Debug, Clone, Default)]
pub struct ActionInput<'a> {
    pub image: Option<ImageSource<'a>>,
    pub story: Option<StorySource>,
    pub description: Option<String>,
    pub style: EnhanceStyle,
}

/// What a successful action produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Text { mode: Mode, text: String },
    Image { url: String, prompt: String },
}

impl Outcome {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Text { mode, .. } => *mode,
            Self::Image { .. } => Mode::ImageEnhancement,
        }
    }
}

pub struct Orchestrator<M: RemoteModel> {
    model: M,
    settings: Settings,
    session: Session,
}

impl<M: RemoteModel> Orchestrator<M> {
    pub fn new(model: M, settings: Settings, credential: Credential) -> Self {
        Self {
            model,
            settings,
            session: Session::new(credential),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.session.credential = credential;
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.settings.language = language.into();
    }

    /// Record the active mode
    pub fn select_mode(&mut self, mode: Mode) {
        log_debug!("Mode selected: {}", mode);
        self.session.mode = mode;
        self.session.phase = Phase::AwaitingInput;
    }

    /// Capture and encode the image for the current action
    pub fn capture_image(&mut self, source: Option<ImageSource<'_>>) -> Result<ImagePayload, ActionError> {
        let source = source.ok_or(CaptureError::NoSource)?;
        let payload = payload::capture_image(source, &self.settings.scratch_dir)?;
        self.session.last_payload = Some(payload.clone());
        Ok(payload)
    }

    /// Run the active mode once with the given inputs
    pub async fn trigger(&mut self, input: ActionInput<'_>) -> Result<Outcome, ActionError> {
        let mode = self.session.mode;
        let result = self.run(mode, input).await;
        self.session.phase = Phase::Idle;
        if let Err(e) = &result {
            if e.is_informational() {
                log_info!("{} blocked: {}", mode, e);
            } else {
                log_warn!("{} failed: {}", mode, e);
            }
        }
        result
    }

    /// Select a mode and trigger it in one step
    pub async fn run_mode(&mut self, mode: Mode, input: ActionInput<'_>) -> Result<Outcome, ActionError> {
        self.select_mode(mode);
        self.trigger(input).await
    }

    async fn run(&mut self, mode: Mode, input: ActionInput<'_>) -> Result<Outcome, ActionError> {
        if !self.session.has_credential() {
            return Err(ActionError::MissingCredential);
        }

        let payload = if mode.requires_image() {
            Some(self.capture_image(input.image)?)
        } else {
            None
        };

        // An explicit description only stands in for an analysis when enhancing
        let description = input
            .description
            .as_deref()
            .filter(|d| mode == Mode::ImageEnhancement && !d.trim().is_empty())
            .or_else(|| self.session.reusable_description());
        let context = PromptContext {
            language: &self.settings.language,
            story: input.story.as_ref(),
            description,
            style: input.style,
        };
        let instruction = prompt::build_prompt(mode, &context).ok_or_else(|| match &input.story {
            Some(StorySource::Idea(_)) | None if mode == Mode::StoryGeneration => {
                ActionError::MissingInput("Write an idea for the story first".to_string())
            }
            _ => ActionError::NeedsAnalysis,
        })?;

        self.session.phase = Phase::InputReady;
        let outcome = self.invoke_remote(mode, instruction, payload).await?;
        self.render_result(&outcome);
        Ok(outcome)
    }

    /// Issue exactly one remote call for the mode
    #[tracing::instrument(name = "invoke_remote", skip_all, fields(mode = %mode))]
    async fn invoke_remote(
        &mut self,
        mode: Mode,
        instruction: String,
        payload: Option<ImagePayload>,
    ) -> Result<Outcome, ActionError> {
        self.session.phase = Phase::Calling;
        log_debug!("Calling {:?} endpoint for {}", mode.endpoint(), mode);

        match mode {
            Mode::ImageEnhancement => {
                let request = ImageRequest {
                    model: self.settings.image_model.clone(),
                    prompt: instruction,
                    size: self.settings.image_size.clone(),
                };
                let url = self
                    .model
                    .generate_image(&self.session.credential, &request)
                    .await?;
                Ok(Outcome::Image {
                    url,
                    prompt: request.prompt,
                })
            }
            Mode::SketchAnalysis | Mode::FormulaSolving | Mode::StoryGeneration => {
                let request = ChatRequest {
                    model: self.settings.chat_model.clone(),
                    instruction,
                    image: payload,
                    max_tokens: mode.max_tokens(),
                };
                let text = self
                    .model
                    .complete(&self.session.credential, &request)
                    .await?;
                Ok(Outcome::Text { mode, text })
            }
        }
    }

    /// Fold a successful outcome into the session
    pub fn render_result(&mut self, outcome: &Outcome) {
        if let Outcome::Text {
            mode: Mode::SketchAnalysis,
            text,
        } = outcome
        {
            self.session.description = Some(text.clone());
            self.session.analysis_done = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_source_maps_to_missing_input() {
        let err: ActionError = CaptureError::NoSource.into();
        assert!(matches!(err, ActionError::MissingInput(_)));
        assert!(!err.is_informational());
        assert!(ActionError::NeedsAnalysis.is_informational());
    }

    #[test]
    fn test_outcome_mode() {
        let image = Outcome::Image {
            url: "u".to_string(),
            prompt: "p".to_string(),
        };
        assert_eq!(image.mode(), Mode::ImageEnhancement);
    }
}
