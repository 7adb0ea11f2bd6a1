//! Per-session state owned by whoever drives the orchestrator.

use crate::mode::Mode;
use crate::payload::ImagePayload;
use std::fmt;

/// Where an action is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingInput,
    InputReady,
    Calling,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingInput => "awaiting input",
            Self::InputReady => "input ready",
            Self::Calling => "calling",
        };
        write!(f, "{name}")
    }
}

/// API key held for the lifetime of the session
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    /// Presence check only; keys are never validated locally
    pub fn is_present(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First non-empty candidate wins
    pub fn resolve<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        candidates
            .into_iter()
            .flatten()
            .map(Self::new)
            .find(Self::is_present)
            .unwrap_or_default()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_present() {
            write!(f, "Credential(***)")
        } else {
            write!(f, "Credential(<empty>)")
        }
    }
}

/// Transient state surviving across actions within one session
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub mode: Mode,
    pub phase: Phase,
    pub credential: Credential,
    /// Text of the last successful sketch analysis
    pub description: Option<String>,
    pub last_payload: Option<ImagePayload>,
    pub analysis_done: bool,
}

impl Session {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            ..Self::default()
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_present()
    }

    /// Description available for reuse, if an analysis has completed
    pub fn reusable_description(&self) -> Option<&str> {
        if self.analysis_done {
            self.description.as_deref()
        } else {
            None
        }
    }
}
