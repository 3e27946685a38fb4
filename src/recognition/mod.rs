//! Recognition (speech-to-text) Module
//!
//! The coordinator never talks to a recognizer directly. It asks a
//! [`RecognizerFactory`] for a fresh [`RecognitionSession`] whenever it
//! (re)initializes, and the session reports back through [`SessionEvents`].
//!
//! Bundled backends:
//! - Console: stdin lines as recognition results (demo and manual testing)

pub mod console;

use crate::event::SessionEvents;
use thiserror::Error;

pub use console::ConsoleRecognizer;

/// Settings applied to every recognition session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    /// Keep listening across pauses. The coordinator always asks for
    /// single-utterance sessions and restarts them itself.
    pub continuous: bool,
    /// Deliver partial hypotheses before the final one
    pub interim_results: bool,
    /// BCP 47 language tag, e.g. `en-GB`
    pub language: String,
    pub max_alternatives: u32,
}

impl RecognitionSettings {
    pub fn new(language: impl Into<String>, max_alternatives: u32) -> Self {
        Self {
            continuous: false,
            interim_results: true,
            language: language.into(),
            max_alternatives,
        }
    }
}

/// One hypothesis for a recognized phrase
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    pub transcript: String,
    pub confidence: f32,
}

/// A recognized phrase with its alternatives, best first
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub is_final: bool,
    pub alternatives: Vec<RecognitionAlternative>,
}

impl RecognitionResult {
    /// A final result with a single alternative
    pub fn final_transcript(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            is_final: true,
            alternatives: vec![RecognitionAlternative {
                transcript: transcript.into(),
                confidence,
            }],
        }
    }
}

/// Payload of a recognition result event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionEvent {
    /// Index of the first result that changed in this event
    pub result_index: usize,
    pub results: Vec<RecognitionResult>,
}

impl RecognitionEvent {
    pub fn single(result: RecognitionResult) -> Self {
        Self {
            result_index: 0,
            results: vec![result],
        }
    }

    /// Top alternative of the most recent result
    pub fn best_transcript(&self) -> Option<&str> {
        self.results
            .last()
            .and_then(|r| r.alternatives.first())
            .map(|a| a.transcript.as_str())
    }

    /// Whether the most recent result is final
    pub fn is_final(&self) -> bool {
        self.results.last().is_some_and(|r| r.is_final)
    }
}

/// Why a session refused to start or stop.
///
/// None of these are failures from the coordinator's point of view: it
/// races ahead of the platform's session lifecycle, so duplicate starts
/// and stops are expected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("recognition session already started")]
    AlreadyStarted,

    #[error("recognition session is not running")]
    NotRunning,

    #[error("recognition unavailable: {0}")]
    Unavailable(String),
}

/// A platform recognition session
pub trait RecognitionSession {
    /// Begin capturing. The session reports results and its end through the
    /// [`SessionEvents`] it was created with.
    fn start(&mut self) -> Result<(), SessionError>;

    /// Stop capturing. The platform may still deliver a final result and
    /// the end signal afterwards.
    fn stop(&mut self) -> Result<(), SessionError>;
}

/// Produces fresh recognition sessions
pub trait RecognizerFactory {
    type Session: RecognitionSession;

    fn create(&mut self, settings: &RecognitionSettings, events: SessionEvents) -> Self::Session;
}

impl<F, S> RecognizerFactory for F
where
    F: FnMut(&RecognitionSettings, SessionEvents) -> S,
    S: RecognitionSession,
{
    type Session = S;

    fn create(&mut self, settings: &RecognitionSettings, events: SessionEvents) -> S {
        self(settings, events)
    }
}
