//! Synthesis (text-to-speech) Module
//!
//! Provides the engine interface the coordinator speaks through, the
//! request/utterance types, and voice selection.

use crate::event::{UtteranceEvents, UtteranceId};
use std::time::Duration;
use tracing::warn;

pub mod system;

pub use system::SystemEngine;

pub const PITCH_RANGE: (f32, f32) = (0.0, 2.0);
pub const RATE_RANGE: (f32, f32) = (0.1, 10.0);
pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);

/// A synthesis voice as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag, e.g. `en-GB`
    pub lang: String,
    /// Installed locally rather than served remotely
    pub local_service: bool,
    pub default: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>, local_service: bool) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            local_service,
            default: false,
        }
    }
}

/// Primary subtag of a language tag (`en` for `en-GB`)
pub fn primary_language(tag: &str) -> &str {
    tag.split('-').next().unwrap_or("")
}

/// First locally installed voice speaking the language of `language`
pub fn select_preferred_voice<'a>(voices: &'a [Voice], language: &str) -> Option<&'a Voice> {
    let primary = primary_language(language).to_ascii_lowercase();
    voices
        .iter()
        .find(|v| v.local_service && v.lang.to_ascii_lowercase().starts_with(&primary))
}

/// What to say and how to say it
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    /// 0 to 2
    pub pitch: f32,
    /// 0.1 to 10
    pub rate: f32,
    /// 0 to 1
    pub volume: f32,
    /// Listen again after this long even if the utterance is still
    /// playing. Zero waits for the engine's own completion signals,
    /// `None` uses the configured default.
    pub resume_delay: Option<Duration>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
            resume_delay: None,
        }
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_resume_delay(mut self, delay: Duration) -> Self {
        self.resume_delay = Some(delay);
        self
    }

    pub fn with_resume_delay_ms(self, millis: u64) -> Self {
        self.with_resume_delay(Duration::from_millis(millis))
    }

    /// Copy of the request with every parameter inside its valid range
    pub fn normalized(&self) -> Self {
        Self {
            text: self.text.clone(),
            pitch: clamp_param("pitch", self.pitch, PITCH_RANGE, 1.0),
            rate: clamp_param("rate", self.rate, RATE_RANGE, 1.0),
            volume: clamp_param("volume", self.volume, VOLUME_RANGE, 1.0),
            resume_delay: self.resume_delay,
        }
    }
}

impl From<&str> for SynthesisRequest {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SynthesisRequest {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

fn clamp_param(name: &str, value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if !value.is_finite() {
        warn!("⚠️ Invalid {} {}, using {}", name, value, fallback);
        return fallback;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("⚠️ {} {} out of range, clamped to {}", name, value, clamped);
    }
    clamped
}

/// A request ready for the engine
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
    pub lang: String,
    /// `None` leaves the choice to the engine
    pub voice: Option<Voice>,
}

impl Utterance {
    pub fn from_request(
        id: UtteranceId,
        request: &SynthesisRequest,
        lang: impl Into<String>,
        voice: Option<Voice>,
    ) -> Self {
        let request = request.normalized();
        Self {
            id,
            text: request.text,
            pitch: request.pitch,
            rate: request.rate,
            volume: request.volume,
            lang: lang.into(),
            voice,
        }
    }

    /// Empty utterance used to make lazy engines load their voices
    pub fn silent(id: UtteranceId, lang: impl Into<String>) -> Self {
        Self {
            id,
            text: String::new(),
            pitch: 1.0,
            rate: 1.0,
            volume: 0.0,
            lang: lang.into(),
            voice: None,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Trait for synthesis engines
///
/// All calls return immediately. Completion and boundary signals go
/// through the [`UtteranceEvents`] handed to `speak`.
pub trait SynthesisEngine {
    /// Start speaking the utterance
    fn speak(&mut self, utterance: Utterance, events: UtteranceEvents);

    /// Abort whatever is being spoken
    fn cancel(&mut self);

    /// Voices currently known to the engine. May be empty until the engine
    /// has been asked to speak at least once.
    fn voices(&self) -> Vec<Voice>;

    /// Get the engine name
    fn name(&self) -> &str;
}
