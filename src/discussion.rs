//! Discussion Coordinator
//!
//! Owns one recognition session and one synthesis engine and keeps them
//! from overlapping: the microphone is closed before anything is spoken and
//! only reopened once the utterance ends, crosses its first boundary, or
//! its resume delay elapses, whichever comes first.
//!
//! Recognition sessions are single-utterance. Every time one ends the
//! coordinator starts it again (keep-alive) unless it is speaking or
//! recognition has been disabled, which gives the caller the impression of
//! continuous listening.

use crate::config::DiscussionConfig;
use crate::error::{DiscussionError, DiscussionResult};
use crate::event::{
    DiscussionEvent, EventReceiver, EventSink, SessionEvents, SessionId, UtteranceEvents,
    UtteranceId,
};
use crate::recognition::{
    RecognitionEvent, RecognitionSession, RecognitionSettings, RecognizerFactory,
};
use crate::synthesis::{
    select_preferred_voice, SynthesisEngine, SynthesisRequest, Utterance, Voice,
};
use crate::timer::{ResumeTimer, TokioTimer};
use std::time::Duration;
use tracing::{debug, info};

/// Callback receiving every recognition result
pub type ResultHandler = Box<dyn FnMut(&RecognitionEvent)>;

/// Lifecycle of the current recognition session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionState {
    /// No session, or the session was stopped on purpose
    Stopped,
    Listening,
    /// The platform closed the session; keep-alive decides what's next
    Ended,
}

/// Lifecycle of synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisState {
    Idle,
    Speaking(UtteranceId),
}

struct ActiveSession<S> {
    id: SessionId,
    session: S,
    state: RecognitionState,
}

/// Coordinates recognition and synthesis for a spoken back-and-forth
pub struct Discussion<F: RecognizerFactory, E: SynthesisEngine> {
    /// Receives every recognition result. Must be set before results arrive.
    pub on_recognition_result: Option<ResultHandler>,
    /// Languages and limits; read whenever a session or utterance is created
    pub config: DiscussionConfig,

    factory: F,
    engine: E,
    timer: Box<dyn ResumeTimer>,
    sink: EventSink,

    recognition: Option<ActiveSession<F::Session>>,
    next_session: u64,
    next_utterance: u64,
    current_utterance: Option<UtteranceId>,

    voices: Vec<Voice>,
    preferred_voice: Option<Voice>,

    is_synthesizing: bool,
    is_recognition_enabled: bool,
}

impl<F: RecognizerFactory, E: SynthesisEngine> Discussion<F, E> {
    /// Create a coordinator. Call [`Discussion::initialize`] once the
    /// application is ready to listen.
    pub fn new(factory: F, engine: E, config: DiscussionConfig, sink: EventSink) -> Self {
        Self {
            on_recognition_result: None,
            config,
            factory,
            engine,
            timer: Box::new(TokioTimer),
            sink,
            recognition: None,
            next_session: 0,
            next_utterance: 0,
            current_utterance: None,
            voices: Vec::new(),
            preferred_voice: None,
            is_synthesizing: false,
            is_recognition_enabled: true,
        }
    }

    /// Replace the tokio-backed resume timer
    pub fn with_timer(mut self, timer: impl ResumeTimer + 'static) -> Self {
        self.timer = Box::new(timer);
        self
    }

    /// Register the recognition result callback
    pub fn on_recognition_result(&mut self, handler: impl FnMut(&RecognitionEvent) + 'static) {
        self.on_recognition_result = Some(Box::new(handler));
    }

    /// Set up synthesis and start listening
    pub fn initialize(&mut self) {
        info!(
            "💬 Initializing discussion (recognition {}, synthesis {})",
            self.config.recognition_language, self.config.synthesis_language
        );
        self.initialize_synthesis();
        self.initialize_recognition();
    }

    /// Voices found during initialize; empty before that
    pub fn synthesis_voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Whether a local voice for the synthesis language was found
    pub fn has_good_voice(&self) -> bool {
        self.preferred_voice.is_some()
    }

    pub fn preferred_voice(&self) -> Option<&Voice> {
        self.preferred_voice.as_ref()
    }

    pub fn is_synthesizing(&self) -> bool {
        self.is_synthesizing
    }

    pub fn is_recognition_enabled(&self) -> bool {
        self.is_recognition_enabled
    }

    pub fn recognition_state(&self) -> RecognitionState {
        self.recognition
            .as_ref()
            .map_or(RecognitionState::Stopped, |active| active.state)
    }

    pub fn synthesis_state(&self) -> SynthesisState {
        match (self.is_synthesizing, self.current_utterance) {
            (true, Some(id)) => SynthesisState::Speaking(id),
            _ => SynthesisState::Idle,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Turn the microphone back on with a fresh session
    pub fn enable_recognition(&mut self) {
        info!("🎙️ Recognition enabled");
        self.is_recognition_enabled = true;
        self.initialize_recognition();
        self.initialize_synthesis();
    }

    /// Turn the microphone off until [`Discussion::enable_recognition`]
    pub fn disable_recognition(&mut self) {
        info!("🔇 Recognition disabled");
        self.is_recognition_enabled = false;
        self.stop_recognition();
    }

    /// Say something to the user.
    ///
    /// Recognition stops first, anything still being spoken is cancelled,
    /// and listening resumes once this utterance ends or crosses a boundary,
    /// or after the resume delay if that is nonzero. A request without its own
    /// delay uses `config.resume_delay_ms`.
    pub fn synthesize(&mut self, request: impl Into<SynthesisRequest>) {
        let request = request.into();

        self.is_synthesizing = true;
        self.stop_recognition();

        let id = self.allocate_utterance();
        self.current_utterance = Some(id);
        let utterance = Utterance::from_request(
            id,
            &request,
            self.config.synthesis_language.clone(),
            self.preferred_voice.clone(),
        );

        info!("🗣️ Speaking {}: '{}'", id, utterance.text);
        self.engine.cancel();
        self.engine.speak(utterance, UtteranceEvents::new(id, self.sink.clone()));

        let delay = request
            .resume_delay
            .unwrap_or_else(|| Duration::from_millis(self.config.resume_delay_ms));
        if !delay.is_zero() {
            self.timer.schedule(delay, id, self.sink.clone());
        }
    }

    /// Handle one event from the stream
    pub fn dispatch(&mut self, event: DiscussionEvent) -> DiscussionResult<()> {
        match event {
            DiscussionEvent::RecognitionResult { session, event } => {
                let handler = self
                    .on_recognition_result
                    .as_mut()
                    .ok_or(DiscussionError::NoResultHandler)?;
                debug!("Result from {}: {:?}", session, event.best_transcript());
                handler(&event);
            }
            DiscussionEvent::RecognitionEnded { session } => self.on_recognition_ended(session),
            DiscussionEvent::UtteranceEnded { utterance } => {
                self.resume_after(utterance, "utterance ended")
            }
            DiscussionEvent::UtteranceBoundary { utterance, kind } => {
                debug!("{} crossed a {:?} boundary", utterance, kind);
                self.resume_after(utterance, "utterance boundary")
            }
            DiscussionEvent::ResumeTimerFired { utterance } => {
                self.resume_after(utterance, "resume delay elapsed")
            }
        }
        Ok(())
    }

    /// Dispatch everything already queued without waiting
    pub fn dispatch_pending(&mut self, events: &mut EventReceiver) -> DiscussionResult<usize> {
        let mut handled = 0;
        while let Ok(event) = events.try_recv() {
            self.dispatch(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Wait for events and dispatch them. Returns on the first dispatch
    /// error, or once every sender is gone.
    pub async fn run(&mut self, events: &mut EventReceiver) -> DiscussionResult<()> {
        while let Some(event) = events.recv().await {
            self.dispatch(event)?;
        }
        Ok(())
    }

    fn initialize_synthesis(&mut self) {
        // Some engines only load their voice list after the first request.
        let warmup = self.allocate_utterance();
        self.engine.speak(
            Utterance::silent(warmup, self.config.synthesis_language.clone()),
            UtteranceEvents::new(warmup, self.sink.clone()),
        );

        self.voices = self.engine.voices();
        self.preferred_voice =
            select_preferred_voice(&self.voices, &self.config.synthesis_language).cloned();

        match &self.preferred_voice {
            Some(voice) => info!(
                "🔊 {} voices via {}, using '{}' ({})",
                self.voices.len(),
                self.engine.name(),
                voice.name,
                voice.lang
            ),
            None => info!(
                "🔊 {} voices via {}, no local voice for {}",
                self.voices.len(),
                self.engine.name(),
                self.config.synthesis_language
            ),
        }
    }

    fn initialize_recognition(&mut self) {
        if let Some(mut old) = self.recognition.take() {
            if let Err(e) = old.session.stop() {
                debug!("Stopping {} ignored: {}", old.id, e);
            }
        }

        let id = SessionId(self.next_session);
        self.next_session += 1;
        let settings = RecognitionSettings::new(
            self.config.recognition_language.clone(),
            self.config.recognition_max_alternatives,
        );
        let session = self
            .factory
            .create(&settings, SessionEvents::new(id, self.sink.clone()));
        debug!("Created recognition {}", id);

        self.recognition = Some(ActiveSession {
            id,
            session,
            state: RecognitionState::Stopped,
        });

        if self.is_synthesizing || !self.is_recognition_enabled {
            debug!("Deferring start of {}", id);
            return;
        }
        self.start_recognition();
    }

    fn on_recognition_ended(&mut self, session: SessionId) {
        let Some(active) = self.recognition.as_mut() else {
            return;
        };
        if active.id != session {
            debug!("Ignoring end of superseded {}", session);
            return;
        }
        active.state = RecognitionState::Ended;

        if self.is_synthesizing || !self.is_recognition_enabled {
            return;
        }
        self.start_recognition();
    }

    fn resume_after(&mut self, utterance: UtteranceId, reason: &str) {
        if self.current_utterance != Some(utterance) {
            debug!("Ignoring {} for superseded {}", reason, utterance);
            return;
        }

        debug!("Resuming recognition after {}: {}", utterance, reason);
        self.is_synthesizing = false;
        if !self.is_recognition_enabled {
            return;
        }
        self.start_recognition();
    }

    fn start_recognition(&mut self) {
        let Some(active) = self.recognition.as_mut() else {
            debug!("No recognition session to start");
            return;
        };
        match active.session.start() {
            Ok(()) => {
                debug!("Listening on {}", active.id);
                active.state = RecognitionState::Listening;
            }
            Err(e) => debug!("Starting {} ignored: {}", active.id, e),
        }
    }

    fn stop_recognition(&mut self) {
        let Some(active) = self.recognition.as_mut() else {
            return;
        };
        match active.session.stop() {
            Ok(()) => debug!("Stopped {}", active.id),
            Err(e) => debug!("Stopping {} ignored: {}", active.id, e),
        }
        active.state = RecognitionState::Stopped;
    }

    fn allocate_utterance(&mut self) -> UtteranceId {
        let id = UtteranceId(self.next_utterance);
        self.next_utterance += 1;
        id
    }
}
