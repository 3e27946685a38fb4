pub mod mock_recognizer;
pub mod mock_synthesis;

use discussion::event::{self, EventReceiver, SessionId, UtteranceEvents, UtteranceId};
use discussion::synthesis::{Utterance, Voice};
use discussion::{Discussion, DiscussionConfig};
use mock_recognizer::{MockRecognizer, SessionHandle};
use mock_synthesis::{ManualTimer, MockSynthesis};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything the mocks were asked to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(SessionId),
    Start(SessionId),
    Stop(SessionId),
    Speak(UtteranceId, String),
    Cancel,
    Schedule(UtteranceId, Duration),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn default_voices() -> Vec<Voice> {
    vec![
        Voice::new("Google UK English Female", "en-GB", false),
        Voice::new("Daniel", "en-GB", true),
        Voice::new("Thomas", "fr-FR", true),
    ]
}

pub struct TestContext {
    pub discussion: Discussion<MockRecognizer, MockSynthesis>,
    pub events: EventReceiver,
    pub log: CallLog,
    pub sessions: Arc<Mutex<Vec<SessionHandle>>>,
    pub spoken: Arc<Mutex<Vec<(Utterance, UtteranceEvents)>>>,
    pub unavailable: Arc<Mutex<bool>>,
    pub heard: Arc<Mutex<Vec<String>>>,
}

impl TestContext {
    /// Default config and voices, a result handler and a manual timer
    pub fn new() -> Self {
        Self::build(DiscussionConfig::default(), default_voices(), true)
    }

    pub fn without_handler() -> Self {
        Self::build(DiscussionConfig::default(), default_voices(), false)
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self::build(DiscussionConfig::default(), voices, true)
    }

    pub fn build(config: DiscussionConfig, voices: Vec<Voice>, with_handler: bool) -> Self {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let recognizer = MockRecognizer::new(log.clone());
        let sessions = recognizer.sessions.clone();
        let unavailable = recognizer.unavailable.clone();
        let engine = MockSynthesis::new(log.clone(), voices);
        let spoken = engine.spoken.clone();

        let (sink, events) = event::channel();
        let mut discussion = Discussion::new(recognizer, engine, config, sink)
            .with_timer(ManualTimer::new(log.clone()));

        let heard = Arc::new(Mutex::new(Vec::new()));
        if with_handler {
            let heard = heard.clone();
            discussion.on_recognition_result(move |event| {
                if let Some(text) = event.best_transcript() {
                    heard.lock().unwrap().push(text.to_string());
                }
            });
        }

        Self {
            discussion,
            events,
            log,
            sessions,
            spoken,
            unavailable,
            heard,
        }
    }

    /// Dispatch every queued event
    pub fn pump(&mut self) -> usize {
        self.discussion
            .dispatch_pending(&mut self.events)
            .expect("dispatch failed")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.log.lock().unwrap().clear();
    }

    /// Number of start attempts since the log was last cleared
    pub fn start_attempts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Start(_)))
            .count()
    }

    pub fn scheduled(&self) -> Vec<(UtteranceId, Duration)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Schedule(id, delay) => Some((id, delay)),
                _ => None,
            })
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn current_session(&self) -> SessionHandle {
        self.sessions
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no session created")
    }

    pub fn session(&self, index: usize) -> SessionHandle {
        self.sessions.lock().unwrap()[index].clone()
    }

    /// The most recent non-silent utterance
    pub fn last_utterance(&self) -> (Utterance, UtteranceEvents) {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(u, _)| !u.is_silent())
            .cloned()
            .expect("nothing spoken")
    }

    pub fn heard(&self) -> Vec<String> {
        self.heard.lock().unwrap().clone()
    }
}
