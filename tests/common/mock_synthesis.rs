//! Mock Synthesis Engine and Timer for Testing
//!
//! Records every utterance so tests can fire its end and boundary signals.

use super::{Call, CallLog};
use discussion::event::{EventSink, UtteranceEvents, UtteranceId};
use discussion::synthesis::{SynthesisEngine, Utterance, Voice};
use discussion::timer::ResumeTimer;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock engine that records spoken utterances
pub struct MockSynthesis {
    log: CallLog,
    voices: Vec<Voice>,
    pub spoken: Arc<Mutex<Vec<(Utterance, UtteranceEvents)>>>,
}

impl MockSynthesis {
    pub fn new(log: CallLog, voices: Vec<Voice>) -> Self {
        Self {
            log,
            voices,
            spoken: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl SynthesisEngine for MockSynthesis {
    fn speak(&mut self, utterance: Utterance, events: UtteranceEvents) {
        self.log
            .lock()
            .unwrap()
            .push(Call::Speak(utterance.id, utterance.text.clone()));
        self.spoken.lock().unwrap().push((utterance, events));
    }

    fn cancel(&mut self) {
        self.log.lock().unwrap().push(Call::Cancel);
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Timer that only records what it was asked to schedule
pub struct ManualTimer {
    log: CallLog,
}

impl ManualTimer {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl ResumeTimer for ManualTimer {
    fn schedule(&mut self, delay: Duration, utterance: UtteranceId, _sink: EventSink) {
        self.log
            .lock()
            .unwrap()
            .push(Call::Schedule(utterance, delay));
    }
}
