//! Mock Recognizer for Testing
//!
//! Sessions behave like a strict platform recognizer: starting twice or
//! stopping while idle is refused. Tests drive results and session ends
//! through [`SessionHandle`].

use super::{Call, CallLog};
use discussion::event::{SessionEvents, SessionId};
use discussion::recognition::{
    RecognitionEvent, RecognitionResult, RecognitionSession, RecognitionSettings,
    RecognizerFactory, SessionError,
};
use std::sync::{Arc, Mutex};

/// Test-side view of one created session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub events: SessionEvents,
    pub settings: RecognitionSettings,
    listening: Arc<Mutex<bool>>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.events.session()
    }

    pub fn is_listening(&self) -> bool {
        *self.listening.lock().unwrap()
    }

    /// Simulate the user saying something
    pub fn hear(&self, text: &str) {
        self.events
            .result(RecognitionEvent::single(RecognitionResult::final_transcript(
                text, 0.92,
            )));
    }

    /// Simulate the platform closing the session
    pub fn end(&self) {
        *self.listening.lock().unwrap() = false;
        self.events.ended();
    }
}

/// Mock recognizer factory recording every session it creates
pub struct MockRecognizer {
    log: CallLog,
    pub sessions: Arc<Mutex<Vec<SessionHandle>>>,
    /// Make every start fail as if the platform had been torn down
    pub unavailable: Arc<Mutex<bool>>,
}

impl MockRecognizer {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            sessions: Arc::new(Mutex::new(Vec::new())),
            unavailable: Arc::new(Mutex::new(false)),
        }
    }
}

impl RecognizerFactory for MockRecognizer {
    type Session = MockSession;

    fn create(&mut self, settings: &RecognitionSettings, events: SessionEvents) -> MockSession {
        let listening = Arc::new(Mutex::new(false));
        self.log.lock().unwrap().push(Call::Create(events.session()));
        self.sessions.lock().unwrap().push(SessionHandle {
            events: events.clone(),
            settings: settings.clone(),
            listening: listening.clone(),
        });
        MockSession {
            id: events.session(),
            log: self.log.clone(),
            listening,
            unavailable: self.unavailable.clone(),
        }
    }
}

pub struct MockSession {
    id: SessionId,
    log: CallLog,
    listening: Arc<Mutex<bool>>,
    unavailable: Arc<Mutex<bool>>,
}

impl RecognitionSession for MockSession {
    fn start(&mut self) -> Result<(), SessionError> {
        self.log.lock().unwrap().push(Call::Start(self.id));
        if *self.unavailable.lock().unwrap() {
            return Err(SessionError::Unavailable("torn down".to_string()));
        }
        let mut listening = self.listening.lock().unwrap();
        if *listening {
            return Err(SessionError::AlreadyStarted);
        }
        *listening = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        self.log.lock().unwrap().push(Call::Stop(self.id));
        let mut listening = self.listening.lock().unwrap();
        if !*listening {
            return Err(SessionError::NotRunning);
        }
        *listening = false;
        Ok(())
    }
}
