//! Console recognizer: every line typed on stdin is "heard"
//!
//! Behaves like a single-utterance platform recognizer. A session only
//! hears lines while it is started; after delivering one line it ends,
//! which is what the coordinator's keep-alive expects.

use super::{
    RecognitionEvent, RecognitionResult, RecognitionSession, RecognitionSettings,
    RecognizerFactory, SessionError,
};
use crate::event::SessionEvents;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing::{debug, info};

type ListenerSlot = Arc<Mutex<Option<SessionEvents>>>;

/// Recognizer factory backed by a line-oriented reader
pub struct ConsoleRecognizer {
    listener: ListenerSlot,
    closed: Arc<AtomicBool>,
    closed_signal: Arc<Notify>,
}

impl ConsoleRecognizer {
    /// Read lines from stdin. Must be called inside a tokio runtime.
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    /// Read lines from any async reader. Must be called inside a tokio runtime.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let listener: ListenerSlot = Arc::new(Mutex::new(None));
        let closed = Arc::new(AtomicBool::new(false));
        let closed_signal = Arc::new(Notify::new());

        let task_listener = listener.clone();
        let task_closed = closed.clone();
        let task_signal = closed_signal.clone();
        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => deliver(&task_listener, &line),
                    Ok(None) => break,
                    Err(e) => {
                        debug!("Console input error: {}", e);
                        break;
                    }
                }
            }

            info!("⌨️ Console input closed");
            task_closed.store(true, Ordering::SeqCst);
            if let Ok(mut slot) = task_listener.lock() {
                if let Some(events) = slot.take() {
                    events.ended();
                }
            }
            task_signal.notify_one();
        });

        Self {
            listener,
            closed,
            closed_signal,
        }
    }

    /// Notified once when the input reaches end of file
    pub fn closed_signal(&self) -> Arc<Notify> {
        self.closed_signal.clone()
    }
}

impl RecognizerFactory for ConsoleRecognizer {
    type Session = ConsoleSession;

    fn create(&mut self, settings: &RecognitionSettings, events: SessionEvents) -> ConsoleSession {
        debug!(
            "Console recognizer: new {} ({}, {} alternatives)",
            events.session(),
            settings.language,
            settings.max_alternatives
        );
        ConsoleSession {
            events,
            listener: self.listener.clone(),
            closed: self.closed.clone(),
        }
    }
}

/// One listening window on the console
pub struct ConsoleSession {
    events: SessionEvents,
    listener: ListenerSlot,
    closed: Arc<AtomicBool>,
}

impl RecognitionSession for ConsoleSession {
    fn start(&mut self) -> Result<(), SessionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SessionError::Unavailable("console input closed".to_string()));
        }

        let mut slot = self
            .listener
            .lock()
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;
        if slot
            .as_ref()
            .is_some_and(|current| current.session() == self.events.session())
        {
            return Err(SessionError::AlreadyStarted);
        }
        *slot = Some(self.events.clone());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        let mut slot = self
            .listener
            .lock()
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;
        match slot.take() {
            Some(current) if current.session() == self.events.session() => {
                current.ended();
                Ok(())
            }
            other => {
                *slot = other;
                Err(SessionError::NotRunning)
            }
        }
    }
}

fn deliver(listener: &ListenerSlot, line: &str) {
    let text = line.trim();
    if text.is_empty() {
        return;
    }

    let Ok(mut slot) = listener.lock() else {
        return;
    };
    match slot.take() {
        Some(events) => {
            events.result(RecognitionEvent::single(RecognitionResult::final_transcript(
                text, 1.0,
            )));
            events.ended();
        }
        None => debug!("Not listening, dropped console input: '{}'", text),
    }
}
