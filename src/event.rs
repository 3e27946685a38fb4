//! Discussion Events
//!
//! Every completion signal from the platform (a recognition result, a
//! recognition session ending, an utterance ending or crossing a boundary,
//! the resume timer firing) is funnelled into one [`DiscussionEvent`] stream.
//! The host drains that stream and hands each event to
//! [`crate::Discussion::dispatch`], so the order in which competing signals
//! are handled is explicit.

use crate::recognition::RecognitionEvent;
use std::fmt;
use tokio::sync::mpsc;
use tracing::debug;

/// Generation number of a recognition session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// Identifier of a single utterance handed to the synthesis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utterance#{}", self.0)
    }
}

/// Which boundary an utterance crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Word,
    Sentence,
}

/// Everything the coordinator reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum DiscussionEvent {
    /// The recognizer produced (interim or final) results
    RecognitionResult {
        session: SessionId,
        event: RecognitionEvent,
    },
    /// The recognizer closed its session
    RecognitionEnded { session: SessionId },
    /// The synthesis engine finished an utterance
    UtteranceEnded { utterance: UtteranceId },
    /// The synthesis engine reached a word or sentence boundary
    UtteranceBoundary {
        utterance: UtteranceId,
        kind: BoundaryKind,
    },
    /// The resume delay of an utterance elapsed
    ResumeTimerFired { utterance: UtteranceId },
}

/// Receiving half of the event stream
pub type EventReceiver = mpsc::UnboundedReceiver<DiscussionEvent>;

/// Create a connected sink/receiver pair
pub fn channel() -> (EventSink, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSink { tx }, rx)
}

/// Sending half of the event stream, cloned into every adapter
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<DiscussionEvent>,
}

impl EventSink {
    /// Queue an event. A dropped receiver means nobody drives the
    /// discussion any more, so the event is discarded.
    pub fn send(&self, event: DiscussionEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped, discarding event");
        }
    }
}

/// Event handle given to one recognition session
#[derive(Debug, Clone)]
pub struct SessionEvents {
    session: SessionId,
    sink: EventSink,
}

impl SessionEvents {
    pub fn new(session: SessionId, sink: EventSink) -> Self {
        Self { session, sink }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn result(&self, event: RecognitionEvent) {
        self.sink.send(DiscussionEvent::RecognitionResult {
            session: self.session,
            event,
        });
    }

    pub fn ended(&self) {
        self.sink.send(DiscussionEvent::RecognitionEnded {
            session: self.session,
        });
    }
}

/// Event handle given to one utterance
#[derive(Debug, Clone)]
pub struct UtteranceEvents {
    utterance: UtteranceId,
    sink: EventSink,
}

impl UtteranceEvents {
    pub fn new(utterance: UtteranceId, sink: EventSink) -> Self {
        Self { utterance, sink }
    }

    pub fn utterance(&self) -> UtteranceId {
        self.utterance
    }

    pub fn ended(&self) {
        self.sink.send(DiscussionEvent::UtteranceEnded {
            utterance: self.utterance,
        });
    }

    pub fn boundary(&self, kind: BoundaryKind) {
        self.sink.send(DiscussionEvent::UtteranceBoundary {
            utterance: self.utterance,
            kind,
        });
    }
}
