//! Resume timer
//!
//! After `synthesize` the coordinator may ask to be woken up after a delay
//! so it can listen again before the engine reports the end of the
//! utterance. The wake-up arrives as a [`DiscussionEvent::ResumeTimerFired`].

use crate::event::{DiscussionEvent, EventSink, UtteranceId};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::warn;

/// Schedules delayed resume events
pub trait ResumeTimer {
    fn schedule(&mut self, delay: Duration, utterance: UtteranceId, sink: EventSink);
}

/// Timer backed by the current tokio runtime
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimer;

impl ResumeTimer for TokioTimer {
    fn schedule(&mut self, delay: Duration, utterance: UtteranceId, sink: EventSink) {
        let Ok(handle) = Handle::try_current() else {
            warn!(
                "⚠️ No tokio runtime, {} will only resume on completion signals",
                utterance
            );
            return;
        };

        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            sink.send(DiscussionEvent::ResumeTimerFired { utterance });
        });
    }
}
