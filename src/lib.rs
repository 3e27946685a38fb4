//! Discussion Library
//!
//! Coordinates a speech recognizer and a speech synthesizer so an
//! application can talk with a user without hearing itself.

pub mod config;
pub mod discussion;
pub mod error;
pub mod event;
pub mod recognition;
pub mod synthesis;
pub mod timer;

pub use config::DiscussionConfig;
pub use discussion::{Discussion, RecognitionState, ResultHandler, SynthesisState};
pub use error::{DiscussionError, DiscussionResult};
pub use event::{BoundaryKind, DiscussionEvent, EventReceiver, EventSink};
pub use synthesis::{SynthesisRequest, Voice};
