//! Discussion - console demo
//!
//! Lines typed on stdin play the part of recognized speech; the system TTS
//! answers back. While it talks, typed lines are not heard.

use anyhow::Result;
use clap::Parser;
use discussion::event;
use discussion::recognition::ConsoleRecognizer;
use discussion::synthesis::SystemEngine;
use discussion::{Discussion, DiscussionConfig};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Language tag for recognition, e.g. en-GB
    #[arg(long)]
    recognition_language: Option<String>,

    /// Language tag for synthesis, e.g. en-GB
    #[arg(long)]
    synthesis_language: Option<String>,

    /// Recognition alternatives per result
    #[arg(long)]
    max_alternatives: Option<u32>,

    /// Listen again this many ms after starting to speak (0 = wait for the end)
    #[arg(long)]
    resume_delay_ms: Option<u64>,

    /// Only log what was heard, never answer
    #[arg(long)]
    no_echo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("💬 Discussion v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => DiscussionConfig::load_from(path)?,
        None => DiscussionConfig::load()?,
    };
    if let Some(lang) = args.recognition_language {
        config.recognition_language = lang;
    }
    if let Some(lang) = args.synthesis_language {
        config.synthesis_language = lang;
    }
    if let Some(max) = args.max_alternatives {
        config.recognition_max_alternatives = max;
    }
    if let Some(delay) = args.resume_delay_ms {
        config.resume_delay_ms = delay;
    }

    let (sink, mut events) = event::channel();
    let recognizer = ConsoleRecognizer::stdin();
    let input_closed = recognizer.closed_signal();
    let mut discussion = Discussion::new(recognizer, SystemEngine::new(), config, sink);

    let (heard_tx, mut heard_rx) = mpsc::unbounded_channel::<String>();
    discussion.on_recognition_result(move |event| {
        if !event.is_final() {
            return;
        }
        if let Some(text) = event.best_transcript() {
            info!("📝 Heard: '{}'", text);
            let _ = heard_tx.send(text.to_string());
        }
    });

    discussion.initialize();
    if !discussion.has_good_voice() {
        warn!("⚠️ No local voice for the synthesis language, using the engine default");
    }

    info!("✅ Discussion ready - type something and press enter");

    loop {
        tokio::select! {
            Some(event) = events.recv() => discussion.dispatch(event)?,
            Some(text) = heard_rx.recv() => {
                if !args.no_echo {
                    discussion.synthesize(format!("You said {}", text));
                }
            }
            _ = input_closed.notified() => {
                info!("⌨️ End of input");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("👋 Shutting down");
                break;
            }
        }
    }

    discussion.disable_recognition();
    Ok(())
}
