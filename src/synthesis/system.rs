//! System TTS engine (speech-dispatcher or espeak-ng)

use super::{SynthesisEngine, Utterance, Voice};
use crate::event::UtteranceEvents;
use std::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Command line speech tool in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    SpdSay,
    EspeakNg,
    /// Nothing installed; utterances end immediately
    Unavailable,
}

impl Backend {
    /// Probe for spd-say first, then espeak-ng
    pub fn detect() -> Self {
        if Command::new("spd-say").arg("--version").output().is_ok() {
            Backend::SpdSay
        } else if Command::new("espeak-ng").arg("--version").output().is_ok() {
            Backend::EspeakNg
        } else {
            Backend::Unavailable
        }
    }

    fn program(&self) -> Option<&'static str> {
        match self {
            Backend::SpdSay => Some("spd-say"),
            Backend::EspeakNg => Some("espeak-ng"),
            Backend::Unavailable => None,
        }
    }
}

#[derive(Debug)]
pub struct SystemEngine {
    backend: Backend,
    current: Option<oneshot::Sender<()>>,
    voice_source: fn(Backend) -> Vec<Voice>,
}

impl Default for SystemEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemEngine {
    pub fn new() -> Self {
        let backend = Backend::detect();
        match backend {
            Backend::Unavailable => {
                warn!("⚠️ No system TTS command found (tried spd-say, espeak-ng)")
            }
            _ => info!("🔊 System TTS using {:?}", backend),
        }
        Self::with_backend(backend)
    }

    pub fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            current: None,
            voice_source: list_voices,
        }
    }

    /// Replace the command used to list installed voices
    pub fn with_voice_source(mut self, source: fn(Backend) -> Vec<Voice>) -> Self {
        self.voice_source = source;
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
}

/// Ask the backend for its installed voices.
///
/// speech-dispatcher loads its modules lazily, so an early listing can come
/// back empty; callers ask again rather than keeping the first answer.
pub fn list_voices(backend: Backend) -> Vec<Voice> {
    let output = match backend {
        Backend::SpdSay => Command::new("spd-say").arg("-L").output(),
        Backend::EspeakNg => Command::new("espeak-ng").arg("--voices").output(),
        Backend::Unavailable => return Vec::new(),
    };

    match output {
        Ok(out) if out.status.success() => {
            let listing = String::from_utf8_lossy(&out.stdout);
            match backend {
                Backend::SpdSay => parse_spd_voices(&listing),
                _ => parse_espeak_voices(&listing),
            }
        }
        Ok(out) => {
            debug!("Voice listing exited with {}", out.status);
            Vec::new()
        }
        Err(e) => {
            debug!("Voice listing failed: {}", e);
            Vec::new()
        }
    }
}

impl SynthesisEngine for SystemEngine {
    fn speak(&mut self, utterance: Utterance, events: UtteranceEvents) {
        if utterance.is_silent() {
            events.ended();
            return;
        }

        let Some(program) = self.backend.program() else {
            warn!("⚠️ No system TTS, skipping: '{}'", utterance.text);
            events.ended();
            return;
        };

        debug!("System speaking {}: {}", utterance.id, utterance.text);
        let mut command = tokio::process::Command::new(program);
        command.args(speak_args(self.backend, &utterance));
        command.kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("❌ Failed to spawn {}: {}", program, e);
                events.ended();
                return;
            }
        };

        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.current = Some(cancel_tx);

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    match status {
                        Ok(status) if !status.success() => {
                            warn!("⚠️ {} exited with {}", program, status);
                        }
                        Err(e) => warn!("⚠️ Waiting for {} failed: {}", program, e),
                        Ok(_) => {}
                    }
                    events.ended();
                }
                _ = cancel_rx => {
                    let _ = child.kill().await;
                    debug!("Cancelled {}", events.utterance());
                }
            }
        });
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.current.take() {
            let _ = cancel.send(());
            if self.backend == Backend::SpdSay {
                // The daemon keeps talking after its client is killed.
                tokio::spawn(async {
                    match tokio::process::Command::new("spd-say").arg("-C").status().await {
                        Ok(status) if !status.success() => {
                            debug!("spd-say -C exited with {}", status)
                        }
                        Err(e) => debug!("spd-say -C failed: {}", e),
                        Ok(_) => {}
                    }
                });
            }
        }
    }

    fn voices(&self) -> Vec<Voice> {
        (self.voice_source)(self.backend)
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// Command line for one utterance
pub fn speak_args(backend: Backend, utterance: &Utterance) -> Vec<String> {
    match backend {
        Backend::SpdSay => {
            let rate = if utterance.rate >= 1.0 {
                (utterance.rate - 1.0) / 9.0 * 100.0
            } else {
                (utterance.rate - 1.0) / 0.9 * 100.0
            };
            let pitch = (utterance.pitch - 1.0) * 100.0;
            let volume = utterance.volume * 200.0 - 100.0;

            let mut args = vec![
                "--wait".to_string(),
                "-l".to_string(),
                primary_lower(&utterance.lang),
                "-r".to_string(),
                format!("{}", rate.round() as i32),
                "-p".to_string(),
                format!("{}", pitch.round() as i32),
                "-i".to_string(),
                format!("{}", volume.round() as i32),
            ];
            if let Some(voice) = &utterance.voice {
                args.push("-y".to_string());
                args.push(voice.name.clone());
            }
            args.push("--".to_string());
            args.push(utterance.text.clone());
            args
        }
        Backend::EspeakNg => {
            let speed = (175.0 * utterance.rate).clamp(80.0, 450.0);
            let pitch = (utterance.pitch * 50.0).clamp(0.0, 99.0);
            let amplitude = utterance.volume * 100.0;
            let voice = utterance
                .voice
                .as_ref()
                .map(|v| v.lang.to_ascii_lowercase())
                .unwrap_or_else(|| utterance.lang.to_ascii_lowercase());

            vec![
                "-v".to_string(),
                voice,
                "-s".to_string(),
                format!("{}", speed.round() as i32),
                "-p".to_string(),
                format!("{}", pitch.round() as i32),
                "-a".to_string(),
                format!("{}", amplitude.round() as i32),
                "--".to_string(),
                utterance.text.clone(),
            ]
        }
        Backend::Unavailable => Vec::new(),
    }
}

fn primary_lower(tag: &str) -> String {
    super::primary_language(tag).to_ascii_lowercase()
}

/// Parse `spd-say -L` output (`NAME LANGUAGE VARIANT` columns)
pub fn parse_spd_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter(|line| !line.trim_start().starts_with("NAME"))
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let name = cols.next()?;
            let lang = cols.next()?;
            Some(Voice::new(name, lang, true))
        })
        .collect()
}

/// Parse `espeak-ng --voices` output
/// (`Pty Language Age/Gender VoiceName File ...` columns)
pub fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter(|line| !line.trim_start().starts_with("Pty"))
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 4 {
                return None;
            }
            Some(Voice::new(cols[3], cols[1], true))
        })
        .collect()
}
