//! Sound gateways
//!
//! The game core hands finished stages to a [`SoundGateway`] and moves on.
//! Gateways never report failure back: a broken speaker must not break a spin.

use std::io::Write;

use parking_lot::Mutex;

use crate::stage::Stage;

/// Fire-and-forget sink for stage events
pub trait SoundGateway {
    /// Trigger whatever sound belongs to this stage
    fn play(&self, stage: &Stage);

    /// Trigger a sequence of stages in order
    fn play_all(&self, stages: &[Stage]) {
        for stage in stages {
            self.play(stage);
        }
    }
}

/// Gateway that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentGateway;

impl SoundGateway for SilentGateway {
    fn play(&self, _stage: &Stage) {}
}

/// Gateway that logs every stage at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogGateway;

impl SoundGateway for LogGateway {
    fn play(&self, stage: &Stage) {
        log::debug!("[sound] {} :: {}", stage.event_name(), stage);
    }
}

/// Gateway that rings the terminal bell on wins
///
/// Write errors are swallowed after a warning.
pub struct BellGateway<W: Write> {
    out: Mutex<W>,
    enabled: bool,
}

impl BellGateway<std::io::Stdout> {
    /// Bell on standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> BellGateway<W> {
    /// Bell on an arbitrary writer
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            enabled: true,
        }
    }

    /// Enable/disable the bell
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Is the bell enabled?
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Take the writer back
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> SoundGateway for BellGateway<W> {
    fn play(&self, stage: &Stage) {
        if !self.enabled || !stage.is_win() {
            return;
        }

        // Big wins ring twice
        let bell: &[u8] = match stage {
            Stage::BigWin { .. } => b"\x07\x07",
            _ => b"\x07",
        };

        let mut out = self.out.lock();
        if let Err(e) = out.write_all(bell).and_then(|_| out.flush()) {
            log::warn!("Bell unavailable: {}", e);
        }
    }
}

/// Gateway that remembers every event name it was asked to play
#[derive(Debug, Default)]
pub struct RecordingGateway {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event names seen so far
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl SoundGateway for RecordingGateway {
    fn play(&self, stage: &Stage) {
        self.events.lock().push(stage.event_name());
    }
}
