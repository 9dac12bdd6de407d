use log::{info, warn};
use rand::Rng;

use crate::bounce::{BounceConfig, BounceSimulator, BounceSnapshot, Reflection, Size};
use crate::clock::Clock;
use crate::flash::{label_color, LabelColor};
use crate::format::{format_duration, format_timestamp};
use crate::log_store::DurationRecord;
use crate::session::{Session, SessionError, SessionPhase};

/// What the display should currently show
#[derive(Debug, Clone, PartialEq)]
pub enum View<'a> {
    Log(&'a [DurationRecord]),
    Idle,
    Running {
        text: String,
        color: LabelColor,
        snapshot: BounceSnapshot,
    },
    Stopped {
        duration: String,
        start: String,
        end: String,
    },
}

/// Single owner of the timing session, the bouncing label and the cached log view
#[derive(Debug)]
pub struct SessionController<C: Clock, R: Rng> {
    clock: C,
    rng: R,
    session: Session,
    bounce: BounceSimulator,
    color: LabelColor,
    // label text whose size the bounds were last computed from
    label: Option<String>,
    log_view: Option<Vec<DurationRecord>>,
    message: Option<String>,
}

impl<C: Clock, R: Rng> SessionController<C, R> {
    pub fn new(clock: C, rng: R, config: BounceConfig) -> Self {
        Self {
            clock,
            rng,
            session: Session::new(),
            bounce: BounceSimulator::new(config),
            color: LabelColor::Default,
            label: None,
            log_view: None,
            message: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Starts (or restarts) timing from now
    pub fn start(&mut self) {
        let now = self.clock.now();
        self.session.start(now);
        self.bounce.launch(&mut self.rng);
        self.color = LabelColor::Default;
        self.label = None;
        self.log_view = None;
        self.message = None;
        info!("Session started at {}", format_timestamp(&now));
    }

    /// Finishes the running session and hands back the record to persist
    pub fn stop(&mut self) -> Result<DurationRecord, SessionError> {
        match self.session.stop(self.clock.now()) {
            Ok(record) => {
                self.color = LabelColor::Default;
                info!("Session stopped after {}", format_duration(record.duration as i64));
                Ok(record)
            }
            Err(e) => {
                warn!("Stop ignored: {e}");
                self.message = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Whole seconds since start, only while running
    pub fn elapsed_secs(&self) -> Option<i64> {
        if self.session.is_running() {
            self.session.elapsed_secs(self.clock.now())
        } else {
            None
        }
    }

    pub fn duration_secs(&self) -> Option<i64> {
        self.session.duration_secs()
    }

    /// Text of the bouncing label while running
    pub fn label_text(&self) -> Option<String> {
        self.elapsed_secs()
            .map(|secs| format!(" {} ", format_duration(secs)))
    }

    pub fn label_color(&self) -> LabelColor {
        self.color
    }

    /// Once-per-second update of the label colour
    pub fn on_clock_tick(&mut self) {
        if let Some(elapsed) = self.elapsed_secs() {
            self.color = label_color(elapsed, &mut self.rng);
        }
    }

    /// Advances the label one animation frame; ignored unless frames are wanted
    pub fn on_frame(&mut self) -> Option<Reflection> {
        if !self.wants_frames() {
            return None;
        }
        self.bounce.step()
    }

    pub fn set_container_size(&mut self, size: Size) {
        self.bounce.set_container(size);
    }

    pub fn set_label_size(&mut self, size: Size) {
        self.bounce.set_label(size);
    }

    /// Records the label text together with its measured size; the running
    /// view draws this text so it always matches the bounds
    pub fn set_label(&mut self, text: String, size: Size) {
        self.bounce.set_label(size);
        self.label = Some(text);
    }

    pub fn snapshot(&self) -> BounceSnapshot {
        self.bounce.snapshot()
    }

    pub fn bounce(&self) -> &BounceSimulator {
        &self.bounce
    }

    pub fn wants_clock_ticks(&self) -> bool {
        self.session.is_running()
    }

    pub fn wants_frames(&self) -> bool {
        self.session.is_running() && self.bounce.bounds_known()
    }

    /// Caches a freshly loaded log for display
    pub fn show_log(&mut self, records: Vec<DurationRecord>) {
        self.log_view = Some(records);
    }

    pub fn hide_log(&mut self) {
        self.log_view = None;
    }

    pub fn log_view(&self) -> Option<&[DurationRecord]> {
        self.log_view.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn view(&self) -> View<'_> {
        if let Some(records) = self.log_view() {
            return View::Log(records);
        }
        match (self.session.start_time(), self.session.stop_time()) {
            (None, _) => View::Idle,
            (Some(start), Some(stop)) => View::Stopped {
                duration: format_duration(self.duration_secs().unwrap_or_default()),
                start: format_timestamp(&start),
                end: format_timestamp(&stop),
            },
            (Some(_), None) => View::Running {
                text: self
                    .label
                    .clone()
                    .or_else(|| self.label_text())
                    .unwrap_or_default(),
                color: self.color,
                snapshot: self.snapshot(),
            },
        }
    }
}
