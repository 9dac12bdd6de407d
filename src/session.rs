use chrono::{DateTime, Local};
use thiserror::Error;

use crate::format::format_timestamp;
use crate::log_store::DurationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Stop pressed without a running session
    #[error("Please press Start first.")]
    NoActiveSession,
}

/// One start-to-stop timing interval
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    start_time: Option<DateTime<Local>>,
    stop_time: Option<DateTime<Local>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.start_time, self.stop_time) {
            (None, _) => SessionPhase::Idle,
            (Some(_), None) => SessionPhase::Running,
            (Some(_), Some(_)) => SessionPhase::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == SessionPhase::Running
    }

    pub fn start_time(&self) -> Option<DateTime<Local>> {
        self.start_time
    }

    pub fn stop_time(&self) -> Option<DateTime<Local>> {
        self.stop_time
    }

    /// Re-arms the session from any phase
    pub fn start(&mut self, now: DateTime<Local>) {
        self.start_time = Some(now);
        self.stop_time = None;
    }

    /// Finishes a running session and returns the record to persist.
    ///
    /// A stop instant earlier than the start is clamped to the start.
    pub fn stop(&mut self, now: DateTime<Local>) -> Result<DurationRecord, SessionError> {
        let start = match (self.start_time, self.stop_time) {
            (Some(start), None) => start,
            _ => return Err(SessionError::NoActiveSession),
        };

        let stop = now.max(start);
        self.stop_time = Some(stop);

        Ok(DurationRecord {
            start: format_timestamp(&start),
            end: format_timestamp(&stop),
            duration: rounded_secs(start, stop).unsigned_abs(),
        })
    }

    /// Whole seconds since start while running, the final duration once stopped
    pub fn elapsed_secs(&self, now: DateTime<Local>) -> Option<i64> {
        match (self.start_time, self.stop_time) {
            (Some(start), None) => Some(rounded_secs(start, now)),
            (Some(start), Some(stop)) => Some(rounded_secs(start, stop)),
            (None, _) => None,
        }
    }

    pub fn duration_secs(&self) -> Option<i64> {
        match (self.start_time, self.stop_time) {
            (Some(start), Some(stop)) => Some(rounded_secs(start, stop)),
            _ => None,
        }
    }
}

/// Seconds between two instants, rounded half up, never negative
pub fn rounded_secs(from: DateTime<Local>, to: DateTime<Local>) -> i64 {
    let millis = (to - from).num_milliseconds();
    (millis + 500).div_euclid(1000).max(0)
}
