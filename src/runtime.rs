use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::log_worker::LogEvent;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// once per second while the clock subscription is active
    Tick,
    /// once per animation frame while the frame subscription is active
    Frame,
    Log(LogEvent),
}

/// Source of external events (keyboard, resize, log completions)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => AppEvent::Key(key),
                Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                Ok(_) => continue,
                Err(_) => break,
            };
            if reader_tx.send(evt).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    /// Handle for other producers (the log worker) feeding the same loop
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Periodic callback that only fires while subscribed
#[derive(Clone, Copy, Debug)]
pub struct Subscription {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Subscription {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// First fire is one interval from `now`; re-subscribing keeps the schedule
    pub fn subscribe(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.interval);
        }
    }

    pub fn unsubscribe(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Consumes one due fire, skipping missed ones rather than bursting
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let next = due + self.interval;
                self.next_due = Some(if next > now { next } else { now + self.interval });
                true
            }
            _ => false,
        }
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    clock: Subscription,
    frames: Subscription,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self::with_clock_interval(event_source, ticker, Duration::from_secs(1))
    }

    pub fn with_clock_interval(event_source: E, ticker: T, clock_interval: Duration) -> Self {
        let frames = Subscription::new(ticker.interval());
        Self {
            event_source,
            ticker,
            clock: Subscription::new(clock_interval),
            frames,
        }
    }

    /// Subscribes or cancels the clock and frame callbacks to match the guards
    pub fn sync(&mut self, clock_active: bool, frames_active: bool) {
        let now = Instant::now();
        if clock_active {
            self.clock.subscribe(now);
        } else {
            self.clock.unsubscribe();
        }
        if frames_active {
            self.frames.subscribe(now);
        } else {
            self.frames.unsubscribe();
        }
    }

    pub fn clock_active(&self) -> bool {
        self.clock.is_active()
    }

    pub fn frames_active(&self) -> bool {
        self.frames.is_active()
    }

    /// Blocks until the next external event or due callback.
    /// Returns None when the wait ends with nothing to deliver.
    pub fn step(&mut self) -> Option<AppEvent> {
        let now = Instant::now();
        let timeout = [self.clock.time_until(now), self.frames.time_until(now)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or_else(|| self.ticker.interval());

        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => return Some(ev),
            Err(RecvTimeoutError::Timeout) => {}
            // no producers left; keep pacing so ticks still arrive on time
            Err(RecvTimeoutError::Disconnected) => std::thread::sleep(timeout),
        }

        let now = Instant::now();
        if self.clock.poll(now) {
            Some(AppEvent::Tick)
        } else if self.frames.poll(now) {
            Some(AppEvent::Frame)
        } else {
            None
        }
    }
}
