use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;
use rand::rngs::StdRng;
use unicode_width::UnicodeWidthStr;

use crate::bounce::Size;
use crate::clock::Clock;
use crate::controller::SessionController;
use crate::format::format_duration;
use crate::log_worker::{LogEvent, LogWorker};
use crate::runtime::AppEvent;

/// User intents the keyboard maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    ToggleLog,
    Quit,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return (key.code == KeyCode::Char('c')).then_some(Action::Quit);
        }
        match key.code {
            KeyCode::Char('s') | KeyCode::Enter => Some(Action::Start),
            KeyCode::Char('x') | KeyCode::Char(' ') => Some(Action::Stop),
            KeyCode::Char('l') => Some(Action::ToggleLog),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }
}

/// Display size of a single-line label
pub fn measure_label(text: &str) -> Size {
    Size::new(text.width() as f64, 1.0)
}

/// Event-loop side of the application: routes events to the controller and
/// hands finished sessions to the log worker
pub struct App<C: Clock> {
    controller: SessionController<C, StdRng>,
    worker: LogWorker,
    log_requested: bool,
    should_quit: bool,
}

impl<C: Clock> App<C> {
    pub fn new(controller: SessionController<C, StdRng>, worker: LogWorker) -> Self {
        Self {
            controller,
            worker,
            log_requested: false,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &SessionController<C, StdRng> {
        &self.controller
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn wants_clock_ticks(&self) -> bool {
        self.controller.wants_clock_ticks()
    }

    pub fn wants_frames(&self) -> bool {
        self.controller.wants_frames()
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.controller
            .set_container_size(Size::new(width as f64, height as f64));
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => {
                if let Some(action) = Action::from_key(key) {
                    self.apply(action);
                }
            }
            AppEvent::Resize(w, h) => self.resize(w, h),
            AppEvent::Tick => {
                self.controller.on_clock_tick();
                self.remeasure_label();
            }
            AppEvent::Frame => {
                self.remeasure_label();
                self.controller.on_frame();
            }
            AppEvent::Log(LogEvent::Appended { record, saved }) => {
                let duration = format_duration(record.duration as i64);
                if saved {
                    self.controller.set_message(format!("Saved {duration}"));
                } else {
                    self.controller
                        .set_message(format!("Could not save {duration}"));
                }
            }
            AppEvent::Log(LogEvent::Loaded(records)) => {
                if self.log_requested {
                    self.log_requested = false;
                    debug!("Showing {} logged sessions", records.len());
                    self.controller.show_log(records);
                }
            }
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Start => self.start(),
            Action::Stop => self.stop(),
            Action::ToggleLog => self.toggle_log(),
            Action::Quit => self.should_quit = true,
        }
    }

    fn start(&mut self) {
        // measure the first label up front so the launch point respects it
        self.controller
            .set_label_size(measure_label(&format!(" {} ", format_duration(0))));
        self.log_requested = false;
        self.controller.start();
        self.remeasure_label();
    }

    fn stop(&mut self) {
        if let Ok(record) = self.controller.stop() {
            self.worker.append(record);
        }
    }

    fn toggle_log(&mut self) {
        if self.controller.log_view().is_some() || self.log_requested {
            self.log_requested = false;
            self.controller.hide_log();
        } else {
            self.log_requested = true;
            self.worker.load_all();
        }
    }

    fn remeasure_label(&mut self) {
        if let Some(text) = self.controller.label_text() {
            let size = measure_label(&text);
            self.controller.set_label(text, size);
        }
    }
}
