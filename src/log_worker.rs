use log::{debug, error, info};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use crate::format::format_duration;
use crate::log_store::{DurationLog, DurationRecord};
use crate::runtime::AppEvent;
use crate::store::KeyValueStore;

enum LogCommand {
    Append(DurationRecord),
    LoadAll,
}

/// Completion of a duration log operation, delivered back to the event loop
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    Appended { record: DurationRecord, saved: bool },
    Loaded(Vec<DurationRecord>),
}

/// Runs duration log reads and writes on a background thread.
///
/// Commands are handled one at a time in submission order, so an append
/// finishes its read-modify-write before the next one starts.
pub struct LogWorker {
    commands: Option<Sender<LogCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl LogWorker {
    pub fn spawn<S>(log: DurationLog<S>, events: Sender<AppEvent>) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let (tx, rx) = mpsc::channel::<LogCommand>();

        let handle = std::thread::spawn(move || {
            let mut listening = true;
            for command in rx {
                let event = match command {
                    LogCommand::Append(record) => {
                        let saved = match log.append(record.clone()) {
                            Ok(()) => {
                                info!("Saved session of {}", format_duration(record.duration as i64));
                                true
                            }
                            Err(e) => {
                                error!("Failed to save duration: {e}");
                                false
                            }
                        };
                        LogEvent::Appended { record, saved }
                    }
                    LogCommand::LoadAll => {
                        let records = log.load_all();
                        debug!("Loaded {} duration records", records.len());
                        LogEvent::Loaded(records)
                    }
                };

                // queued appends still run once the event loop is gone
                if listening && events.send(AppEvent::Log(event)).is_err() {
                    debug!("Event loop closed, finishing queued log commands");
                    listening = false;
                }
            }
        });

        Self {
            commands: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn append(&self, record: DurationRecord) {
        self.submit(LogCommand::Append(record));
    }

    pub fn load_all(&self) {
        self.submit(LogCommand::LoadAll);
    }

    fn submit(&self, command: LogCommand) {
        let sent = self
            .commands
            .as_ref()
            .map(|tx| tx.send(command).is_ok())
            .unwrap_or(false);
        if !sent {
            error!("Duration log worker is not running");
        }
    }
}

impl Drop for LogWorker {
    fn drop(&mut self) {
        // closing the queue ends the worker loop
        self.commands.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_store::DURATIONS_KEY;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn record(duration: u64) -> DurationRecord {
        DurationRecord {
            start: "start".into(),
            end: "end".into(),
            duration,
        }
    }

    fn next_log_event(rx: &mpsc::Receiver<AppEvent>) -> LogEvent {
        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok(AppEvent::Log(event)) => event,
            other => panic!("expected log event, got {other:?}"),
        }
    }

    #[test]
    fn appends_are_applied_in_order() {
        let store = Arc::new(MemoryStore::new());
        let (tx, rx) = mpsc::channel();
        let worker = LogWorker::spawn(DurationLog::new(store.clone()), tx);

        for n in 1..=3 {
            worker.append(record(n));
        }
        for n in 1..=3 {
            assert_eq!(
                next_log_event(&rx),
                LogEvent::Appended {
                    record: record(n),
                    saved: true
                }
            );
        }

        worker.load_all();
        assert_eq!(
            next_log_event(&rx),
            LogEvent::Loaded(vec![record(1), record(2), record(3)])
        );
        drop(worker);
        assert!(store.raw(DURATIONS_KEY).is_some());
    }

    #[test]
    fn failed_append_is_reported_not_fatal() {
        let (tx, rx) = mpsc::channel();
        let worker = LogWorker::spawn(DurationLog::new(MemoryStore::new().failing_writes()), tx);

        worker.append(record(5));
        assert_eq!(
            next_log_event(&rx),
            LogEvent::Appended {
                record: record(5),
                saved: false
            }
        );

        worker.load_all();
        assert_eq!(next_log_event(&rx), LogEvent::Loaded(vec![]));
    }

    #[test]
    fn queued_appends_survive_event_loop_shutdown() {
        let store = Arc::new(MemoryStore::new());
        let (tx, rx) = mpsc::channel();
        let worker = LogWorker::spawn(DurationLog::new(store.clone()), tx);
        drop(rx);

        for n in 1..=3 {
            worker.append(record(n));
        }
        worker.load_all();
        drop(worker);

        let saved = DurationLog::new(store).load_all();
        assert_eq!(saved, vec![record(1), record(2), record(3)]);
    }
}
