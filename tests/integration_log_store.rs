use bouncetime::log_store::{DurationLog, DurationRecord, DURATIONS_KEY};
use bouncetime::store::{KeyValueStore, SqliteStore};
use tempfile::tempdir;

fn record(duration: u64) -> DurationRecord {
    DurationRecord {
        start: "3/1/2024, 9:00:00 AM".into(),
        end: "3/1/2024, 9:02:05 AM".into(),
        duration,
    }
}

#[test]
fn sqlite_backed_log_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("durations.db");

    {
        let log = DurationLog::new(SqliteStore::open(&path).unwrap());
        log.append(record(125)).unwrap();
        log.append(record(5)).unwrap();
    }

    let log = DurationLog::new(SqliteStore::open(&path).unwrap());
    assert_eq!(log.load_all(), vec![record(125), record(5)]);
}

#[test]
fn roundtrip_appends_exactly_one_record() {
    let log = DurationLog::new(SqliteStore::in_memory().unwrap());
    log.append(record(1)).unwrap();

    let before = log.load_all();
    log.append(record(2)).unwrap();
    let after = log.load_all();

    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.last(), Some(&record(2)));
}

#[test]
fn malformed_sqlite_value_reads_as_empty() {
    let store = SqliteStore::in_memory().unwrap();
    store.set(DURATIONS_KEY, "{{{").unwrap();
    let log = DurationLog::new(store);

    assert!(log.load_all().is_empty());
    log.append(record(9)).unwrap();
    assert_eq!(log.load_all(), vec![record(9)]);
}
