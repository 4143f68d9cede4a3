use flate2::write::GzEncoder;
use flate2::Compression;
use linegroup::input::{InputError, LoaderConfig, RecordLoader};
use linegroup::progress::ProgressCallback;
use std::fs;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn gzip(data: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

#[derive(Default)]
struct PhaseLog {
    events: Mutex<Vec<(String, usize)>>,
}

impl ProgressCallback for PhaseLog {
    fn on_phase_start(&self, phase: &str, total: usize) {
        self.events
            .lock()
            .unwrap()
            .push((format!("start:{phase}"), total));
    }

    fn on_progress(&self, current: usize, _detail: &str) {
        self.events
            .lock()
            .unwrap()
            .push(("progress".to_string(), current));
    }

    fn on_phase_end(&self, phase: &str) {
        self.events
            .lock()
            .unwrap()
            .push((format!("end:{phase}"), 0));
    }
}

#[test]
fn test_multi_member_gzip_is_read_to_the_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lng.txt.gz");

    let mut data = gzip("\"1\";\"2\"\n\"1\";\"3\"\n");
    data.extend(gzip("\"4\";\"2\"\n"));
    fs::write(&path, data).unwrap();

    let loader = RecordLoader::with_defaults().unwrap();
    let (records, stats) = loader.load_path(&path).unwrap();

    assert_eq!(stats.lines_read, 3);
    assert_eq!(records.len(), 3);
    assert!(records.contains("\"4\";\"2\""));
}

#[test]
fn test_corrupt_gzip_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.gz");
    // Valid header, then a deflate block with the reserved type.
    let mut data = vec![0x1f, 0x8b, 0x08, 0x00, 0, 0, 0, 0, 0x00, 0xff];
    data.extend([0xff, 0xff, 0xff, 0xff]);
    fs::write(&path, data).unwrap();

    let loader = RecordLoader::with_defaults().unwrap();
    match loader.load_path(&path) {
        Err(InputError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("Expected Io error, got {:?}", other.map(|(_, s)| s)),
    }
}

#[test]
fn test_single_byte_file_is_plain_text() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("one.txt");
    fs::write(&path, "x").unwrap();

    let loader = RecordLoader::with_defaults().unwrap();
    let (records, stats) = loader.load_path(&path).unwrap();
    assert!(records.is_empty());
    assert_eq!(stats.invalid_lines, 1);
}

#[test]
fn test_reading_phase_reports_progress() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lines.txt");
    fs::write(&path, "\"1\"\n\"2\"\n\"3\"\n").unwrap();

    let log = Arc::new(PhaseLog::default());
    let config = LoaderConfig::default()
        .with_batch_size(2)
        .with_progress_callback(log.clone());
    let loader = RecordLoader::new(config).unwrap();
    loader.load_path(&path).unwrap();

    let events = log.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            ("start:reading".to_string(), 0),
            ("progress".to_string(), 2),
            ("progress".to_string(), 3),
            ("end:reading".to_string(), 0),
        ]
    );
}
