//! Append-only analytics log.
//!
//! One interaction record per line. Object payloads are flattened next to
//! `type` and `timestamp`; anything else lands under `data`.

use chorus_application::{AnalyticsEvent, AnalyticsSink};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Analytics sink backed by a `.jsonl` file shared across runs.
pub struct JsonlAnalyticsSink {
    path: PathBuf,
    file: Mutex<BufWriter<File>>,
}

impl JsonlAnalyticsSink {
    /// Open `path` for appending, creating it and its directory on first use.
    ///
    /// Analytics are best effort: on failure this warns and returns `None`.
    pub fn open(path: &Path) -> Option<Self> {
        match open_append(path) {
            Ok(file) => Some(Self {
                path: path.to_path_buf(),
                file: Mutex::new(BufWriter::new(file)),
            }),
            Err(e) => {
                warn!("Analytics disabled, cannot open {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn to_record(event: AnalyticsEvent) -> Value {
    let kind = Value::String(event.event_type.to_string());
    let at = Value::String(
        event
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    );

    let mut record = match event.payload {
        Value::Object(fields) => fields,
        other => {
            let mut wrapped = Map::new();
            wrapped.insert("data".to_string(), other);
            wrapped
        }
    };
    record.insert("type".to_string(), kind);
    record.insert("timestamp".to_string(), at);
    Value::Object(record)
}

impl AnalyticsSink for JsonlAnalyticsSink {
    fn emit(&self, event: AnalyticsEvent) {
        let line = match serde_json::to_string(&to_record(event)) {
            Ok(line) => line,
            Err(e) => {
                warn!("Unserializable analytics event: {}", e);
                return;
            }
        };
        if let Err(e) = self.append(&line) {
            warn!("Analytics event lost ({}): {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("analytics.jsonl");
        let sink = JsonlAnalyticsSink::open(&path).unwrap();

        sink.emit(AnalyticsEvent::new(
            "interaction",
            serde_json::json!({ "confidence": 0.82, "tokens": 120 }),
        ));
        sink.emit(AnalyticsEvent::new("interaction", serde_json::json!({ "tokens": 7 })));
        drop(sink);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "interaction");
        assert_eq!(lines[0]["confidence"], 0.82);
        assert!(lines[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(lines[1]["tokens"], 7);
    }

    #[test]
    fn test_appends_across_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.jsonl");

        for _ in 0..2 {
            let sink = JsonlAnalyticsSink::open(&path).unwrap();
            sink.emit(AnalyticsEvent::new("interaction", serde_json::json!({})));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_non_object_payload_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.jsonl");
        let sink = JsonlAnalyticsSink::open(&path).unwrap();

        sink.emit(AnalyticsEvent::new("note", serde_json::json!("just a string")));
        drop(sink);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "note");
        assert_eq!(lines[0]["data"], "just a string");
    }

    #[test]
    fn test_unwritable_location_disables_sink() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        assert!(JsonlAnalyticsSink::open(&blocker.join("analytics.jsonl")).is_none());
    }
}
