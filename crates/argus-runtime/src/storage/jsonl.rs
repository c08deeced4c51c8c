use argus_types::Event;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{EventStore, LoadError};
use crate::Result;

/// JSON Lines file store: one field-named record per event, in emission
/// order.
#[derive(Debug, Clone)]
pub struct JsonlEventStore {
    path: PathBuf,
}

impl JsonlEventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventStore for JsonlEventStore {
    fn save(&self, events: &[Event]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        for event in events {
            serde_json::to_writer(&mut writer, event)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        tracing::debug!(path = %self.path.display(), events = events.len(), "saved trace");
        Ok(())
    }

    fn load(&self) -> std::result::Result<Vec<Event>, LoadError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(LoadError::NotFound(self.path.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        let mut events = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let event = serde_json::from_str(&line).map_err(|err| LoadError::Parse {
                line: index + 1,
                message: err.to_string(),
            })?;
            events.push(event);
        }

        tracing::debug!(path = %self.path.display(), events = events.len(), "loaded trace");
        Ok(events)
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_testing::fixtures;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlEventStore::new(temp_dir.path().join("missing.jsonl"));

        assert!(matches!(store.load(), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trace.jsonl");
        let events = fixtures::empty_output_scenario();
        fixtures::write_jsonl(&path, &events[..2]).unwrap();

        let mut content = fs::read_to_string(&path).unwrap();
        content.push_str("{\"id\": 3, \"status\": \"exploded\"}\n");
        fs::write(&path, content).unwrap();

        match JsonlEventStore::new(&path).load() {
            Err(LoadError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trace.jsonl");
        let events = fixtures::success_scenario();
        fixtures::write_jsonl(&path, &events).unwrap();

        let mut content = fs::read_to_string(&path).unwrap();
        content.push_str("\n\n");
        fs::write(&path, content).unwrap();

        assert_eq!(JsonlEventStore::new(&path).load().unwrap(), events);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlEventStore::new(temp_dir.path().join("nested/trace.jsonl"));

        store.save(&fixtures::success_scenario()).unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(matches!(store.load(), Err(LoadError::NotFound(_))));
    }
}
