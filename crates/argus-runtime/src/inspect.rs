use argus_engine::Inspector;

use crate::storage::{EventStore, LoadError};

/// Load a stored trace and render it with default settings.
///
/// Load failures propagate; an unreadable store never renders as an empty
/// trace.
pub fn inspect_store(store: &dyn EventStore) -> Result<String, LoadError> {
    inspect_store_with(store, &Inspector::default())
}

pub fn inspect_store_with(store: &dyn EventStore, inspector: &Inspector) -> Result<String, LoadError> {
    let events = store.load()?;
    Ok(inspector.inspect(&events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonlEventStore;
    use argus_testing::fixtures;
    use tempfile::TempDir;

    #[test]
    fn test_inspect_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlEventStore::new(temp_dir.path().join("trace.jsonl"));
        store.save(&fixtures::empty_output_scenario()).unwrap();

        let text = inspect_store(&store).unwrap();
        assert!(text.contains("Root cause: #3 tool_call (success)"));
    }

    #[test]
    fn test_inspect_missing_store_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlEventStore::new(temp_dir.path().join("absent.jsonl"));

        assert!(matches!(inspect_store(&store), Err(LoadError::NotFound(_))));
    }
}
