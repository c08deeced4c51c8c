//! Assertions for invariants every logger-produced trace must hold.

use anyhow::Result;
use argus_types::Event;
use std::collections::HashSet;

/// Assert that no two events share an id.
pub fn assert_unique_ids(events: &[Event]) -> Result<()> {
    let mut seen = HashSet::with_capacity(events.len());
    for (i, event) in events.iter().enumerate() {
        if !seen.insert(event.id) {
            anyhow::bail!("Event at position {} reuses id {}", i + 1, event.id);
        }
    }
    Ok(())
}

/// Assert that timestamps never go backwards in emission order.
pub fn assert_monotonic_timestamps(events: &[Event]) -> Result<()> {
    for (i, pair) in events.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            anyhow::bail!(
                "Event at position {} ({}) is earlier than its predecessor ({})",
                i + 2,
                pair[1].timestamp.to_rfc3339(),
                pair[0].timestamp.to_rfc3339()
            );
        }
    }
    Ok(())
}

/// Assert that every parent_id names an earlier event.
pub fn assert_parents_precede(events: &[Event]) -> Result<()> {
    let mut seen = HashSet::with_capacity(events.len());
    for event in events {
        if let Some(parent) = event.parent_id
            && !seen.contains(&parent)
        {
            anyhow::bail!("Event {} has parent {} which was not logged before it", event.id, parent);
        }
        seen.insert(event.id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_fixtures_hold_invariants() {
        let events = fixtures::retry_exhaustion_scenario();
        assert!(assert_unique_ids(&events).is_ok());
        assert!(assert_monotonic_timestamps(&events).is_ok());
        assert!(assert_parents_precede(&events).is_ok());
    }

    #[test]
    fn test_detects_duplicate_id() {
        let mut events = fixtures::empty_output_scenario();
        events[3].id = events[1].id;
        assert!(assert_unique_ids(&events).is_err());
    }

    #[test]
    fn test_detects_timestamp_regression() {
        let mut events = fixtures::empty_output_scenario();
        events.swap(1, 2);
        assert!(assert_monotonic_timestamps(&events).is_err());
    }
}
