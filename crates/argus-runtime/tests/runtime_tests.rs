use argus_engine::{ExecutionTree, RuleKind, analysis::analyze};
use argus_runtime::{EventLogger, EventStore, JsonlEventStore, Tracer, inspect_store};
use argus_testing::{assertions, fixtures};
use argus_types::{EventStatus, EventType, NewEvent, Payload, Value, payload};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_store_round_trip_preserves_absent_fields() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonlEventStore::new(temp_dir.path().join("trace.jsonl"));

    let logger = EventLogger::new();
    let root = logger
        .log_event(NewEvent::new(EventType::Decision, EventStatus::Started))
        .unwrap();
    logger
        .log_event(
            NewEvent::new(EventType::ToolCall, EventStatus::Success)
                .parent(root.id)
                .duration(Duration::from_nanos(1_234_567))
                .input(Payload::new())
                .output(payload([
                    ("results_count", Value::from(0)),
                    ("score", Value::from(0.5)),
                    ("tags", Value::from(vec!["a", "b"])),
                    ("none", Value::Null),
                ])),
        )
        .unwrap();
    logger
        .log_event(
            NewEvent::new(EventType::Termination, EventStatus::Failure)
                .parent(root.id)
                .error("list index out of range"),
        )
        .unwrap();

    let events = logger.get_events();
    store.save(&events).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded, events);
    assert_eq!(loaded[0].input_summary, None);
    assert_eq!(loaded[0].error, None);
    assert_eq!(loaded[1].input_summary, Some(Payload::new()));
    assert_eq!(loaded[1].duration, Some(Duration::from_nanos(1_234_567)));
}

#[test]
fn test_fixtures_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonlEventStore::new(temp_dir.path().join("trace.jsonl"));

    for events in [
        fixtures::empty_output_scenario(),
        fixtures::retry_exhaustion_scenario(),
        fixtures::success_scenario(),
    ] {
        store.save(&events).unwrap();
        assert_eq!(store.load().unwrap(), events);
    }
}

#[test]
fn test_traced_agent_end_to_end() {
    let logger = EventLogger::new();
    let run = Tracer::new(&logger, EventType::Decision)
        .metadata(payload([("step", "run_agent")]))
        .start()
        .unwrap();

    let search = Tracer::new(&logger, EventType::ToolCall)
        .parent(run.id())
        .input(payload([("query", "xyz123")]))
        .run(|scope| {
            scope.set_output(payload([("results_count", 0)]));
            Ok::<_, String>(Vec::<String>::new())
        })
        .unwrap();
    assert_eq!(search, Ok(Vec::new()));

    let synth = Tracer::new(&logger, EventType::LlmCall)
        .parent(run.id())
        .run(|_| {
            let results: Vec<String> = Vec::new();
            results
                .first()
                .cloned()
                .ok_or_else(|| "list index out of range".to_string())
        })
        .unwrap();
    assert!(synth.is_err());

    logger
        .log_event(
            NewEvent::new(EventType::Termination, EventStatus::Failure)
                .parent(run.id())
                .error("list index out of range"),
        )
        .unwrap();
    run.fail("agent failed").unwrap();

    let events = logger.get_events();
    assertions::assert_unique_ids(&events).unwrap();
    assertions::assert_monotonic_timestamps(&events).unwrap();
    assertions::assert_parents_precede(&events).unwrap();

    let tree = ExecutionTree::build(&events);
    let analysis = analyze(&tree);
    assert_eq!(analysis.rule, Some(RuleKind::EmptyOutputPropagation));

    let root_cause = analysis.root_cause.unwrap();
    assert_eq!(root_cause.event_type, EventType::ToolCall);
    assert_eq!(root_cause.status, EventStatus::Success);

    let temp_dir = TempDir::new().unwrap();
    let store = JsonlEventStore::new(temp_dir.path().join("run.jsonl"));
    store.save(&events).unwrap();
    let text = inspect_store(&store).unwrap();
    assert!(text.contains("[rule: empty_output_propagation]"));
    assert!(text.contains("agent assumed non-empty output from tool_call"));
}

#[test]
fn test_traced_retries_reset_by_successful_attempt() {
    let logger = EventLogger::new();
    let run = Tracer::new(&logger, EventType::Decision).start().unwrap();

    let attempt = |succeed: bool| {
        Tracer::new(&logger, EventType::ToolCall)
            .parent(run.id())
            .input(payload([("query", "agent observability tools")]))
            .run(|scope| {
                if succeed {
                    scope.set_output(payload([("results_count", 3)]));
                    Ok(vec!["a", "b", "c"])
                } else {
                    Err("search backend timed out".to_string())
                }
            })
            .unwrap()
    };
    let retry = |n: i64| {
        logger
            .log_event(
                NewEvent::new(EventType::Retry, EventStatus::Retrying)
                    .parent(run.id())
                    .metadata(payload([
                        ("retry_count", Value::from(n)),
                        ("max_retries", Value::from(3)),
                    ])),
            )
            .unwrap()
    };

    assert!(attempt(false).is_err());
    for n in 1..=3 {
        retry(n);
        assert_eq!(attempt(n == 3).is_ok(), n == 3);
    }

    let synth = Tracer::new(&logger, EventType::LlmCall)
        .parent(run.id())
        .run(|_| Err::<String, _>("LLM unavailable"))
        .unwrap();
    assert!(synth.is_err());

    logger
        .log_event(
            NewEvent::new(EventType::Termination, EventStatus::Failure)
                .parent(run.id())
                .error("LLM unavailable"),
        )
        .unwrap();
    run.fail("agent failed").unwrap();

    let events = logger.get_events();
    let tree = ExecutionTree::build(&events);
    let analysis = analyze(&tree);

    assert_ne!(analysis.rule, Some(RuleKind::RetryExhaustion));
    assert_eq!(analysis.rule, Some(RuleKind::UnclassifiedFailure));
    assert_eq!(analysis.explanation.as_deref(), Some("LLM unavailable"));
}
