//! Simulated research agent used by `argus demo`.
//!
//! Answers a question in four steps (generate queries, search, select
//! results, synthesize) and records every step through [`Tracer`]. The agent
//! is deliberately brittle: unless `guarded`, it never checks that search
//! returned anything before citing the first result.

use argus_runtime::{EventLogger, Tracer};
use argus_types::{EventId, EventStatus, EventType, NewEvent, Value, payload};
use std::fmt;

use crate::args::Scenario;

pub const MAX_RETRIES: u32 = 3;

const OBSCURE_MARKERS: [&str; 3] = ["xyz123", "obscure", "nonexistent"];

/// Behaviour of the mocked search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackend {
    /// Three results per query, none for obscure topics
    Online,
    /// Every call fails
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
}

#[derive(Debug)]
pub enum AgentError {
    SearchFailed { query: String, cause: String },
    NoResults,
    IndexOutOfRange,
    Logging(argus_runtime::Error),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::SearchFailed { query, cause } => write!(
                f,
                "search for '{}' failed after {} retries: {}",
                query, MAX_RETRIES, cause
            ),
            AgentError::NoResults => write!(
                f,
                "search returned no results; cannot answer without information sources"
            ),
            AgentError::IndexOutOfRange => write!(f, "list index out of range"),
            AgentError::Logging(err) => write!(f, "failed to record trace: {}", err),
        }
    }
}

impl std::error::Error for AgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AgentError::Logging(err) => Some(err),
            _ => None,
        }
    }
}

impl From<argus_runtime::Error> for AgentError {
    fn from(err: argus_runtime::Error) -> Self {
        AgentError::Logging(err)
    }
}

impl From<argus_types::ValidationError> for AgentError {
    fn from(err: argus_types::ValidationError) -> Self {
        AgentError::Logging(err.into())
    }
}

pub struct ResearchAgent<'l> {
    logger: &'l EventLogger,
    backend: SearchBackend,
    guarded: bool,
}

impl<'l> ResearchAgent<'l> {
    pub fn new(logger: &'l EventLogger, backend: SearchBackend) -> Self {
        Self {
            logger,
            backend,
            guarded: false,
        }
    }

    /// Validate search output before using it.
    pub fn guarded(mut self, guarded: bool) -> Self {
        self.guarded = guarded;
        self
    }

    /// Agent and question for a demo scenario.
    pub fn for_scenario(logger: &'l EventLogger, scenario: Scenario) -> (Self, &'static str) {
        const COMMON: &str = "What are best practices for Rust error handling?";
        const OBSCURE: &str = "What is known about xyz123?";

        match scenario {
            Scenario::Success => (Self::new(logger, SearchBackend::Online), COMMON),
            Scenario::EmptyResults => (Self::new(logger, SearchBackend::Online), OBSCURE),
            Scenario::RetryExhaustion => (Self::new(logger, SearchBackend::Unavailable), COMMON),
            Scenario::Guarded => (
                Self::new(logger, SearchBackend::Online).guarded(true),
                OBSCURE,
            ),
        }
    }

    /// Answer `question`, recording the whole run under one `decision` span.
    ///
    /// The run ends with a `termination` event whose status mirrors the
    /// returned result.
    pub fn answer(&self, question: &str) -> Result<String, AgentError> {
        let run = Tracer::new(self.logger, EventType::Decision)
            .input(payload([("question", question)]))
            .metadata(payload([("agent", "research"), ("step", "question_received")]))
            .start()?;

        match self.pipeline(question, run.id()) {
            Ok(answer) => {
                self.logger.log_event(
                    NewEvent::new(EventType::Termination, EventStatus::Success)
                        .parent(run.id())
                        .output(payload([("answer_length", answer.len())])),
                )?;
                run.succeed()?;
                Ok(answer)
            }
            Err(AgentError::Logging(err)) => Err(AgentError::Logging(err)),
            Err(err) => {
                self.logger.log_event(
                    NewEvent::new(EventType::Termination, EventStatus::Failure)
                        .parent(run.id())
                        .error(err.to_string()),
                )?;
                run.fail(err.to_string())?;
                Err(err)
            }
        }
    }

    fn pipeline(&self, question: &str, run: EventId) -> Result<String, AgentError> {
        let queries = self.generate_queries(question, run)?;
        let results = self.search_all(&queries, run)?;

        if self.guarded && results.is_empty() {
            self.logger.log_event(
                NewEvent::new(EventType::Failure, EventStatus::Failure)
                    .parent(run)
                    .input(payload([
                        ("search_results_count", Value::from(0)),
                        ("queries", Value::from(queries.clone())),
                    ]))
                    .metadata(payload([
                        ("intervention", "input_validation"),
                        ("step", "search_validation"),
                    ]))
                    .error("search returned no results; refusing to continue with empty data"),
            )?;
            return Err(AgentError::NoResults);
        }

        let selected = self.select(&results, run)?;
        self.synthesize(question, &selected, run)
    }

    fn generate_queries(&self, question: &str, run: EventId) -> Result<Vec<String>, AgentError> {
        Tracer::new(self.logger, EventType::LlmCall)
            .parent(run)
            .input(payload([("question", question)]))
            .metadata(payload([("step", "query_generation"), ("model", "mock-llm")]))
            .run(|scope| {
                let queries = mock_query_generation(question);
                scope.set_output(payload([("queries", queries.clone())]));
                Ok::<_, AgentError>(queries)
            })?
    }

    fn search_all(&self, queries: &[String], run: EventId) -> Result<Vec<SearchResult>, AgentError> {
        let mut all = Vec::new();
        for query in queries {
            all.extend(self.search_with_retry(query, run)?);
        }
        Ok(all)
    }

    fn search_with_retry(&self, query: &str, run: EventId) -> Result<Vec<SearchResult>, AgentError> {
        let mut retries = 0;

        loop {
            let attempt = Tracer::new(self.logger, EventType::ToolCall)
                .parent(run)
                .input(payload([("query", query)]))
                .metadata(payload([
                    ("tool", Value::from("search")),
                    ("retry_count", Value::from(retries)),
                ]))
                .run(|scope| {
                    let results = self.search(query)?;
                    scope.set_output(payload([("results_count", results.len())]));
                    Ok::<_, String>(results)
                })?;

            let cause = match attempt {
                Ok(results) => return Ok(results),
                Err(cause) => cause,
            };

            if retries >= MAX_RETRIES {
                let err = AgentError::SearchFailed {
                    query: query.to_string(),
                    cause,
                };
                self.logger.log_event(
                    NewEvent::new(EventType::Failure, EventStatus::Failure)
                        .parent(run)
                        .input(payload([("query", query)]))
                        .metadata(payload([("tool", "search")]))
                        .error(err.to_string()),
                )?;
                return Err(err);
            }

            retries += 1;
            self.logger.log_event(
                NewEvent::new(EventType::Retry, EventStatus::Retrying)
                    .parent(run)
                    .input(payload([
                        ("query", Value::from(query)),
                        ("last_error", Value::from(cause)),
                    ]))
                    .metadata(payload([
                        ("tool", Value::from("search")),
                        ("retry_count", Value::from(retries)),
                        ("max_retries", Value::from(MAX_RETRIES)),
                    ])),
            )?;
        }
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>, String> {
        if self.backend == SearchBackend::Unavailable {
            return Err("search service temporarily unavailable".to_string());
        }

        let lowered = query.to_lowercase();
        if OBSCURE_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Ok(Vec::new());
        }

        Ok((1..=3)
            .map(|i| SearchResult {
                title: format!("Result {} for: {}", i, query),
                snippet: format!("Relevant information about {}", query),
            })
            .collect())
    }

    fn select(&self, results: &[SearchResult], run: EventId) -> Result<Vec<SearchResult>, AgentError> {
        Tracer::new(self.logger, EventType::Decision)
            .parent(run)
            .input(payload([("total_results", results.len())]))
            .metadata(payload([("step", "result_selection")]))
            .run(|scope| {
                let selected: Vec<SearchResult> = results.iter().take(5).cloned().collect();
                scope.set_output(payload([
                    ("selected_count", Value::from(selected.len())),
                    ("selection_strategy", Value::from("first_n")),
                ]));
                Ok::<_, AgentError>(selected)
            })?
    }

    fn synthesize(
        &self,
        question: &str,
        results: &[SearchResult],
        run: EventId,
    ) -> Result<String, AgentError> {
        // Cites the first result without checking there is one.
        let primary = results.first().ok_or(AgentError::IndexOutOfRange)?;
        let context: Vec<&str> = results.iter().map(|r| r.snippet.as_str()).collect();

        Tracer::new(self.logger, EventType::LlmCall)
            .parent(run)
            .input(payload([("sources", results.len())]))
            .metadata(payload([("step", "answer_synthesis"), ("model", "mock-llm")]))
            .run(|scope| {
                let answer = format!(
                    "{} According to {} ({} sources): {}",
                    question,
                    primary.title,
                    results.len(),
                    context.join("; ")
                );
                scope.set_output(payload([("answer_length", answer.len())]));
                Ok::<_, AgentError>(answer)
            })?
    }
}

fn mock_query_generation(question: &str) -> Vec<String> {
    let lowered = question.to_lowercase();
    if lowered.contains("xyz123") {
        return vec![
            "xyz123 obscure topic".to_string(),
            "nonexistent information query".to_string(),
        ];
    }

    let subject = question.trim().trim_end_matches('?');
    vec![format!("{} overview", subject), format!("{} examples", subject)]
}
