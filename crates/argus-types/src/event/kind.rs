use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of occurrence recorded by an event.
///
/// The snake_case names are stable wire values; new kinds may be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A language-model API call
    LlmCall,
    /// A tool or function invocation
    ToolCall,
    /// A decision point in the agent's reasoning
    Decision,
    /// A retry attempt
    Retry,
    /// Something failed inside the run
    Failure,
    /// The run ended (successfully or not)
    Termination,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::LlmCall,
        EventType::ToolCall,
        EventType::Decision,
        EventType::Retry,
        EventType::Failure,
        EventType::Termination,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::LlmCall => "llm_call",
            EventType::ToolCall => "tool_call",
            EventType::Decision => "decision",
            EventType::Retry => "retry",
            EventType::Failure => "failure",
            EventType::Termination => "termination",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an event.
///
/// `Started` opens a span; the other statuses close one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Started,
    Success,
    Failure,
    Retrying,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Started => "started",
            EventStatus::Success => "success",
            EventStatus::Failure => "failure",
            EventStatus::Retrying => "retrying",
        }
    }

    /// True for statuses that close an open span.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventStatus::Started)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
