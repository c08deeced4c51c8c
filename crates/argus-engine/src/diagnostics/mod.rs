// Diagnostics module - structural health checks for loaded traces
// Reports problems instead of failing; the tree builder tolerates all of them

pub mod validator;

pub use validator::{IssueKind, TraceIssue, check_trace};
