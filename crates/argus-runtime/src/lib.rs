pub mod config;
pub mod error;
pub mod inspect;
pub mod logger;
pub mod storage;
pub mod tracer;

pub use config::{Config, resolve_data_path};
pub use error::{Error, Result};
pub use inspect::{inspect_store, inspect_store_with};
pub use logger::EventLogger;
pub use storage::{EventStore, JsonlEventStore, LoadError};
pub use tracer::{TraceScope, Tracer};
