pub mod error;
pub mod event;
mod util;

pub use error::ValidationError;
pub use event::*;
