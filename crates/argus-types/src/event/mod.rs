pub mod event;
pub mod kind;
pub mod value;

pub use event::*;
pub use kind::*;
pub use value::*;
