//! GS1 Converter Core - Shared types for the conversion pipeline

mod error;
mod modes;
mod options;

pub use error::*;
pub use modes::*;
pub use options::*;
