//! # GS1 Conversion
//!
//! This crate translates GS1 scripts into event-callback target code.
//!
//! ## Pipeline
//! - Lexer and parser produce a GS1 syntax tree with line diagnostics
//! - The generator translates statements and expressions using the
//!   language tables
//! - The synthesizer routes each top-level statement to an event callback,
//!   the dispatcher, the prologue, or global code
//! - Entry points assemble the result, optionally split into server and
//!   client sections with the original source embedded
//!
//! ## Modes
//!
//! Tile coordinates are level-local or global, and "all players" is the
//! level's list or the server's; see [`gs1conv_core::ConvertOptions`].

pub mod codegen;
pub mod convert;
pub mod error;
pub mod gs1;
pub mod sink;
pub mod synth;
pub mod tables;

pub use convert::{convert_with_split, recover_original, Converter};
pub use error::{Diagnostic, Result, ScriptError};
pub use gs1::{parse, Parsed, Script};
pub use sink::{Sink, SinkStack};
pub use synth::Synthesizer;
pub use tables::LanguageTables;
