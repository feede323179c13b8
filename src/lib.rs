//! The Sigil language runtime: a virtual machine for a compact,
//! character-oriented stack language, plus the REPL and output encoder
//! around it.
//!
//! Programs are raw bytes. Digits and uppercase letters are literals, twenty
//! bytes are opcodes, and everything else is padding. [`vm::interpret`] runs
//! a program and flushes its recorded output to a sink at the narrowest
//! integer width that fits.

pub mod error;
pub mod opcodes;
pub mod output;
pub mod repl;
pub mod value;
pub mod vm;

pub use error::{Fault, VmError};
pub use value::Value;
pub use vm::{interpret, Machine};
