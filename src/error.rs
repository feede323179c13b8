//! # Error Handling for the Sigil VM
//!
//! This module defines the error kinds the virtual machine can raise and the
//! [`Fault`] wrapper that couples an error with the instruction pointer at
//! which it occurred.
//!
//! ## Design
//! - [`VmError`] is a compact enumeration of the *categories* of runtime
//!   failure. Kinds that carry useful context (a message, the offending
//!   letter) embed it; kinds that cannot (allocation failure) do not.
//! - [`Fault`] is what `vm::run` returns on error termination. The host
//!   renders it; the VM contract only guarantees the kind and the pointer.
//!
//! ## Display
//! - Implements [`fmt::Display`] for both types, producing the diagnostic
//!   lines the command-line host prints to stderr.
//! - Implements [`std::error::Error`] so both integrate with Rust's standard
//!   error handling ecosystem.
//!
//! Normal termination is not an error: halting, falling off the end of the
//! code, and a return with an empty call stack all surface as `Ok(())` from
//! the interpreter loop.

use std::fmt;

/// Errors that terminate Sigil program execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VmError {
    /// Operand underflow, an out-of-range stack index, or division by zero.
    State(String),
    /// An operand's runtime kind did not match the opcode's expectation.
    Type(String),
    /// A call or jump targeted a letter with no defined subroutine.
    Subroutine(u8),
    /// A container could not reserve space for growth.
    Mem,
    /// The operand stack's length counter wrapped. Kept for parity with the
    /// status set; a `Vec`-backed stack cannot produce it.
    Overflow,
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::State(msg) => write!(f, "bad state: {}", msg),
            VmError::Type(msg) => write!(f, "type error: {}", msg),
            VmError::Subroutine(name) => {
                write!(f, "call to undefined subroutine '{}'", char::from(*name))
            }
            VmError::Mem => write!(f, "out of memory"),
            VmError::Overflow => write!(f, "operand stack overflow"),
        }
    }
}

impl std::error::Error for VmError {}

/// An error termination: the kind of failure plus the instruction pointer
/// that was current when it was raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    pub kind: VmError,
    pub ip: i64,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "halted: {} (at ip = {})", self.kind, self.ip)
    }
}

impl std::error::Error for Fault {}
