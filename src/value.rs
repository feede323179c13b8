//! # Value Representation for the Sigil VM
//!
//! This module defines [`Value`], the tagged runtime type that lives on the
//! Sigil virtual machine's operand stack.
//!
//! ## Supported kinds
//! - `Int(i64)` – 64-bit signed integer, pushed by the digit literals `0`-`9`
//!   and produced by the arithmetic opcodes
//! - `Symbol(u8)` – one of the uppercase letters `A`-`Z`, naming a subroutine
//! - `Addr(i64)` – an instruction-pointer offset recorded by `{`
//!
//! ## Design
//! - All three payloads are word-sized, so `Value` is `Copy`; duplicating or
//!   picking a stack slot is a plain copy with no ownership ceremony.
//! - The accessors are strict: an opcode that wants an integer and finds a
//!   symbol gets a type error, never a coercion. The error message names the
//!   kind that was actually found.

use std::fmt;

use crate::error::VmError;

/// Tagged value for the VM operand stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Value {
    /// 64-bit signed integer.
    Int(i64),
    /// Uppercase letter naming a subroutine, stored as its ASCII byte.
    Symbol(u8),
    /// Instruction-pointer offset into the code buffer.
    Addr(i64),
}

impl Value {
    /// Human-readable name of this value's kind, used in type errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Symbol(_) => "symbol",
            Value::Addr(_) => "address",
        }
    }

    /// Return the integer payload, or a type error naming the actual kind.
    pub fn as_int(&self) -> Result<i64, VmError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(VmError::Type(format!(
                "expected an integer, found {} {}",
                article(other.kind()),
                other.kind()
            ))),
        }
    }

    /// Return the symbol payload, or a type error naming the actual kind.
    pub fn as_symbol(&self) -> Result<u8, VmError> {
        match self {
            Value::Symbol(s) => Ok(*s),
            other => Err(VmError::Type(format!(
                "expected a symbol, found {} {}",
                article(other.kind()),
                other.kind()
            ))),
        }
    }

    /// Return the address payload, or a type error naming the actual kind.
    pub fn as_addr(&self) -> Result<i64, VmError> {
        match self {
            Value::Addr(a) => Ok(*a),
            other => Err(VmError::Type(format!(
                "expected an address, found {} {}",
                article(other.kind()),
                other.kind()
            ))),
        }
    }
}

fn article(kind: &str) -> &'static str {
    if kind == "integer" || kind == "address" {
        "an"
    } else {
        "a"
    }
}

impl fmt::Display for Value {
    /// Render a value for host display: integers as decimal, symbols as
    /// their letter, addresses with an `@` prefix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Symbol(s) => write!(f, "{}", char::from(*s)),
            Value::Addr(a) => write!(f, "@{}", a),
        }
    }
}
