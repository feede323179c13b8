//! # Character-Oriented Stack Virtual Machine
//!
//! This module implements the Sigil virtual machine: a fetch-decode-dispatch
//! loop over raw source bytes. There is no compiler and no instruction
//! decoding pass; every byte of the program is a literal, an opcode, or
//! padding.
//!
//! ## High-level model
//! - **Operand stack (`stack`)**: holds [`Value`]s consumed/produced by ops.
//! - **Subroutine table (`subroutines`)**: 26 slots, one per uppercase
//!   letter, each holding the entry address of a defined subroutine.
//! - **Call stack (`call_stack`)**: return addresses pushed by the call
//!   opcodes and popped by `}`.
//! - **Result buffer (`results`)**: integers appended by `r`, flushed to the
//!   host sink at termination in the narrowest width that fits.
//! - **Scratch register (`register`)**: a single integer exchanged by `t`.
//! - **Instruction pointer (`ip`)**: signed byte offset of the next fetch.
//!
//! ## Addressing
//! Most bytes advance the pointer by one after dispatch. A `{` records its
//! own offset and skips so the pointer rests on the matching `}`; the
//! post-dispatch advance then steps past it. Transfers into a subroutine
//! (`c`, `i`, and the symbol forms of `j`/`k`) set the pointer to the
//! recorded `{` address and likewise receive the advance, entering the body
//! one past the brace. A `}` pops the caller's address (the call opcode's
//! own offset) and the advance resumes execution one past the call site.
//! Only the relative (integer) jumps suppress the advance: the popped delta
//! is the exact next-fetch displacement.
//!
//! ## Termination
//! The machine stops on `h`, on `}` with an empty call stack, or when the
//! pointer leaves the code (either end); all of these are normal. Any
//! [`VmError`] terminates with a [`Fault`] carrying the pointer. Every
//! termination path still flushes the result buffer.

use std::io::{self, Write};

use crate::error::{Fault, VmError};
use crate::output::ResultBuffer;
use crate::value::Value;

mod ops_arith;
mod ops_control;
mod ops_stack;

/// Entry addresses for the 26 single-letter subroutines.
///
/// A slot is `None` until `f` defines it; redefinition overwrites silently.
#[derive(Debug, Default)]
pub(crate) struct SubroutineTable {
    entries: [Option<i64>; 26],
}

impl SubroutineTable {
    fn new() -> Self {
        SubroutineTable {
            entries: [None; 26],
        }
    }

    /// Record `addr` as the entry point for `name`. Symbols are constructed
    /// only from uppercase letters, so the index is always in range.
    pub(crate) fn define(&mut self, name: u8, addr: i64) {
        self.entries[usize::from(name - b'A')] = Some(addr);
    }

    /// Entry address for `name`, if it has been defined.
    pub(crate) fn lookup(&self, name: u8) -> Option<i64> {
        self.entries[usize::from(name - b'A')]
    }
}

/// Push a [`Value`], reporting exhaustion instead of aborting.
pub(crate) fn push(stack: &mut Vec<Value>, value: Value) -> Result<(), VmError> {
    stack.try_reserve(1).map_err(|_| VmError::Mem)?;
    stack.push(value);
    Ok(())
}

/// Pop a single [`Value`] from the operand stack.
///
/// Returns a state error on underflow. Typed pops layer on top of this.
pub(crate) fn pop(stack: &mut Vec<Value>) -> Result<Value, VmError> {
    stack
        .pop()
        .ok_or_else(|| VmError::State("operand stack underflow".to_string()))
}

/// Pop an integer, with a type error for any other kind.
pub(crate) fn pop_int(stack: &mut Vec<Value>) -> Result<i64, VmError> {
    pop(stack)?.as_int()
}

/// Pop a symbol, with a type error for any other kind.
pub(crate) fn pop_symbol(stack: &mut Vec<Value>) -> Result<u8, VmError> {
    pop(stack)?.as_symbol()
}

/// Pop an address, with a type error for any other kind.
pub(crate) fn pop_addr(stack: &mut Vec<Value>) -> Result<i64, VmError> {
    pop(stack)?.as_addr()
}

/// A Sigil virtual machine bound to one immutable program.
///
/// The machine owns all mutable execution state; the code buffer is borrowed
/// from the host and never modified.
pub struct Machine<'a> {
    code: &'a [u8],
    stack: Vec<Value>,
    subroutines: SubroutineTable,
    call_stack: Vec<i64>,
    results: ResultBuffer,
    register: i64,
    ip: i64,
}

impl<'a> Machine<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Machine {
            code,
            stack: Vec::new(),
            subroutines: SubroutineTable::new(),
            call_stack: Vec::new(),
            results: ResultBuffer::new(),
            register: 0,
            ip: 0,
        }
    }

    /// The integers recorded so far. Valid after any termination, normal or
    /// faulted; the flush reads these.
    pub fn results(&self) -> &ResultBuffer {
        &self.results
    }

    /// Execute the program to termination.
    ///
    /// Returns `Ok(())` on a clean halt (`h`, a top-level `}`, or the
    /// pointer running off the code) and `Err(Fault)` when an opcode raises
    /// an error. The caller is expected to flush [`Machine::results`] in
    /// either case.
    pub fn run(&mut self) -> Result<(), Fault> {
        // === Fetch-decode-dispatch loop ===
        loop {
            if self.ip < 0 {
                break;
            }
            let Some(&byte) = self.code.get(self.ip as usize) else {
                break;
            };

            // Most bytes advance the pointer by one after dispatch; the
            // relative jumps and the terminal transitions opt out.
            let mut advance = true;

            let step: Result<(), VmError> = match byte {
                // ----- Literals -----
                b'0'..=b'9' => push(&mut self.stack, Value::Int(i64::from(byte - b'0'))),
                b'A'..=b'Z' => push(&mut self.stack, Value::Symbol(byte)),

                // ----- Blocks, definition, and return -----
                b'{' => ops_control::handle_block_start(&mut self.stack, self.code, &mut self.ip),
                b'}' => {
                    ops_control::handle_return(
                        &mut self.call_stack,
                        self.code.len(),
                        &mut self.ip,
                        &mut advance,
                    );
                    Ok(())
                }
                b'f' => ops_control::handle_define(&mut self.stack, &mut self.subroutines),

                // ----- Arithmetic -----
                b'a' => ops_arith::handle_add(&mut self.stack),
                b's' => ops_arith::handle_sub(&mut self.stack),
                b'm' => ops_arith::handle_mul(&mut self.stack),
                b'd' => ops_arith::handle_div(&mut self.stack),

                // ----- Transfers -----
                b'j' => ops_control::handle_jump(
                    &mut self.stack,
                    &self.subroutines,
                    &mut self.ip,
                    &mut advance,
                ),
                b'c' => ops_control::handle_call(
                    &mut self.stack,
                    &self.subroutines,
                    &mut self.call_stack,
                    &mut self.ip,
                ),
                b'i' => ops_control::handle_branch_call(
                    &mut self.stack,
                    &self.subroutines,
                    &mut self.call_stack,
                    &mut self.ip,
                ),
                b'k' => ops_control::handle_branch_jump(
                    &mut self.stack,
                    &self.subroutines,
                    &mut self.ip,
                    &mut advance,
                ),

                // ----- Output -----
                b'r' => ops_stack::handle_record(&self.stack, &mut self.results),

                // ----- Stack manipulation -----
                b'q' => {
                    ops_stack::handle_discard(&mut self.stack);
                    Ok(())
                }
                b'w' => ops_stack::handle_duplicate(&mut self.stack),
                b'e' => ops_stack::handle_exchange(&mut self.stack),
                b'z' => ops_stack::handle_depth(&mut self.stack),
                b'x' => ops_stack::handle_pick(&mut self.stack),
                b'y' => ops_stack::handle_place(&mut self.stack),
                b't' => ops_stack::handle_register_exchange(&mut self.stack, &mut self.register),

                // ----- Halt -----
                b'h' => {
                    ops_control::handle_halt(self.code.len(), &mut self.ip, &mut advance);
                    Ok(())
                }

                // Padding: whitespace, prose, anything unassigned.
                _ => Ok(()),
            };

            if let Err(kind) = step {
                return Err(Fault { kind, ip: self.ip });
            }

            if advance {
                self.ip += 1;
            }
        }
        Ok(())
    }
}

/// Run a program and flush its output to `sink`.
///
/// The flush is unconditional: it happens after error termination too, so a
/// program that recorded values before faulting still produces them. The
/// outer `Result` carries sink I/O failures; the inner one is the VM's
/// terminal status.
pub fn interpret<W: Write>(code: &[u8], sink: &mut W) -> io::Result<Result<(), Fault>> {
    let mut machine = Machine::new(code);
    let status = machine.run();
    machine.results().write_to(sink)?;
    Ok(status)
}

#[cfg(test)]
mod tests;
