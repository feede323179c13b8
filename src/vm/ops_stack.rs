//! # Stack-Manipulation Operations for the Sigil VM
//!
//! Handlers for the opcode family that rearranges the operand stack or moves
//! values between the stack and the other storage locations:
//! - **Shuffling**: `q` (discard), `w` (duplicate), `e` (swap)
//! - **Indexed access**: `z` (depth), `x` (pick a slot), `y` (overwrite a
//!   slot)
//! - **Register**: `t` (exchange with the scratch register)
//! - **Output**: `r` (record the top integer)
//!
//! Indexing is from the bottom: slot 0 is the oldest value. `x` and `y`
//! reject indices outside `[0, len)` against the stack as it stands after
//! their operand pops.
//!
//! `q` and `w` on an empty stack are silent no-ops; the other handlers
//! report underflow as a state error.

use super::{pop, pop_int, push};
use crate::error::VmError;
use crate::output::ResultBuffer;
use crate::value::Value;

/// Handle `r`: append the top of the stack to the result buffer.
///
/// Peeks rather than pops, so the value stays available; requires an
/// integer.
pub(super) fn handle_record(
    stack: &[Value],
    results: &mut ResultBuffer,
) -> Result<(), VmError> {
    let top = stack
        .last()
        .ok_or_else(|| VmError::State("operand stack underflow".to_string()))?;
    results.append(top.as_int()?)
}

/// Handle `q`: discard the top of the stack if present.
pub(super) fn handle_discard(stack: &mut Vec<Value>) {
    stack.pop();
}

/// Handle `w`: duplicate the top of the stack if present.
pub(super) fn handle_duplicate(stack: &mut Vec<Value>) -> Result<(), VmError> {
    if let Some(&top) = stack.last() {
        push(stack, top)?;
    }
    Ok(())
}

/// Handle `e`: swap the top two stack entries.
pub(super) fn handle_exchange(stack: &mut Vec<Value>) -> Result<(), VmError> {
    let a = pop(stack)?;
    let b = pop(stack)?;
    push(stack, a)?;
    push(stack, b)
}

/// Handle `z`: push the stack depth as it was before this push.
pub(super) fn handle_depth(stack: &mut Vec<Value>) -> Result<(), VmError> {
    let depth = stack.len() as i64;
    push(stack, Value::Int(depth))
}

/// Resolve a popped index against the current stack, rejecting negatives
/// and anything at or past the top.
fn slot(index: i64, len: usize) -> Result<usize, VmError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| VmError::State(format!("stack index {} out of range", index)))
}

/// Handle `x`: pop an index, push a copy of that slot.
pub(super) fn handle_pick(stack: &mut Vec<Value>) -> Result<(), VmError> {
    let index = pop_int(stack)?;
    let value = stack[slot(index, stack.len())?];
    push(stack, value)
}

/// Handle `y`: pop a value and an index, overwrite that slot.
pub(super) fn handle_place(stack: &mut Vec<Value>) -> Result<(), VmError> {
    let value = pop(stack)?;
    let index = pop_int(stack)?;
    let i = slot(index, stack.len())?;
    stack[i] = value;
    Ok(())
}

/// Handle `t`: pop an integer and swap it with the scratch register,
/// pushing the register's previous value.
pub(super) fn handle_register_exchange(
    stack: &mut Vec<Value>,
    register: &mut i64,
) -> Result<(), VmError> {
    let value = pop_int(stack)?;
    let previous = std::mem::replace(register, value);
    push(stack, Value::Int(previous))
}
