//! # Control-Flow Operations for the Sigil VM
//!
//! Handlers for everything that moves the instruction pointer or touches the
//! call stack and subroutine table:
//! - **Blocks** (`{`) and the nested skip over their bodies
//! - **Definition** (`f`)
//! - **Return** (`}`)
//! - **Jumps** (`j`, `k`) and **calls** (`c`, `i`)
//! - **Halt** (`h`)
//!
//! ## Execution model
//! Handlers mutate the pointer directly; the main loop's post-dispatch
//! advance then applies unless a handler clears the `advance` flag. Setting
//! the pointer to a subroutine's recorded `{` address and keeping the
//! advance is what enters the body one past the brace; a relative jump
//! clears the flag because its delta is the exact next-fetch displacement.
//!
//! Termination is expressed by parking the pointer at the end of the code,
//! which the main loop's fetch treats as a normal halt.

use super::{pop, pop_addr, pop_int, pop_symbol, push, SubroutineTable};
use crate::error::VmError;
use crate::value::Value;

/// Advance `ip` so it rests on the `}` matching the `{` it points at.
///
/// Each nested `{` raises the depth, each `}` lowers it. Running off the end
/// of the code parks the pointer there, which terminates the program
/// normally on the next fetch.
fn skip_block(code: &[u8], ip: &mut i64) {
    let mut depth = 1u32;
    while depth > 0 {
        *ip += 1;
        let Some(&byte) = code.get(*ip as usize) else {
            *ip = code.len() as i64;
            return;
        };
        match byte {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ => {}
        }
    }
}

/// Handle `{`: record this block's address, then skip its body.
///
/// The pushed address is the offset of the `{` byte itself, not one past it;
/// `f` stores exactly this value, and the call opcodes rely on it.
pub(super) fn handle_block_start(
    stack: &mut Vec<Value>,
    code: &[u8],
    ip: &mut i64,
) -> Result<(), VmError> {
    push(stack, Value::Addr(*ip))?;
    skip_block(code, ip);
    Ok(())
}

/// Handle `}`: pop a return address into the pointer.
///
/// The stored address is the call opcode's own offset, so the post-dispatch
/// advance resumes execution one past the call site. An empty call stack is
/// the normal top-level termination path, not an error.
pub(super) fn handle_return(
    call_stack: &mut Vec<i64>,
    code_len: usize,
    ip: &mut i64,
    advance: &mut bool,
) {
    match call_stack.pop() {
        Some(ret) => *ip = ret,
        None => {
            *ip = code_len as i64;
            *advance = false;
        }
    }
}

/// Handle `f`: pop a symbol and an address, define that subroutine.
///
/// Redefinition overwrites silently.
pub(super) fn handle_define(
    stack: &mut Vec<Value>,
    subroutines: &mut SubroutineTable,
) -> Result<(), VmError> {
    let name = pop_symbol(stack)?;
    let addr = pop_addr(stack)?;
    subroutines.define(name, addr);
    Ok(())
}

/// Resolve `name` in the subroutine table and transfer to its entry.
fn jump_subroutine(
    subroutines: &SubroutineTable,
    name: u8,
    ip: &mut i64,
) -> Result<(), VmError> {
    let target = subroutines
        .lookup(name)
        .ok_or(VmError::Subroutine(name))?;
    *ip = target;
    Ok(())
}

/// Handle `j`: pop one value and jump.
///
/// An integer is a relative displacement applied to this opcode's offset,
/// with the post-dispatch advance suppressed. A symbol transfers to that
/// subroutine's entry without touching the call stack.
pub(super) fn handle_jump(
    stack: &mut Vec<Value>,
    subroutines: &SubroutineTable,
    ip: &mut i64,
    advance: &mut bool,
) -> Result<(), VmError> {
    match pop(stack)? {
        Value::Int(delta) => {
            *ip = ip.wrapping_add(delta);
            *advance = false;
            Ok(())
        }
        Value::Symbol(name) => jump_subroutine(subroutines, name, ip),
        other => Err(VmError::Type(format!(
            "jump target must be an integer or a symbol, found an {}",
            other.kind()
        ))),
    }
}

/// Handle `c`: pop a symbol and call that subroutine.
///
/// The current pointer (the offset of the `c` itself) is pushed as the
/// return address; `}` pops it and resumes one past here.
pub(super) fn handle_call(
    stack: &mut Vec<Value>,
    subroutines: &SubroutineTable,
    call_stack: &mut Vec<i64>,
    ip: &mut i64,
) -> Result<(), VmError> {
    let name = pop_symbol(stack)?;
    call_stack.try_reserve(1).map_err(|_| VmError::Mem)?;
    call_stack.push(*ip);
    jump_subroutine(subroutines, name, ip)
}

/// Handle `i`: pop symbols for both branches and an integer condition, then
/// call the selected branch exactly as `c` would.
pub(super) fn handle_branch_call(
    stack: &mut Vec<Value>,
    subroutines: &SubroutineTable,
    call_stack: &mut Vec<i64>,
    ip: &mut i64,
) -> Result<(), VmError> {
    let on_zero = pop_symbol(stack)?;
    let on_nonzero = pop_symbol(stack)?;
    let condition = pop_int(stack)?;
    let name = if condition != 0 { on_nonzero } else { on_zero };
    call_stack.try_reserve(1).map_err(|_| VmError::Mem)?;
    call_stack.push(*ip);
    jump_subroutine(subroutines, name, ip)
}

/// Handle `k`: pop two targets of any kind and an integer condition, then
/// jump to the selected target with `j`'s rules and no call-stack push.
pub(super) fn handle_branch_jump(
    stack: &mut Vec<Value>,
    subroutines: &SubroutineTable,
    ip: &mut i64,
    advance: &mut bool,
) -> Result<(), VmError> {
    let on_zero = pop(stack)?;
    let on_nonzero = pop(stack)?;
    let condition = pop_int(stack)?;
    let branch = if condition != 0 { on_nonzero } else { on_zero };
    match branch {
        Value::Int(delta) => {
            *ip = ip.wrapping_add(delta);
            *advance = false;
            Ok(())
        }
        Value::Symbol(name) => jump_subroutine(subroutines, name, ip),
        other => Err(VmError::Type(format!(
            "branch target must be an integer or a symbol, found an {}",
            other.kind()
        ))),
    }
}

/// Handle `h`: park the pointer at the end of the code to stop execution.
pub(super) fn handle_halt(code_len: usize, ip: &mut i64, advance: &mut bool) {
    *ip = code_len as i64;
    *advance = false;
}
