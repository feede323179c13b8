//! # Sigil Instruction Set Reference
//!
//! Sigil has no binary bytecode format: the VM executes raw source bytes,
//! so the instruction set is fully described by which bytes mean what.
//!
//! - `0`-`9` push the digit's value as an integer
//! - `A`-`Z` push the letter as a symbol
//! - the twenty bytes in [`OPCODES`] dispatch as operations
//! - every other byte is padding and is ignored, so whitespace and prose
//!   comments can be interleaved with code freely
//!
//! This module is the single place that enumerates the opcode set. The
//! formatted listing in [`reference`] backs both `sigil --help` and the
//! REPL's `help` command.

use once_cell::sync::Lazy;

/// The complete opcode set: each operation byte with a one-line summary.
pub const OPCODES: &[(u8, &str)] = &[
    (b'{', "push this block's address, then skip past its matching '}'"),
    (b'}', "return to the address popped from the call stack"),
    (b'f', "pop a name and an address, define that subroutine"),
    (b'a', "pop two integers, push their sum"),
    (b's', "pop two integers, push their difference"),
    (b'm', "pop two integers, push their product"),
    (b'd', "pop two integers, push their quotient"),
    (b'j', "pop a value, jump: integers are relative, symbols by name"),
    (b'c', "pop a name, call that subroutine"),
    (b'i', "pop two names and a condition, call one of them"),
    (b'k', "pop two targets and a condition, jump to one of them"),
    (b'r', "append the top integer to the program output"),
    (b'q', "discard the top of the stack"),
    (b'w', "duplicate the top of the stack"),
    (b'e', "swap the top two stack entries"),
    (b'z', "push the current stack depth"),
    (b'x', "pop an index, push a copy of that stack slot"),
    (b'y', "pop a value and an index, overwrite that stack slot"),
    (b't', "pop an integer, swap it with the scratch register"),
    (b'h', "halt"),
];

/// Formatted opcode listing, built once on first use.
static REFERENCE: Lazy<String> = Lazy::new(|| {
    let mut text = String::from(
        "Literals:\n    0-9         push the digit as an integer\n    A-Z         push the letter as a symbol\n\nOpcodes:\n",
    );
    for (op, summary) in OPCODES {
        text.push_str(&format!("    {}           {}\n", char::from(*op), summary));
    }
    text.push_str("\nAll other bytes are ignored and may be used as padding or comments.");
    text
});

/// The opcode reference text shown by `--help` and the REPL `help` command.
pub fn reference() -> &'static str {
    &REFERENCE
}

/// Whether `byte` dispatches as an operation (as opposed to a literal or
/// padding).
pub fn is_opcode(byte: u8) -> bool {
    OPCODES.iter().any(|(op, _)| *op == byte)
}
