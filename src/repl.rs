//! # Sigil REPL
//!
//! An interactive read-eval-print loop for the Sigil language. Users type
//! program fragments line by line, evaluate them immediately, and see any
//! newly recorded result values.
//!
//! ## Design
//! - Prompts with `>>>` for fresh input and `...` for continuations.
//! - Tracks **brace depth** so a `{…}` subroutine body can span multiple
//!   lines before execution. Sigil has no string syntax, so every `{` and
//!   `}` byte counts.
//! - Preserves **history**: each submission re-executes all previously
//!   accepted input followed by the new block on a fresh machine, so
//!   subroutine definitions and stack state carry forward.
//! - **Diffs output**: only result values the new block appended are shown,
//!   rendered as decimal integers one per line rather than as the packed
//!   byte stream a batch run emits.
//! - `exit` / `quit` leave the loop; `help` prints the opcode reference.
//!
//! ## Limitations
//! - Because each submission replays the whole history, a `h` that makes it
//!   into history halts every later replay at the same point; faulting
//!   blocks are therefore discarded instead of accumulated.

use std::io::{self, Write};

use crate::opcodes;
use crate::vm::Machine;

/// Run an interactive REPL for the Sigil language.
///
/// The loop:
/// 1. Prints a prompt.
/// 2. Reads a line of user input.
/// 3. If all braces opened so far are closed, executes history plus the
///    accumulated block.
/// 4. Prints newly recorded result values, or the fault diagnostic.
/// 5. Resets the input buffer for the next iteration.
///
/// Exits cleanly on EOF (Ctrl+D) or if the user types `exit`/`quit`.
pub fn repl_interpret() {
    println!("Sigil - REPL");
    println!("Type `help` for the opcode reference, `exit` or `quit` to leave.");

    // Source accepted so far; replayed before every new block.
    let mut history = String::new();
    // Result values already shown, so replays only print what is new.
    let mut printed = 0usize;
    // Buffer for building a multi-line block while braces are open.
    let mut buffer: Vec<String> = Vec::new();
    // Current open-brace depth across the buffered lines.
    let mut brace_depth: i32 = 0;

    loop {
        let prompt = if buffer.is_empty() { ">>> " } else { "... " };
        print!("{}", prompt);
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        // EOF (Ctrl+D) ends the session.
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(_) => break,
        }

        let trimmed = line.trim();
        if buffer.is_empty() {
            if trimmed == "exit" || trimmed == "quit" {
                break;
            }
            if trimmed == "help" {
                println!("{}", opcodes::reference());
                continue;
            }
        }

        for byte in line.bytes() {
            match byte {
                b'{' => brace_depth += 1,
                b'}' => brace_depth -= 1,
                _ => {}
            }
        }

        buffer.push(line);

        // An open block waits for more input before executing.
        if brace_depth > 0 {
            continue;
        }

        let block = buffer.join("");
        let source = format!("{}{}", history, block);

        let mut machine = Machine::new(source.as_bytes());
        let status = machine.run();

        match status {
            Ok(()) => {
                for value in machine.results().values().iter().skip(printed) {
                    println!("{}", value);
                }
                printed = machine.results().len();
                // Accepted input becomes part of the replayed history.
                history.push_str(&block);
            }
            Err(fault) => {
                // The block is discarded so one mistake does not poison
                // every later submission.
                eprintln!("{}", fault);
            }
        }

        buffer.clear();
        brace_depth = 0;
    }
}
