//! Sigil runtime entry point.
//!
//! Behavior summary:
//! - With **no args**, start an interactive REPL.
//! - With `-h/--help`, print usage and the opcode reference.
//! - With `-v/--version`, print a build-target + version line.
//! - With `-`, read the program from stdin until EOF and execute it.
//! - With a **path**, read the program bytes from disk and execute them.
//!
//! The packed result stream goes to stdout; diagnostics go to stderr. Exit
//! codes: 0 on success, 1 on a runtime fault, 2 when the input file cannot
//! be opened, 4 when it cannot be read.

use std::env;
use std::fs::File;
use std::io::{self, Read, Write};
use std::process;

use sigil_runtime::repl::repl_interpret;
use sigil_runtime::{opcodes, vm};

/// Human-facing runtime version string, printed by `--version` and included
/// in the help text.
const VERSION: &str = "0.1.0";

/// Construct the help/usage text shown for `-h/--help`.
fn usage() -> String {
    format!(
        r#"Sigil Runtime v{0}

Usage:
    sigil <program>
    sigil -

Arguments:
    <program>
        Path to a Sigil program. Every byte is interpreted: digits and
        uppercase letters are literals, opcodes execute, anything else
        is ignored.
    -
        Read the program from standard input until EOF.

With no arguments an interactive REPL is started.

{1}

Options:
    -h, --help
        Show this help message and exit.
    -v, --version
        Show runtime version."#,
        VERSION,
        opcodes::reference()
    )
}

/// Read the program bytes from the selected source.
///
/// `-` streams stdin to EOF; anything else is opened as a file. Failure to
/// open exits 2, failure to read exits 4.
fn load_program(arg: &str) -> Vec<u8> {
    let mut source = Vec::new();
    if arg == "-" {
        if let Err(e) = io::stdin().read_to_end(&mut source) {
            eprintln!("error: could not read input: {}", e);
            process::exit(4);
        }
    } else {
        let mut file = match File::open(arg) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("error: could not open input file: {}", e);
                process::exit(2);
            }
        };
        if let Err(e) = file.read_to_end(&mut source) {
            eprintln!("error: could not read input file: {}", e);
            process::exit(4);
        }
    }
    source
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // No arguments starts the interactive REPL.
    if args.len() == 1 {
        repl_interpret();
        return;
    }

    if args[1] == "-h" || args[1] == "--help" {
        println!("{}", usage());
        return;
    }

    if args[1] == "-v" || args[1] == "--version" {
        println!(
            "sigil-runtime-build-{}-{}: v{}",
            env::consts::OS,
            env::consts::ARCH,
            VERSION
        );
        return;
    }

    let source = load_program(&args[1]);

    // Run the program. The result stream goes to stdout whatever the
    // terminal status, so drain the buffered lock before acting on a fault.
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let status = vm::interpret(&source, &mut out);
    match (status, out.flush()) {
        (Err(e), _) | (Ok(_), Err(e)) => {
            eprintln!("error: could not write output: {}", e);
            process::exit(1);
        }
        (Ok(Err(fault)), Ok(())) => {
            eprintln!("{}", fault);
            process::exit(1);
        }
        (Ok(Ok(())), Ok(())) => {}
    }
}
