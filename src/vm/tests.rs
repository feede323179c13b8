use super::*;
use crate::error::VmError;
use crate::value::Value;

/// Run a program that must terminate normally and return the recorded
/// values.
fn run_values(program: &str) -> Vec<i64> {
    let mut machine = Machine::new(program.as_bytes());
    assert_eq!(machine.run(), Ok(()));
    machine.results().values().to_vec()
}

/// Run a program that must terminate normally and return the packed output
/// bytes.
fn run_output(program: &str) -> Vec<u8> {
    let mut sink = Vec::new();
    let status = interpret(program.as_bytes(), &mut sink).unwrap();
    assert_eq!(status, Ok(()));
    sink
}

/// Run a program that must fault and return the fault.
fn run_fault(program: &str) -> Fault {
    let mut machine = Machine::new(program.as_bytes());
    machine.run().unwrap_err()
}

// ----- Literals and dispatch -----

#[test]
fn digits_and_letters_push_literals() {
    let mut machine = Machine::new(b"07K");
    assert_eq!(machine.run(), Ok(()));
    assert_eq!(
        machine.stack,
        vec![Value::Int(0), Value::Int(7), Value::Symbol(b'K')]
    );
}

#[test]
fn padding_bytes_are_ignored() {
    assert_eq!(run_values("1 \n\t2,a .r"), vec![3]);
}

#[test]
fn every_byte_dispatches_without_crashing() {
    for byte in 0u8..=255 {
        let program = [byte];
        let mut machine = Machine::new(&program);
        // A one-byte program either terminates normally or faults on an
        // empty stack; it never panics and never loops.
        let _ = machine.run();
    }
}

#[test]
fn single_padding_byte_leaves_the_machine_untouched() {
    let mut machine = Machine::new(b"#");
    assert_eq!(machine.run(), Ok(()));
    assert!(machine.stack.is_empty());
    assert!(machine.results().is_empty());
}

// ----- End-to-end scenarios -----

#[test]
fn add_and_record() {
    assert_eq!(run_output("12ar"), vec![0x03]);
}

#[test]
fn duplicate_and_multiply() {
    assert_eq!(run_output("5wmr"), vec![0x19]);
}

#[test]
fn halt_from_inside_a_subroutine() {
    // The `h` in the body terminates before the return is reached.
    assert_eq!(run_output("{5rh}AfAc"), vec![0x05]);
}

#[test]
fn records_keep_program_order() {
    assert_eq!(run_output("9r8r7r"), vec![0x09, 0x08, 0x07]);
}

#[test]
fn multiply_chain_to_zero() {
    assert_eq!(run_output("210mmr"), vec![0x00]);
}

#[test]
fn one_wide_value_escalates_output_to_16_bits() {
    let bytes = run_output("1r99m5mr");
    let mut expected = Vec::new();
    expected.extend_from_slice(&1i16.to_ne_bytes());
    expected.extend_from_slice(&405i16.to_ne_bytes());
    assert_eq!(bytes, expected);
}

#[test]
fn past_16_bits_the_output_is_full_width() {
    let bytes = run_output("1r99m9m9m9mr");
    let mut expected = Vec::new();
    expected.extend_from_slice(&1i64.to_ne_bytes());
    expected.extend_from_slice(&59049i64.to_ne_bytes());
    assert_eq!(bytes, expected);
}

// ----- Arithmetic -----

#[test]
fn subtraction_can_go_negative() {
    assert_eq!(run_values("05sr"), vec![-5]);
}

#[test]
fn division_truncates() {
    assert_eq!(run_values("94dr"), vec![2]);
}

#[test]
fn division_truncates_toward_zero_for_negatives() {
    assert_eq!(run_values("08s3dr"), vec![-2]);
}

#[test]
fn division_by_zero_faults() {
    let fault = run_fault("10d");
    assert_eq!(fault.kind, VmError::State("division by zero".to_string()));
    assert_eq!(fault.ip, 2);
}

#[test]
fn arithmetic_requires_integers() {
    let fault = run_fault("1Aa");
    assert!(matches!(fault.kind, VmError::Type(_)));
    assert_eq!(fault.ip, 2);
}

#[test]
fn arithmetic_underflow_faults() {
    let fault = run_fault("1a");
    assert_eq!(
        fault.kind,
        VmError::State("operand stack underflow".to_string())
    );
    assert_eq!(fault.ip, 1);
}

// ----- Blocks, definition, call and return -----

#[test]
fn a_block_records_the_address_of_its_opening_brace() {
    let mut machine = Machine::new(b"9{h}Bf");
    assert_eq!(machine.run(), Ok(()));
    assert_eq!(machine.subroutines.lookup(b'B'), Some(1));
}

#[test]
fn call_runs_the_body_and_returns_past_the_call_site() {
    let mut machine = Machine::new(b"{5r}AfAc9r");
    assert_eq!(machine.run(), Ok(()));
    assert_eq!(machine.results().values(), &[5, 9]);
    assert!(machine.call_stack.is_empty());
}

#[test]
fn redefinition_overwrites_silently() {
    assert_eq!(run_values("{1r}Af{2r}AfAc"), vec![2]);
}

#[test]
fn nested_blocks_are_skipped_as_one() {
    assert_eq!(run_values("{1{2}3}Af9r"), vec![9]);
}

#[test]
fn calling_a_body_with_a_nested_block_works() {
    // The body pushes 1, records the inner block's address, pushes 3; the
    // depth probe sees all three entries.
    assert_eq!(run_values("{1{2}3}AfAczr"), vec![3]);
}

#[test]
fn an_unterminated_block_is_a_normal_halt() {
    assert_eq!(run_output("{123"), Vec::<u8>::new());
}

#[test]
fn a_top_level_return_terminates() {
    assert_eq!(run_values("12}3r"), Vec::<i64>::new());
}

#[test]
fn calling_an_undefined_subroutine_faults() {
    let fault = run_fault("Ac");
    assert_eq!(fault.kind, VmError::Subroutine(b'A'));
    assert_eq!(fault.ip, 1);
}

#[test]
fn defining_with_a_non_address_faults() {
    let fault = run_fault("1Af");
    assert!(matches!(fault.kind, VmError::Type(_)));
    assert_eq!(fault.ip, 2);
}

#[test]
fn subroutine_table_lookup_returns_what_define_stored() {
    let mut table = SubroutineTable::new();
    assert_eq!(table.lookup(b'Q'), None);
    table.define(b'Q', 12);
    assert_eq!(table.lookup(b'Q'), Some(12));
    table.define(b'Q', 40);
    assert_eq!(table.lookup(b'Q'), Some(40));
    assert_eq!(table.lookup(b'R'), None);
}

// ----- Jumps and branches -----

#[test]
fn relative_jump_is_the_next_fetch_delta() {
    // The delta 2 lands one past the digit that would otherwise be pushed.
    assert_eq!(run_values("12j3r"), vec![1]);
}

#[test]
fn jumping_off_the_front_of_the_code_halts_normally() {
    assert_eq!(run_values("05sj"), Vec::<i64>::new());
}

#[test]
fn symbol_jump_does_not_push_a_return_address() {
    // The body's closing brace finds an empty call stack and terminates, so
    // the record after the jump never runs.
    assert_eq!(run_values("{3r}BfBj9r"), vec![3]);
}

#[test]
fn jumping_to_an_address_value_faults() {
    let fault = run_fault("{}j");
    assert!(matches!(fault.kind, VmError::Type(_)));
    assert_eq!(fault.ip, 2);
}

#[test]
fn conditional_call_takes_the_nonzero_branch() {
    assert_eq!(run_values("{1r}Tf{2r}Ff5TFi9rh"), vec![1, 9]);
}

#[test]
fn conditional_call_takes_the_zero_branch() {
    assert_eq!(run_values("{1r}Tf{2r}Ff0TFi9rh"), vec![2, 9]);
}

#[test]
fn conditional_jump_selects_between_symbols() {
    assert_eq!(run_values("{4r}Gf{5r}Nf1GNk"), vec![4]);
    assert_eq!(run_values("{4r}Gf{5r}Nf0GNk"), vec![5]);
}

#[test]
fn conditional_jump_with_integer_deltas_loops() {
    // Counts 3, 2, 1: each pass records, decrements, and jumps back while
    // the counter is nonzero.
    assert_eq!(run_output("3r1sw08s1kh"), vec![0x03, 0x02, 0x01]);
}

// ----- Stack manipulation -----

#[test]
fn record_peeks_instead_of_popping() {
    let mut machine = Machine::new(b"4r");
    assert_eq!(machine.run(), Ok(()));
    assert_eq!(machine.stack, vec![Value::Int(4)]);
    assert_eq!(machine.results().values(), &[4]);
}

#[test]
fn record_on_an_empty_stack_faults() {
    let fault = run_fault("r");
    assert_eq!(
        fault.kind,
        VmError::State("operand stack underflow".to_string())
    );
    assert_eq!(fault.ip, 0);
}

#[test]
fn record_requires_an_integer() {
    let fault = run_fault("Ar");
    assert!(matches!(fault.kind, VmError::Type(_)));
    assert_eq!(fault.ip, 1);
}

#[test]
fn duplicate_then_discard_restores_the_stack() {
    assert_eq!(run_values("1wqr"), vec![1]);
}

#[test]
fn duplicate_and_discard_on_empty_are_no_ops() {
    assert_eq!(run_values("wq1r"), vec![1]);
}

#[test]
fn exchange_swaps_the_top_two() {
    assert_eq!(run_values("12erqr"), vec![1, 2]);
}

#[test]
fn exchange_twice_restores_order() {
    assert_eq!(run_values("12eerqr"), vec![2, 1]);
}

#[test]
fn exchange_needs_two_operands() {
    let fault = run_fault("1e");
    assert!(matches!(fault.kind, VmError::State(_)));
    assert_eq!(fault.ip, 1);
}

#[test]
fn depth_counts_entries_before_its_own_push() {
    assert_eq!(run_values("zr"), vec![0]);
    assert_eq!(run_values("12zr"), vec![2]);
}

#[test]
fn pick_copies_a_slot_counted_from_the_bottom() {
    assert_eq!(run_values("120xr"), vec![1]);
}

#[test]
fn pick_rejects_an_index_at_the_stack_length() {
    // The depth probe reports 2, but after the pick pops it only indices
    // 0 and 1 exist.
    let fault = run_fault("12zx");
    assert!(matches!(fault.kind, VmError::State(_)));
    assert_eq!(fault.ip, 3);
}

#[test]
fn pick_rejects_a_negative_index() {
    let fault = run_fault("05sx");
    assert!(matches!(fault.kind, VmError::State(_)));
    assert_eq!(fault.ip, 3);
}

#[test]
fn place_overwrites_a_slot() {
    assert_eq!(run_values("8907yrqr"), vec![9, 7]);
}

#[test]
fn place_bounds_check_uses_the_stack_after_its_pops() {
    let fault = run_fault("12y");
    assert!(matches!(fault.kind, VmError::State(_)));
    assert_eq!(fault.ip, 2);
}

#[test]
fn register_starts_at_zero() {
    assert_eq!(run_values("1tr"), vec![0]);
}

#[test]
fn register_exchange_returns_the_previous_value() {
    assert_eq!(run_values("5t3tr"), vec![5]);
}

#[test]
fn register_exchange_requires_an_integer() {
    let fault = run_fault("At");
    assert!(matches!(fault.kind, VmError::Type(_)));
    assert_eq!(fault.ip, 1);
}

// ----- Termination and flushing -----

#[test]
fn halt_stops_execution_immediately() {
    assert_eq!(run_values("1rh2r"), vec![1]);
}

#[test]
fn running_off_the_end_is_a_normal_halt() {
    assert_eq!(run_values("12a"), Vec::<i64>::new());
}

#[test]
fn a_fault_still_flushes_recorded_output() {
    let mut sink = Vec::new();
    let status = interpret(b"5rAc", &mut sink).unwrap();
    let fault = status.unwrap_err();
    assert_eq!(fault.kind, VmError::Subroutine(b'A'));
    assert_eq!(fault.ip, 3);
    assert_eq!(sink, vec![0x05]);
}

#[test]
fn an_empty_program_produces_no_output() {
    assert_eq!(run_output(""), Vec::<u8>::new());
}
