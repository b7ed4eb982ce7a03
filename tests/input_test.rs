mod common;
use common::*;

#[test]
fn test_input_reads_a_string_into_a_sigil_variable() {
    assert_eq!(
        exec_with_input("10 INPUT \"name? \", N$\n20 PRINT N$\n", "steve\n"),
        "name? steve"
    );
}

#[test]
fn test_input_parses_numbers() {
    assert_eq!(
        exec_with_input("10 INPUT \"n? \", N\n20 PRINT N*2\n", "21\n"),
        "n? 42"
    );
}

#[test]
fn test_input_parse_failure() {
    assert_eq!(
        exec_err_with_input("10 INPUT \"n? \", N\n", "abc\n"),
        "Line 10 : Failed to convert abc to a number"
    );
}

#[test]
fn test_input_without_prompt_and_comma_is_malformed() {
    assert_eq!(
        exec_err_with_input("10 INPUT N\n", "1\n"),
        "Line 10 : INPUT should be : INPUT \"prompt\",var"
    );
}
