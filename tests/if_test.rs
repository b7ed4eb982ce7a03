mod common;
use common::*;

#[test]
fn test_and_chain() {
    assert_eq!(
        exec("10 IF 1=1 AND 2=2 THEN PRINT \"YES\" ELSE PRINT \"NO\"\n"),
        "YES"
    );
    assert_eq!(
        exec("10 IF 1=1 AND 2=3 THEN PRINT \"YES\" ELSE PRINT \"NO\"\n"),
        "NO"
    );
}

#[test]
fn test_or_chain() {
    assert_eq!(
        exec("10 IF 1=2 OR 2=2 THEN PRINT \"YES\" ELSE PRINT \"NO\"\n"),
        "YES"
    );
    assert_eq!(
        exec("10 IF 1=2 OR 2=3 THEN PRINT \"YES\" ELSE PRINT \"NO\"\n"),
        "NO"
    );
}

#[test]
fn test_comparison_operators() {
    assert_eq!(exec("10 IF 2>1 THEN PRINT \"GT\"\n"), "GT");
    assert_eq!(exec("10 IF 1<>2 THEN PRINT \"NE\"\n"), "NE");
    assert_eq!(exec("10 IF 2>=2 THEN PRINT \"GE\"\n"), "GE");
    assert_eq!(exec("10 IF \"abc\"<\"abd\" THEN PRINT \"LT\"\n"), "LT");
}

#[test]
fn test_false_without_else_falls_through() {
    assert_eq!(exec("10 IF 1=2 THEN PRINT \"A\"\n20 PRINT \"B\"\n"), "B");
}

#[test]
fn test_then_branch_swallows_else() {
    assert_eq!(
        exec("10 IF 1=1 THEN PRINT \"A\" ELSE PRINT \"B\"\n20 PRINT \"C\"\n"),
        "AC"
    );
}

#[test]
fn test_goto_consequent_lands_on_target() {
    assert_eq!(
        exec("10 IF 1=1 THEN GOTO 40\n20 PRINT \"A\"\n40 PRINT \"B\"\n"),
        "B"
    );
}

#[test]
fn test_goto_in_else_lands_on_target() {
    assert_eq!(
        exec("10 IF 1=2 THEN PRINT \"A\" ELSE GOTO 40\n20 PRINT \"X\"\n40 PRINT \"B\"\n"),
        "B"
    );
}

#[test]
fn test_gosub_consequent_returns_to_next_line() {
    assert_eq!(
        exec("10 IF 1=1 THEN GOSUB 100\n20 PRINT \"M\"\n30 END\n100 PRINT \"S\"\n110 RETURN\n"),
        "SM"
    );
}

#[test]
fn test_print_with_colon_in_consequent() {
    assert_eq!(
        exec("10 IF 1=1 THEN PRINT \"A\" : ELSE PRINT \"B\"\n"),
        "A"
    );
}

#[test]
fn test_missing_then() {
    assert_eq!(
        exec_err("10 IF 1=1 PRINT \"A\"\n"),
        "Line 10 : Expected THEN after IF EXPR, got PRINT"
    );
}

#[test]
fn test_condition_error_propagates() {
    assert_eq!(
        exec_err("10 IF X=1 THEN PRINT \"A\"\n"),
        "Line 10 : The variable 'X' doesn't exist"
    );
}

#[test]
fn test_mixed_type_comparison_fails() {
    assert_eq!(
        exec_err("10 IF \"a\"=1 THEN PRINT \"A\"\n"),
        "Line 10 : Unhandled comparison: 'a' = '1'"
    );
}
