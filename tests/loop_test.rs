mod common;
use common::*;
use minibasic::eval::Val;

#[test]
fn test_counting_loop() {
    assert_eq!(exec("10 FOR I = 1 TO 3\n20 PRINT I\n30 NEXT I\n40 END\n"), "123");
}

#[test]
fn test_counter_ends_one_step_past_the_endpoint() {
    let (mut basic, output) = interpreter("10 FOR I = 1 TO 3\n20 PRINT I\n30 NEXT I\n40 END\n");
    basic.run().expect("program failed");
    assert_eq!(output.take(), "123");
    assert_eq!(basic.get_variable("I"), Val::Number(4.0));
}

#[test]
fn test_nested_loops_with_distinct_counters() {
    assert_eq!(
        exec(
            "10 FOR I = 1 TO 2\n20 FOR J = 1 TO 2\n30 PRINT I,J\n40 NEXT J\n50 NEXT I\n60 END\n"
        ),
        "1 11 22 12 2"
    );
}

#[test]
fn test_step_literal() {
    let (mut basic, output) =
        interpreter("10 FOR I = 1 TO 9 STEP 2\n20 PRINT I\n30 NEXT I\n");
    basic.run().expect("program failed");
    assert_eq!(output.take(), "13579");
    assert_eq!(basic.get_variable("I"), Val::Number(11.0));
}

#[test]
fn test_descending_step() {
    assert_eq!(
        exec("10 FOR I = 3 TO 1 STEP -1\n20 PRINT I\n30 NEXT I\n"),
        "321"
    );
}

#[test]
fn test_coinciding_bounds_run_once() {
    let (mut basic, output) = interpreter("10 FOR I = 5 TO 5\n20 PRINT I\n30 NEXT I\n");
    basic.run().expect("program failed");
    assert_eq!(output.take(), "5");
    assert_eq!(basic.get_variable("I"), Val::Number(6.0));
}

#[test]
fn test_bounds_from_variables() {
    assert_eq!(
        exec("10 LET N = 3\n20 FOR I = 1 TO N\n30 PRINT I\n40 NEXT I\n"),
        "123"
    );
}

#[test]
fn test_next_without_for() {
    assert_eq!(exec_err("10 NEXT I\n"), "Line 10 : NEXT without FOR");
}

#[test]
fn test_unclosed_for_is_reported() {
    assert_eq!(exec_err("10 FOR I = 1 TO 3\n20 PRINT I\n"), "Unclosed FOR loop");
}

#[test]
fn test_for_bound_must_be_numeric() {
    assert_eq!(
        exec_err("10 LET S$ = \"x\"\n20 FOR I = S$ TO 3\n30 NEXT I\n"),
        "Line 20 : FOR: start-variable must be a number"
    );
}
