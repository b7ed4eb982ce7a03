#![allow(dead_code)]

use minibasic::eval::Interpreter;
use minibasic::lang::lex;
use std::cell::RefCell;
use std::io::{self, Cursor, Write};
use std::rc::Rc;

/// Captures everything the interpreter prints so tests can assert on it.
#[derive(Clone, Default)]
pub struct Output {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl Output {
    pub fn take(&self) -> String {
        String::from_utf8(self.buffer.borrow().clone()).expect("output was not UTF-8")
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Builds an interpreter for `src` with its output captured.
pub fn interpreter(src: &str) -> (Interpreter, Output) {
    let output = Output::default();
    let mut basic = Interpreter::new(lex(src));
    basic.set_stdout(output.clone());
    (basic, output)
}

/// Runs `src` to completion and returns what it printed.
pub fn exec(src: &str) -> String {
    let (mut basic, output) = interpreter(src);
    basic.run().expect("program failed");
    output.take()
}

/// Runs `src`, expecting it to fail, and returns the rendered error.
pub fn exec_err(src: &str) -> String {
    let (mut basic, _output) = interpreter(src);
    basic
        .run()
        .expect_err("program unexpectedly succeeded")
        .to_string()
}

/// Runs `src` with `input` available to INPUT statements.
pub fn exec_with_input(src: &str, input: &str) -> String {
    let (mut basic, output) = interpreter(src);
    basic.set_stdin(Cursor::new(input.to_string()));
    basic.run().expect("program failed");
    output.take()
}

/// As `exec_with_input`, but expecting a failure.
pub fn exec_err_with_input(src: &str, input: &str) -> String {
    let (mut basic, _output) = interpreter(src);
    basic.set_stdin(Cursor::new(input.to_string()));
    basic
        .run()
        .expect_err("program unexpectedly succeeded")
        .to_string()
}
