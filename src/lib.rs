//! # minibasic
//!
//! A tree-walking interpreter for a small line-numbered BASIC dialect.
//! The program is lexed into a flat token stream; the evaluator walks
//! that stream with a single cursor, so a `GOTO` is nothing more than
//! writing a new offset into it.
//!
//! ```
//! use minibasic::eval::Interpreter;
//! use minibasic::lang::lex;
//!
//! let tokens = lex("10 LET A = 3\n20 PRINT A*A\n30 END\n");
//! let mut basic = Interpreter::new(tokens);
//! basic.run().unwrap();
//! ```
//!
//! Hosts can extend the language by registering primitives that are
//! callable from the program, and can read and write variables before
//! and after a run. See [`eval::Interpreter`].

pub mod eval;
pub mod lang;
