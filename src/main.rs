use ansi_term::Colour::Red;
use minibasic::eval::Interpreter;
use minibasic::lang::lex;
use std::fs;
use std::process;

fn main() {
    let mut trace = false;
    let mut filename = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--trace" => trace = true,
            _ => filename = Some(arg),
        }
    }
    let filename = match filename {
        Some(filename) => filename,
        None => {
            eprintln!("Usage: minibasic [--trace] FILE");
            process::exit(2);
        }
    };
    let source = match fs::read_to_string(&filename) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{}: {}", filename, err);
            process::exit(2);
        }
    };
    let mut basic = Interpreter::new(lex(&source));
    basic.set_trace(trace);
    if let Err(err) = basic.run() {
        eprintln!("{}", Red.bold().paint(err.to_string()));
        process::exit(1);
    }
}
