use super::{Interpreter, Val};
use rand::Rng;
use std::collections::HashMap;
use std::rc::Rc;

/// Primitives receive the interpreter so they can read and write
/// variables and produce output; failure is an in-band `Val::Error`.
pub type Handler = Rc<dyn Fn(&mut Interpreter, Vec<Val>) -> Val>;

#[derive(Clone)]
pub struct Primitive {
    pub arity: usize,
    pub handler: Handler,
}

/// ## Primitive registry
///
/// Maps a primitive name, sigil included, to its arity and handler.

#[derive(Default)]
pub struct Builtins {
    map: HashMap<String, Primitive>,
}

impl Builtins {
    pub fn new() -> Builtins {
        Builtins::default()
    }

    pub fn register<F>(&mut self, name: &str, arity: usize, handler: F)
    where
        F: Fn(&mut Interpreter, Vec<Val>) -> Val + 'static,
    {
        self.map.insert(
            name.to_string(),
            Primitive {
                arity,
                handler: Rc::new(handler),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<Primitive> {
        self.map.get(name).cloned()
    }
}

/// Registers the standard primitive set. Called by the interpreter
/// constructor once the program has been indexed, because registration
/// re-tags identifier tokens in place.
pub fn register_standard(basic: &mut Interpreter) {
    basic.register_primitive("ABS", 1, abs);
    basic.register_primitive("ACS", 1, acs);
    basic.register_primitive("ASN", 1, asn);
    basic.register_primitive("ATN", 1, atn);
    basic.register_primitive("BIN", 1, bin);
    basic.register_primitive("COS", 1, cos);
    basic.register_primitive("EXP", 1, exp);
    basic.register_primitive("INT", 1, int);
    basic.register_primitive("LN", 1, ln);
    basic.register_primitive("PI", 0, pi);
    basic.register_primitive("RND", 1, rnd);
    basic.register_primitive("SGN", 1, sgn);
    basic.register_primitive("SIN", 1, sin);
    basic.register_primitive("SQR", 1, sqr);
    basic.register_primitive("TAN", 1, tan);
    basic.register_primitive("VAL", 1, val);

    basic.register_primitive("CHR$", 1, chr);
    basic.register_primitive("CODE", 1, code);
    basic.register_primitive("LEFT$", 2, left);
    basic.register_primitive("LEN", 1, len);
    basic.register_primitive("MID$", 3, mid);
    basic.register_primitive("RIGHT$", 2, right);
    basic.register_primitive("TL$", 1, tl);
    basic.register_primitive("STR$", 1, str);

    basic.register_primitive("DUMP", 1, dump);
}

fn abs(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.abs()),
        _ => Val::error("ABS requires a numeric argument"),
    }
}

fn acs(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.acos()),
        _ => Val::error("ACS requires a numeric argument"),
    }
}

fn asn(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.asin()),
        _ => Val::error("ASN requires a numeric argument"),
    }
}

fn atn(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.atan()),
        _ => Val::error("ATN requires a numeric argument"),
    }
}

// Re-reads the decimal digits of the argument as a binary numeral, so
// BIN(1111) is 15.
fn bin(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => {
            let digits = (n.trunc() as i64).to_string();
            match i64::from_str_radix(&digits, 2) {
                Ok(v) => Val::Number(v as f64),
                Err(_) => Val::error(format!("BIN: {} is not a binary number", digits)),
            }
        }
        _ => Val::error("BIN requires a numeric argument"),
    }
}

fn cos(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.cos()),
        _ => Val::error("COS requires a numeric argument"),
    }
}

fn exp(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.exp()),
        _ => Val::error("EXP requires a numeric argument"),
    }
}

fn int(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.trunc()),
        _ => Val::error("INT requires a numeric argument"),
    }
}

fn ln(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.ln()),
        _ => Val::error("LN requires a numeric argument"),
    }
}

fn pi(_env: &mut Interpreter, _args: Vec<Val>) -> Val {
    Val::Number(std::f64::consts::PI)
}

fn rnd(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => {
            let max = n.trunc() as i64;
            if max < 1 {
                return Val::error("RND argument must be at least 1");
            }
            Val::Number(rand::thread_rng().gen_range(0..max) as f64)
        }
        _ => Val::error("RND requires a numeric argument"),
    }
}

fn sgn(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(if n == 0.0 {
            0.0
        } else if n < 0.0 {
            -1.0
        } else {
            1.0
        }),
        _ => Val::error("SGN requires a numeric argument"),
    }
}

fn sin(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.sin()),
        _ => Val::error("SIN requires a numeric argument"),
    }
}

fn sqr(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.sqrt()),
        _ => Val::error("SQR requires a numeric argument"),
    }
}

fn tan(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => Val::Number(n.tan()),
        _ => Val::error("TAN requires a numeric argument"),
    }
}

fn val(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => Val::Number(n),
            Err(_) => Val::error(format!("Failed to convert {} to a number", s)),
        },
        _ => Val::error("VAL requires a string argument"),
    }
}

fn chr(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::Number(n) => {
            let point = n.trunc();
            if point < 0.0 || point > u32::MAX as f64 {
                return Val::error(format!("CHR$: {} is not a valid character code", n));
            }
            match std::char::from_u32(point as u32) {
                Some(ch) => Val::String(ch.to_string()),
                None => Val::error(format!("CHR$: {} is not a valid character code", n)),
            }
        }
        _ => Val::error("CHR$ requires a numeric argument"),
    }
}

// CODE of the empty string is zero.
fn code(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::String(s) => match s.chars().next() {
            Some(ch) => Val::Number(u32::from(ch) as f64),
            None => Val::Number(0.0),
        },
        _ => Val::error("CODE requires a string argument"),
    }
}

fn left(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    let string = args.remove(0);
    let count = args.remove(0);
    match (string, count) {
        (Val::String(s), Val::Number(n)) => {
            if n < 0.0 {
                return Val::error("LEFT$ requires a non-negative count");
            }
            Val::String(s.chars().take(n.trunc() as usize).collect())
        }
        _ => Val::error("LEFT$ requires a string and a count"),
    }
}

fn len(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::String(s) => Val::Number(s.chars().count() as f64),
        _ => Val::error("LEN requires a string argument"),
    }
}

// MID$ offsets are one-based, like the dialects this one imitates.
fn mid(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    let string = args.remove(0);
    let offset = args.remove(0);
    let count = args.remove(0);
    match (string, offset, count) {
        (Val::String(s), Val::Number(offset), Val::Number(count)) => {
            if offset < 1.0 {
                return Val::error("MID$: offset must be at least 1");
            }
            if count < 0.0 {
                return Val::error("MID$ requires a non-negative count");
            }
            Val::String(
                s.chars()
                    .skip(offset.trunc() as usize - 1)
                    .take(count.trunc() as usize)
                    .collect(),
            )
        }
        _ => Val::error("MID$ requires a string, an offset, and a count"),
    }
}

fn right(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    let string = args.remove(0);
    let count = args.remove(0);
    match (string, count) {
        (Val::String(s), Val::Number(n)) => {
            if n < 0.0 {
                return Val::error("RIGHT$ requires a non-negative count");
            }
            let count = n.trunc() as usize;
            let length = s.chars().count();
            if count >= length {
                return Val::String(s);
            }
            Val::String(s.chars().skip(length - count).collect())
        }
        _ => Val::error("RIGHT$ requires a string and a count"),
    }
}

fn tl(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        Val::String(s) => Val::String(s.chars().skip(1).collect()),
        _ => Val::error("TL$ requires a string argument"),
    }
}

// Renders the number exactly as PRINT would.
fn str(_env: &mut Interpreter, mut args: Vec<Val>) -> Val {
    match args.remove(0) {
        num @ Val::Number(_) => Val::String(num.to_string()),
        _ => Val::error("STR$ requires a numeric argument"),
    }
}

// Diagnostic: writes the variable store, sorted by name, to the
// interpreter's output. The argument is ignored.
fn dump(env: &mut Interpreter, _args: Vec<Val>) -> Val {
    for (name, value) in env.variables() {
        if let Err(err) = env.write_str(&format!("{} => {}\n", name, value)) {
            return Val::error(err.to_string());
        }
    }
    Val::Number(0.0)
}
