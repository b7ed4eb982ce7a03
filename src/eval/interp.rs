use super::builtin;
use super::builtin::Builtins;
use super::loops::{ForLoop, Loops};
use super::stack::Stack;
use super::val::Val;
use super::var::Var;
use super::Address;
use crate::error;
use crate::lang::{Error, Kind, Token};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

type Result<T> = std::result::Result<T, Error>;

/// ## The interpreter
///
/// Holds the complete execution state: the immutable token stream, a
/// cursor into it, and the tables the statements mutate. Sequential
/// execution bumps the cursor; control flow writes it directly.
///
/// One statement lives on one line. A statement handler consumes the
/// tokens it understands and leaves the cursor wherever it stopped;
/// the dispatcher advances past that position unless the handler
/// jumped, in which case the cursor already names the next token to
/// execute.
pub struct Interpreter {
    // The program is nothing more than the lexed token stream.
    program: Vec<Token>,
    // Offset of the token following each line-number marker, keyed by
    // the marker's exact literal.
    lines: HashMap<String, Address>,
    cursor: Address,
    // The most recent line-number literal, for error attribution.
    current_line: String,
    vars: Var,
    gstack: Stack<Address>,
    loops: Loops,
    primitives: Builtins,
    finished: bool,
    // Set when a statement moved the cursor somewhere other than the
    // next token; suppresses the dispatcher's advance and tells IF its
    // consequent already transferred control.
    jumped: bool,
    trace: bool,
    stdin: Box<dyn BufRead>,
    stdout: Box<dyn Write>,
}

impl Interpreter {
    /// Indexes the token stream and registers the standard primitives.
    /// Indexing stops at the first EOF token; a duplicated line number
    /// gets a warning on stderr and keeps its first offset.
    pub fn new(tokens: Vec<Token>) -> Interpreter {
        let mut program: Vec<Token> = Vec::with_capacity(tokens.len());
        let mut lines: HashMap<String, Address> = HashMap::new();
        for tok in tokens {
            if tok.kind == Kind::Eof {
                break;
            }
            if tok.kind == Kind::LineNo {
                if lines.contains_key(&tok.literal) {
                    eprintln!(
                        "WARN: Line {} is duplicated - GOTO/GOSUB behaviour is undefined",
                        tok.literal
                    );
                } else {
                    lines.insert(tok.literal.clone(), program.len() + 1);
                }
            }
            program.push(tok);
        }
        let mut basic = Interpreter {
            program,
            lines,
            cursor: 0,
            current_line: String::new(),
            vars: Var::new(),
            gstack: Stack::new(),
            loops: Loops::new(),
            primitives: Builtins::new(),
            finished: false,
            jumped: false,
            trace: false,
            stdin: Box::new(io::BufReader::new(io::stdin())),
            stdout: Box::new(io::stdout()),
        };
        builtin::register_standard(&mut basic);
        basic
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Replaces the line source INPUT reads from.
    pub fn set_stdin<R: BufRead + 'static>(&mut self, reader: R) {
        self.stdin = Box::new(reader);
    }

    /// Replaces the sink PRINT and tracing write to.
    pub fn set_stdout<W: Write + 'static>(&mut self, writer: W) {
        self.stdout = Box::new(writer);
    }

    /// Returns the variable's value, or an error value when it has
    /// never been set.
    pub fn get_variable(&self, var_name: &str) -> Val {
        match self.vars.get(var_name) {
            Some(val) => val.clone(),
            None => Val::error(format!("The variable '{}' doesn't exist", var_name)),
        }
    }

    pub fn set_variable(&mut self, var_name: &str, value: Val) {
        self.vars.set(var_name, value);
    }

    /// Registers a primitive and re-tags every identifier token with
    /// this name as a primitive reference, so the expression engine
    /// treats future occurrences as calls rather than variables. The
    /// `$` sigil is part of the name.
    pub fn register_primitive<F>(&mut self, name: &str, arity: usize, handler: F)
    where
        F: Fn(&mut Interpreter, Vec<Val>) -> Val + 'static,
    {
        self.primitives.register(name, arity, handler);
        for tok in self.program.iter_mut() {
            if tok.kind == Kind::Ident && tok.literal == name {
                tok.kind = Kind::Builtin;
            }
        }
    }

    /// Executes a single statement.
    pub fn run_once(&mut self) -> Result<()> {
        if self.finished || self.cursor >= self.program.len() {
            return Ok(());
        }
        let tok = self.program[self.cursor].clone();
        if self.trace {
            let _ = writeln!(self.stdout, "run_once( {} )", tok);
        }
        self.jumped = false;
        match tok.kind {
            Kind::Newline => {}
            Kind::LineNo => self.current_line = tok.literal.clone(),
            Kind::End => {
                self.finished = true;
                return Ok(());
            }
            Kind::For => self.run_for()?,
            Kind::Gosub => {
                self.run_gosub()?;
                self.jumped = true;
            }
            Kind::Goto => {
                self.run_goto()?;
                self.jumped = true;
            }
            Kind::Input => self.run_input()?,
            Kind::If => self.run_if()?,
            Kind::Let => self.run_let()?,
            Kind::Next => self.run_next()?,
            Kind::Print => self.run_print()?,
            Kind::Rem => self.run_rem(),
            Kind::Return => self.run_return()?,
            Kind::Builtin => {
                // A bare primitive call; the value is discarded. The
                // call leaves the cursor past the last argument, so
                // step back one for the shared advance below.
                let out = self.call_primitive(&tok.literal);
                if let Val::Error(message) = out {
                    return Err(Error::new(message));
                }
                self.cursor -= 1;
            }
            _ => return Err(error!("Token not handled: {}", tok)),
        }
        if !self.jumped {
            self.cursor += 1;
        }
        Ok(())
    }

    /// Drives the program until END, the end of the stream, or the
    /// first error, which is reported against the current line.
    pub fn run(&mut self) -> Result<()> {
        while self.cursor < self.program.len() && !self.finished {
            if let Err(err) = self.run_once() {
                return Err(err.in_line(&self.current_line));
            }
        }
        if !self.loops.is_empty() {
            return Err(error!("Unclosed FOR loop"));
        }
        Ok(())
    }

    pub(crate) fn variables(&self) -> Vec<(String, Val)> {
        self.vars.sorted()
    }

    pub(crate) fn write_str(&mut self, text: &str) -> Result<()> {
        self.stdout.write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_val(&mut self, val: &Val) -> Result<()> {
        self.write_str(&val.to_string())
    }

    fn take_token(&mut self, context: &str) -> Result<Token> {
        match self.program.get(self.cursor) {
            Some(tok) => {
                let tok = tok.clone();
                self.cursor += 1;
                Ok(tok)
            }
            None => Err(error!("Hit end of program processing {}", context)),
        }
    }

    // Lifts an expression error into a statement error.
    fn value(val: Val) -> Result<Val> {
        match val {
            Val::Error(message) => Err(Error::new(message)),
            val => Ok(val),
        }
    }

    ////
    //
    // Expression engine
    //
    ////

    // factor is the bottom level: a parenthesized expression, a
    // literal, a primitive call, or a variable.
    fn factor(&mut self) -> Val {
        let tok = match self.program.get(self.cursor) {
            Some(tok) => tok.clone(),
            None => return Val::error("Hit end of program processing factor()"),
        };
        match tok.kind {
            Kind::LParen => {
                self.cursor += 1;
                let ret = self.expression(true);
                if ret.is_error() {
                    return ret;
                }
                match self.program.get(self.cursor) {
                    Some(close) if close.kind == Kind::RParen => {
                        self.cursor += 1;
                        ret
                    }
                    _ => Val::error("Unclosed bracket around expression"),
                }
            }
            Kind::Number => match tok.literal.parse::<f64>() {
                Ok(n) => {
                    self.cursor += 1;
                    Val::Number(n)
                }
                Err(_) => Val::error(format!("Failed to convert {} to a number", tok.literal)),
            },
            Kind::String => {
                self.cursor += 1;
                Val::String(tok.literal)
            }
            Kind::Builtin => self.call_primitive(&tok.literal),
            Kind::Ident => {
                let val = self.get_variable(&tok.literal);
                self.cursor += 1;
                val
            }
            _ => Val::error(format!("factor() - unhandled token: {}", tok)),
        }
    }

    // term handles `*`, `/`, and `%`, left-associative, numbers only.
    fn term(&mut self) -> Val {
        let mut f1 = self.factor();
        if f1.is_error() {
            return f1;
        }
        loop {
            let op = match self.program.get(self.cursor) {
                Some(tok) => tok.kind,
                None => return Val::error("Hit end of program processing term()"),
            };
            if !matches!(op, Kind::Asterisk | Kind::Slash | Kind::Percent) {
                break;
            }
            self.cursor += 1;
            let f2 = self.factor();
            if f2.is_error() {
                return f2;
            }
            let (v1, v2) = match (&f1, &f2) {
                (Val::Number(v1), Val::Number(v2)) => (*v1, *v2),
                _ => return Val::error("term() only handles numbers"),
            };
            f1 = match op {
                Kind::Asterisk => Val::Number(v1 * v2),
                Kind::Slash => {
                    if v2 == 0.0 {
                        return Val::error("Division by zero");
                    }
                    Val::Number(v1 / v2)
                }
                _ => {
                    // Modulus truncates both operands to integers.
                    if v2.trunc() as i64 == 0 {
                        return Val::error("Division by zero");
                    }
                    Val::Number((v1.trunc() as i64 % v2.trunc() as i64) as f64)
                }
            };
        }
        f1
    }

    // expression handles `+`, `-`, and, when enabled, the bitwise AND
    // and OR. The logicals are disabled while an IF condition parses
    // so the conjunction splits at the IF level instead.
    fn expression(&mut self, allow_logical: bool) -> Val {
        let mut t1 = self.term();
        if t1.is_error() {
            return t1;
        }
        loop {
            let op = match self.program.get(self.cursor) {
                Some(tok) => tok.clone(),
                None => return Val::error("Hit end of program processing expr()"),
            };
            let logical = matches!(op.kind, Kind::And | Kind::Or);
            if !matches!(op.kind, Kind::Plus | Kind::Minus) && !logical {
                break;
            }
            if logical && !allow_logical {
                break;
            }
            self.cursor += 1;
            let t2 = self.term();
            if t2.is_error() {
                return t2;
            }
            t1 = match (t1, t2) {
                (Val::String(v1), Val::String(v2)) => match op.kind {
                    Kind::Plus => Val::String(v1 + &v2),
                    _ => {
                        return Val::error(format!(
                            "expr() operation '{}' not supported for strings",
                            op
                        ))
                    }
                },
                (Val::Number(v1), Val::Number(v2)) => match op.kind {
                    Kind::Plus => Val::Number(v1 + v2),
                    Kind::Minus => Val::Number(v1 - v2),
                    Kind::And => Val::Number((v1.trunc() as i64 & v2.trunc() as i64) as f64),
                    _ => Val::Number((v1.trunc() as i64 | v2.trunc() as i64) as f64),
                },
                (v1, v2) => {
                    return Val::error(format!(
                        "expr() - type mismatch between '{}' and '{}'",
                        v1, v2
                    ))
                }
            };
        }
        t1
    }

    // comparison produces Number 1 or 0. Strings compare
    // lexicographically, numbers by IEEE-754 order.
    fn comparison(&mut self, allow_logical: bool) -> Val {
        let t1 = self.expression(allow_logical);
        if t1.is_error() {
            return t1;
        }
        let op = match self.program.get(self.cursor) {
            Some(tok) => tok.clone(),
            None => return Val::error("Hit end of program processing comparison()"),
        };
        if !matches!(
            op.kind,
            Kind::Equal
                | Kind::NotEqual
                | Kind::Less
                | Kind::LessEqual
                | Kind::Greater
                | Kind::GreaterEqual
        ) {
            return Val::error(format!("Expected comparison operator, got {}", op));
        }
        self.cursor += 1;
        let t2 = self.expression(allow_logical);
        if t2.is_error() {
            return t2;
        }
        let result = match (&t1, &t2) {
            (Val::String(v1), Val::String(v2)) => match op.kind {
                Kind::Equal => v1 == v2,
                Kind::NotEqual => v1 != v2,
                Kind::Less => v1 < v2,
                Kind::LessEqual => v1 <= v2,
                Kind::Greater => v1 > v2,
                _ => v1 >= v2,
            },
            (Val::Number(v1), Val::Number(v2)) => match op.kind {
                Kind::Equal => v1 == v2,
                Kind::NotEqual => v1 != v2,
                Kind::Less => v1 < v2,
                Kind::LessEqual => v1 <= v2,
                Kind::Greater => v1 > v2,
                _ => v1 >= v2,
            },
            _ => {
                return Val::error(format!("Unhandled comparison: '{}' {} '{}'", t1, op, t2));
            }
        };
        Val::Number(if result { 1.0 } else { 0.0 })
    }

    /// Invokes the named primitive at the cursor: skips the name,
    /// collects exactly `arity` comma-separated argument expressions,
    /// and calls the handler with them. Leaves the cursor after the
    /// last argument.
    fn call_primitive(&mut self, name: &str) -> Val {
        if self.trace {
            let _ = writeln!(self.stdout, "call_primitive( {} )", name);
        }
        let primitive = match self.primitives.get(name) {
            Some(primitive) => primitive,
            None => return Val::error(format!("The primitive '{}' isn't registered", name)),
        };
        self.cursor += 1;
        let mut args: Vec<Val> = vec![];
        while args.len() < primitive.arity {
            let kind = match self.program.get(self.cursor) {
                Some(tok) => tok.kind,
                None => {
                    return Val::error(format!(
                        "Hit EOF while searching for argument {} to {}",
                        args.len() + 1,
                        name
                    ))
                }
            };
            if kind == Kind::Comma {
                self.cursor += 1;
                continue;
            }
            if kind == Kind::Newline {
                return Val::error(format!(
                    "Hit newline while searching for argument {} to {}",
                    args.len() + 1,
                    name
                ));
            }
            let arg = self.expression(true);
            if arg.is_error() {
                return arg;
            }
            if self.trace {
                let _ = writeln!(self.stdout, "\tArgument {} -> {}", args.len() + 1, arg);
            }
            args.push(arg);
        }
        let handler = primitive.handler.clone();
        let out = handler(self, args);
        if self.trace {
            let _ = writeln!(self.stdout, "\tReturn value {}", out);
        }
        out
    }

    ////
    //
    // Statement handlers
    //
    ////

    // FOR ident = start TO end [STEP literal]
    //
    // All the work happens at NEXT: the header only records the bounds
    // and the offset of the body, then seeds the counter.
    fn run_for(&mut self) -> Result<()> {
        self.cursor += 1;
        let target = self.take_token("FOR")?;
        if target.kind != Kind::Ident {
            return Err(error!("Expected IDENT after FOR, got {}", target));
        }
        let eq = self.take_token("FOR")?;
        if eq.kind != Kind::Equal {
            return Err(error!("Expected = after 'FOR {}', got {}", target.literal, eq));
        }
        let start_tok = self.take_token("FOR")?;
        let start = match start_tok.kind {
            Kind::Number => match start_tok.literal.parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    return Err(error!("Failed to convert {} to a number", start_tok.literal))
                }
            },
            Kind::Ident => match self.get_variable(&start_tok.literal) {
                Val::Number(v) => v,
                _ => return Err(error!("FOR: start-variable must be a number")),
            },
            _ => {
                return Err(error!(
                    "Expected NUMBER/VARIABLE after 'FOR {}=', got {}",
                    target.literal, start_tok
                ))
            }
        };
        let to = self.take_token("FOR")?;
        if to.kind != Kind::To {
            return Err(error!(
                "Expected TO after 'FOR {}={}', got {}",
                target.literal, start_tok.literal, to
            ));
        }
        let end_tok = self.take_token("FOR")?;
        let end = match end_tok.kind {
            Kind::Number => match end_tok.literal.parse::<f64>() {
                Ok(v) => v,
                Err(_) => return Err(error!("Failed to convert {} to a number", end_tok.literal)),
            },
            Kind::Ident => match self.get_variable(&end_tok.literal) {
                Val::Number(v) => v,
                _ => return Err(error!("FOR: end-variable must be a number")),
            },
            _ => {
                return Err(error!(
                    "Expected NUMBER/VARIABLE after 'FOR {}={} TO', got {}",
                    target.literal, start_tok.literal, end_tok
                ))
            }
        };
        let mut step = 1.0;
        if let Some(tok) = self.program.get(self.cursor) {
            if tok.kind == Kind::Step {
                self.cursor += 1;
                let step_tok = self.take_token("FOR")?;
                if step_tok.kind != Kind::Number {
                    return Err(error!(
                        "Expected NUMBER after 'FOR {}={} TO {} STEP', got {}",
                        target.literal, start_tok.literal, end_tok.literal, step_tok
                    ));
                }
                step = match step_tok.literal.parse::<f64>() {
                    Ok(v) => v,
                    Err(_) => {
                        return Err(error!("Failed to convert {} to a number", step_tok.literal))
                    }
                };
            }
        }
        let record = ForLoop {
            id: target.literal.clone(),
            body: self.cursor,
            start: start as i64,
            end: end as i64,
            step: step as i64,
            finished: false,
        };
        self.vars.set(&target.literal, Val::Number(start));
        self.loops.add(record);
        Ok(())
    }

    fn run_gosub(&mut self) -> Result<()> {
        self.cursor += 1;
        let target = self.take_token("GOSUB")?;
        if target.kind != Kind::Number {
            return Err(error!("GOSUB should be followed by a line number"));
        }
        // The return address is the token after the target literal;
        // RETURN's post-advance lands on the following line's marker.
        self.gstack.push(self.cursor);
        match self.lines.get(&target.literal) {
            Some(&offset) => {
                self.cursor = offset;
                Ok(())
            }
            None => Err(error!("Failed to GOSUB {}", target.literal)),
        }
    }

    fn run_goto(&mut self) -> Result<()> {
        self.cursor += 1;
        let target = self.take_token("GOTO")?;
        if target.kind != Kind::Number {
            return Err(error!("GOTO should be followed by a line number"));
        }
        match self.lines.get(&target.literal) {
            Some(&offset) => {
                self.cursor = offset;
                Ok(())
            }
            None => Err(error!("Failed to GOTO {}", target.literal)),
        }
    }

    // INPUT "prompt" , ident
    //
    // A `$` name stores the line as a string; anything else parses it
    // as a number.
    fn run_input(&mut self) -> Result<()> {
        self.cursor += 1;
        let prompt = self.take_token("INPUT")?;
        let comma = self.take_token("INPUT")?;
        if comma.kind != Kind::Comma {
            return Err(error!("INPUT should be : INPUT \"prompt\",var"));
        }
        let ident = self.take_token("INPUT")?;
        if ident.kind != Kind::Ident {
            return Err(error!("INPUT should be : INPUT \"prompt\",var"));
        }
        self.write_str(&prompt.literal)?;
        self.stdout.flush()?;
        let mut input = String::new();
        self.stdin.read_line(&mut input)?;
        let input = input.trim_end_matches('\n').trim_end_matches('\r');
        if Var::is_string(&ident.literal) {
            self.vars.set(&ident.literal, Val::String(input.to_string()));
            return Ok(());
        }
        match input.parse::<f64>() {
            Ok(n) => {
                self.vars.set(&ident.literal, Val::Number(n));
                Ok(())
            }
            Err(_) => Err(error!("Failed to convert {} to a number", input)),
        }
    }

    // IF cmp (AND|OR cmp)* THEN stmt [ELSE stmt] NEWLINE
    //
    // Conditions parse with the logicals disabled so the chain splits
    // here; the running truth value folds left over the keywords, and
    // both sides of every conjunction are evaluated.
    fn run_if(&mut self) -> Result<()> {
        self.cursor += 1;
        let res = Self::value(self.comparison(false))?;
        let mut result = matches!(res, Val::Number(n) if n == 1.0);
        let mut target = self.take_token("IF")?;
        while matches!(target.kind, Kind::And | Kind::Or) {
            let extra = Self::value(self.comparison(false))?;
            let extra = matches!(extra, Val::Number(n) if n == 1.0);
            result = match target.kind {
                Kind::And => result && extra,
                _ => result || extra,
            };
            target = self.take_token("IF")?;
        }
        if target.kind != Kind::Then {
            return Err(error!("Expected THEN after IF EXPR, got {}", target));
        }
        if result {
            // Run the single statement after THEN. It advanced the
            // cursor as a full step of its own; if it jumped, the
            // cursor already names the target and must not move again.
            self.run_once()?;
            if self.jumped {
                return Ok(());
            }
            self.cursor -= 1;
            // Swallow the rest of the line, ELSE branch included.
            loop {
                let kind = match self.program.get(self.cursor) {
                    Some(tok) => tok.kind,
                    None => return Err(error!("Hit end of program processing IF")),
                };
                self.cursor += 1;
                if kind == Kind::Newline {
                    return Ok(());
                }
            }
        }
        // The test failed: skip the THEN branch, stopping at the end
        // of the line or running the single statement after ELSE.
        loop {
            let kind = match self.program.get(self.cursor) {
                Some(tok) => tok.kind,
                None => return Err(error!("Hit end of program processing IF")),
            };
            self.cursor += 1;
            if kind == Kind::Newline {
                return Ok(());
            }
            if kind == Kind::Else {
                return self.run_once();
            }
        }
    }

    // LET ident = expr
    fn run_let(&mut self) -> Result<()> {
        self.cursor += 1;
        let target = self.take_token("LET")?;
        if target.kind != Kind::Ident {
            return Err(error!("Expected IDENT after LET, got {}", target));
        }
        let assign = self.take_token("LET")?;
        if assign.kind != Kind::Equal {
            return Err(error!(
                "Expected assignment after 'LET {}', got {}",
                target.literal, assign
            ));
        }
        let res = Self::value(self.expression(true))?;
        self.vars.set(&target.literal, res);
        Ok(())
    }

    // NEXT ident
    //
    // Bumps the counter and jumps back to the body offset until the
    // record is finished. The counter advances even on the closing
    // trip, so it ends one step past the endpoint.
    fn run_next(&mut self) -> Result<()> {
        self.cursor += 1;
        let target = self.take_token("NEXT")?;
        if target.kind != Kind::Ident {
            return Err(error!("Expected IDENT after NEXT, got {}", target));
        }
        let mut record = match self.loops.get(&target.literal) {
            Some(record) => record.clone(),
            None => return Err(error!("NEXT without FOR")),
        };
        let counter = match self.get_variable(&target.literal) {
            Val::Number(n) => n,
            _ => return Err(error!("NEXT variable {} is not a number", target.literal)),
        };
        // Coinciding bounds still run the body once.
        if record.start == record.end {
            record.finished = true;
        }
        let counter = counter + record.step as f64;
        self.vars.set(&target.literal, Val::Number(counter));
        if record.finished {
            self.loops.remove(&target.literal);
            return Ok(());
        }
        // Reaching the endpoint marks the loop finished but still runs
        // the body once more, so the endpoint is inclusive.
        if counter == record.end as f64 {
            record.finished = true;
        }
        self.cursor = record.body;
        self.loops.add(record);
        Ok(())
    }

    // PRINT swallows items up to the end of the line. It also stops at
    // `:` and ELSE so it can sit inside an IF body.
    fn run_print(&mut self) -> Result<()> {
        self.cursor += 1;
        while self.cursor < self.program.len() {
            let tok = self.program[self.cursor].clone();
            match tok.kind {
                Kind::Newline | Kind::Colon | Kind::Else => return Ok(()),
                Kind::Number | Kind::String => self.write_str(&tok.literal)?,
                Kind::Comma => self.write_str(" ")?,
                Kind::Builtin => {
                    let val = Self::value(self.call_primitive(&tok.literal))?;
                    self.write_val(&val)?;
                    // The call advanced past its arguments; step back
                    // one for this loop's own advance.
                    self.cursor -= 1;
                }
                _ => {
                    // A variable or any other expression.
                    let out = Self::value(self.expression(true))?;
                    self.write_val(&out)?;
                    self.cursor -= 1;
                }
            }
            self.cursor += 1;
        }
        Ok(())
    }

    // REM swallows the rest of the line.
    fn run_rem(&mut self) {
        while let Some(tok) = self.program.get(self.cursor) {
            if tok.kind == Kind::Newline {
                return;
            }
            self.cursor += 1;
        }
    }

    fn run_return(&mut self) -> Result<()> {
        match self.gstack.pop() {
            Some(addr) => {
                self.cursor = addr;
                Ok(())
            }
            None => Err(error!("RETURN without GOSUB")),
        }
    }
}
