use super::token::{Kind, Token};

/// Lexes a whole program into the token stream the evaluator consumes.
///
/// Every physical line that begins with digits yields a `LineNo` token
/// carrying the digits exactly as written. The stream always ends with
/// a `Newline` followed by a single `Eof`.
pub fn lex(source: &str) -> Vec<Token> {
    BasicLexer::new(source).run()
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

struct BasicLexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    tokens: Vec<Token>,
    line_start: bool,
    remark: bool,
}

impl<'a> BasicLexer<'a> {
    fn new(source: &'a str) -> BasicLexer<'a> {
        BasicLexer {
            chars: source.chars().peekable(),
            tokens: vec![],
            line_start: true,
            remark: false,
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(&pk) = self.chars.peek() {
            if self.remark {
                self.remark_text();
                continue;
            }
            if pk == '\n' {
                self.chars.next();
                self.push(Kind::Newline, "\n");
                self.line_start = true;
                continue;
            }
            if is_basic_whitespace(pk) {
                self.chars.next();
                continue;
            }
            let line_start = self.line_start;
            self.line_start = false;
            if pk.is_ascii_digit() {
                if line_start {
                    self.line_number();
                } else {
                    self.number(String::new());
                }
                continue;
            }
            if pk == '"' {
                self.string();
                continue;
            }
            if pk.is_ascii_alphabetic() {
                self.word();
                continue;
            }
            self.minutia();
        }
        match self.tokens.last() {
            Some(tok) if tok.kind == Kind::Newline => {}
            Some(_) => self.push(Kind::Newline, "\n"),
            None => {}
        }
        self.push(Kind::Eof, "");
        self.tokens
    }

    fn push<S: Into<String>>(&mut self, kind: Kind, literal: S) {
        self.tokens.push(Token::new(kind, literal));
    }

    // The rest of a line after REM becomes one opaque token, so comment
    // text can never open a string or otherwise confuse the lexer.
    fn remark_text(&mut self) {
        let mut text = String::new();
        while let Some(&pk) = self.chars.peek() {
            if pk == '\n' {
                break;
            }
            text.push(pk);
            self.chars.next();
        }
        let text = text.trim_end();
        if !text.is_empty() {
            self.push(Kind::Unknown, text);
        }
        self.remark = false;
    }

    fn line_number(&mut self) {
        let mut s = String::new();
        while let Some(&pk) = self.chars.peek() {
            if !pk.is_ascii_digit() {
                break;
            }
            s.push(pk);
            self.chars.next();
        }
        self.push(Kind::LineNo, s);
    }

    // `s` carries an optional leading minus sign.
    fn number(&mut self, mut s: String) {
        let mut decimal = false;
        while let Some(&pk) = self.chars.peek() {
            if pk.is_ascii_digit() {
                s.push(pk);
            } else if pk == '.' && !decimal {
                decimal = true;
                s.push(pk);
            } else {
                break;
            }
            self.chars.next();
        }
        self.push(Kind::Number, s);
    }

    fn string(&mut self) {
        self.chars.next();
        let mut s = String::new();
        while let Some(ch) = self.chars.next() {
            if ch == '"' {
                break;
            }
            s.push(ch);
        }
        self.push(Kind::String, s);
    }

    fn word(&mut self) {
        let mut s = String::new();
        while let Some(&pk) = self.chars.peek() {
            if pk.is_ascii_alphanumeric() {
                s.push(pk);
                self.chars.next();
                continue;
            }
            if pk == '$' {
                s.push(pk);
                self.chars.next();
            }
            break;
        }
        match Kind::keyword(&s.to_ascii_uppercase()) {
            Some(kind) => {
                if kind == Kind::Rem {
                    self.remark = true;
                }
                self.push(kind, s);
            }
            None => self.push(Kind::Ident, s),
        }
    }

    fn minutia(&mut self) {
        let ch = match self.chars.next() {
            Some(ch) => ch,
            None => return,
        };
        match ch {
            '(' => self.push(Kind::LParen, "("),
            ')' => self.push(Kind::RParen, ")"),
            ',' => self.push(Kind::Comma, ","),
            ':' => self.push(Kind::Colon, ":"),
            '+' => self.push(Kind::Plus, "+"),
            '*' => self.push(Kind::Asterisk, "*"),
            '/' => self.push(Kind::Slash, "/"),
            '%' => self.push(Kind::Percent, "%"),
            '=' => self.push(Kind::Equal, "="),
            '-' => {
                if self.starts_negative_number() {
                    self.number("-".to_string());
                } else {
                    self.push(Kind::Minus, "-");
                }
            }
            '<' => match self.chars.peek() {
                Some(&'=') => {
                    self.chars.next();
                    self.push(Kind::LessEqual, "<=");
                }
                Some(&'>') => {
                    self.chars.next();
                    self.push(Kind::NotEqual, "<>");
                }
                _ => self.push(Kind::Less, "<"),
            },
            '>' => match self.chars.peek() {
                Some(&'=') => {
                    self.chars.next();
                    self.push(Kind::GreaterEqual, ">=");
                }
                _ => self.push(Kind::Greater, ">"),
            },
            _ => self.push(Kind::Unknown, ch.to_string()),
        }
    }

    // A minus right after a value is a subtraction, not a sign.
    fn starts_negative_number(&mut self) -> bool {
        match self.chars.peek() {
            Some(pk) if pk.is_ascii_digit() => {}
            _ => return false,
        }
        !matches!(
            self.tokens.last().map(|tok| tok.kind),
            Some(Kind::Number) | Some(Kind::String) | Some(Kind::Ident) | Some(Kind::RParen)
        )
    }
}
