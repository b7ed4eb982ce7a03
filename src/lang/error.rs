use std::fmt;

/// Runtime errors carry a message and, once the dispatcher has seen a
/// line-number marker, the line the statement surfaced on.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    message: String,
    line: Option<String>,
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::lang::Error::new(format!($($arg)*))
    };
}

impl Error {
    pub fn new<S: Into<String>>(message: S) -> Error {
        Error {
            message: message.into(),
            line: None,
        }
    }

    /// Attaches the current line number. The first attachment wins so a
    /// nested statement keeps the line it actually failed on.
    pub fn in_line(mut self, line: &str) -> Error {
        if self.line.is_none() && !line.is_empty() {
            self.line = Some(line.to_string());
        }
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.line {
            Some(line) => write!(f, "Line {} : {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_line() {
        let err = Error::new("Division by zero").in_line("30");
        assert_eq!(err.to_string(), "Line 30 : Division by zero");
    }

    #[test]
    fn test_display_without_line() {
        let err = Error::new("Unclosed FOR loop");
        assert_eq!(err.to_string(), "Unclosed FOR loop");
    }
}
