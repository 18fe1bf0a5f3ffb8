// Error kinds and the control signal used to unwind a line of Forth

use num_bigint::BigInt;
use std::fmt;

/// Problems raised by Forth code. Any of these aborts the rest of the current line.
///
#[derive(Debug, Clone, PartialEq)]
pub enum ForthError {
    StackUnderflow,
    ParseError(String),
    NameNotFound(String),
    DivisionByZero,
    AddressOutOfRange(BigInt),
    Aborted,
    CompileOnly(String),
    NestedDefinition(String),
    TypeMismatch { word: String, expected: &'static str },
    UninitializedVariable(usize),
    Invalid(String),
}

impl fmt::Display for ForthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForthError::StackUnderflow => f.write_str("Stack underflow"),
            ForthError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ForthError::NameNotFound(token) => write!(f, "Not word or number: {}", token),
            ForthError::DivisionByZero => f.write_str("Cannot divide by zero"),
            ForthError::AddressOutOfRange(addr) => write!(f, "Address out of range: {}", addr),
            ForthError::Aborted => f.write_str("Aborted"),
            ForthError::CompileOnly(name) => {
                write!(f, "{}: only valid inside a definition", name)
            }
            ForthError::NestedDefinition(name) => {
                write!(f, "Cannot start a definition while compiling {}", name)
            }
            ForthError::TypeMismatch { word, expected } => {
                write!(f, "{}: expected {}", word, expected)
            }
            ForthError::UninitializedVariable(addr) => {
                write!(f, "Variable at {} has no value", addr)
            }
            ForthError::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ForthError {}

/// Everything that can unwind out of a word: a Forth error, or a request to end the session.
///
///     Bye is not a ForthError: the per-line recovery passes it through untouched.
///
#[derive(Debug, Clone, PartialEq)]
pub enum Interrupt {
    Error(ForthError),
    Bye,
}

impl From<ForthError> for Interrupt {
    fn from(error: ForthError) -> Self {
        Interrupt::Error(error)
    }
}

impl From<std::io::Error> for Interrupt {
    fn from(error: std::io::Error) -> Self {
        Interrupt::Error(ForthError::Invalid(format!("I/O error: {}", error)))
    }
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Error(e) => write!(f, "{}", e),
            Interrupt::Bye => f.write_str("bye"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Interrupt>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_converts_to_interrupt() {
        let i: Interrupt = ForthError::DivisionByZero.into();
        assert_eq!(i, Interrupt::Error(ForthError::DivisionByZero));
        assert_ne!(i, Interrupt::Bye);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ForthError::NameNotFound("blah".to_string()).to_string(),
            "Not word or number: blah"
        );
        assert_eq!(ForthError::StackUnderflow.to_string(), "Stack underflow");
    }
}
