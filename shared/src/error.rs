use thiserror::Error as ThisError;

#[macro_export]
macro_rules! error
{
    ( $err_type:ident, $msg:expr ) =>
    {
        {
            $crate::error::Error::$err_type(String::from($msg))
        }
    };
}

// Construct a RuntimeError
#[macro_export]
macro_rules! rterr
{
    ($msg:literal) => { $crate::error!(RuntimeError, $msg) };
    ($msg:literal $(, $x:expr)+) =>
    {
        $crate::error!(RuntimeError, format!($msg $(, $x)+))
    };
}

// Construct a LexError at a source line
#[macro_export]
macro_rules! lexerr
{
    ($line:expr, $msg:literal) =>
    {
        $crate::error::Error::LexError($line, String::from($msg))
    };
    ($line:expr, $msg:literal $(, $x:expr)+) =>
    {
        $crate::error::Error::LexError($line, format!($msg $(, $x)+))
    };
}

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum Error
{
    #[error("Lexing error on line {0}: {1}")]
    LexError(usize, String),
    #[error("Parsing error: {0}")]
    ParseError(String),
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl Error
{
    /// The message without the kind prefix.
    pub fn message(&self) -> &str
    {
        match self
        {
            Error::LexError(_, msg) => msg,
            Error::ParseError(msg) => msg,
            Error::RuntimeError(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn display_has_kind_prefix()
    {
        let e = lexerr!(3, "not a number: {}", "1x");
        assert_eq!(e.to_string(), "Lexing error on line 3: not a number: 1x");
        assert_eq!(e.message(), "not a number: 1x");

        let e = error!(ParseError, "missing ')' to close sequence");
        assert_eq!(e.to_string(), "Parsing error: missing ')' to close sequence");

        let e = rterr!("could not find symbol '{}'", "foo");
        assert_eq!(e, Error::RuntimeError("could not find symbol 'foo'".to_owned()));
    }
}
