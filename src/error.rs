use std::ffi::OsStr;
use std::fmt;

/// The error type for registration, parsing and value lookup.
///
/// It is boxed so that `Result<T>` stays pointer-sized on the happy path.
pub struct Error(Box<Inner>);

struct Inner {
    kind: ErrorKind,
    arg: Option<String>,
    input: Option<String>,
    position: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An option token names no declared argument.
    #[error("unexpected argument")]
    UnknownArgument,
    /// `--name=` or `-abc=` with nothing after the delimiter.
    #[error("empty value after '='")]
    EmptyInlineValue,
    /// A value-taking option is followed by more characters in a short cluster.
    #[error("an option taking a value must end a short option cluster")]
    ShortClusterValue,
    /// A value-taking option is the last token.
    #[error("missing value")]
    MissingValue,
    #[error("invalid value")]
    ParsingError,
    #[error("too few values")]
    TooFewArguments,
    /// A token was claimed by neither an option nor a positional argument.
    #[error("unconsumed token")]
    UnconsumedToken,
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("missing program name")]
    MissingArg0,

    #[error("no such argument")]
    NoSuchArgument,
    #[error("wrong value type requested")]
    WrongType,
    #[error("value index out of range")]
    IndexOutOfRange,

    #[error("duplicate argument name")]
    DuplicateName,
    #[error("duplicate short name")]
    DuplicateShortName,
    #[error("invalid argument name")]
    InvalidName,
}

/// The recorded failure of one argument slot, set during a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    /// Fewer values than the declared minimum and no default.
    TooFewArguments,
    /// A token failed to convert into the value type, or a value was missing.
    ParsingError,
}

impl ErrorKind {
    pub(crate) fn with_arg(self, name: &str) -> Error {
        Error::from(self).with_arg(name)
    }

    pub(crate) fn with_input(self, input: impl Into<String>) -> Error {
        Error::from(self).with_input(input)
    }
}

impl From<ErrorKind> for Error {
    #[cold]
    fn from(kind: ErrorKind) -> Self {
        Self(Box::new(Inner { kind, arg: None, input: None, position: None }))
    }
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.0.kind
    }

    /// The long name of the argument this error is attributed to, if any.
    #[must_use]
    pub fn arg(&self) -> Option<&str> {
        self.0.arg.as_deref()
    }

    /// The offending raw token, lossily decoded.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.0.input.as_deref()
    }

    /// The index of the offending token in the parsed argv.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.0.position
    }

    pub(crate) fn with_arg(mut self, name: &str) -> Self {
        self.0.arg = Some(name.to_owned());
        self
    }

    pub(crate) fn with_input(mut self, input: impl Into<String>) -> Self {
        self.0.input = Some(input.into());
        self
    }

    pub(crate) fn with_os_input(self, input: &OsStr) -> Self {
        self.with_input(input.to_string_lossy())
    }

    pub(crate) fn at(mut self, position: usize) -> Self {
        self.0.position = Some(position);
        self
    }
}

impl From<ErrorStatus> for ErrorKind {
    fn from(status: ErrorStatus) -> Self {
        match status {
            ErrorStatus::TooFewArguments => Self::TooFewArguments,
            ErrorStatus::ParsingError => Self::ParsingError,
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.0.kind)
            .field("arg", &self.0.arg)
            .field("input", &self.0.input)
            .field("position", &self.0.position)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = &*self.0;
        write!(f, "{}", inner.kind)?;
        if let Some(arg) = &inner.arg {
            write!(f, " for '--{arg}'")?;
        }
        if let Some(input) = &inner.input {
            write!(f, ": '{input}'")?;
        }
        if let Some(pos) = inner.position {
            write!(f, " (at position {pos})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}
