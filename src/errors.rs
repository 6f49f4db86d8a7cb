//! Harness error handling.
//!
//! Structural misuse (writing a read-only property, calling something that is
//! not a function, broken configuration) is raised immediately as a
//! [`SuiteError`]. Failures of a suite's own function are *not* errors at this
//! level: they are recorded as data on the suite, see
//! [`crate::suite::RunError`].

use miette::Diagnostic;
use thiserror::Error;

/// Type-safe error classification that corresponds to [`SuiteError`] variants.
/// Lets test code match on categories instead of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Misuse of a typed surface: read-only writes, wrong value types,
    /// invoking a non-function.
    TypeError,
    /// Names that do not resolve to anything.
    Validation,
    /// Settings that could not be read or parsed.
    Config,
    /// Errors raised by decorated plugin functions.
    Plugin,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::TypeError => "TypeError",
            ErrorType::Validation => "Validation",
            ErrorType::Config => "Config",
            ErrorType::Plugin => "Plugin",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The crate error type.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum SuiteError {
    #[error("cannot assign to read-only property `{property}`")]
    #[diagnostic(
        code(harness::property::read_only),
        help("`{property}` is derived from the suite tree; change the titles instead")
    )]
    ReadOnlyProperty { property: String },

    #[error("unknown suite property `{property}`")]
    #[diagnostic(
        code(harness::property::unknown),
        help("known properties: title, fullTitle, pending, passed, skipped")
    )]
    UnknownProperty { property: String },

    #[error("property `{property}` expects {expected}, got {actual}")]
    #[diagnostic(code(harness::property::type_mismatch))]
    TypeMismatch {
        property: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unknown suite event `{name}`")]
    #[diagnostic(
        code(harness::event::unknown),
        help("recognized events: will-run, did-run")
    )]
    UnknownEvent { name: String },

    #[error("`{keypath}` is not a function on the delegate")]
    #[diagnostic(
        code(harness::delegate::not_callable),
        help("decorate or alias `{keypath}` before invoking it")
    )]
    NotCallable { keypath: String },

    #[error("alias resolution of `{keypath}` nested deeper than {limit} levels")]
    #[diagnostic(
        code(harness::delegate::alias_depth),
        help("two or more aliases forward to each other; break the cycle")
    )]
    AliasDepth { keypath: String, limit: usize },

    #[error("plugin error: {message}")]
    #[diagnostic(code(harness::delegate::plugin))]
    Plugin { message: String },

    #[error("invalid settings: {message}")]
    #[diagnostic(code(harness::config))]
    Config { message: String },
}

impl SuiteError {
    /// Shorthand used by decorated functions to fail a call.
    pub fn plugin(message: impl Into<String>) -> Self {
        SuiteError::Plugin {
            message: message.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::ReadOnlyProperty { .. }
            | Self::TypeMismatch { .. }
            | Self::NotCallable { .. } => ErrorType::TypeError,
            Self::UnknownProperty { .. }
            | Self::UnknownEvent { .. }
            | Self::AliasDepth { .. } => ErrorType::Validation,
            Self::Plugin { .. } => ErrorType::Plugin,
            Self::Config { .. } => ErrorType::Config,
        }
    }
}
