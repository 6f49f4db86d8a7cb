use std::any::Any;
use thiserror::Error;

/// Why a suite's function failed. Stored in the suite's result, never
/// returned from `run()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Returned as an error, passed to the completion signal, or produced by
    /// the future.
    #[error("{0}")]
    Failed(String),
    #[error("panicked: {0}")]
    Panicked(String),
    /// The completion signal was dropped without being invoked.
    #[error("completion callback dropped without being called")]
    Abandoned,
}

impl RunError {
    pub fn new(message: impl Into<String>) -> Self {
        RunError::Failed(message.into())
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        RunError::Panicked(message)
    }
}

impl From<&str> for RunError {
    fn from(message: &str) -> Self {
        RunError::new(message)
    }
}

impl From<String> for RunError {
    fn from(message: String) -> Self {
        RunError::Failed(message)
    }
}

/// Outcome of the last `run()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteResult {
    pub passed: bool,
    /// True when there was no function to run.
    pub skipped: bool,
    pub error: Option<RunError>,
}

impl SuiteResult {
    pub fn passed() -> Self {
        Self {
            passed: true,
            skipped: false,
            error: None,
        }
    }

    pub fn skipped() -> Self {
        Self {
            passed: true,
            skipped: true,
            error: None,
        }
    }

    pub fn failed(error: RunError) -> Self {
        Self {
            passed: false,
            skipped: false,
            error: Some(error),
        }
    }
}

impl From<Result<(), RunError>> for SuiteResult {
    fn from(outcome: Result<(), RunError>) -> Self {
        match outcome {
            Ok(()) => Self::passed(),
            Err(error) => Self::failed(error),
        }
    }
}
