//! Harness core: the suite tree and execution engine of a test framework,
//! and the delegation layer that makes runner objects pluggable.

pub use crate::delegation::Decoratable;
pub use crate::errors::{ErrorType, SuiteError};
pub use crate::suite::{Done, RunError, Suite, SuiteConfig, SuiteEvent, SuiteFn, SuiteResult};
pub use crate::value::{Callable, Value};

pub mod config;
pub mod delegation;
pub mod errors;
pub mod suite;
pub mod value;
