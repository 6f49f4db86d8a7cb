//! The three calling conventions a suite function may use.
//!
//! The convention is fixed when the [`SuiteFn`] is built, so `run()` never
//! has to guess how to wait for completion.

use super::outcome::RunError;
use super::Suite;
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

pub type SuiteFuture = LocalBoxFuture<'static, Result<(), RunError>>;

/// Sync: completes on return.
pub type SyncFn = Rc<dyn Fn(&Suite) -> Result<(), RunError>>;
/// Future: completes when the returned future settles.
pub type FutureFn = Rc<dyn Fn(&Suite) -> SuiteFuture>;
/// Callback: completes when the [`Done`] it is handed is invoked.
pub type CallbackFn = Rc<dyn Fn(&Suite, Done)>;

/// A suite's executable. Every variant receives the suite's context as its
/// receiver.
#[derive(Clone)]
pub enum SuiteFn {
    Sync(SyncFn),
    Future(FutureFn),
    Callback(CallbackFn),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnShape {
    Sync,
    Future,
    Callback,
}

impl SuiteFn {
    pub fn sync<F>(func: F) -> Self
    where
        F: Fn(&Suite) -> Result<(), RunError> + 'static,
    {
        SuiteFn::Sync(Rc::new(func))
    }

    pub fn future<F, Fut>(func: F) -> Self
    where
        F: Fn(&Suite) -> Fut + 'static,
        Fut: Future<Output = Result<(), RunError>> + 'static,
    {
        SuiteFn::Future(Rc::new(move |suite: &Suite| func(suite).boxed_local()))
    }

    pub fn callback<F>(func: F) -> Self
    where
        F: Fn(&Suite, Done) + 'static,
    {
        SuiteFn::Callback(Rc::new(func))
    }

    pub fn shape(&self) -> FnShape {
        match self {
            SuiteFn::Sync(_) => FnShape::Sync,
            SuiteFn::Future(_) => FnShape::Future,
            SuiteFn::Callback(_) => FnShape::Callback,
        }
    }

    /// Declared parameter count, not counting the receiver.
    pub fn arity(&self) -> usize {
        match self.shape() {
            FnShape::Callback => 1,
            FnShape::Sync | FnShape::Future => 0,
        }
    }

    /// Runs the function against `context` and waits for it to settle.
    /// Panics become [`RunError::Panicked`].
    pub(crate) async fn invoke(&self, context: &Suite) -> Result<(), RunError> {
        match self {
            SuiteFn::Sync(func) => catch_unwind(AssertUnwindSafe(|| func(context)))
                .unwrap_or_else(|p| Err(RunError::from_panic(p))),
            SuiteFn::Future(func) => {
                let fut = match catch_unwind(AssertUnwindSafe(|| func(context))) {
                    Ok(fut) => fut,
                    Err(payload) => return Err(RunError::from_panic(payload)),
                };
                AssertUnwindSafe(fut)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|p| Err(RunError::from_panic(p)))
            }
            SuiteFn::Callback(func) => {
                let (done, signal) = Done::channel();
                if let Err(payload) = catch_unwind(AssertUnwindSafe(|| func(context, done))) {
                    return Err(RunError::from_panic(payload));
                }
                signal.await.unwrap_or(Err(RunError::Abandoned))
            }
        }
    }
}

impl fmt::Debug for SuiteFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuiteFn::{:?}", self.shape())
    }
}

/// Completion signal handed to callback-style functions. Consumed on use,
/// so it can only be invoked once. It is `Send` and may complete from another
/// thread or task.
pub struct Done(oneshot::Sender<Result<(), RunError>>);

impl Done {
    fn channel() -> (Self, oneshot::Receiver<Result<(), RunError>>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    /// Signals completion, failing if `error` is present.
    pub fn complete(self, error: Option<RunError>) {
        let outcome = match error {
            Some(error) => Err(error),
            None => Ok(()),
        };
        // The receiver only goes away if the run future was dropped.
        let _ = self.0.send(outcome);
    }

    pub fn ok(self) {
        self.complete(None)
    }

    pub fn fail(self, error: impl Into<RunError>) {
        self.complete(Some(error.into()))
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done")
            .field("canceled", &self.0.is_canceled())
            .finish()
    }
}
