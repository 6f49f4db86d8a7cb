//! # Suite tree
//!
//! A [`Suite`] is a node in the test tree: a named group or a leaf test.
//! Parents own their children; a child only keeps a weak back-reference to
//! its parent, used to derive `pending` and `full_title`.
//!
//! ## Pending rules
//!
//! - A root is never pending, and assigning `pending` to it does nothing.
//! - A child with no explicit assignment is pending when its parent is, or
//!   when it has no function.
//! - An explicit assignment wins over the parent, but a child with no
//!   function stays pending even when assigned `false`.
//!
//! ## Running
//!
//! [`Suite::run`] emits `will-run`, awaits the function in whichever of the
//! three [`SuiteFn`] shapes it was built with, records a [`SuiteResult`],
//! emits `did-run` and resolves to the suite. It never fails: errors and
//! panics of the function end up in the result. A suite without a function
//! still emits both events and records a skipped, passing result.

mod events;
mod func;
mod outcome;

pub use events::{Listener, SuiteEvent};
pub use func::{CallbackFn, Done, FnShape, FutureFn, SuiteFn, SuiteFuture, SyncFn};
pub use outcome::{RunError, SuiteResult};

use crate::errors::SuiteError;
use crate::value::Value;
use events::Listeners;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

struct SuiteInner {
    title: RefCell<String>,
    parent: Weak<SuiteInner>,
    children: RefCell<Vec<Suite>>,
    func: RefCell<Option<SuiteFn>>,
    pending: Cell<Option<bool>>,
    result: RefCell<Option<SuiteResult>>,
    context: RefCell<Option<Weak<SuiteInner>>>,
    listeners: RefCell<Listeners>,
}

/// Shared handle to a suite node. Clones refer to the same node, and
/// equality is identity.
#[derive(Clone)]
pub struct Suite(Rc<SuiteInner>);

/// Construction options for [`Suite::new`].
#[derive(Clone, Debug, Default)]
pub struct SuiteConfig {
    pub parent: Option<Suite>,
    pub func: Option<SuiteFn>,
    pub title: String,
    pub pending: Option<bool>,
}

impl SuiteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn parent(mut self, parent: &Suite) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn func(mut self, func: SuiteFn) -> Self {
        self.func = Some(func);
        self
    }

    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = Some(pending);
        self
    }
}

impl Suite {
    /// Builds a suite and, if it has a parent, appends it to the parent's
    /// children.
    pub fn new(config: SuiteConfig) -> Self {
        let SuiteConfig {
            parent,
            func,
            title,
            pending,
        } = config;
        let suite = Suite(Rc::new(SuiteInner {
            title: RefCell::new(title),
            parent: parent
                .as_ref()
                .map(|p| Rc::downgrade(&p.0))
                .unwrap_or_default(),
            children: RefCell::new(Vec::new()),
            func: RefCell::new(func),
            pending: Cell::new(None),
            result: RefCell::new(None),
            context: RefCell::new(None),
            listeners: RefCell::new(Listeners::default()),
        }));
        if let Some(parent) = &parent {
            parent.add_child_suite(&suite);
        }
        if let Some(pending) = pending {
            suite.set_pending(pending);
        }
        suite
    }

    pub fn root() -> Self {
        Self::new(SuiteConfig::default())
    }

    // ------------------------------------------------------------------------
    // Tree
    // ------------------------------------------------------------------------

    /// Appends `child`. Never reorders or deduplicates.
    pub fn add_child_suite(&self, child: &Suite) -> &Self {
        self.0.children.borrow_mut().push(child.clone());
        self
    }

    pub fn parent(&self) -> Option<Suite> {
        self.0.parent.upgrade().map(Suite)
    }

    pub fn children(&self) -> Vec<Suite> {
        self.0.children.borrow().clone()
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    pub fn root_of(&self) -> Suite {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Number of ancestors.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(suite) = current {
            depth += 1;
            current = suite.parent();
        }
        depth
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    pub fn title(&self) -> String {
        self.0.title.borrow().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.0.title.borrow_mut() = title.into();
    }

    /// Titles from the root down, separated by spaces.
    pub fn full_title(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{} {}", parent.full_title(), self.title()),
            None => self.title(),
        }
    }

    pub fn func(&self) -> Option<SuiteFn> {
        self.0.func.borrow().clone()
    }

    pub fn set_func(&self, func: Option<SuiteFn>) {
        *self.0.func.borrow_mut() = func;
    }

    pub fn has_func(&self) -> bool {
        self.0.func.borrow().is_some()
    }

    pub fn pending(&self) -> bool {
        let Some(parent) = self.parent() else {
            return false;
        };
        let func_absent = !self.has_func();
        match self.0.pending.get() {
            Some(explicit) => explicit || func_absent,
            None => parent.pending() || func_absent,
        }
    }

    /// Ignored on a root.
    pub fn set_pending(&self, pending: bool) {
        if self.is_root() {
            debug!(suite = %self.title(), "ignoring pending assignment on a root suite");
            return;
        }
        self.0.pending.set(Some(pending));
    }

    pub fn result(&self) -> Option<SuiteResult> {
        self.0.result.borrow().clone()
    }

    /// The receiver handed to the function. Defaults to the suite itself,
    /// and falls back to it if the configured context has been dropped.
    pub fn context(&self) -> Suite {
        self.0
            .context
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Suite)
            .unwrap_or_else(|| self.clone())
    }

    /// Non-owning: the context must be kept alive elsewhere.
    pub fn set_context(&self, context: &Suite) {
        *self.0.context.borrow_mut() = Some(Rc::downgrade(&context.0));
    }

    /// Reads a property by name, for plugins and reporters that address
    /// suites dynamically. `passed`/`skipped` are absent before the first run.
    pub fn property(&self, name: &str) -> Option<Value> {
        match name {
            "title" => Some(Value::String(self.title())),
            "fullTitle" => Some(Value::String(self.full_title())),
            "pending" => Some(Value::Bool(self.pending())),
            "passed" => self.result().map(|r| Value::Bool(r.passed)),
            "skipped" => self.result().map(|r| Value::Bool(r.skipped)),
            _ => None,
        }
    }

    pub fn set_property(&self, name: &str, value: Value) -> Result<(), SuiteError> {
        match (name, value) {
            ("title", Value::String(title)) => {
                self.set_title(title);
                Ok(())
            }
            ("pending", Value::Bool(pending)) => {
                self.set_pending(pending);
                Ok(())
            }
            ("title", other) => Err(type_mismatch(name, "String", &other)),
            ("pending", other) => Err(type_mismatch(name, "Bool", &other)),
            ("fullTitle" | "passed" | "skipped", _) => Err(SuiteError::ReadOnlyProperty {
                property: name.to_string(),
            }),
            _ => Err(SuiteError::UnknownProperty {
                property: name.to_string(),
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    pub fn on(&self, event: SuiteEvent, listener: impl Fn(&Suite) + 'static) -> &Self {
        self.0.listeners.borrow_mut().add(event, Rc::new(listener));
        self
    }

    pub fn emit(&self, event: SuiteEvent) {
        debug!(suite = %self.full_title(), event = %event, "emit");
        let listeners = self.0.listeners.borrow().for_event(event);
        for listener in listeners {
            listener(self);
        }
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Runs the suite's function and resolves to the suite.
    ///
    /// Must not be called again on the same suite while a previous call is
    /// still pending.
    #[tracing::instrument(name = "suite.run", skip_all, fields(suite = %self.full_title()))]
    pub async fn run(&self) -> Suite {
        self.emit(SuiteEvent::WillRun);

        let result = match self.func() {
            None => {
                debug!("no function, recording a skipped result");
                SuiteResult::skipped()
            }
            Some(func) => {
                let context = self.context();
                match func.invoke(&context).await {
                    Ok(()) => SuiteResult::passed(),
                    Err(error) => {
                        warn!(error = %error, shape = ?func.shape(), "suite failed");
                        SuiteResult::failed(error)
                    }
                }
            }
        };
        *self.0.result.borrow_mut() = Some(result);

        self.emit(SuiteEvent::DidRun);
        self.clone()
    }
}

fn type_mismatch(property: &str, expected: &'static str, actual: &Value) -> SuiteError {
    SuiteError::TypeMismatch {
        property: property.to_string(),
        expected,
        actual: actual.type_name(),
    }
}

impl PartialEq for Suite {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Suite {}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("title", &self.title())
            .field("pending", &self.pending())
            .field("func", &self.func())
            .field("children", &self.0.children.borrow().len())
            .field("listeners", &self.0.listeners.borrow().len())
            .field("result", &self.result())
            .finish()
    }
}
