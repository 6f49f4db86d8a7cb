//! # Delegation layer
//!
//! A [`Decoratable`] wraps a delegate (a shared, dotted-path addressed store)
//! and lets independent plugins install capabilities onto it:
//!
//! - **`decorate`** installs a plain value, or a function bound to a context
//!   with leading arguments pre-applied.
//! - **`alias`** installs a forwarding function that resolves its target at
//!   call time, so it may point at something decorated later.
//!
//! Empty or malformed keypaths never raise: the decoration is skipped and an
//! alias to such a path returns `Nil`. Aliases that forward to each other fail
//! with [`SuiteError::AliasDepth`] once resolution nests past
//! [`MAX_ALIAS_DEPTH`] levels.
//!
//! ```rust
//! use harness_core::delegation::{Decoratable, Method};
//! use harness_core::Value;
//!
//! let layer = Decoratable::new();
//! layer
//!     .alias("ui.bdd.describe", "describe")
//!     .decorate("ui.bdd.describe", Method::new(|_, args| Ok(Value::List(args.to_vec()))));
//!
//! let out = layer.call("describe", &[Value::from("suite")]).unwrap();
//! assert_eq!(out, Value::List(vec![Value::from("suite")]));
//! ```

mod bind;
mod path;
mod store;

pub use bind::{bind, Context, DecorateOptions, Decoration, Decorator, Method};
pub use path::KeyPath;
pub use store::{Delegate, SharedDelegate};

use crate::config::DelegationSettings;
use crate::errors::SuiteError;
use crate::value::{CallResult, Callable, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// How deeply alias forwarding may nest before a call fails.
pub const MAX_ALIAS_DEPTH: usize = 64;

#[derive(Clone)]
pub struct Decoratable {
    delegate: SharedDelegate,
    warn_on_overwrite: bool,
    alias_depth: Rc<Cell<usize>>,
}

/// Non-owning handle to a [`Decoratable`]. Functions the layer installs on
/// its own delegate hold one of these so the delegate never owns itself.
#[derive(Clone)]
pub struct LayerRef {
    delegate: Weak<RefCell<Delegate>>,
    warn_on_overwrite: bool,
    alias_depth: Rc<Cell<usize>>,
}

impl LayerRef {
    pub fn upgrade(&self) -> Option<Decoratable> {
        self.delegate.upgrade().map(|delegate| Decoratable {
            delegate,
            warn_on_overwrite: self.warn_on_overwrite,
            alias_depth: Rc::clone(&self.alias_depth),
        })
    }
}

impl fmt::Debug for LayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerRef")
            .field("alive", &(self.delegate.strong_count() > 0))
            .finish()
    }
}

impl Decoratable {
    pub fn new() -> Self {
        Self::with_settings(&DelegationSettings::default())
    }

    pub fn with_settings(settings: &DelegationSettings) -> Self {
        Self::with_delegate_and_settings(Delegate::shared(), settings)
    }

    /// Extends an existing delegate instead of a fresh one.
    pub fn with_delegate(delegate: SharedDelegate) -> Self {
        Self::with_delegate_and_settings(delegate, &DelegationSettings::default())
    }

    pub fn with_delegate_and_settings(
        delegate: SharedDelegate,
        settings: &DelegationSettings,
    ) -> Self {
        Self {
            delegate,
            warn_on_overwrite: settings.warn_on_overwrite,
            alias_depth: Rc::new(Cell::new(0)),
        }
    }

    pub fn delegate(&self) -> SharedDelegate {
        Rc::clone(&self.delegate)
    }

    pub fn downgrade(&self) -> LayerRef {
        LayerRef {
            delegate: Rc::downgrade(&self.delegate),
            warn_on_overwrite: self.warn_on_overwrite,
            alias_depth: Rc::clone(&self.alias_depth),
        }
    }

    // ------------------------------------------------------------------------
    // Decoration
    // ------------------------------------------------------------------------

    /// Decorates `keypath` with default options: no leading arguments,
    /// bound to this layer.
    pub fn decorate(&self, keypath: &str, value: impl Into<Decorator>) -> &Self {
        self.decorate_with(keypath, value, DecorateOptions::default())
    }

    /// A plain [`Callable`] has no receiver, so decorating one with an
    /// explicit `opts.context` is refused: the decoration is skipped with a
    /// warning. Wrap it in a [`Method`] to bind a context.
    pub fn decorate_with(
        &self,
        keypath: &str,
        value: impl Into<Decorator>,
        opts: DecorateOptions,
    ) -> &Self {
        let Some(path) = KeyPath::parse(keypath) else {
            debug!(keypath, "skipping decoration of an invalid keypath");
            return self;
        };
        let decorator = value.into();
        let DecorateOptions { args, context } = opts;
        if context.is_some() && matches!(decorator, Decorator::Value(Value::Func(_))) {
            warn!(keypath, "a plain callable cannot be bound to a context; use a Method");
            return self;
        }
        let context = context.unwrap_or_else(|| Context::Layer(self.downgrade()));
        self.install(&path, bind(decorator, context, args));
        self
    }

    /// Decorates each `{name, func, opts}` entry, in order.
    pub fn decorate_each(&self, entries: impl IntoIterator<Item = Decoration>) -> &Self {
        for Decoration { name, func, opts } in entries {
            self.decorate_with(&name, func, opts);
        }
        self
    }

    /// Decorates each `name -> value` pair with default options, in
    /// iteration order.
    pub fn decorate_map<K, D>(&self, entries: impl IntoIterator<Item = (K, D)>) -> &Self
    where
        K: AsRef<str>,
        D: Into<Decorator>,
    {
        for (name, value) in entries {
            self.decorate(name.as_ref(), value);
        }
        self
    }

    /// Installs at `to` a function forwarding to whatever lives at `from`
    /// when it is called.
    pub fn alias(&self, from: &str, to: &str) -> &Self {
        let Some(target) = KeyPath::parse(to) else {
            debug!(from, to, "skipping alias to an invalid keypath");
            return self;
        };
        let forward = self.delegate_result(from);
        self.install(&target, Value::Func(forward));
        self
    }

    /// A function that reads `keypath` on every call: functions are invoked
    /// with the call's arguments, other values are returned as they are.
    fn delegate_result(&self, keypath: &str) -> Callable {
        let Some(path) = KeyPath::parse(keypath) else {
            return Callable::noop();
        };
        let layer = self.downgrade();
        Callable::new(move |args| {
            let Some(layer) = layer.upgrade() else {
                return Ok(Value::Nil);
            };
            let _depth = AliasDepthGuard::enter(&layer.alias_depth).ok_or_else(|| {
                SuiteError::AliasDepth {
                    keypath: path.to_string(),
                    limit: MAX_ALIAS_DEPTH,
                }
            })?;
            let current = layer.lookup(&path);
            trace!(keypath = %path, found = current.type_name(), "resolving alias");
            match current {
                Value::Func(func) => func.call(args),
                value => Ok(value),
            }
        })
    }

    fn install(&self, path: &KeyPath, value: Value) {
        let previous = self.delegate.borrow_mut().set(path, value);
        if let Some(previous) = previous {
            if self.warn_on_overwrite {
                warn!(
                    keypath = %path,
                    replaced = previous.type_name(),
                    "decoration replaces an existing delegate value"
                );
            }
        }
    }

    // ------------------------------------------------------------------------
    // Consumer side
    // ------------------------------------------------------------------------

    // The borrow is released before the value is returned, so callers may
    // invoke it even if it decorates this layer again.
    fn lookup(&self, path: &KeyPath) -> Value {
        self.delegate.borrow().get(path).cloned().unwrap_or_default()
    }

    pub fn get(&self, keypath: &str) -> Option<Value> {
        let path = KeyPath::parse(keypath)?;
        self.delegate.borrow().get(&path).cloned()
    }

    pub fn has(&self, keypath: &str) -> bool {
        self.get(keypath).is_some()
    }

    /// Invokes the function at `keypath`. A plain value is returned as-is.
    pub fn call(&self, keypath: &str, args: &[Value]) -> CallResult {
        match self.get(keypath) {
            Some(Value::Func(func)) => func.call(args),
            Some(value) => Ok(value),
            None => Err(SuiteError::NotCallable {
                keypath: keypath.to_string(),
            }),
        }
    }
}

/// Counts one level of alias forwarding for as long as it is alive.
struct AliasDepthGuard(Rc<Cell<usize>>);

impl AliasDepthGuard {
    fn enter(depth: &Rc<Cell<usize>>) -> Option<Self> {
        if depth.get() >= MAX_ALIAS_DEPTH {
            return None;
        }
        depth.set(depth.get() + 1);
        Some(Self(Rc::clone(depth)))
    }
}

impl Drop for AliasDepthGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl Default for Decoratable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Decoratable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoratable")
            .field("keys", &self.delegate.borrow().keys())
            .finish()
    }
}
