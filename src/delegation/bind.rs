//! Decorators and partial application.
//!
//! A decorator is either a plain [`Value`] or a [`Method`]: a function that
//! still expects a [`Context`]. Binding fixes the context and any leading
//! arguments and produces the [`Callable`] that gets installed on the
//! delegate.

use super::{Decoratable, LayerRef};
use crate::value::{CallResult, Callable, Value};
use std::fmt;
use std::rc::Rc;

/// The receiver a [`Method`] is bound to.
#[derive(Clone, Debug)]
pub enum Context {
    /// The delegation layer that installed the method.
    Layer(LayerRef),
    /// Any value chosen by the plugin.
    Value(Value),
}

impl Context {
    /// The delegation layer, if this context is one and it is still alive.
    pub fn layer(&self) -> Option<Decoratable> {
        match self {
            Context::Layer(layer) => layer.upgrade(),
            Context::Value(_) => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Context::Value(value) => Some(value),
            Context::Layer(_) => None,
        }
    }
}

/// An unbound function: receives its context plus the full argument list
/// (bound leading arguments first).
#[derive(Clone)]
pub struct Method(Rc<dyn Fn(&Context, &[Value]) -> CallResult>);

impl Method {
    pub fn new(func: impl Fn(&Context, &[Value]) -> CallResult + 'static) -> Self {
        Self(Rc::new(func))
    }

    pub fn call(&self, context: &Context, args: &[Value]) -> CallResult {
        (self.0)(context, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method(<fn>)")
    }
}

/// What can be decorated onto a delegate.
#[derive(Clone, Debug)]
pub enum Decorator {
    Value(Value),
    Method(Method),
}

impl From<Value> for Decorator {
    fn from(value: Value) -> Self {
        Decorator::Value(value)
    }
}

impl From<Method> for Decorator {
    fn from(method: Method) -> Self {
        Decorator::Method(method)
    }
}

impl From<Callable> for Decorator {
    fn from(func: Callable) -> Self {
        Decorator::Value(Value::Func(func))
    }
}

/// Options for a single decoration. `context: None` means the layer doing
/// the decorating.
#[derive(Clone, Debug, Default)]
pub struct DecorateOptions {
    pub args: Vec<Value>,
    pub context: Option<Context>,
}

impl DecorateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }
}

/// One `{name, func, opts}` entry for [`Decoratable::decorate_each`].
#[derive(Clone, Debug)]
pub struct Decoration {
    pub name: String,
    pub func: Decorator,
    pub opts: DecorateOptions,
}

impl Decoration {
    pub fn new(name: impl Into<String>, func: impl Into<Decorator>) -> Self {
        Self {
            name: name.into(),
            func: func.into(),
            opts: DecorateOptions::default(),
        }
    }

    pub fn with_opts(mut self, opts: DecorateOptions) -> Self {
        self.opts = opts;
        self
    }
}

/// Turns a decorator into the value to install.
///
/// Methods are bound to `context`; callables get `args` prepended; plain
/// values pass through untouched.
pub fn bind(decorator: Decorator, context: Context, args: Vec<Value>) -> Value {
    match decorator {
        Decorator::Method(method) => Value::Func(Callable::new(move |call_args| {
            method.call(&context, &prepend(&args, call_args))
        })),
        Decorator::Value(Value::Func(func)) if !args.is_empty() => {
            Value::Func(Callable::new(move |call_args| {
                func.call(&prepend(&args, call_args))
            }))
        }
        Decorator::Value(value) => value,
    }
}

fn prepend(leading: &[Value], rest: &[Value]) -> Vec<Value> {
    let mut all = Vec::with_capacity(leading.len() + rest.len());
    all.extend_from_slice(leading);
    all.extend_from_slice(rest);
    all
}
