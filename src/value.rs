use crate::errors::SuiteError;
use im::HashMap;
use std::fmt;
use std::rc::Rc;

/// What every installed function returns.
pub type CallResult = Result<Value, SuiteError>;

/// A function stored on a delegate, with its context and leading arguments
/// already bound.
#[derive(Clone)]
pub struct Callable(Rc<dyn Fn(&[Value]) -> CallResult>);

impl Callable {
    pub fn new(func: impl Fn(&[Value]) -> CallResult + 'static) -> Self {
        Self(Rc::new(func))
    }

    /// A function that ignores its arguments and returns `Nil`.
    pub fn noop() -> Self {
        Self::new(|_| Ok(Value::Nil))
    }

    pub fn call(&self, args: &[Value]) -> CallResult {
        (self.0)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable(<fn>)")
    }
}

// Functions compare by identity.
impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A value stored on a delegate or read off a suite.
///
/// # Examples
///
/// ```rust
/// use harness_core::Value;
/// let v = Value::from("bdd");
/// assert_eq!(v.type_name(), "String");
/// assert!(Value::default().is_nil());
/// assert!(!Value::from(1.0).is_callable());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    Func(Callable),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Func(_) => "Function",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Func(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Func(func) => Some(func),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Callable> for Value {
    fn from(func: Callable) -> Self {
        Value::Func(func)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::List(_) | Value::Map(_) | Value::Func(_) => {
                write!(f, "<{}>", self.type_name())
            }
        }
    }
}
