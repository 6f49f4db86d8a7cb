use super::path::KeyPath;
use crate::value::Value;
use im::HashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// A delegate shared between a [`super::Decoratable`] and whatever object
/// exposes it.
pub type SharedDelegate = Rc<RefCell<Delegate>>;

// ============================================================================
// DELEGATE: hierarchical key/value store addressed by dotted paths
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Delegate {
    data: Value,
}

impl Delegate {
    pub fn new() -> Self {
        Self {
            data: Value::Map(HashMap::new()),
        }
    }

    pub fn shared() -> SharedDelegate {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn get(&self, path: &KeyPath) -> Option<&Value> {
        lookup(&self.data, path.segments())
    }

    /// Installs `val` at `path`, creating intermediate maps and replacing
    /// any non-map value in the way. Returns what the write displaced: the
    /// old value at `path`, or a non-map value sitting on the way to it.
    pub fn set(&mut self, path: &KeyPath, val: Value) -> Option<Value> {
        let previous = displaced(&self.data, path.segments()).cloned();
        self.data = insert_at(&self.data, path.segments(), val);
        previous
    }

    pub fn exists(&self, path: &KeyPath) -> bool {
        self.get(path).is_some()
    }

    /// Top-level keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let Value::Map(map) = &self.data else {
            return Vec::new();
        };
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for Delegate {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// PURE HELPERS: lookup, displaced, insert_at
// ============================================================================

pub(crate) fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for key in segments {
        let Value::Map(map) = current else { return None };
        current = map.get(key.as_str())?;
    }
    Some(current)
}

fn displaced<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for key in segments {
        let Value::Map(map) = current else {
            return Some(current);
        };
        current = map.get(key.as_str())?;
    }
    Some(current)
}

pub(crate) fn insert_at(current: &Value, segments: &[String], val: Value) -> Value {
    let Some(key) = segments.first() else {
        return current.clone();
    };

    let remaining = &segments[1..];
    let mut map = match current {
        Value::Map(m) => m.clone(),
        _ => HashMap::new(),
    };

    if remaining.is_empty() {
        map.insert(key.clone(), val);
    } else {
        let child = map.get(key).cloned().unwrap_or_default();
        map.insert(key.clone(), insert_at(&child, remaining, val));
    }

    Value::Map(map)
}
