//! A canonical, type-safe representation of a dotted path into a delegate.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath(pub Vec<String>);

impl KeyPath {
    /// Splits `a.b.c` into segments.
    ///
    /// Returns `None` for an empty string or for any empty segment
    /// (`"a..b"`, `".a"`, `"a."`); such keypaths address nothing.
    ///
    /// ```rust
    /// use harness_core::delegation::KeyPath;
    /// let path = KeyPath::parse("reporter.emit").unwrap();
    /// assert_eq!(path.segments(), ["reporter", "emit"]);
    /// assert!(KeyPath::parse("").is_none());
    /// assert!(KeyPath::parse("a..b").is_none());
    /// ```
    pub fn parse(keypath: &str) -> Option<Self> {
        if keypath.is_empty() {
            return None;
        }
        let segments: Vec<String> = keypath.split('.').map(String::from).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
