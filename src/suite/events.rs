use super::Suite;
use crate::errors::SuiteError;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Lifecycle events a suite emits around `run()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuiteEvent {
    WillRun,
    DidRun,
}

impl SuiteEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuiteEvent::WillRun => "will-run",
            SuiteEvent::DidRun => "did-run",
        }
    }
}

impl fmt::Display for SuiteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SuiteEvent {
    type Err = SuiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "will-run" => Ok(SuiteEvent::WillRun),
            "did-run" => Ok(SuiteEvent::DidRun),
            _ => Err(SuiteError::UnknownEvent {
                name: s.to_string(),
            }),
        }
    }
}

pub type Listener = Rc<dyn Fn(&Suite)>;

/// Per-suite listener table, in subscription order.
#[derive(Default, Clone)]
pub(crate) struct Listeners {
    entries: Vec<(SuiteEvent, Listener)>,
}

impl Listeners {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn add(&mut self, event: SuiteEvent, listener: Listener) {
        self.entries.push((event, listener));
    }

    /// Snapshot of the listeners for `event`, so they can be called without
    /// holding a borrow on the table.
    pub(crate) fn for_event(&self, event: SuiteEvent) -> Vec<Listener> {
        self.entries
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, l)| Rc::clone(l))
            .collect()
    }
}
