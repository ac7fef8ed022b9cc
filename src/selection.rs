//! User-chosen subsets of template and area names.
//!
//! Membership is not checked against the active session when toggled; a set
//! is only meaningful relative to the session that is active when it is read.
use std::fmt;

/// Which of the two selection sets an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Templates,
    Areas,
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Templates => write!(f, "templates"),
            Self::Areas => write!(f, "areas"),
        }
    }
}

/// A set of selected names.
///
/// Iteration follows the order names were first toggled on, which is the
/// order the service emits them in extracted artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    names: Vec<String>,
}

impl SelectionSet {
    /// Flip membership of `name`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(index) = self.names.iter().position(|existing| existing == name) {
            self.names.remove(index);
            false
        } else {
            self.names.push(name.to_string());
            true
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
