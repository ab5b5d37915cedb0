//! Lightweight issue-tracking used by the windowing and pipeline stages to
//! record non-fatal observations (e.g. "dropped N events with non-finite
//! timestamps") without aborting the analysis.
//!
//! This is deliberately distinct from [`crate`]'s statistical diagnostics
//! story (the time-rescaling KS test lives in `lifetrack-model`); this
//! module is just a structured warning log.
//!
//! # Example
//!
//! ```
//! use lifetrack_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning("windows", "dropped 3 events outside observation windows");
//! assert_eq!(diag.warning_count(), 1);
//! ```

use serde::Serialize;

/// Severity level for a diagnostic issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but the operation continued (e.g. events dropped, data defaulted).
    Warning,
    /// The operation could not complete as requested.
    Error,
}

/// A single diagnostic issue.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    pub message: String,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}:{}] {}", severity, self.category, self.message)
    }
}

/// Collection of issues accumulated during one analysis run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, category: &str, message: impl Into<String>) {
        self.issues.push(Issue {
            severity: Severity::Warning,
            category: category.to_string(),
            message: message.into(),
        });
    }

    pub fn add_error(&mut self, category: &str, message: impl Into<String>) {
        self.issues.push(Issue {
            severity: Severity::Error,
            category: category.to_string(),
            message: message.into(),
        });
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut diag = Diagnostics::new();
        diag.add_warning("windows", "dropped 2 events");
        diag.add_error("fit", "no eligible target types");
        assert_eq!(diag.warning_count(), 1);
        assert_eq!(diag.error_count(), 1);
        assert!(diag.has_errors());
    }

    #[test]
    fn merge_combines_issues() {
        let mut a = Diagnostics::new();
        a.add_warning("a", "first");
        let mut b = Diagnostics::new();
        b.add_warning("b", "second");
        a.merge(b);
        assert_eq!(a.issues.len(), 2);
    }
}
