//! [`ValidationCollector`]: non-fatal diagnostics gathered while
//! deserializing a scenario configuration, per §4.18 and §7.

use serde::{Deserialize, Serialize};

/// How serious one validation finding is. A [`Severity::Severe`] entry
/// anywhere still fails the overall deserialization; the other two are
/// informational and left for the host to surface or ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Informational,
    Warning,
    Severe,
}

/// One recorded diagnostic: a stable id (`"object_invalid"`,
/// `"version_mismatch"`, `"time_invalid"`, `"missing_filename"`,
/// `"file_not_found"`, …), a severity, and a human-readable context path
/// such as `"ignitions[3].attributes[1]"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub severity: Severity,
    pub id: String,
    pub context: String,
}

/// Accumulates [`ValidationEntry`] findings instead of failing outright on
/// recoverable deserialization problems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationCollector {
    entries: Vec<ValidationEntry>,
}

impl ValidationCollector {
    #[must_use]
    pub fn new() -> Self {
        ValidationCollector::default()
    }

    pub fn record(&mut self, severity: Severity, id: impl Into<String>, context: impl Into<String>) {
        self.entries.push(ValidationEntry {
            severity,
            id: id.into(),
            context: context.into(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[ValidationEntry] {
        &self.entries
    }

    /// True if any recorded entry is [`Severity::Severe`]; deserialization
    /// should fail overall when this is true.
    #[must_use]
    pub fn has_severe(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Severe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severe_entry_flags_overall_failure() {
        let mut collector = ValidationCollector::new();
        collector.record(Severity::Warning, "time_invalid", "ignitions[0].start_time");
        assert!(!collector.has_severe());
        collector.record(Severity::Severe, "object_invalid", "ignitions[1]");
        assert!(collector.has_severe());
        assert_eq!(collector.entries().len(), 2);
    }
}
