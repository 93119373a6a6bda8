use std::collections::BTreeMap;
use std::fmt;

use brabbel::Severity;

/// Outcome of validating a form: failed rule messages per field, split by
/// severity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: BTreeMap<String, Vec<String>>,
    pub warnings: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed rule's message under `field`.
    pub fn add(&mut self, field: &str, severity: Severity, message: &str) {
        let bucket = match severity {
            Severity::Error => &mut self.errors,
            Severity::Warning => &mut self.warnings,
        };
        bucket
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// True when no error-severity rule failed. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, bucket) in [("error", &self.errors), ("warning", &self.warnings)] {
            for (field, messages) in bucket {
                for msg in messages {
                    writeln!(f, "{label}: {field}: {msg}")?;
                }
            }
        }
        Ok(())
    }
}
