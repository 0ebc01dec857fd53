use std::collections::BTreeSet;

use pagelog_protocol::{CaptureSnapshot, Channel};
use serde::{Deserialize, Serialize};

/// Severity of a validation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultLevel {
    Ok,
    Warning,
    Error,
}

/// One finding about a page's console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub name: String,
    pub status: ResultLevel,
    pub message: String,
    pub data: Vec<String>,
}

/// Turns a retrieved capture buffer into validation results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleValidator;

impl ConsoleValidator {
    pub const NAME: &'static str = "console";
    pub const ERROR_MESSAGE: &'static str = "Errors in the console were present";
    pub const WARNING_MESSAGE: &'static str =
        "Warnings and/or network errors in the console were present";
    pub const INFO_MESSAGE: &'static str = "Info messages in the console were present";

    /// One result per non-empty channel, in info, warning, error order.
    ///
    /// Entries within a result are de-duplicated and sorted.
    pub fn validate(&self, logs: &CaptureSnapshot) -> Vec<ValidationResult> {
        [Channel::Info, Channel::Warning, Channel::Error]
            .into_iter()
            .filter_map(|channel| {
                let entries: BTreeSet<&String> = logs.channel(channel).iter().collect();
                if entries.is_empty() {
                    return None;
                }
                let (status, message) = match channel {
                    Channel::Info => (ResultLevel::Ok, Self::INFO_MESSAGE),
                    Channel::Warning => (ResultLevel::Warning, Self::WARNING_MESSAGE),
                    Channel::Error => (ResultLevel::Error, Self::ERROR_MESSAGE),
                };
                Some(ValidationResult {
                    name: Self::NAME.into(),
                    status,
                    message: message.into(),
                    data: entries.into_iter().cloned().collect(),
                })
            })
            .collect()
    }

    /// The most severe level among the results, `Ok` when there are none.
    pub fn worst(results: &[ValidationResult]) -> ResultLevel {
        results
            .iter()
            .map(|r| r.status)
            .max()
            .unwrap_or(ResultLevel::Ok)
    }
}
