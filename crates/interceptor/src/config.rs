//! Interceptor configuration.
//!
//! Read from a camelCase JSON file. Every field is optional; values outside
//! their accepted range fall back to the default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::InterceptorError;

/// Default bound on wrapper re-entry in [`DelegationMode::Reentrant`].
const DEFAULT_MAX_REENTRY_DEPTH: usize = 8;

/// Accepted range for `maxReentryDepth`.
const REENTRY_DEPTH_RANGE: std::ops::RangeInclusive<usize> = 1..=64;

/// Default placeholder word for values that cannot be encoded.
const DEFAULT_PLACEHOLDER: &str = "unserializable";

/// Where a console decorator forwards a call after capturing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DelegationMode {
    /// Forward the caller's arguments to the console method that was
    /// installed before the decorator.
    #[default]
    Original,
    /// Legacy compatibility: re-dispatch the formatted arguments through the
    /// decorator itself, capturing the entry again on every pass. Bounded by
    /// `max_reentry_depth`, after which the original method is called.
    Reentrant,
}

/// What an uncaught-error entry shows when the error object serializes to
/// empty text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyErrorPolicy {
    #[default]
    FallBackToMessage,
    KeepEmpty,
}

/// On-disk config format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    delegation: Option<DelegationMode>,
    #[serde(default)]
    max_reentry_depth: Option<usize>,
    #[serde(default)]
    empty_error_policy: Option<EmptyErrorPolicy>,
    #[serde(default)]
    unserializable_placeholder: Option<String>,
}

/// Interceptor behavior switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorConfig {
    pub delegation: DelegationMode,
    pub max_reentry_depth: usize,
    pub empty_error_policy: EmptyErrorPolicy,
    pub unserializable_placeholder: String,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            delegation: DelegationMode::Original,
            max_reentry_depth: DEFAULT_MAX_REENTRY_DEPTH,
            empty_error_policy: EmptyErrorPolicy::FallBackToMessage,
            unserializable_placeholder: DEFAULT_PLACEHOLDER.into(),
        }
    }
}

impl InterceptorConfig {
    /// Parses a config document strictly: malformed JSON or out-of-range
    /// values are errors.
    pub fn from_json(json: &str) -> Result<Self, InterceptorError> {
        let file: ConfigFile = serde_json::from_str(json)?;
        let mut config = Self::default();

        if let Some(delegation) = file.delegation {
            config.delegation = delegation;
        }
        if let Some(depth) = file.max_reentry_depth {
            if !REENTRY_DEPTH_RANGE.contains(&depth) {
                return Err(InterceptorError::Config(format!(
                    "maxReentryDepth must be within {}..={}, got {depth}",
                    REENTRY_DEPTH_RANGE.start(),
                    REENTRY_DEPTH_RANGE.end()
                )));
            }
            config.max_reentry_depth = depth;
        }
        if let Some(policy) = file.empty_error_policy {
            config.empty_error_policy = policy;
        }
        if let Some(placeholder) = file.unserializable_placeholder {
            if placeholder.trim().is_empty() {
                return Err(InterceptorError::Config(
                    "unserializablePlaceholder must not be empty".into(),
                ));
            }
            config.unserializable_placeholder = placeholder;
        }

        Ok(config)
    }

    /// Loads configuration from disk.
    ///
    /// A missing file yields the defaults. A file that cannot be parsed or
    /// holds invalid values is logged and also yields the defaults.
    pub fn load(path: &Path) -> Result<Self, InterceptorError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no interceptor config, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match Self::from_json(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse interceptor config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Serializes the configuration in its on-disk format.
    pub fn to_json(&self) -> Result<String, InterceptorError> {
        let file = ConfigFile {
            delegation: Some(self.delegation),
            max_reentry_depth: Some(self.max_reentry_depth),
            empty_error_policy: Some(self.empty_error_policy),
            unserializable_placeholder: Some(self.unserializable_placeholder.clone()),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}
