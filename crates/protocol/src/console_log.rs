use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three append-only sequences in a capture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Error,
    Warning,
    Info,
}

impl Channel {
    /// All channels, in snapshot field order.
    pub const ALL: [Channel; 3] = [Channel::Error, Channel::Warning, Channel::Info];

    /// The channel's key in the snapshot layout.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Error => "error",
            Channel::Warning => "warning",
            Channel::Info => "info",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four console entry points that get intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleMethod {
    Log,
    Info,
    Warn,
    Error,
}

impl ConsoleMethod {
    pub const ALL: [ConsoleMethod; 4] = [
        ConsoleMethod::Log,
        ConsoleMethod::Info,
        ConsoleMethod::Warn,
        ConsoleMethod::Error,
    ];

    /// Channel that receives entries from this method.
    pub fn channel(self) -> Channel {
        match self {
            ConsoleMethod::Log | ConsoleMethod::Info => Channel::Info,
            ConsoleMethod::Warn => Channel::Warning,
            ConsoleMethod::Error => Channel::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConsoleMethod::Log => "log",
            ConsoleMethod::Info => "info",
            ConsoleMethod::Warn => "warn",
            ConsoleMethod::Error => "error",
        }
    }
}

/// Read-only copy of a capture buffer, in the layout a harness retrieves.
///
/// All three channels are always serialized. Missing keys deserialize as
/// empty channels so partially populated page values can still be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSnapshot {
    #[serde(default)]
    pub error: Vec<String>,
    #[serde(default)]
    pub warning: Vec<String>,
    #[serde(default)]
    pub info: Vec<String>,
}

impl CaptureSnapshot {
    /// Entries of a single channel, oldest first.
    pub fn channel(&self, channel: Channel) -> &[String] {
        match channel {
            Channel::Error => &self.error,
            Channel::Warning => &self.warning,
            Channel::Info => &self.info,
        }
    }

    /// Total number of entries across all channels.
    pub fn len(&self) -> usize {
        self.error.len() + self.warning.len() + self.info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_method_routing() {
        assert_eq!(ConsoleMethod::Log.channel(), Channel::Info);
        assert_eq!(ConsoleMethod::Info.channel(), Channel::Info);
        assert_eq!(ConsoleMethod::Warn.channel(), Channel::Warning);
        assert_eq!(ConsoleMethod::Error.channel(), Channel::Error);
    }

    #[test]
    fn channel_serialization() {
        assert_eq!(serde_json::to_string(&Channel::Warning).unwrap(), "\"warning\"");
        let ch: Channel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(ch, Channel::Error);
        assert_eq!(Channel::Info.to_string(), "info");
    }

    #[test]
    fn snapshot_always_serializes_all_channels() {
        let json = serde_json::to_value(CaptureSnapshot::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": [], "warning": [], "info": []})
        );
    }

    #[test]
    fn snapshot_missing_keys_default_to_empty() {
        let snap: CaptureSnapshot =
            serde_json::from_str(r#"{"error": ["a - 1:1 - x"]}"#).unwrap();
        assert_eq!(snap.error, vec!["a - 1:1 - x"]);
        assert!(snap.warning.is_empty());
        assert!(snap.info.is_empty());
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn snapshot_channel_accessor() {
        let snap = CaptureSnapshot {
            error: vec!["e".into()],
            warning: vec!["w1".into(), "w2".into()],
            info: vec![],
        };
        assert_eq!(snap.channel(Channel::Warning), ["w1", "w2"]);
        assert!(snap.channel(Channel::Info).is_empty());
        assert!(!snap.is_empty());
    }
}
