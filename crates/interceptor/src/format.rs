//! Formatting of console arguments and uncaught errors into log entries.

use pagelog_protocol::constants::{ARG_SEPARATOR, ERROR_PART_SEPARATOR};

use crate::config::EmptyErrorPolicy;
use crate::context::ErrorEvent;

/// A console argument or error object as handed to a hook by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// A plain text value. Passed through verbatim.
    Text(String),
    /// Numbers, booleans, null, arrays and objects.
    Json(serde_json::Value),
    /// The host's "no value". Has no structured encoding.
    Undefined,
    /// Structured text the host already encoded itself (may be empty).
    Encoded(String),
    /// A value with no structured encoding, e.g. a cyclic object.
    /// Carries a short description of what it was.
    Unserializable(String),
}

impl ArgValue {
    /// Structured encoding of this value, classified explicitly.
    pub fn serialize(&self) -> Serialization {
        match self {
            ArgValue::Text(s) => {
                Serialization::Present(serde_json::Value::from(s.as_str()).to_string())
            }
            // An error object with no own enumerable fields encodes as `{}`.
            ArgValue::Json(serde_json::Value::Object(map)) if map.is_empty() => {
                Serialization::Empty
            }
            ArgValue::Json(v) => Serialization::Present(v.to_string()),
            ArgValue::Encoded(s) if s.is_empty() || s == "{}" => Serialization::Empty,
            ArgValue::Encoded(s) => Serialization::Present(s.clone()),
            ArgValue::Undefined | ArgValue::Unserializable(_) => Serialization::Unavailable,
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Text(s.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Text(s)
    }
}

impl From<serde_json::Value> for ArgValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => ArgValue::Text(s),
            other => ArgValue::Json(other),
        }
    }
}

impl From<i64> for ArgValue {
    fn from(n: i64) -> Self {
        ArgValue::Json(n.into())
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        ArgValue::Json(n.into())
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Json(b.into())
    }
}

/// Outcome of serializing an error object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Serialization {
    /// The value has no structured encoding.
    Unavailable,
    /// Serialization succeeded but produced no text, or only `{}`.
    Empty,
    /// Serialization produced this text.
    Present(String),
}

/// Formats one console argument.
///
/// Text passes through verbatim, structured values are JSON-encoded,
/// `Undefined` becomes the empty string and unserializable values are
/// replaced with `[{placeholder} {kind}]`.
pub fn format_arg(arg: &ArgValue, placeholder: &str) -> String {
    match arg {
        ArgValue::Text(s) | ArgValue::Encoded(s) => s.clone(),
        ArgValue::Json(v) => v.to_string(),
        ArgValue::Undefined => String::new(),
        ArgValue::Unserializable(kind) => format!("[{placeholder} {kind}]"),
    }
}

/// Formats a console call's arguments into a single space-joined entry.
pub fn format_console_args(args: &[ArgValue], placeholder: &str) -> String {
    args.iter()
        .map(|arg| format_arg(arg, placeholder))
        .collect::<Vec<_>>()
        .join(ARG_SEPARATOR)
}

/// Formats an uncaught error as `"{url} - {line}:{column} - {detail}"`.
///
/// `detail` is the serialized error object when present, otherwise the raw
/// message. An empty serialization follows `policy`.
pub fn format_error_entry(event: &ErrorEvent, policy: EmptyErrorPolicy) -> String {
    let serialized = event
        .error
        .as_ref()
        .map_or(Serialization::Unavailable, ArgValue::serialize);

    let detail = match serialized {
        Serialization::Present(s) => s,
        Serialization::Empty => match policy {
            EmptyErrorPolicy::FallBackToMessage => event.message.clone(),
            EmptyErrorPolicy::KeepEmpty => String::new(),
        },
        Serialization::Unavailable => event.message.clone(),
    };

    [
        event.source_url.clone(),
        format!("{}:{}", event.line, event.column),
        detail,
    ]
    .join(ERROR_PART_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(error: Option<ArgValue>) -> ErrorEvent {
        ErrorEvent {
            message: "boom".into(),
            source_url: "http://x/y.js".into(),
            line: 10,
            column: 3,
            error,
        }
    }

    #[test]
    fn text_passes_through_numbers_are_encoded() {
        let args = vec![ArgValue::from("hello"), ArgValue::from(42)];
        assert_eq!(format_console_args(&args, "unserializable"), "hello 42");
    }

    #[test]
    fn structured_values_are_json_encoded() {
        let args = vec![
            ArgValue::from(json!({"a": 1})),
            ArgValue::from(json!([1, "two"])),
            ArgValue::from(true),
            ArgValue::Json(serde_json::Value::Null),
        ];
        assert_eq!(
            format_console_args(&args, "unserializable"),
            r#"{"a":1} [1,"two"] true null"#
        );
    }

    #[test]
    fn json_string_value_is_treated_as_text() {
        assert_eq!(ArgValue::from(json!("plain")), ArgValue::Text("plain".into()));
    }

    #[test]
    fn undefined_formats_as_empty() {
        let args = vec![ArgValue::from("a"), ArgValue::Undefined, ArgValue::from("b")];
        assert_eq!(format_console_args(&args, "unserializable"), "a  b");
    }

    #[test]
    fn unserializable_uses_placeholder() {
        let arg = ArgValue::Unserializable("cyclic object".into());
        assert_eq!(format_arg(&arg, "unserializable"), "[unserializable cyclic object]");
        assert_eq!(format_arg(&arg, "n/a"), "[n/a cyclic object]");
    }

    #[test]
    fn no_args_is_empty_entry() {
        assert_eq!(format_console_args(&[], "unserializable"), "");
    }

    #[test]
    fn serialization_tri_state() {
        assert_eq!(ArgValue::Undefined.serialize(), Serialization::Unavailable);
        assert_eq!(
            ArgValue::Unserializable("x".into()).serialize(),
            Serialization::Unavailable
        );
        assert_eq!(ArgValue::Encoded(String::new()).serialize(), Serialization::Empty);
        assert_eq!(
            ArgValue::from("x").serialize(),
            Serialization::Present("\"x\"".into())
        );
        assert_eq!(
            ArgValue::from(json!({"name": "TypeError"})).serialize(),
            Serialization::Present(r#"{"name":"TypeError"}"#.into())
        );
    }

    #[test]
    fn error_without_object_uses_message() {
        let entry = format_error_entry(&event(None), EmptyErrorPolicy::default());
        assert_eq!(entry, "http://x/y.js - 10:3 - boom");

        let entry = format_error_entry(&event(Some(ArgValue::Undefined)), EmptyErrorPolicy::default());
        assert_eq!(entry, "http://x/y.js - 10:3 - boom");
    }

    #[test]
    fn error_with_object_uses_serialization() {
        let err = ArgValue::from(json!({"message": "boom", "code": 7}));
        let entry = format_error_entry(&event(Some(err)), EmptyErrorPolicy::default());
        assert_eq!(entry, r#"http://x/y.js - 10:3 - {"message":"boom","code":7}"#);
    }

    #[test]
    fn empty_serialization_follows_policy() {
        let ev = event(Some(ArgValue::Encoded(String::new())));
        assert_eq!(
            format_error_entry(&ev, EmptyErrorPolicy::FallBackToMessage),
            "http://x/y.js - 10:3 - boom"
        );
        assert_eq!(
            format_error_entry(&ev, EmptyErrorPolicy::KeepEmpty),
            "http://x/y.js - 10:3 - "
        );
    }

    #[test]
    fn error_with_no_fields_uses_message() {
        let ev = event(Some(ArgValue::from(json!({}))));
        assert_eq!(
            format_error_entry(&ev, EmptyErrorPolicy::default()),
            "http://x/y.js - 10:3 - boom"
        );

        let ev = event(Some(ArgValue::Encoded("{}".into())));
        assert_eq!(
            format_error_entry(&ev, EmptyErrorPolicy::FallBackToMessage),
            "http://x/y.js - 10:3 - boom"
        );
        assert_eq!(
            format_error_entry(&ev, EmptyErrorPolicy::KeepEmpty),
            "http://x/y.js - 10:3 - "
        );
    }

    #[test]
    fn text_serialization_is_quoted() {
        assert_eq!(
            ArgValue::from("say \"hi\"").serialize(),
            Serialization::Present(r#""say \"hi\"""#.into())
        );
    }

    #[test]
    fn console_objects_keep_key_order() {
        let args = vec![ArgValue::from(json!({"z": 1, "a": 2}))];
        assert_eq!(format_console_args(&args, "unserializable"), r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn unserializable_error_falls_back_to_message() {
        let ev = event(Some(ArgValue::Unserializable("cyclic object".into())));
        assert_eq!(
            format_error_entry(&ev, EmptyErrorPolicy::KeepEmpty),
            "http://x/y.js - 10:3 - boom"
        );
    }
}
