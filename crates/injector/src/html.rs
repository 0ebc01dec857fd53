//! Script injection into HTML responses.
//!
//! Meant for a proxy sitting between the browser and the site under test:
//! every successful HTML document gets the interceptor script as the first
//! child of its `<head>`, so it runs before any page script.

use serde::{Deserialize, Serialize};

use crate::ERROR_DETECTION_JS;

/// Default content-type filter.
const DEFAULT_CONTENT_TYPE_FILTER: &str = "text/html";

/// Injection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectorConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Case-insensitive substring the response content type must contain.
    #[serde(default = "default_content_type_filter")]
    pub content_type_filter: String,
}

fn default_enabled() -> bool {
    true
}

fn default_content_type_filter() -> String {
    DEFAULT_CONTENT_TYPE_FILTER.into()
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            content_type_filter: default_content_type_filter(),
        }
    }
}

/// The parts of an HTTP response that decide whether to inject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub content_type: Option<String>,
}

/// Wraps the interceptor script in a `<script>` element.
pub fn script_tag() -> String {
    format!(r#"<script type="application/javascript">{ERROR_DETECTION_JS}</script>"#)
}

/// Injects the interceptor script into HTML documents.
#[derive(Debug, Clone, Default)]
pub struct HtmlInjector {
    config: InjectorConfig,
}

impl HtmlInjector {
    pub fn new(config: InjectorConfig) -> Self {
        Self { config }
    }

    /// Whether a response qualifies for injection, ignoring its body.
    pub fn matches(&self, meta: &ResponseMeta) -> bool {
        if !self.config.enabled || meta.status != 200 {
            return false;
        }
        let filter = self.config.content_type_filter.to_ascii_lowercase();
        meta.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains(&filter))
    }

    /// Returns the rewritten body, or `None` to leave the response untouched.
    ///
    /// Documents without a `<head>` element are not modified.
    pub fn inject(&self, meta: &ResponseMeta, body: &str) -> Option<String> {
        if !self.matches(meta) {
            return None;
        }

        let Some(insert_at) = head_content_start(body) else {
            tracing::debug!("HTML response has no <head>, not injecting");
            return None;
        };

        let tag = script_tag();
        let mut out = String::with_capacity(body.len() + tag.len());
        out.push_str(&body[..insert_at]);
        out.push_str(&tag);
        out.push_str(&body[insert_at..]);
        Some(out)
    }
}

/// Byte offset just past the opening `<head ...>` tag.
///
/// Comments and `<script>`/`<style>` bodies are skipped, so a `<head>`
/// mentioned inside them is never taken for the element.
fn head_content_start(body: &str) -> Option<usize> {
    let lower = body.to_ascii_lowercase();
    let mut pos = 0;

    while let Some(rel) = lower[pos..].find('<') {
        let start = pos + rel;
        let rest = &lower[start..];

        if rest.starts_with("<!--") {
            let close = rest[4..].find("-->")?;
            pos = start + 4 + close + 3;
        } else if let Some(raw) = ["script", "style"]
            .into_iter()
            .find(|name| opens_tag(rest, name))
        {
            let close = rest.find(&format!("</{raw}"))?;
            pos = start + close + 2;
        } else if opens_tag(rest, "head") {
            return rest.find('>').map(|gt| start + gt + 1);
        } else {
            pos = start + 1;
        }
    }
    None
}

/// Whether `rest` starts with an opening `<name` tag (not a longer name
/// such as `<header>`).
fn opens_tag(rest: &str, name: &str) -> bool {
    let Some(after) = rest.strip_prefix('<').and_then(|r| r.strip_prefix(name)) else {
        return false;
    };
    matches!(
        after.as_bytes().first(),
        Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'/')
    )
}
