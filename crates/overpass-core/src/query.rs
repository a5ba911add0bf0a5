//! Outgoing query text: settings preamble plus the caller's query body.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Response format requested via `[out:<format>]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Xml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix `body` with `[out:<format>]`, then `[timeout:<secs>]` unless `timeout_secs` is 0.
///
/// The body is not inspected.
pub fn build_query(body: &str, format: OutputFormat, timeout_secs: u64) -> String {
    let mut query = format!("[out:{}]", format);
    if timeout_secs > 0 {
        query.push_str(&format!("[timeout:{}]", timeout_secs));
    }
    query.push(';');
    query.push_str(body);
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_with_timeout() {
        assert_eq!(
            build_query("node(1);out;", OutputFormat::Json, 25),
            "[out:json][timeout:25];node(1);out;"
        );
    }

    #[test]
    fn zero_timeout_omits_clause() {
        assert_eq!(
            build_query("node(1);out;", OutputFormat::Xml, 0),
            "[out:xml];node(1);out;"
        );
    }

    #[test]
    fn format_serde_lowercase() {
        #[derive(Deserialize)]
        struct Wrap {
            format: OutputFormat,
        }
        let w: Wrap = toml::from_str("format = \"xml\"").unwrap();
        assert_eq!(w.format, OutputFormat::Xml);
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }
}
