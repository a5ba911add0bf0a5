use serde::de::DeserializeOwned;

/// Successful (2xx) response from the interpreter endpoint.
///
/// The pipeline treats this as opaque; it only caches and returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassResponse {
    pub body: String,
    pub content_type: Option<String>,
}

impl OverpassResponse {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Decode the body as JSON (for queries issued with `[out:json]`).
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}
