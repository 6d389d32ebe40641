/// Convenience result type used across runon.
pub type RunonResult<T> = Result<T, RunonError>;

/// Top-level error taxonomy used by pen, render, gpu and preview APIs.
#[derive(thiserror::Error, Debug)]
pub enum RunonError {
    /// Invalid user-provided data (malformed pen state, bad parameters).
    #[error("validation error: {0}")]
    Validation(String),

    /// A child was appended to a node that still holds path content.
    #[error("mixed content: cannot append children to a pen holding {0} path commands")]
    MixedContent(usize),

    /// An operation needed concrete geometry but the pen is empty.
    #[error("no geometry: {0}")]
    NoGeometry(&'static str),

    /// Failures while rasterizing or writing vector output.
    #[error("render error: {0}")]
    Render(String),

    /// GPU context creation, resize or readback failures.
    #[error("gpu error: {0}")]
    Gpu(String),

    /// Errors when serializing or deserializing pens and configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RunonError {
    /// Build a [`RunonError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RunonError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RunonError::Gpu`] value.
    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }

    /// Build a [`RunonError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// First line of the display form, suitable for inline error placeholders.
    pub fn short_message(&self) -> String {
        let full = self.to_string();
        full.lines().next().unwrap_or_default().to_string()
    }
}

impl From<serde_json::Error> for RunonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
