use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, FeedError>;

/// Errors that can abort a pipeline run
#[derive(Debug, Error)]
pub enum FeedError {
    /// The source feed could not be retrieved
    #[error("failed to fetch feed from {location}: {reason}")]
    Fetch { location: String, reason: String },

    /// The source is not well-formed XML or not an RSS document
    #[error("feed is not a well-formed RSS document: {0}")]
    Parse(String),

    /// A retained item lacks a field the canonical shape requires
    #[error("item {index} ({identifier}) is missing required field `{field}`")]
    MalformedItem {
        index: usize,
        identifier: String,
        field: &'static str,
    },

    /// A derived document could not be rendered to XML
    #[error("failed to serialize `{key}` output: {reason}")]
    Serialize { key: String, reason: String },

    /// The output sink rejected a write
    #[error("failed to store `{key}` output: {reason}")]
    SinkWrite { key: String, reason: String },

    /// A configured CSS selector does not parse
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl FeedError {
    /// Name of the pipeline stage this error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            FeedError::Fetch { .. } => "fetch",
            FeedError::Parse(_) => "parse",
            FeedError::MalformedItem { .. } => "normalize",
            FeedError::Serialize { .. } | FeedError::SinkWrite { .. } => "publish",
            FeedError::InvalidSelector { .. } => "configure",
        }
    }
}
