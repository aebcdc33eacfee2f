use thiserror::Error;

/// Why a manifest load did not produce data
#[derive(Debug, Error)]
pub enum LoadError {
    /// Non-success HTTP status or transport failure
    #[error("manifest not available at {url}: {reason}")]
    SourceUnavailable { url: String, reason: String },

    /// Body is not a JSON array of entries
    #[error("manifest is not valid: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl LoadError {
    pub fn unavailable(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
