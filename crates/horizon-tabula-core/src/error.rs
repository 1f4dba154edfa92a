//! Error types for Horizon Tabula.
//!
//! Every failure surfaced by the table subsystem is a [`TabulaError`]. Nothing
//! is recovered inside the library: errors propagate to the request boundary,
//! where the embedding application decides whether to render an error page or
//! discard the stored page state.

/// Boxed error used for failures reported by application-supplied providers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, TabulaError>;

/// Errors that can occur while building, driving or restoring controls.
#[derive(Debug, thiserror::Error)]
pub enum TabulaError {
    /// A caller-supplied ID does not have the expected structure or range.
    #[error("bad id '{id}': {reason}")]
    BadId { id: String, reason: String },

    /// A required collaborator is missing or wired incorrectly.
    #[error("misconfigured {control}: {message}")]
    Misconfiguration { control: String, message: String },

    /// Data handed to a data manager is not a sequence of rows.
    #[error("bad data: {0}")]
    BadData(String),

    /// A data binder or checkbox provider reported an error.
    #[error("provider '{provider}' failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: BoxError,
    },

    /// A stored reference no longer resolves after deserialization.
    #[error("stale state in '{control}': reference '{reference}' no longer exists")]
    StaleState { control: String, reference: String },

    /// Page state could not be encoded or decoded.
    #[error("page state encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The request was cancelled before the operation completed.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TabulaError {
    /// Create a bad-id error.
    pub fn bad_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a misconfiguration error.
    pub fn misconfigured(control: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Misconfiguration {
            control: control.into(),
            message: message.into(),
        }
    }

    /// Create a bad-data error.
    pub fn bad_data(message: impl Into<String>) -> Self {
        Self::BadData(message.into())
    }

    /// Wrap an error reported by a provider.
    pub fn provider(provider: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Provider {
            provider: provider.into(),
            source: source.into(),
        }
    }

    /// Create a stale-state error.
    pub fn stale_state(control: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::StaleState {
            control: control.into(),
            reference: reference.into(),
        }
    }

    /// Create a cancellation error.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled(operation.into())
    }

    /// Returns `true` if this error came from a provider callback.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    /// Returns `true` if this error invalidates stored page state.
    pub fn is_stale_state(&self) -> bool {
        matches!(self, Self::StaleState { .. })
    }
}

impl From<toml::de::Error> for TabulaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
