use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid query type: {kind}")]
    InvalidQueryType { kind: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("No results found for {kind} '{query}'")]
    NoResultsFound { kind: String, query: String },

    #[error("Spotify client error: {message}")]
    SpotifyClient { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Credential error: {message}")]
    Credential { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Coarse classification used by the delivery layer and for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad kind token or missing parameter, never retried
    InvalidInput,
    /// Upstream returned nothing
    NotFound,
    /// Transport, authentication or renewal failure talking to Spotify
    UpstreamFailure,
    /// Cache read/write failure, absorbed by the orchestrator
    CacheDegradation,
    /// Decode, serialization, configuration and anything unclassified
    Internal,
}

impl DomainError {
    pub fn invalid_query_type(kind: impl Into<String>) -> Self {
        Self::InvalidQueryType { kind: kind.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn no_results(kind: impl Into<String>, query: impl Into<String>) -> Self {
        Self::NoResultsFound {
            kind: kind.into(),
            query: query.into(),
        }
    }

    pub fn spotify_client(message: impl Into<String>) -> Self {
        Self::SpotifyClient {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidQueryType { .. } | Self::Validation { .. } => ErrorCategory::InvalidInput,
            Self::NoResultsFound { .. } => ErrorCategory::NotFound,
            Self::SpotifyClient { .. } | Self::Provider { .. } | Self::Credential { .. } => {
                ErrorCategory::UpstreamFailure
            }
            Self::Cache { .. } => ErrorCategory::CacheDegradation,
            Self::Configuration { .. } | Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}
