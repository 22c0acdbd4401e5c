use thiserror::Error;

/// Errors that can occur when using the llm-relay library.
#[derive(Error, Debug)]
pub enum Error {
    /// No credential was found in configuration or the environment.
    /// Fatal to the client being constructed.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// The caller asked for a model the backend does not know about.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// The backend cannot serve requests right now (daemon unreachable,
    /// model not pulled). Recoverable once the environment is fixed.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The stream completed with a 2xx handshake but produced no content.
    #[error("Backend returned an empty response")]
    EmptyResponse,

    /// A transport or protocol fault. Carries the underlying cause when
    /// one exists. Never retried automatically.
    #[error("{backend} request failed: {message}")]
    RequestFailed {
        backend: String,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// No bundle in the configuration set has `enabled: true`.
    #[error("No enabled provider found in configuration")]
    NoProviderConfigured,

    /// A backend name outside the known set was requested.
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    /// A bundle is missing a parameter its backend requires.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn missing_credential(message: impl Into<String>) -> Self {
        Error::MissingCredential(message.into())
    }

    pub fn unknown_model(model: impl Into<String>) -> Self {
        Error::UnknownModel(model.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Error::BackendUnavailable(message.into())
    }

    pub fn request_failed(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Error::RequestFailed {
            backend: backend.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    pub fn transport(
        backend: impl Into<String>,
        message: impl Into<String>,
        source: reqwest::Error,
    ) -> Self {
        Error::RequestFailed {
            backend: backend.into(),
            message: message.into(),
            source: Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = Error::unknown_model("gpt-9");
        assert!(error.to_string().contains("gpt-9"));

        let error = Error::request_failed("azure", "connection reset");
        assert!(error.to_string().contains("azure"));
        assert!(error.to_string().contains("connection reset"));

        let error = Error::unavailable("daemon not running");
        assert!(error.to_string().contains("daemon not running"));
    }
}
