// src/errors.rs

use thiserror::Error;

pub type MedsageResult<T> = Result<T, MedsageError>;

#[derive(Debug, Error)]
pub enum MedsageError {
    /// The service answered with a non-success status.
    #[error("api error: {message}")]
    Api { message: String },

    /// The request never completed (connect, DNS, broken pipe, ...).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// A 2xx body that is not the expected `{"answer": ...}` shape.
    #[error("unexpected response: {message}")]
    Response { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("logging error: {message}")]
    Logging { message: String },
}

impl MedsageError {
    pub fn api_error(message: impl Into<String>) -> Self {
        MedsageError::Api {
            message: message.into(),
        }
    }

    pub fn transport_error(message: impl Into<String>) -> Self {
        MedsageError::Transport {
            message: message.into(),
        }
    }

    pub fn response_error(message: impl Into<String>) -> Self {
        MedsageError::Response {
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        MedsageError::Config {
            message: message.into(),
        }
    }

    pub fn logging_error(message: impl Into<String>) -> Self {
        MedsageError::Logging {
            message: message.into(),
        }
    }
}
