use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {path}")]
    HttpStatus { path: String, status: u16 },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// True for failures of an HTTP exchange with the array (network, TLS,
    /// status or response shape). These abort the current poll.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ExporterError::Transport(_)
                | ExporterError::HttpStatus { .. }
                | ExporterError::Protocol(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
