use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvanzaError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no current courtage class in response")]
    MissingClass,

    #[error("courtage class switch rejected")]
    SwitchRejected,
}

pub type Result<T> = std::result::Result<T, AvanzaError>;
