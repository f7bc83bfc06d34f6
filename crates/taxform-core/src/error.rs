use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// An element-level action failed; the page itself is still usable.
    #[error("Element error: {0}")]
    Element(String),

    /// The browser session or protocol failed.
    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read form data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse form data: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the Helper may absorb this error as a failed step.
    pub fn is_element(&self) -> bool {
        matches!(self, Error::Element(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
