use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwarmError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Function error: {function}: {message}")]
    Function { function: String, message: String },

    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Missing API key: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),

    #[error("Run cancelled")]
    Cancelled,
}

impl SwarmError {
    pub fn function(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Function {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Failures raised by the function body itself, as opposed to bad input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Function { .. } | Self::Other(_))
    }

    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SwarmError>;
