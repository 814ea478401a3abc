//! Client error types and their user-facing translations

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The server answered with a non-success status
    #[error("Server returned {status}: {details}")]
    Http { status: u16, details: String },

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body was not what the API promises
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Text shown in the transcript in place of a reply
    pub fn user_message(&self) -> &'static str {
        let (status, details) = match self {
            ClientError::Http { status, details } => (Some(*status), details.as_str()),
            ClientError::Transport(details) | ClientError::Decode(details) => (None, details.as_str()),
        };

        if status == Some(429) && details.contains("quota") {
            "OpenAI API quota exceeded. Please check your billing or try again later."
        } else if status == Some(401) {
            "Invalid API key. Please check your OpenAI API configuration."
        } else if details.contains("rate limit") {
            "Rate limit exceeded. Please wait a moment and try again."
        } else {
            "Sorry, I encountered an error. Please try again."
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
