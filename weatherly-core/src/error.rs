use reqwest::StatusCode;
use thiserror::Error;

/// Shown when the server gives no better explanation.
pub const GENERIC_FETCH_MESSAGE: &str = "Failed to fetch weather";

/// Errors surfaced by the weather data client.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The API answered with `success: false`.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// Non-OK status and a body that is not an API envelope.
    #[error("weather API request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to reach weather API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse weather API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid weather API url: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Message for the error panel.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Api { message, .. } => message.clone(),
            FetchError::Transport(err) if err.is_timeout() => "Weather service timed out".to_string(),
            FetchError::Transport(err) if err.is_connect() => "No internet connection".to_string(),
            _ => GENERIC_FETCH_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_show_server_message() {
        let err = FetchError::Api {
            status: StatusCode::NOT_FOUND,
            message: "city not found".into(),
        };
        assert_eq!(err.user_message(), "city not found");
        assert_eq!(err.to_string(), "city not found");
    }

    #[test]
    fn other_errors_fall_back_to_generic_message() {
        let err = FetchError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>".into(),
        };
        assert_eq!(err.user_message(), GENERIC_FETCH_MESSAGE);
        assert!(err.to_string().contains("502"));
    }
}
