use thiserror::Error;

/// Failures that end a forecast lookup before anything is rendered.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// No usable HTTP response: connectivity, timeout, non-success status or a body that is not JSON.
    #[error("Request failed: {message}")]
    Request { message: String },

    /// The body decoded as JSON but lacks the `daily` series we render.
    #[error("Unexpected response shape: {message}")]
    UnexpectedResponseShape { message: String },
}

impl ForecastError {
    pub fn request<S: Into<String>>(message: S) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    pub fn unexpected_shape<S: Into<String>>(message: S) -> Self {
        Self::UnexpectedResponseShape {
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ForecastError::Request { message } => {
                format!("Unable to reach the forecast service: {message}")
            }
            ForecastError::UnexpectedResponseShape { .. } => {
                "The forecast service returned data in an unexpected format.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        Self::request(err.to_string())
    }
}
