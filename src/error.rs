use serde::Deserialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Token decode error: {0}")]
    Decode(String),

    #[error("Response shape mismatch: {0}")]
    ResponseShape(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

/// Error envelope returned by the backend on rejected requests.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<Vec<FieldDetail>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldDetail {
    pub field: String,
    pub error: String,
}

impl Error {
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parses the backend error envelope; non-JSON bodies yield `None`.
    pub fn api_body(&self) -> Option<ApiErrorBody> {
        match self {
            Error::HttpStatus { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_details_from_status_body() {
        let err = Error::HttpStatus {
            status: 422,
            body: r#"{"message":"invalid","code":"UNPROCESSABLE","details":[{"field":"salary","error":"must be positive"}]}"#.into(),
        };
        let body = err.api_body().expect("json body");
        assert_eq!(err.http_status(), Some(422));
        assert_eq!(body.message.as_deref(), Some("invalid"));
        let details = body.details.unwrap();
        assert_eq!(details[0].field, "salary");
        assert_eq!(details[0].error, "must be positive");
    }

    #[test]
    fn plain_text_body_has_no_envelope() {
        let err = Error::HttpStatus {
            status: 500,
            body: "Internal Server Error".into(),
        };
        assert!(err.api_body().is_none());
    }
}
