use thiserror::Error;

/// Errors returned by SmartData client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// An API root is not a valid absolute URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Endpoint path could not be joined to the API root.
    #[error("invalid endpoint path '{0}'")]
    InvalidPath(String),

    /// Client configuration is missing a value or holds a malformed one.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An entity identifier was absent or empty.
    #[error("missing {0} identifier")]
    MissingIdentifier(&'static str),

    /// Request parameters cannot be encoded for the chosen method.
    #[error("invalid request parameters: {0}")]
    InvalidParams(String),

    /// Response JSON does not have the shape the operation expects.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The operation is declared by the API but not supported by this client.
    #[error("operation '{0}' is not supported")]
    Unsupported(&'static str),

    /// HTTP transport-layer request failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body could not be parsed as JSON.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success HTTP status with response payload.
    #[error("server returned status {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}
