use gifgrid::FetchError;

pub type Result<T, E = ClientError> = core::result::Result<T, E>;

/// Errors of the GIPHY client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("GIPHY API key is not set (GIPHY_API_KEY)")]
    MissingApiKey,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success HTTP status, or a success status whose `meta.status` reports an error.
    #[error("GIPHY returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed GIPHY response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status, message } => FetchError::api(status, message),
            ClientError::Decode(e) => FetchError::decode(e.to_string()),
            ClientError::Http(e) if e.is_decode() => FetchError::decode(e.to_string()),
            other => FetchError::transport(other.to_string()),
        }
    }
}
