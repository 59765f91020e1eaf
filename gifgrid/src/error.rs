use alloc::string::String;

/// Why a page request did not produce a page.
///
/// An empty page is not an error: it is a legitimate `Ok` result with zero items.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FetchError {
    /// The request never produced a response (connection, DNS, timeout, ...).
    #[error("transport failure: {message}")]
    Transport { message: String },
    /// The service answered with a non-success status.
    #[error("api returned status {status}: {message}")]
    Api { status: u16, message: String },
    /// The response body could not be understood.
    #[error("malformed response: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
