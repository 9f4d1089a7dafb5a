//! Typed HTTP client for the storefront API.

pub mod shop;

pub use shop::ShopClient;

/// Errors surfaced by [`ShopClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport or JSON decode failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The server answered with a failure envelope.
    #[error("api rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// A success envelope arrived without its `data` payload.
    #[error("malformed api response: missing data")]
    MissingData,
}
