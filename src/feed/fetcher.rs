use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving the feed.
///
/// A non-success HTTP status is deliberately NOT represented here: the
/// advisory endpoint is known to answer error pages with a usable body, so a
/// bad status is logged and the body is returned to the caller anyway.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response body was not valid UTF-8
    #[error("Response body is not valid UTF-8: {0}")]
    BodyDecode(#[from] std::string::FromUtf8Error),
}

/// Fetches the feed document from `url` and returns the full body as text.
///
/// Issues a single GET request with no custom headers and no retries. The
/// complete response body is read; the body is returned even when the server
/// answers with a non-success status (a warning is logged in that case and
/// the caller decides what to do with the text).
///
/// # Errors
///
/// - [`FetchError::Network`] - connection-level failure
/// - [`FetchError::Timeout`] - no response within 30 seconds
/// - [`FetchError::ResponseTooLarge`] - body exceeded 10MB
/// - [`FetchError::BodyDecode`] - body was not valid UTF-8
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = tokio::time::timeout(FETCH_TIMEOUT, client.get(url).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(
            url = %url,
            status = %status,
            "Feed request returned non-success status, using body anyway"
        );
    }

    let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;
    Ok(String::from_utf8(bytes)?)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
