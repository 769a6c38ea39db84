/// Failure taxonomy for dispatch and decode.
///
/// Every failure is surfaced to the immediate caller as-is; nothing is
/// retried, logged-and-swallowed, or translated into another category.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request target could not be resolved to a URL.
    #[error("invalid request target: {0}")]
    Target(#[from] url::ParseError),

    /// The target named a protocol the platform client cannot speak.
    /// Only `http` and `https` are dispatchable.
    #[error("unsupported protocol scheme: {0}")]
    Scheme(String),

    /// The connection failed before response headers arrived (DNS failure,
    /// refused connection, reset during the exchange).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body stream failed after headers arrived.
    #[error("response stream error: {0}")]
    Stream(#[source] reqwest::Error),

    /// The declared gzip/deflate body could not be decompressed.
    #[error("decompression error: {0}")]
    Decompress(#[source] std::io::Error),

    /// JSON decoding was requested and the body was non-empty but not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The caller-supplied deadline elapsed. Only produced when a deadline
    /// was set; without one a hung remote hangs the caller.
    #[error("request deadline elapsed")]
    Timeout,
}
