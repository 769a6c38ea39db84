//! The live response handle.
//!
//! A [`ResponseHandle`] represents an in-progress response whose headers have
//! arrived but whose body has not been consumed. Headers, status and final
//! URL can be observed freely; the body stream can be consumed exactly once.
//! Decoding takes the handle by value, so draining a body twice is a compile
//! error rather than a silent empty second read.

use bytes::Bytes;
use futures::stream::BoxStream;
use http::{HeaderMap, StatusCode};
use url::Url;

use crate::target::Transport;

#[derive(Debug)]
pub struct ResponseHandle {
    transport: Transport,
    inner: reqwest::Response,
}

impl ResponseHandle {
    pub(crate) fn new(transport: Transport, inner: reqwest::Response) -> Self {
        ResponseHandle { transport, inner }
    }

    /// The transport the request was dispatched over.
    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Final URL of the response (after redirects, if the platform client
    /// followed any).
    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    /// Response headers as a case-insensitive map. Never mutated here.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// The declared `content-encoding`, lowercased, if any.
    pub(crate) fn content_encoding(&self) -> Option<String> {
        self.inner
            .headers()
            .get(http::header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase())
    }

    /// Consume the handle into its raw body chunk stream. Chunks arrive in
    /// emission order; no decompression is applied here.
    pub(crate) fn into_body_stream(self) -> BoxStream<'static, Result<Bytes, reqwest::Error>> {
        use futures::StreamExt;
        self.inner.bytes_stream().boxed()
    }
}
