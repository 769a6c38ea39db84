//! Request issuance.
//!
//! [`dispatch`] resolves its target, selects the transport and hands the
//! request to the platform client. It resolves with a [`ResponseHandle`] as
//! soon as response headers arrive; the body is not consumed at that point.
//! Connection handling, redirects and TLS verification belong to the
//! platform client. Nothing is retried here.

use std::time::Duration;

use http::{HeaderMap, Method};
use log::debug;

use crate::body::Body;
use crate::errors::FetchError;
use crate::response::ResponseHandle;
use crate::target::Target;

/// Request configuration, mirroring the option conventions of platform HTTP
/// clients. Immutable once handed to [`dispatch_with`].
#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    /// Header names are matched case-insensitively by the map itself.
    pub headers: HeaderMap,
    pub body: Option<Body>,
    /// Optional deadline covering the whole exchange, off by default.
    /// Without one, a hung remote hangs the caller.
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }
}

impl RequestOptions {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Issue a GET request with default options.
pub async fn dispatch(target: impl Into<Target>) -> Result<ResponseHandle, FetchError> {
    dispatch_with(target, RequestOptions::default()).await
}

/// Issue a request and resolve once response headers have arrived.
///
/// Transport-level failure (DNS, refused connection, reset before headers)
/// surfaces as [`FetchError::Transport`] carrying the platform error verbatim.
pub async fn dispatch_with(
    target: impl Into<Target>,
    options: RequestOptions,
) -> Result<ResponseHandle, FetchError> {
    let (transport, url) = target.into().resolve()?;
    debug!("dispatching {} {} over {:?}", options.method, url, transport);

    let client = reqwest::Client::new();
    let mut request = client.request(options.method, url).headers(options.headers);
    if let Some(body) = options.body {
        request = request.body(body);
    }
    let deadline = options.timeout;
    if let Some(timeout) = deadline {
        request = request.timeout(timeout);
    }

    let response = request.send().await.map_err(|e| {
        if deadline.is_some() && e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(e)
        }
    })?;

    debug!("response headers received: {}", response.status());
    Ok(ResponseHandle::new(transport, response))
}
