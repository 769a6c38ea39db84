use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;

/// Request payload. Text and bytes are written whole and the request is
/// terminated; a stream is piped into the outgoing request and terminates
/// when the source ends.
pub enum Body {
    Text(String),
    Bytes(Bytes),
    Stream(BoxStream<'static, Result<Bytes, std::io::Error>>),
}

impl Body {
    /// Wrap a chunk stream as a lazily-written request body.
    pub fn stream<S>(source: S) -> Self
    where
        S: futures::Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static,
    {
        Body::Stream(source.boxed())
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Text(s) => f.debug_tuple("Text").field(&s.len()).finish(),
            Body::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_string())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Bytes(b)
    }
}

impl From<Body> for reqwest::Body {
    fn from(body: Body) -> Self {
        match body {
            Body::Text(s) => reqwest::Body::from(s),
            Body::Bytes(b) => reqwest::Body::from(b),
            Body::Stream(s) => reqwest::Body::wrap_stream(s),
        }
    }
}
