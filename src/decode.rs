//! Response body materialization.
//!
//! The decoder drains a [`ResponseHandle`]'s body stream fully into memory
//! and converts the buffered bytes into the requested [`Representation`].
//! When the response declares gzip or deflate content-encoding, a
//! decompression transform sits between the raw stream and the accumulator.
//! The contiguous byte buffer is the canonical intermediate form that every
//! representation derives from.
//!
//! Two entry points share one drain routine. [`decode`] is the eager form.
//! [`decoder`] is the curried form and returns a reusable [`Decoder`] that
//! composes after [`dispatch`](crate::dispatch::dispatch).
//!
//! There is no partial-consumption interface. An arbitrarily large response
//! is fully materialized in memory.

use std::io::Write;
use std::str::FromStr;

use bytes::Bytes;
use flate2::write::{GzDecoder, ZlibDecoder};
use futures::StreamExt;
use log::trace;
use serde::de::DeserializeOwned;

use crate::encoding::{Encoding, UnknownEncoding};
use crate::errors::FetchError;
use crate::response::ResponseHandle;

/// The caller-selected target shape for decoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Text under a named encoding. The default representation is UTF-8 text.
    Text(Encoding),
    /// The drained byte buffer, unchanged.
    Bytes,
    /// A parsed JSON value; an empty body yields the absent-value marker.
    Json,
}

impl Default for Representation {
    fn default() -> Self {
        Representation::Text(Encoding::Utf8)
    }
}

impl FromStr for Representation {
    type Err = UnknownEncoding;

    /// `"buffer"` (or `"bytes"`) and `"json"` name their representations;
    /// any other name must be a known text encoding.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "buffer" | "bytes" => Ok(Representation::Bytes),
            "json" => Ok(Representation::Json),
            other => Ok(Representation::Text(other.parse()?)),
        }
    }
}

/// A decoded response body. Produced once per handle; the handle is consumed
/// by decoding and cannot be drained again.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Text(String),
    Bytes(Bytes),
    /// `None` is the absent-value marker for an empty body.
    Json(Option<serde_json::Value>),
}

impl Decoded {
    pub fn into_text(self) -> Option<String> {
        match self {
            Decoded::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            Decoded::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Option<serde_json::Value>> {
        match self {
            Decoded::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Drain the response body and convert it to the requested representation.
pub async fn decode(
    handle: ResponseHandle,
    representation: Representation,
) -> Result<Decoded, FetchError> {
    let buffer = drain(handle).await?;
    convert(buffer, representation)
}

/// Drain the response body as UTF-8 text.
pub async fn decode_text(handle: ResponseHandle) -> Result<String, FetchError> {
    let buffer = drain(handle).await?;
    Ok(Encoding::Utf8.decode(&buffer))
}

/// Drain the response body as raw bytes.
pub async fn decode_bytes(handle: ResponseHandle) -> Result<Bytes, FetchError> {
    let buffer = drain(handle).await?;
    Ok(Bytes::from(buffer))
}

/// Drain the response body and parse it as JSON into a typed value. An empty
/// body yields `Ok(None)`, not an error.
pub async fn decode_json<T: DeserializeOwned>(
    handle: ResponseHandle,
) -> Result<Option<T>, FetchError> {
    let buffer = drain(handle).await?;
    let text = String::from_utf8_lossy(&buffer);
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&text)?))
}

/// Curried form of [`decode`]: fix the representation now, supply the handle
/// later. Composes directly after dispatch.
pub fn decoder(representation: Representation) -> Decoder {
    Decoder { representation }
}

/// A reusable decode step with a fixed target representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    representation: Representation,
}

impl Decoder {
    pub async fn run(self, handle: ResponseHandle) -> Result<Decoded, FetchError> {
        decode(handle, self.representation).await
    }
}

/// Drain the whole body stream into one contiguous buffer, decompressing on
/// the way when the response declares gzip or deflate. Chunks accumulate in
/// emission order; a stream error or malformed compressed input discards any
/// partial data and surfaces the failure.
async fn drain(handle: ResponseHandle) -> Result<Vec<u8>, FetchError> {
    let mut sink = BodySink::for_encoding(handle.content_encoding().as_deref());
    let mut stream = handle.into_body_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Stream)?;
        sink.write(&chunk).map_err(FetchError::Decompress)?;
    }

    let buffer = sink.finish().map_err(FetchError::Decompress)?;
    trace!("drained {} body bytes", buffer.len());
    Ok(buffer)
}

fn convert(buffer: Vec<u8>, representation: Representation) -> Result<Decoded, FetchError> {
    match representation {
        Representation::Bytes => Ok(Decoded::Bytes(Bytes::from(buffer))),
        Representation::Json => {
            let text = String::from_utf8_lossy(&buffer);
            if text.is_empty() {
                return Ok(Decoded::Json(None));
            }
            Ok(Decoded::Json(Some(serde_json::from_str(&text)?)))
        }
        Representation::Text(encoding) => Ok(Decoded::Text(encoding.decode(&buffer))),
    }
}

/// Accumulator spliced between the raw body stream and the final buffer.
/// Plain responses append directly; declared gzip/deflate bodies pass through
/// the matching decompressor chunk by chunk.
enum BodySink {
    Plain(Vec<u8>),
    Gzip(GzDecoder<Vec<u8>>),
    Deflate(ZlibDecoder<Vec<u8>>),
}

impl BodySink {
    fn for_encoding(content_encoding: Option<&str>) -> Self {
        match content_encoding {
            Some("gzip") => BodySink::Gzip(GzDecoder::new(Vec::new())),
            Some("deflate") => BodySink::Deflate(ZlibDecoder::new(Vec::new())),
            _ => BodySink::Plain(Vec::new()),
        }
    }

    fn write(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        match self {
            BodySink::Plain(buffer) => {
                buffer.extend_from_slice(chunk);
                Ok(())
            }
            BodySink::Gzip(decoder) => decoder.write_all(chunk),
            BodySink::Deflate(decoder) => decoder.write_all(chunk),
        }
    }

    fn finish(self) -> std::io::Result<Vec<u8>> {
        match self {
            BodySink::Plain(buffer) => Ok(buffer),
            BodySink::Gzip(decoder) => decoder.finish(),
            BodySink::Deflate(decoder) => decoder.finish(),
        }
    }
}
