//! Small convenience layer over the platform HTTP client.
//!
//! Two cooperating entry points. [`dispatch`] issues a request from a URL
//! string, a parsed [`url::Url`] or structured [`Parts`]. It selects the
//! plain or encrypted transport from the target and resolves with a live
//! [`ResponseHandle`] once response headers arrive. [`decode`] drains that
//! handle's body fully into memory and converts the buffered bytes into text
//! under a named [`Encoding`], raw bytes, or a parsed JSON value. Bodies
//! declared as gzip or deflate are decompressed transparently.
//!
//! ```no_run
//! # async fn run() -> Result<(), minifetch::FetchError> {
//! use minifetch::{decode, decoder, dispatch, Representation};
//!
//! // Eager form
//! let handle = dispatch("https://jsonplaceholder.typicode.com/todos/1").await?;
//! let value = decode(handle, Representation::Json).await?;
//!
//! // Curried form
//! let as_json = decoder(Representation::Json);
//! let handle = dispatch("https://jsonplaceholder.typicode.com/todos/2").await?;
//! let value = as_json.run(handle).await?;
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod decode;
pub mod dispatch;
pub mod encoding;
pub mod errors;
pub mod response;
pub mod target;

pub use body::Body;
pub use decode::{
    decode, decode_bytes, decode_json, decode_text, decoder, Decoded, Decoder, Representation,
};
pub use dispatch::{dispatch, dispatch_with, RequestOptions};
pub use encoding::{Encoding, UnknownEncoding};
pub use errors::FetchError;
pub use response::ResponseHandle;
pub use target::{Parts, PortSpec, Target, Transport};
