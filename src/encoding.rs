use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;

/// Named text encodings a drained body can be rendered under. Matches the
/// buffer-to-string encoding set of the platform: conversions are total, and
/// lossy where the platform's are lossy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    /// Little-endian UTF-16; a trailing odd byte is dropped. `ucs2` alias.
    Utf16Le,
    /// Each byte becomes the code point of the same value. `binary` alias.
    Latin1,
    /// Like latin1 with the high bit stripped.
    Ascii,
    Base64,
    /// URL-safe alphabet, unpadded.
    Base64Url,
    Hex,
}

impl Encoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Encoding::Ascii => bytes.iter().map(|&b| (b & 0x7f) as char).collect(),
            Encoding::Base64 => STANDARD.encode(bytes),
            Encoding::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
            Encoding::Hex => {
                use std::fmt::Write;
                bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
                    let _ = write!(out, "{b:02x}");
                    out
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown encoding name: {0}")]
pub struct UnknownEncoding(pub String);

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Encoding::Utf16Le),
            "latin1" | "binary" => Ok(Encoding::Latin1),
            "ascii" => Ok(Encoding::Ascii),
            "base64" => Ok(Encoding::Base64),
            "base64url" => Ok(Encoding::Base64Url),
            "hex" => Ok(Encoding::Hex),
            _ => Err(UnknownEncoding(name.to_string())),
        }
    }
}
