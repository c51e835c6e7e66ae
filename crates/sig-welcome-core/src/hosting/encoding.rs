//! Transport decoding of file content returned by the hosting API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// File content could not be decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid transport encoding: {0}")]
pub struct DecodeError(#[from] pub base64::DecodeError);

/// Decodes base64 file content.
///
/// Hosting APIs wrap long content across lines, so ASCII whitespace is dropped
/// before decoding. Anything else that is not valid base64 is an error.
pub fn decode_transport(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}

/// Encodes bytes the way the hosting API transports them.
pub fn encode_transport(raw: &[u8]) -> String {
    STANDARD.encode(raw)
}
