//! Base64 and data URI helpers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::DecodeError;

/// Encodes a whole buffer with the standard, padded base64 alphabet.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Wraps `bytes` into a `data:<mime>;base64,` URI.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", to_base64(bytes))
}

/// Returns whether `source` looks like a data URI rather than a URL or path.
pub fn is_data_uri(source: &str) -> bool {
    source
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Decodes the base64 payload that follows the first comma of a data URI.
///
/// Whitespace inside the payload is ignored, since encoders commonly wrap long lines.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, DecodeError> {
    let (_, payload) = uri.split_once(',').ok_or(DecodeError::MissingComma)?;
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

/// Lenient variant of [`decode_data_uri`] for optional images: malformed input yields an empty
/// buffer.
pub fn data_uri_bytes_or_empty(uri: &str) -> Vec<u8> {
    match decode_data_uri(uri) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("Ignoring undecodable data URI: {err}");
            Vec::new()
        }
    }
}
