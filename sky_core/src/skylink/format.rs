//! Text encodings of the raw skylink form.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use data_encoding::BASE32HEX_NOPAD;

use super::{BASE32_ENCODED_SKYLINK_SIZE, BASE64_ENCODED_SKYLINK_SIZE, ParseError, Skylink};

/// Encodes `skylink` as 55 characters of lowercase, unpadded base32hex,
/// suitable for a DNS label.
pub fn convert_skylink_to_base32(skylink: &Skylink) -> String {
    BASE32HEX_NOPAD
        .encode(&skylink.to_bytes())
        .to_ascii_lowercase()
}

/// Encodes `skylink` as 46 characters of unpadded URL-safe base64.
pub fn convert_skylink_to_base64(skylink: &Skylink) -> String {
    URL_SAFE_NO_PAD.encode(skylink.to_bytes())
}

/// Decodes a bare skylink token, picking the encoding from its length.
///
/// Both decoders reject non-canonical input (set trailing bits, padding),
/// so every accepted token is the unique encoding of its raw bytes.
pub(crate) fn decode_token(token: &str) -> Result<Skylink, ParseError> {
    let raw = match token.len() {
        BASE64_ENCODED_SKYLINK_SIZE => {
            URL_SAFE_NO_PAD
                .decode(token)
                .map_err(|_| ParseError::InvalidEncoding {
                    encoding: "base64",
                    token: token.to_owned(),
                })?
        }
        BASE32_ENCODED_SKYLINK_SIZE => BASE32HEX_NOPAD
            .decode(token.to_ascii_uppercase().as_bytes())
            .map_err(|_| ParseError::InvalidEncoding {
                encoding: "base32",
                token: token.to_owned(),
            })?,
        len => return Err(ParseError::InvalidTokenLength(len)),
    };

    Skylink::from_bytes(&raw)
}
