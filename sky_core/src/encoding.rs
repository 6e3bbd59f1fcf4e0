//! Sia-style binary encodings.
//!
//! Integers are 8-byte little-endian; variable-length byte strings are
//! prefixed with their length encoded the same way.

use bytes::{BufMut, BytesMut};

/// Encodes `n` as 8 little-endian bytes.
pub fn encode_u64(n: u64) -> [u8; 8] {
    n.to_le_bytes()
}

/// Encodes `bytes` prefixed with its length.
pub fn encode_prefixed_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(8 + bytes.len());
    buf.put_u64_le(bytes.len() as u64);
    buf.put_slice(bytes);
    buf.to_vec()
}

/// Encodes the UTF-8 bytes of `s` prefixed with their length.
pub fn encode_utf8_string(s: &str) -> Vec<u8> {
    encode_prefixed_bytes(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_u64() {
        assert_eq!(encode_u64(0), [0u8; 8]);
        assert_eq!(encode_u64(1), [1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode_u64(256), [0, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode_u64(u64::MAX), [0xff; 8]);
    }

    #[test]
    fn test_encode_prefixed_bytes() {
        assert_eq!(encode_prefixed_bytes(b""), vec![0u8; 8]);
        assert_eq!(
            encode_prefixed_bytes(b"{}"),
            vec![2, 0, 0, 0, 0, 0, 0, 0, b'{', b'}']
        );
    }

    #[test]
    fn test_encode_utf8_string_counts_bytes_not_chars() {
        let encoded = encode_utf8_string("é");
        assert_eq!(encoded[0], 2);
        assert_eq!(&encoded[8..], "é".as_bytes());
    }
}
