//! Skylinks: fixed-width content and registry addresses.
//!
//! The raw form is 34 bytes: a little-endian `u16` bitfield followed by a
//! 32-byte payload. The two low bits of the bitfield select the version:
//!
//! - V1 (`00`): the payload is the Merkle root of the content and the rest
//!   of the bitfield encodes which byte range of it to fetch.
//! - V2 (bitfield exactly `1`): the payload is the id of a registry entry,
//!   `hash(publicKey, tweak)`, and the link resolves to whatever that entry
//!   currently points at.
//!
//! Text forms are 46 characters of unpadded URL-safe base64 (path-style URLs)
//! or 55 characters of unpadded lowercase base32hex (subdomain-style URLs).

mod bitfield;
mod format;
mod parse;
mod portal;

use std::{fmt, str::FromStr};

pub use bitfield::V1Layout;
pub use format::{convert_skylink_to_base32, convert_skylink_to_base64};
pub use parse::{ParseSkylinkOptions, ParsedSkylink, parse_skylink};
pub use portal::{SkylinkUrlOptions, get_skylink_url_for_portal};

pub(crate) use portal::parse_portal_url;

use crate::{Hash, hash::hash_all, keys::PublicKey};

/// Length of the raw binary form.
pub const RAW_SKYLINK_SIZE: usize = 34;

/// Length of the unpadded base64 form.
pub const BASE64_ENCODED_SKYLINK_SIZE: usize = 46;

/// Length of the unpadded base32 form.
pub const BASE32_ENCODED_SKYLINK_SIZE: usize = 55;

const VERSION_MASK: u16 = 0b11;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("no skylink found in {0:?}")]
    NoSkylink(String),

    #[error(
        "invalid skylink length: expected 46 (base64) or 55 (base32) characters, got {0}"
    )]
    InvalidTokenLength(usize),

    #[error("invalid {encoding} skylink {token:?}")]
    InvalidEncoding {
        encoding: &'static str,
        token: String,
    },

    #[error("invalid raw skylink length: expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("unsupported skylink version {0}")]
    UnsupportedVersion(u8),

    #[error("invalid skylink bitfield {bitfield:#06x}: {reason}")]
    InvalidBitfield { bitfield: u16, reason: &'static str },

    #[error("skylink form {0:?} is not allowed by the parse options")]
    DisallowedForm(String),

    #[error("invalid portal url {0:?}")]
    InvalidPortalUrl(String),
}

/// A content hash skylink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SkylinkV1 {
    bitfield: u16,
    merkle_root: Hash,
    layout: V1Layout,
}

impl SkylinkV1 {
    /// Builds a V1 skylink, rejecting bitfields that are not well-formed V1
    /// layouts.
    pub fn from_parts(bitfield: u16, merkle_root: Hash) -> Result<Self, ParseError> {
        let layout = bitfield::parse_v1_bitfield(bitfield)?;
        Ok(Self {
            bitfield,
            merkle_root,
            layout,
        })
    }

    pub fn bitfield(&self) -> u16 {
        self.bitfield
    }

    pub fn merkle_root(&self) -> &Hash {
        &self.merkle_root
    }

    /// Byte offset of the linked range within the uploaded data.
    pub fn offset(&self) -> u64 {
        self.layout.offset
    }

    /// Number of bytes to fetch starting at [`SkylinkV1::offset`].
    pub fn fetch_size(&self) -> u64 {
        self.layout.fetch_size
    }
}

/// A registry pointer skylink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SkylinkV2 {
    entry_id: Hash,
}

impl SkylinkV2 {
    /// The only bitfield a V2 skylink may carry.
    pub const BITFIELD: u16 = 1;

    /// Points at the registry entry owned by `public_key` under `tweak`.
    pub fn new(public_key: &PublicKey, tweak: &Hash) -> Self {
        let entry_id = hash_all(&[&public_key.sia_encoding(), tweak.as_bytes()]);
        Self { entry_id }
    }

    pub fn from_entry_id(entry_id: Hash) -> Self {
        Self { entry_id }
    }

    /// `hash(sia_encoding(publicKey), tweak)` of the entry this link resolves through.
    pub fn entry_id(&self) -> &Hash {
        &self.entry_id
    }
}

/// A parsed, validated skylink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Skylink {
    V1(SkylinkV1),
    V2(SkylinkV2),
}

impl Skylink {
    /// Decodes and validates the raw 34-byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() != RAW_SKYLINK_SIZE {
            return Err(ParseError::WrongLength {
                expected: RAW_SKYLINK_SIZE,
                actual: bytes.len(),
            });
        }

        let bitfield = u16::from_le_bytes([bytes[0], bytes[1]]);
        let mut payload = [0u8; 32];
        payload.copy_from_slice(&bytes[2..]);
        let payload = Hash::from_bytes(payload);

        match bitfield & VERSION_MASK {
            0 => Ok(Skylink::V1(SkylinkV1::from_parts(bitfield, payload)?)),
            1 if bitfield == SkylinkV2::BITFIELD => Ok(Skylink::V2(SkylinkV2::from_entry_id(payload))),
            1 => Err(ParseError::InvalidBitfield {
                bitfield,
                reason: "V2 skylinks must not set any bit besides the version",
            }),
            version => Err(ParseError::UnsupportedVersion(version as u8 + 1)),
        }
    }

    /// The canonical raw form.
    pub fn to_bytes(&self) -> [u8; RAW_SKYLINK_SIZE] {
        let mut raw = [0u8; RAW_SKYLINK_SIZE];
        raw[..2].copy_from_slice(&self.bitfield().to_le_bytes());
        raw[2..].copy_from_slice(self.payload().as_bytes());
        raw
    }

    pub fn bitfield(&self) -> u16 {
        match self {
            Skylink::V1(link) => link.bitfield,
            Skylink::V2(_) => SkylinkV2::BITFIELD,
        }
    }

    /// Merkle root for V1, entry id for V2.
    pub fn payload(&self) -> &Hash {
        match self {
            Skylink::V1(link) => &link.merkle_root,
            Skylink::V2(link) => &link.entry_id,
        }
    }

    /// Protocol version number (1 or 2).
    pub fn version(&self) -> u8 {
        match self {
            Skylink::V1(_) => 1,
            Skylink::V2(_) => 2,
        }
    }

    pub fn is_v1(&self) -> bool {
        matches!(self, Skylink::V1(_))
    }

    pub fn is_v2(&self) -> bool {
        matches!(self, Skylink::V2(_))
    }

    pub fn to_base64(&self) -> String {
        convert_skylink_to_base64(self)
    }

    pub fn to_base32(&self) -> String {
        convert_skylink_to_base32(self)
    }
}

/// Whether `skylink` addresses content directly.
pub fn is_skylink_v1(skylink: &Skylink) -> bool {
    skylink.is_v1()
}

/// Whether `skylink` points at a registry entry.
pub fn is_skylink_v2(skylink: &Skylink) -> bool {
    skylink.is_v2()
}

impl fmt::Display for Skylink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl FromStr for Skylink {
    type Err = ParseError;

    /// Decodes a bare base64 or base32 skylink, without prefixes or paths.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        format::decode_token(s)
    }
}

impl From<SkylinkV1> for Skylink {
    fn from(value: SkylinkV1) -> Self {
        Skylink::V1(value)
    }
}

impl From<SkylinkV2> for Skylink {
    fn from(value: SkylinkV2) -> Self {
        Skylink::V2(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKYLINK: &str = "XABvi7JtJbQSMAcDwnUnmp2FKDPjg8_tTTFP4BwMSxVdEg";

    fn raw(bitfield: u16, fill: u8) -> Vec<u8> {
        let mut bytes = bitfield.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[fill; 32]);
        bytes
    }

    #[test]
    fn test_known_skylink_decodes_as_v1() {
        let skylink: Skylink = SKYLINK.parse().unwrap();
        let Skylink::V1(v1) = skylink else {
            panic!("expected a V1 skylink");
        };
        assert_eq!(v1.bitfield(), 0x005c);
        assert_eq!(
            v1.merkle_root().to_hex(),
            "6f8bb26d25b412300703c275279a9d852833e383cfed4d314fe01c0c4b155d12"
        );
        assert_eq!(v1.offset(), 0);
        assert_eq!(v1.fetch_size(), 196_608);
        assert_eq!(skylink.version(), 1);
        assert_eq!(skylink.to_string(), SKYLINK);
    }

    #[test]
    fn test_raw_roundtrip() {
        for bytes in [raw(0, 1), raw(SkylinkV2::BITFIELD, 2), raw(0x005c, 3)] {
            let skylink = Skylink::from_bytes(&bytes).unwrap();
            assert_eq!(skylink.to_bytes().as_slice(), bytes.as_slice());
        }
    }

    #[test]
    fn test_wrong_raw_length() {
        let short = vec![0u8; RAW_SKYLINK_SIZE - 1];
        let long = vec![0u8; RAW_SKYLINK_SIZE + 1];
        assert_eq!(
            Skylink::from_bytes(&short),
            Err(ParseError::WrongLength {
                expected: 34,
                actual: 33
            })
        );
        assert_eq!(
            Skylink::from_bytes(&long),
            Err(ParseError::WrongLength {
                expected: 34,
                actual: 35
            })
        );
    }

    #[test]
    fn test_unsupported_versions() {
        assert_eq!(
            Skylink::from_bytes(&raw(0b10, 0)),
            Err(ParseError::UnsupportedVersion(3))
        );
        assert_eq!(
            Skylink::from_bytes(&raw(0b11, 0)),
            Err(ParseError::UnsupportedVersion(4))
        );
    }

    #[test]
    fn test_v2_rejects_extra_bits() {
        assert!(matches!(
            Skylink::from_bytes(&raw(0b101, 0)),
            Err(ParseError::InvalidBitfield { bitfield: 5, .. })
        ));
    }

    #[test]
    fn test_version_discrimination() {
        let v1 = Skylink::from_bytes(&raw(0, 9)).unwrap();
        let v2 = Skylink::from_bytes(&raw(1, 9)).unwrap();

        assert!(is_skylink_v1(&v1) && !is_skylink_v2(&v1));
        assert!(is_skylink_v2(&v2) && !is_skylink_v1(&v2));
        assert_eq!(v2.version(), 2);
        assert_eq!(v1.payload(), v2.payload());
        assert_ne!(v1, v2);
    }

    #[test]
    fn test_v2_from_public_key_and_tweak() {
        let public_key: PublicKey =
            "ed25519:d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
                .parse()
                .unwrap();
        let tweak = crate::hash_data_key("file.json");
        let skylink = Skylink::from(SkylinkV2::new(&public_key, &tweak));

        assert_eq!(
            skylink.to_base64(),
            "AQCdokYi-EM4f83IdMJtkjp96ya_kjoZvCl-aiXqyWcRZQ"
        );
        assert_eq!(
            skylink.to_base32(),
            "0409r8i64bs46e3vpn479gjdi8t7rqp6nu93k6ds55v6k9fap5jh2p8"
        );
    }
}
