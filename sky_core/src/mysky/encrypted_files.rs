//! Padded, authenticated encryption of small files.
//!
//! ```text
//! nonce (24) || XChaCha20-Poly1305( meta (16) || data || zero padding ) || tag (16)
//!
//! meta = version (1) || 7 zero bytes || u64le(len(data))
//! ```
//!
//! The total length is always a padded block size (see [`pad_file_size`]),
//! so ciphertexts only reveal the size bucket of the plaintext.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use zeroize::Zeroize;

use crate::error::{EntropyError, ValidationError};

const KIB: u64 = 1 << 10;
const MIN_BLOCK_SIZE: u64 = 4 * KIB;
const MIN_BLOCK_RANGE: u64 = 80 * KIB;

const NONCE_LENGTH: usize = 24;
const TAG_LENGTH: usize = 16;
const METADATA_LENGTH: usize = 16;
const ENCRYPTED_FILE_VERSION: u8 = 1;

/// Bytes an encrypted file carries on top of its data, before padding.
pub const ENCRYPTED_FILE_OVERHEAD: usize = NONCE_LENGTH + METADATA_LENGTH + TAG_LENGTH;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncryptionError {
    #[error("encrypted file is {0} bytes, shorter than the 56 byte overhead")]
    TooShort(usize),

    #[error("encrypted file size {0} is not a padded block size")]
    NotPadded(usize),

    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed: wrong key or corrupted file")]
    DecryptFailed,

    #[error("unsupported encrypted file version {0}")]
    UnsupportedVersion(u8),

    #[error("encrypted file declares {declared} data bytes but holds {available}")]
    InconsistentLength { declared: u64, available: usize },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Entropy(#[from] EntropyError),
}

/// Rounds `size` up to the next padded block size.
///
/// Sizes up to 80 KiB are padded to 4 KiB blocks; each time the range
/// doubles, so does the block size (8 KiB blocks up to 160 KiB, 16 KiB up
/// to 320 KiB, ...).
pub fn pad_file_size(size: u64) -> Result<u64, ValidationError> {
    let block = block_size_for(size)?;
    Ok(size.div_ceil(block) * block)
}

/// Whether `size` is already a padded block size.
pub fn check_padded_block(size: u64) -> Result<bool, ValidationError> {
    let block = block_size_for(size)?;
    Ok(size % block == 0)
}

fn block_size_for(size: u64) -> Result<u64, ValidationError> {
    for n in 0..u64::BITS {
        let Some(range) = MIN_BLOCK_RANGE.checked_mul(1 << n) else {
            break;
        };
        if size <= range {
            return Ok(MIN_BLOCK_SIZE << n);
        }
    }
    Err(ValidationError::PaddingOverflow(size))
}

/// Encrypts `data` under `key` with a fresh random nonce.
pub fn encrypt_file_bytes(key: &[u8; 32], data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let mut nonce = [0u8; NONCE_LENGTH];
    getrandom::getrandom(&mut nonce).map_err(|e| EntropyError(e.to_string()))?;
    encrypt_file_bytes_with_nonce(key, data, &nonce)
}

/// Encrypts `data` under `key` with the given nonce.
///
/// A nonce must never be reused with the same key; outside of tests use
/// [`encrypt_file_bytes`].
pub fn encrypt_file_bytes_with_nonce(
    key: &[u8; 32],
    data: &[u8],
    nonce: &[u8; NONCE_LENGTH],
) -> Result<Vec<u8>, EncryptionError> {
    let total = pad_file_size((data.len() + ENCRYPTED_FILE_OVERHEAD) as u64)? as usize;

    let mut plaintext = Vec::with_capacity(total - NONCE_LENGTH - TAG_LENGTH);
    plaintext.push(ENCRYPTED_FILE_VERSION);
    plaintext.extend_from_slice(&[0u8; 7]);
    plaintext.extend_from_slice(&(data.len() as u64).to_le_bytes());
    plaintext.extend_from_slice(data);
    plaintext.resize(total - NONCE_LENGTH - TAG_LENGTH, 0);

    let cipher = XChaCha20Poly1305::new(key.into());
    let ciphertext = cipher.encrypt(XNonce::from_slice(nonce), plaintext.as_slice());
    plaintext.zeroize();
    let ciphertext = ciphertext.map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Reverses [`encrypt_file_bytes`], returning the original data.
pub fn decrypt_file_bytes(key: &[u8; 32], encrypted: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if encrypted.len() < ENCRYPTED_FILE_OVERHEAD {
        return Err(EncryptionError::TooShort(encrypted.len()));
    }
    if !check_padded_block(encrypted.len() as u64)? {
        return Err(EncryptionError::NotPadded(encrypted.len()));
    }

    let (nonce, ciphertext) = encrypted.split_at(NONCE_LENGTH);
    let cipher = XChaCha20Poly1305::new(key.into());
    let mut plaintext = cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| EncryptionError::DecryptFailed)?;

    let result = read_padded_plaintext(&plaintext);
    plaintext.zeroize();
    result
}

fn read_padded_plaintext(plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let (meta, body) = plaintext.split_at(METADATA_LENGTH);
    if meta[0] != ENCRYPTED_FILE_VERSION {
        return Err(EncryptionError::UnsupportedVersion(meta[0]));
    }

    let mut len = [0u8; 8];
    len.copy_from_slice(&meta[8..]);
    let declared = u64::from_le_bytes(len);
    let inconsistent = EncryptionError::InconsistentLength {
        declared,
        available: body.len(),
    };

    let declared_len = usize::try_from(declared).map_err(|_| inconsistent.clone())?;
    if declared_len > body.len() {
        return Err(inconsistent);
    }
    let (data, padding) = body.split_at(declared_len);
    if padding.iter().any(|&b| b != 0) {
        return Err(inconsistent);
    }
    Ok(data.to_vec())
}
