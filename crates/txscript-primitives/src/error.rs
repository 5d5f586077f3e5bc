/// Unified error type for all primitives operations.
///
/// Covers wire decoding, hashing helpers, base58 text, keys and signature encoding.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("truncated input: needed {needed} bytes at offset {offset}, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signature is not canonically encoded: {0}")]
    NonCanonicalSignature(String),

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid base58 character {character:?} at index {index}")]
    InvalidBase58Character { character: char, index: usize },

    #[error("invalid base58: {0}")]
    InvalidBase58(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
