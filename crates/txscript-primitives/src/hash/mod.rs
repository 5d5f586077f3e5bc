//! Hash primitives.
//!
//! Single and double SHA-256, RIPEMD-160, SHA-1 and the Hash160
//! composition used for transaction ids, block hashes, address payloads
//! and Base58Check checksums.

use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Compute SHA-256 of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute double SHA-256: SHA-256(SHA-256(data)).
///
/// Used for transaction ids, block hashes, signature hashes and address
/// checksums.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute RIPEMD-160 of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// Compute SHA-1 of the input data.
///
/// Only reachable through `OP_SHA1`.
pub fn sha1(data: &[u8]) -> [u8; 20] {
    Sha1::digest(data).into()
}

/// Compute Hash160: RIPEMD-160(SHA-256(data)).
///
/// This is the payload hash carried by pubkey-hash and script-hash
/// addresses.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// Return the first four bytes of `sha256d(data)`.
pub fn checksum(data: &[u8]) -> [u8; 4] {
    let digest = sha256d(data);
    [digest[0], digest[1], digest[2], digest[3]]
}
