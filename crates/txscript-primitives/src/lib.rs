/// Transaction script engine - binary codec, hashing and signature encoding.
///
/// This crate provides the leaf building blocks shared by the script and
/// transaction crates:
/// - Cursor reader / append-only writer with compact variable-length integers
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, SHA-1, Hash160)
/// - Chain hash type for transaction ids and block hashes
/// - Base58 and Base58Check text encoding
/// - The signature codec (DER envelope, hash types, canonical checks)
/// - secp256k1 keys used as the reference signing primitive

pub mod codec;
pub mod hash;
pub mod chainhash;
pub mod base58;
pub mod signature;
pub mod ec;

mod error;
pub use error::PrimitivesError;
pub use chainhash::ChainHash;
pub use codec::{ByteReader, ByteWriter, VarInt};
pub use signature::{Signature, SignatureVerifier, Signer};
