//! secp256k1 reference signing primitive.
//!
//! Thin wrappers over `k256` that plug into the curve-agnostic
//! [`Signer`](crate::signature::Signer) and
//! [`SignatureVerifier`](crate::signature::SignatureVerifier) traits.

pub mod private_key;
pub mod public_key;

pub use private_key::PrivateKey;
pub use public_key::{PublicKey, Secp256k1Verifier};
