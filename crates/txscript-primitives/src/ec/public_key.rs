//! secp256k1 public key and verifier.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{self, VerifyingKey};

use crate::hash::hash160;
use crate::signature::{Signature, SignatureVerifier};
use crate::PrimitivesError;

/// A secp256k1 public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    pub(crate) fn from_verifying_key(inner: VerifyingKey) -> Self {
        PublicKey { inner }
    }

    /// Parse a SEC1 encoded key (33-byte compressed or 65-byte uncompressed).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Parse a hex-encoded SEC1 key.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// 33-byte compressed SEC1 encoding.
    pub fn to_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out.copy_from_slice(self.inner.to_encoded_point(true).as_bytes());
        out
    }

    /// 65-byte uncompressed SEC1 encoding.
    pub fn to_uncompressed(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out.copy_from_slice(self.inner.to_encoded_point(false).as_bytes());
        out
    }

    /// Hash160 of the compressed encoding.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify a DER signature over a 32-byte digest.
    ///
    /// High-S signatures verify; the LOW_S policy is enforced by callers.
    pub fn verify(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        let sig = match ecdsa::Signature::from_der(&signature.to_der()) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        let sig = sig.normalize_s().unwrap_or(sig);
        self.inner.verify_prehash(digest, &sig).is_ok()
    }
}

/// [`SignatureVerifier`] for SEC1-encoded secp256k1 keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Verifier;

impl SignatureVerifier for Secp256k1Verifier {
    fn verify_digest(&self, public_key: &[u8], digest: &[u8; 32], signature: &Signature) -> bool {
        match PublicKey::from_bytes(public_key) {
            Ok(key) => key.verify(digest, signature),
            Err(_) => false,
        }
    }
}
