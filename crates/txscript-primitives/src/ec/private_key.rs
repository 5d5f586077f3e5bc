//! secp256k1 private key.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{self, SigningKey};

use crate::ec::public_key::PublicKey;
use crate::signature::{Signature, Signer};
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key.
///
/// Signs 32-byte digests with RFC 6979 deterministic nonces and always
/// emits low-S signatures.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Create a private key from a raw 32-byte scalar.
    ///
    /// # Returns
    /// An error if the slice has the wrong length, or the scalar is zero or
    /// not below the group order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// Raw 32-byte scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(*self.inner.verifying_key())
    }

    /// Sign a 32-byte digest.
    ///
    /// # Returns
    /// A DER signature with low S and no hash type attached.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        let sig: ecdsa::Signature = self
            .inner
            .sign_prehash(digest)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        Ok(Signature::from_der(sig.to_der().as_bytes())?.with_compressed_hint(true))
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

impl Signer for PrivateKey {
    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        self.sign(digest)
    }

    fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key().to_compressed().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;
    use crate::signature::{is_canonical_tx_der, SIGHASH_ALL};

    #[test]
    fn test_rfc6979_vectors() {
        let tests = [
            (
                "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50",
                "sample",
                "3045022100af340daf02cc15c8d5d08d7735dfe6b98a474ed373bdb5fbecf7571be52b384202205009fb27f37034a9b24b707b7c6b79ca23ddef9e25f7282e8a797efe53a8f124",
            ),
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                "Satoshi Nakamoto",
                "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d802202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            ),
            (
                "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181",
                "Alan Turing",
                "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
            ),
        ];

        for (key_hex, msg, expected) in tests {
            let key = PrivateKey::from_hex(key_hex).unwrap();
            let digest = sha256(msg.as_bytes());
            let sig = key.sign(&digest).unwrap();
            assert_eq!(hex::encode(sig.to_der()), expected, "message {:?}", msg);
            assert!(sig.has_low_s());
            assert!(is_canonical_tx_der(&sig.with_hash_type(SIGHASH_ALL).to_tx_format().unwrap()));
        }
    }

    #[test]
    fn test_from_bytes_rejects_invalid_scalars() {
        assert!(PrivateKey::from_bytes(&[0u8; 31]).is_err());
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(PrivateKey::from_hex(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        )
        .is_err());
    }

    #[test]
    fn test_signer_trait_reports_compressed_key() {
        let key = PrivateKey::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(
            hex::encode(key.public_key_bytes()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert!(key.sign_digest(&[7u8; 32]).unwrap().compressed_hint());
    }
}
