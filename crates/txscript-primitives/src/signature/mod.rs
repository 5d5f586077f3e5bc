//! Signature codec.
//!
//! A transaction signature travels as a DER envelope followed by one
//! hash-type byte. [`Signature`] keeps the DER body with its `0x30` header
//! stripped and re-adds the header on encode. The codec never assumes a
//! particular curve: structural canonicality is checked on the envelope
//! alone, and the only curve-specific rule is the secp256k1 low-S bound.
//!
//! Signing and verification primitives plug in through the [`Signer`] and
//! [`SignatureVerifier`] traits.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::PrimitivesError;

/// Sign all inputs and outputs.
pub const SIGHASH_ALL: u8 = 0x01;
/// Sign all inputs and no outputs.
pub const SIGHASH_NONE: u8 = 0x02;
/// Sign all inputs and the output at the same index.
pub const SIGHASH_SINGLE: u8 = 0x03;
/// Modifier: sign only the current input.
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;
/// Mask selecting the base hash type.
pub const SIGHASH_MASK: u8 = 0x1f;

/// The DER sequence tag that is stripped from the stored body.
pub const DER_HEADER: u8 = 0x30;

/// Half of the secp256k1 group order.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

/// First byte of a compact signature for recovery id 0, uncompressed key.
const COMPACT_RECOVERY_BASE: u8 = 27;
/// Added to the compact header when the signing key is compressed.
const COMPACT_COMPRESSED_FLAG: u8 = 4;

/// Header byte and body of a DER envelope as found on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerEnvelope<'a> {
    /// First byte, normally `0x30`.
    pub header: u8,
    /// Everything after the header byte.
    pub body: &'a [u8],
}

/// Split a DER envelope into its header byte and body.
///
/// A header other than `0x30` is accepted; only an empty buffer is an error.
pub fn parse_der(bytes: &[u8]) -> Result<DerEnvelope<'_>, PrimitivesError> {
    match bytes.split_first() {
        Some((&header, body)) => Ok(DerEnvelope { header, body }),
        None => Err(PrimitivesError::InvalidSignature(
            "empty DER signature".to_string(),
        )),
    }
}

/// Strict structural check of a tx-format signature (DER plus hash-type byte).
///
/// Never fails: any violation yields `false`.
pub fn is_canonical_tx_der(buf: &[u8]) -> bool {
    let len = buf.len();
    if !(9..=73).contains(&len) {
        return false;
    }
    if buf[0] != DER_HEADER || buf[1] as usize != len - 3 {
        return false;
    }
    let len_r = buf[3] as usize;
    if 5 + len_r >= len {
        return false;
    }
    let len_s = buf[5 + len_r] as usize;
    if len_r + len_s + 7 != len {
        return false;
    }

    if buf[2] != 0x02 || len_r == 0 {
        return false;
    }
    let r = &buf[4..4 + len_r];
    if !is_canonical_der_int(r) {
        return false;
    }

    if buf[4 + len_r] != 0x02 || len_s == 0 {
        return false;
    }
    let s = &buf[6 + len_r..6 + len_r + len_s];
    is_canonical_der_int(s)
}

/// Non-negative and not over-padded.
fn is_canonical_der_int(v: &[u8]) -> bool {
    if v[0] & 0x80 != 0 {
        return false;
    }
    !(v.len() > 1 && v[0] == 0x00 && v[1] & 0x80 == 0)
}

/// Minimal big-endian DER integer content for an unsigned magnitude.
fn der_int(magnitude: &[u8]) -> Vec<u8> {
    let start = magnitude.iter().position(|&b| b != 0).unwrap_or(magnitude.len());
    let trimmed = &magnitude[start..];
    if trimmed.is_empty() {
        return vec![0x00];
    }
    let mut out = Vec::with_capacity(trimmed.len() + 1);
    if trimmed[0] & 0x80 != 0 {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}

/// Left-pad an unsigned magnitude to 32 bytes, dropping DER sign padding.
fn to_32_bytes(v: &[u8]) -> Result<[u8; 32], PrimitivesError> {
    let start = v.iter().position(|&b| b != 0).unwrap_or(v.len());
    let trimmed = &v[start..];
    if trimmed.len() > 32 {
        return Err(PrimitivesError::InvalidSignature(
            "integer value too large for 32 bytes".to_string(),
        ));
    }
    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(out)
}

/// A transaction or message signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    der_body: Vec<u8>,
    hash_type: Option<u8>,
    compressed_hint: bool,
    recovery_id: Option<u8>,
}

impl Signature {
    /// Build a signature from a DER envelope with no hash type.
    ///
    /// The header byte is not validated; see [`parse_der`].
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let envelope = parse_der(bytes)?;
        Ok(Signature {
            der_body: envelope.body.to_vec(),
            hash_type: None,
            compressed_hint: false,
            recovery_id: None,
        })
    }

    /// Build a canonical DER signature from big-endian R and S magnitudes.
    pub fn from_components(r: &[u8], s: &[u8]) -> Self {
        let rb = der_int(r);
        let sb = der_int(s);
        let content_len = 4 + rb.len() + sb.len();
        let mut body = Vec::with_capacity(content_len + 1);
        body.push(content_len as u8);
        body.push(0x02);
        body.push(rb.len() as u8);
        body.extend_from_slice(&rb);
        body.push(0x02);
        body.push(sb.len() as u8);
        body.extend_from_slice(&sb);
        Signature {
            der_body: body,
            hash_type: None,
            compressed_hint: false,
            recovery_id: None,
        }
    }

    /// Parse a 65-byte compact (recoverable) message signature.
    ///
    /// The first byte is `27 + recovery_id`, plus 4 when the key is
    /// compressed, so it must lie in `27..=34`.
    pub fn from_compact(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != 65 {
            return Err(PrimitivesError::InvalidSignature(format!(
                "compact signature must be 65 bytes, got {}",
                bytes.len()
            )));
        }
        let header = bytes[0];
        let mut recovery = header.wrapping_sub(COMPACT_RECOVERY_BASE);
        let compressed = recovery >= COMPACT_COMPRESSED_FLAG;
        if compressed {
            recovery -= COMPACT_COMPRESSED_FLAG;
        }
        if recovery > 3 {
            return Err(PrimitivesError::InvalidRecoveryId(header));
        }
        let mut sig = Signature::from_components(&bytes[1..33], &bytes[33..65]);
        sig.compressed_hint = compressed;
        sig.recovery_id = Some(recovery);
        Ok(sig)
    }

    /// Parse the on-chain form: DER envelope followed by a hash-type byte.
    pub fn from_tx_format(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let (&hash_type, der) = bytes.split_last().ok_or_else(|| {
            PrimitivesError::InvalidSignature("empty tx signature".to_string())
        })?;
        let mut sig = Signature::from_der(der)?;
        sig.hash_type = Some(hash_type);
        Ok(sig)
    }

    /// Parse the on-chain form, rejecting anything that is not strictly canonical.
    pub fn from_canonical_tx_format(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if !is_canonical_tx_der(bytes) {
            return Err(PrimitivesError::NonCanonicalSignature(
                "DER envelope fails the canonical structure check".to_string(),
            ));
        }
        let sig = Signature::from_tx_format(bytes)?;
        if !sig.has_defined_hash_type() {
            return Err(PrimitivesError::NonCanonicalSignature(format!(
                "undefined hash type 0x{:02x}",
                sig.hash_type.unwrap_or_default()
            )));
        }
        Ok(sig)
    }

    /// DER envelope with the `0x30` header re-prepended.
    pub fn to_der(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.der_body.len() + 1);
        out.push(DER_HEADER);
        out.extend_from_slice(&self.der_body);
        out
    }

    /// On-chain form: DER envelope followed by the hash-type byte.
    pub fn to_tx_format(&self) -> Result<Vec<u8>, PrimitivesError> {
        let hash_type = self.hash_type.ok_or_else(|| {
            PrimitivesError::InvalidSignature("signature has no hash type".to_string())
        })?;
        let mut out = self.to_der();
        out.push(hash_type);
        Ok(out)
    }

    /// 65-byte compact form. Requires a recovery id and 32-byte R/S values.
    pub fn to_compact(&self) -> Result<[u8; 65], PrimitivesError> {
        let recovery = self.recovery_id.ok_or_else(|| {
            PrimitivesError::InvalidSignature("signature has no recovery id".to_string())
        })?;
        let (r, s) = self.der_components()?;
        let mut out = [0u8; 65];
        out[0] = COMPACT_RECOVERY_BASE
            + recovery
            + if self.compressed_hint { COMPACT_COMPRESSED_FLAG } else { 0 };
        out[1..33].copy_from_slice(&to_32_bytes(r)?);
        out[33..65].copy_from_slice(&to_32_bytes(s)?);
        Ok(out)
    }

    /// Extract the R and S integer contents from the DER body.
    pub fn der_components(&self) -> Result<(&[u8], &[u8]), PrimitivesError> {
        let body = &self.der_body;
        let malformed = |what: &str| PrimitivesError::InvalidSignature(format!("malformed DER: {}", what));
        if body.len() < 5 {
            return Err(malformed("too short"));
        }
        if body[0] as usize != body.len() - 1 {
            return Err(malformed("length byte does not match body"));
        }
        if body[1] != 0x02 {
            return Err(malformed("missing R integer marker"));
        }
        let len_r = body[2] as usize;
        let s_marker = 3 + len_r;
        if len_r == 0 || s_marker + 2 > body.len() {
            return Err(malformed("bad R length"));
        }
        if body[s_marker] != 0x02 {
            return Err(malformed("missing S integer marker"));
        }
        let len_s = body[s_marker + 1] as usize;
        let s_start = s_marker + 2;
        if len_s == 0 || s_start + len_s != body.len() {
            return Err(malformed("bad S length"));
        }
        Ok((&body[3..s_marker], &body[s_start..]))
    }

    /// True iff, ignoring ANYONECANPAY, the hash type is ALL, NONE or SINGLE.
    pub fn has_defined_hash_type(&self) -> bool {
        match self.hash_type {
            Some(t) => matches!(t & !SIGHASH_ANYONECANPAY, SIGHASH_ALL..=SIGHASH_SINGLE),
            None => false,
        }
    }

    /// True iff `1 <= S <= n/2` for the secp256k1 order `n`.
    pub fn has_low_s(&self) -> bool {
        let s = match self.der_components() {
            Ok((_, s)) => BigUint::from_bytes_be(s),
            Err(_) => return false,
        };
        !s.is_zero() && s <= BigUint::from_bytes_be(&SECP256K1_HALF_ORDER)
    }

    /// Return a copy carrying the given hash type.
    pub fn with_hash_type(mut self, hash_type: u8) -> Self {
        self.hash_type = Some(hash_type);
        self
    }

    /// Return a copy carrying the given compression hint.
    pub fn with_compressed_hint(mut self, compressed: bool) -> Self {
        self.compressed_hint = compressed;
        self
    }

    /// Return a copy carrying the given recovery id (0..=3).
    pub fn with_recovery_id(mut self, recovery_id: u8) -> Result<Self, PrimitivesError> {
        if recovery_id > 3 {
            return Err(PrimitivesError::InvalidRecoveryId(recovery_id));
        }
        self.recovery_id = Some(recovery_id);
        Ok(self)
    }

    /// DER body without the `0x30` header.
    pub fn der_body(&self) -> &[u8] {
        &self.der_body
    }

    pub fn hash_type(&self) -> Option<u8> {
        self.hash_type
    }

    pub fn compressed_hint(&self) -> bool {
        self.compressed_hint
    }

    pub fn recovery_id(&self) -> Option<u8> {
        self.recovery_id
    }
}

/// Produces signatures over 32-byte digests.
pub trait Signer {
    /// Sign a digest, returning a signature without a hash type.
    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, PrimitivesError>;

    /// Encoded public key matching this signer.
    fn public_key_bytes(&self) -> Vec<u8>;
}

/// Checks signatures over 32-byte digests.
pub trait SignatureVerifier {
    /// Return true if `signature` over `digest` verifies under `public_key`.
    fn verify_digest(&self, public_key: &[u8], digest: &[u8; 32], signature: &Signature) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_DER: &str = "304402204e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd41\
                             0220181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d09";
    const R_HEX: &str = "4e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd41";
    const S_HEX: &str = "181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d09";
    const HIGH_S_HEX: &str = "971729c7fa944b465b35250c6570a2f31acbb14b13d1565fab7330dcb2b3dfb1";

    fn tx_format(der_hex: &str, hash_type: u8) -> Vec<u8> {
        let mut v = hex::decode(der_hex).expect("valid hex");
        v.push(hash_type);
        v
    }

    // ---- DER envelope ----

    #[test]
    fn test_parse_der_keeps_any_header() {
        let env = parse_der(&[0x31, 0x01, 0x02]).expect("non-empty");
        assert_eq!(env.header, 0x31);
        assert_eq!(env.body, &[0x01, 0x02]);
        assert!(parse_der(&[]).is_err());
    }

    #[test]
    fn test_der_body_strips_header_and_encode_restores_it() {
        let der = hex::decode(VALID_DER).unwrap();
        let sig = Signature::from_der(&der).unwrap();
        assert_eq!(sig.der_body(), &der[1..]);
        assert_ne!(sig.der_body()[0], DER_HEADER);
        assert_eq!(sig.to_der(), der);
    }

    #[test]
    fn test_from_components_is_canonical() {
        let sig = Signature::from_components(&hex::decode(R_HEX).unwrap(), &hex::decode(S_HEX).unwrap());
        assert_eq!(hex::encode(sig.to_der()), VALID_DER);

        // A high bit in R gets a 0x00 pad; leading zeros are trimmed.
        let mut r = [0u8; 32];
        r[31] = 0x80;
        let sig = Signature::from_components(&r, &[0x00, 0x01]);
        assert_eq!(sig.to_der(), vec![0x30, 0x07, 0x02, 0x02, 0x00, 0x80, 0x02, 0x01, 0x01]);
    }

    #[test]
    fn test_der_components() {
        let sig = Signature::from_der(&hex::decode(VALID_DER).unwrap()).unwrap();
        let (r, s) = sig.der_components().unwrap();
        assert_eq!(hex::encode(r), R_HEX);
        assert_eq!(hex::encode(s), S_HEX);

        let broken = Signature::from_der(&[0x30, 0x03, 0x02, 0x01]).unwrap();
        assert!(broken.der_components().is_err());
    }

    // ---- tx format ----

    #[test]
    fn test_tx_format_roundtrip() {
        let bytes = tx_format(VALID_DER, SIGHASH_ALL);
        let sig = Signature::from_tx_format(&bytes).unwrap();
        assert_eq!(sig.hash_type(), Some(SIGHASH_ALL));
        assert_eq!(sig.to_tx_format().unwrap(), bytes);
        assert!(Signature::from_tx_format(&[]).is_err());
    }

    #[test]
    fn test_to_tx_format_requires_hash_type() {
        let sig = Signature::from_der(&hex::decode(VALID_DER).unwrap()).unwrap();
        assert!(sig.to_tx_format().is_err());
        let sig = sig.with_hash_type(SIGHASH_NONE);
        assert_eq!(*sig.to_tx_format().unwrap().last().unwrap(), SIGHASH_NONE);
    }

    #[test]
    fn test_from_canonical_tx_format() {
        assert!(Signature::from_canonical_tx_format(&tx_format(VALID_DER, SIGHASH_ALL)).is_ok());
        assert!(matches!(
            Signature::from_canonical_tx_format(&tx_format(VALID_DER, 0x04)),
            Err(PrimitivesError::NonCanonicalSignature(_))
        ));
        let mut bad = tx_format(VALID_DER, SIGHASH_ALL);
        bad[0] = 0x31;
        assert!(matches!(
            Signature::from_canonical_tx_format(&bad),
            Err(PrimitivesError::NonCanonicalSignature(_))
        ));
    }

    // ---- canonical DER ----

    #[test]
    fn test_canonical_tx_der_accepts_well_formed() {
        assert!(is_canonical_tx_der(&tx_format(VALID_DER, SIGHASH_ALL)));
        // Minimal size: one-byte R and S.
        assert!(is_canonical_tx_der(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01, 0x01]));
        // A 0x00 pad is allowed when it clears the sign bit.
        let padded = Signature::from_components(&[0x80], &[0x01]).with_hash_type(SIGHASH_ALL);
        assert!(is_canonical_tx_der(&padded.to_tx_format().unwrap()));
    }

    #[test]
    fn test_canonical_tx_der_rejects_length_bounds() {
        assert!(!is_canonical_tx_der(&[0x30, 0x05, 0x02, 0x01, 0x01, 0x02, 0x00, 0x01]));
        let mut too_long = vec![0u8; 74];
        too_long[0] = 0x30;
        too_long[1] = 71;
        assert!(!is_canonical_tx_der(&too_long));
    }

    #[test]
    fn test_canonical_tx_der_rejects_structure_violations() {
        let good = tx_format(VALID_DER, SIGHASH_ALL);

        let mut bad_header = good.clone();
        bad_header[0] = 0x31;
        assert!(!is_canonical_tx_der(&bad_header));

        let mut bad_len = good.clone();
        bad_len[1] = 0x45;
        assert!(!is_canonical_tx_der(&bad_len));

        let mut bad_r_marker = good.clone();
        bad_r_marker[2] = 0x03;
        assert!(!is_canonical_tx_der(&bad_r_marker));

        let mut bad_s_marker = good.clone();
        bad_s_marker[4 + 32] = 0x03;
        assert!(!is_canonical_tx_der(&bad_s_marker));

        let mut negative_r = good.clone();
        negative_r[4] = 0x80;
        assert!(!is_canonical_tx_der(&negative_r));

        let mut negative_s = good;
        negative_s[6 + 32] = 0x80;
        assert!(!is_canonical_tx_der(&negative_s));
    }

    #[test]
    fn test_canonical_tx_der_rejects_overpadding() {
        // R = 0x00 0x01: the zero byte is not needed.
        let buf = [0x30, 0x07, 0x02, 0x02, 0x00, 0x01, 0x02, 0x01, 0x01, 0x01];
        assert!(!is_canonical_tx_der(&buf));
        let buf = [0x30, 0x07, 0x02, 0x01, 0x01, 0x02, 0x02, 0x00, 0x01, 0x01];
        assert!(!is_canonical_tx_der(&buf));
    }

    // ---- hash types ----

    #[test]
    fn test_has_defined_hash_type() {
        let base = Signature::from_der(&hex::decode(VALID_DER).unwrap()).unwrap();
        for t in [0x01, 0x02, 0x03, 0x81, 0x82, 0x83] {
            assert!(base.clone().with_hash_type(t).has_defined_hash_type(), "0x{:02x}", t);
        }
        for t in [0x00, 0x04, 0x41, 0x80, 0x84, 0xff] {
            assert!(!base.clone().with_hash_type(t).has_defined_hash_type(), "0x{:02x}", t);
        }
        assert!(!base.has_defined_hash_type());
    }

    // ---- low S ----

    #[test]
    fn test_has_low_s() {
        let r = hex::decode(R_HEX).unwrap();
        assert!(Signature::from_components(&r, &hex::decode(S_HEX).unwrap()).has_low_s());
        assert!(!Signature::from_components(&r, &hex::decode(HIGH_S_HEX).unwrap()).has_low_s());
        assert!(Signature::from_components(&r, &SECP256K1_HALF_ORDER).has_low_s());
        assert!(!Signature::from_components(&r, &[0x00]).has_low_s());
    }

    // ---- compact ----

    #[test]
    fn test_from_compact_recovery_range() {
        let mut buf = [0u8; 65];
        buf[1..33].copy_from_slice(&hex::decode(R_HEX).unwrap());
        buf[33..65].copy_from_slice(&hex::decode(S_HEX).unwrap());

        for (header, recovery, compressed) in [(27u8, 0u8, false), (30, 3, false), (31, 0, true), (34, 3, true)] {
            buf[0] = header;
            let sig = Signature::from_compact(&buf).unwrap();
            assert_eq!(sig.recovery_id(), Some(recovery));
            assert_eq!(sig.compressed_hint(), compressed);
            assert_eq!(hex::encode(sig.to_der()), VALID_DER);
            assert_eq!(sig.to_compact().unwrap(), buf);
        }

        for header in [0u8, 26, 35, 0xff] {
            buf[0] = header;
            assert!(matches!(
                Signature::from_compact(&buf),
                Err(PrimitivesError::InvalidRecoveryId(h)) if h == header
            ));
        }
        assert!(Signature::from_compact(&buf[..64]).is_err());
    }
}
