//! Base58 and Base58Check text encoding.
//!
//! Uses the 58-character alphabet that omits `0`, `O`, `I` and `l`.
//! Base58Check appends the first four bytes of `sha256d(payload)` before
//! encoding and verifies them on decode.

use crate::hash::checksum;
use crate::PrimitivesError;

/// The Base58 alphabet.
pub const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Encode bytes as Base58. Leading zero bytes become leading `1`s.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string.
///
/// # Returns
/// The decoded bytes, or `InvalidBase58Character` naming the first
/// character outside the alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| match e {
            bs58::decode::Error::InvalidCharacter { character, index } => {
                PrimitivesError::InvalidBase58Character { character, index }
            }
            other => PrimitivesError::InvalidBase58(other.to_string()),
        })
}

/// Encode `data || checksum(data)` as Base58.
pub fn check_encode(data: &[u8]) -> String {
    let mut payload = Vec::with_capacity(data.len() + 4);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum(data));
    encode(&payload)
}

/// Decode a Base58Check string and verify its trailing 4-byte checksum.
///
/// # Returns
/// The payload without the checksum, `ChecksumMismatch` if the checksum
/// does not match, or a base58 error for malformed text.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() < 4 {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let (payload, check) = decoded.split_at(decoded.len() - 4);
    if check != checksum(payload) {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_vectors() {
        let cases = [
            ("", ""),
            ("00", "1"),
            ("00010966776006953D5567439E5E39F86A0D273BEED61967F6", "16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM"),
            ("0123456789ABCDEF", "C3CPq7c8PY"),
            ("000000287FB4CD", "111233QC4"),
            ("ffffffff", "7YXq9G"),
        ];
        for (hex_in, expected) in cases {
            let input = hex::decode(hex_in).expect("valid hex");
            assert_eq!(encode(&input), expected);
            assert_eq!(decode(expected).expect("decode"), input);
        }
    }

    #[test]
    fn test_base58_rejects_characters_outside_alphabet() {
        for bad in ["0abc", "Oabc", "Iabc", "labc", "12!3"] {
            match decode(bad) {
                Err(PrimitivesError::InvalidBase58Character { .. }) => {}
                other => panic!("expected invalid character for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_base58_check_roundtrip() {
        let payload = hex::decode("00f54a5851e9372b87810a8e60cdd2e7cfd80b6e31").unwrap();
        let encoded = check_encode(&payload);
        assert_eq!(check_decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_base58_check_bad_checksum() {
        let payload = vec![0x80, 0x01, 0x02, 0x03];
        let mut encoded = check_encode(&payload);
        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });
        assert!(matches!(check_decode(&encoded), Err(PrimitivesError::ChecksumMismatch)));
    }

    #[test]
    fn test_base58_check_too_short() {
        assert!(check_decode("1").is_err());
    }
}
