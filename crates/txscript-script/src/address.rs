/// Address encoding and template extraction.
///
/// An address is a network byte, a 20-byte hash and a 4-byte sha256d
/// checksum, written in Base58. The network byte selects both the network
/// and whether the hash is of a public key or of a redeem script.

use std::fmt;
use std::str::FromStr;

use txscript_primitives::base58;
use txscript_primitives::hash::{checksum, hash160};
use txscript_primitives::PrimitivesError;

use crate::classify::ScriptClass;
use crate::Script;

/// Payload size of a decoded address: version byte, hash, checksum.
const DECODED_LEN: usize = 1 + 20 + 4;

/// Errors from address text and template handling.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("non-base58 character {character:?} at index {index}")]
    NonBase58Character { character: char, index: usize },

    #[error("address checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid decoded address length: {0} bytes")]
    InvalidLength(usize),

    #[error("unknown network byte 0x{0:02x}")]
    InvalidNetwork(u8),

    #[error("address is for {actual:?}, expected {expected:?}")]
    NetworkMismatch { expected: Network, actual: Network },

    #[error("no address for script template {0}")]
    UnsupportedScriptTemplate(ScriptClass),

    #[error(transparent)]
    Base58(PrimitivesError),
}

/// Network an address belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Livenet,
    Testnet,
}

/// Version bytes of one network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkParams {
    pub network: Network,
    pub pubkey_hash: u8,
    pub script_hash: u8,
}

const LIVENET: NetworkParams = NetworkParams {
    network: Network::Livenet,
    pubkey_hash: 0x26,
    script_hash: 0x32,
};

const TESTNET: NetworkParams = NetworkParams {
    network: Network::Testnet,
    pubkey_hash: 0x6f,
    script_hash: 0xc4,
};

impl Network {
    pub fn params(self) -> &'static NetworkParams {
        match self {
            Network::Livenet => &LIVENET,
            Network::Testnet => &TESTNET,
        }
    }

    /// Resolve a version byte to its network and address kind.
    pub fn from_version_byte(byte: u8) -> Option<(Network, AddressKind)> {
        [LIVENET, TESTNET].iter().find_map(|p| {
            if byte == p.pubkey_hash {
                Some((p.network, AddressKind::PubkeyHash))
            } else if byte == p.script_hash {
                Some((p.network, AddressKind::ScriptHash))
            } else {
                None
            }
        })
    }
}

/// What the 20-byte payload is a hash of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressKind {
    PubkeyHash,
    ScriptHash,
}

/// Base58Check-encode a version byte and a 20-byte hash.
pub fn encode(network_byte: u8, payload_hash: &[u8; 20]) -> String {
    let mut payload = [0u8; 21];
    payload[0] = network_byte;
    payload[1..].copy_from_slice(payload_hash);
    base58::check_encode(&payload)
}

/// Decode an address string into its version byte and hash.
///
/// Surrounding whitespace is ignored. The version byte is not interpreted.
pub fn decode(s: &str) -> Result<(u8, [u8; 20]), AddressError> {
    let raw = base58::decode(s.trim()).map_err(|e| match e {
        PrimitivesError::InvalidBase58Character { character, index } => {
            AddressError::NonBase58Character { character, index }
        }
        other => AddressError::Base58(other),
    })?;
    if raw.len() != DECODED_LEN {
        return Err(AddressError::InvalidLength(raw.len()));
    }
    let (payload, check) = raw.split_at(21);
    if check != checksum(payload) {
        return Err(AddressError::ChecksumMismatch);
    }
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok((payload[0], hash))
}

/// A decoded address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    pub payload_hash: [u8; 20],
    pub network: Network,
    pub kind: AddressKind,
}

impl Address {
    pub fn new(payload_hash: [u8; 20], network: Network, kind: AddressKind) -> Self {
        Address {
            payload_hash,
            network,
            kind,
        }
    }

    /// Pay-to-pubkey-hash address for an encoded public key.
    pub fn from_public_key(public_key: &[u8], network: Network) -> Self {
        Address::new(hash160(public_key), network, AddressKind::PubkeyHash)
    }

    /// Pay-to-script-hash address for a serialized redeem script.
    pub fn from_script_hash(redeem_script: &Script, network: Network) -> Self {
        Address::new(
            hash160(&redeem_script.to_bytes()),
            network,
            AddressKind::ScriptHash,
        )
    }

    /// Extract the address a locking or unlocking script pays to or spends from.
    ///
    /// Output templates are tried before input templates.
    pub fn from_script(script: &Script, network: Network) -> Result<Self, AddressError> {
        let class = script.classify_output();
        let out_hash = match class {
            ScriptClass::PubkeyHashOut => script.chunks()[2].data(),
            ScriptClass::ScriptHashOut => script.chunks()[1].data(),
            _ => None,
        };
        if let Some(data) = out_hash {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(data);
            let kind = if class == ScriptClass::PubkeyHashOut {
                AddressKind::PubkeyHash
            } else {
                AddressKind::ScriptHash
            };
            return Ok(Address::new(hash, network, kind));
        }

        let chunks = script.chunks();
        match script.classify_input() {
            ScriptClass::PubkeyHashIn => match chunks[1].data() {
                Some(pubkey) => Ok(Address::from_public_key(pubkey, network)),
                None => Err(AddressError::UnsupportedScriptTemplate(ScriptClass::PubkeyHashIn)),
            },
            ScriptClass::ScriptHashIn => match chunks.last().and_then(|c| c.data()) {
                Some(redeem) => Ok(Address::new(hash160(redeem), network, AddressKind::ScriptHash)),
                None => Err(AddressError::UnsupportedScriptTemplate(ScriptClass::ScriptHashIn)),
            },
            ScriptClass::Unknown => Err(AddressError::UnsupportedScriptTemplate(class)),
            other => Err(AddressError::UnsupportedScriptTemplate(other)),
        }
    }

    /// Parse an address, accepting either network.
    pub fn from_string(s: &str) -> Result<Self, AddressError> {
        let (byte, hash) = decode(s)?;
        let (network, kind) =
            Network::from_version_byte(byte).ok_or(AddressError::InvalidNetwork(byte))?;
        Ok(Address::new(hash, network, kind))
    }

    /// Parse an address that must belong to `network`.
    pub fn from_string_for(s: &str, network: Network) -> Result<Self, AddressError> {
        let addr = Address::from_string(s)?;
        if addr.network != network {
            return Err(AddressError::NetworkMismatch {
                expected: network,
                actual: addr.network,
            });
        }
        Ok(addr)
    }

    pub fn version_byte(&self) -> u8 {
        let params = self.network.params();
        match self.kind {
            AddressKind::PubkeyHash => params.pubkey_hash,
            AddressKind::ScriptHash => params.script_hash,
        }
    }

    /// The locking script paying to this address.
    pub fn to_script(&self) -> Script {
        match self.kind {
            AddressKind::PubkeyHash => Script::build_pubkey_hash_out(&self.payload_hash),
            AddressKind::ScriptHash => Script::build_script_hash_out(&self.payload_hash),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self.version_byte(), &self.payload_hash))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// hash160 of the compressed public key for private key 1.
    const PKH: &str = "751e76e8199196d454941c45d1b3a323f1433bd6";
    /// hash160 of the one-byte script `OP_1`.
    const SH: &str = "da1745e9b549bd0bfa1a569971c77eba30cd5a4b";
    const PUBKEY: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn h20(s: &str) -> [u8; 20] {
        let mut out = [0u8; 20];
        out.copy_from_slice(&hex::decode(s).expect("valid hex"));
        out
    }

    // -----------------------------------------------------------------------
    // Encoding vectors
    // -----------------------------------------------------------------------

    /// One pinned vector per network and kind.
    #[test]
    fn test_encode_vectors() {
        let cases = [
            (0x26, PKH, "GUXByHDZLvU4DnVH9imSFckt3HEQ5cFgE5"),
            (0x32, SH, "MTnKRHunzrvFDTK5okuZyrwPjWNnTSRjZi"),
            (0x6f, PKH, "mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r"),
            (0xc4, SH, "2ND8PB9RrfCaAcjfjP1Y6nAgFd9zWHYX4DN"),
        ];
        for (byte, hash, expected) in cases {
            assert_eq!(encode(byte, &h20(hash)), expected);
            assert_eq!(decode(expected).expect("decodes"), (byte, h20(hash)));
        }
    }

    #[test]
    fn test_from_string_resolves_network_and_kind() {
        let addr = Address::from_string("GUXByHDZLvU4DnVH9imSFckt3HEQ5cFgE5").expect("valid");
        assert_eq!(addr.network, Network::Livenet);
        assert_eq!(addr.kind, AddressKind::PubkeyHash);
        assert_eq!(addr.payload_hash, h20(PKH));

        let addr: Address = "2ND8PB9RrfCaAcjfjP1Y6nAgFd9zWHYX4DN".parse().expect("valid");
        assert_eq!(addr.network, Network::Testnet);
        assert_eq!(addr.kind, AddressKind::ScriptHash);
        assert_eq!(addr.to_string(), "2ND8PB9RrfCaAcjfjP1Y6nAgFd9zWHYX4DN");
    }

    #[test]
    fn test_decode_trims_whitespace() {
        let (byte, _) = decode("  mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r\n").expect("valid");
        assert_eq!(byte, 0x6f);
    }

    // -----------------------------------------------------------------------
    // Decode errors
    // -----------------------------------------------------------------------

    #[test]
    fn test_decode_rejects_non_base58() {
        let err = decode("GUXByHDZLvU4DnVH9imSFckt3HEQ5cFgE0").expect_err("0 not in alphabet");
        assert!(matches!(
            err,
            AddressError::NonBase58Character { character: '0', index: 33 }
        ));
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let err = decode("GUXByHDZLvU4DnVH9imSFckt3HEQ5cFgE6").expect_err("checksum");
        assert!(matches!(err, AddressError::ChecksumMismatch));
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let short = base58::check_encode(&[0x26; 10]);
        assert!(matches!(decode(&short), Err(AddressError::InvalidLength(14))));
    }

    #[test]
    fn test_from_string_rejects_unknown_network() {
        let s = encode(0x00, &h20(PKH));
        assert!(matches!(
            Address::from_string(&s),
            Err(AddressError::InvalidNetwork(0x00))
        ));
    }

    #[test]
    fn test_from_string_for_checks_network() {
        let err = Address::from_string_for("mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r", Network::Livenet)
            .expect_err("testnet address");
        assert!(matches!(
            err,
            AddressError::NetworkMismatch {
                expected: Network::Livenet,
                actual: Network::Testnet
            }
        ));
    }

    // -----------------------------------------------------------------------
    // Scripts
    // -----------------------------------------------------------------------

    #[test]
    fn test_from_public_key() {
        let pk = hex::decode(PUBKEY).expect("hex");
        let addr = Address::from_public_key(&pk, Network::Livenet);
        assert_eq!(addr.to_string(), "GUXByHDZLvU4DnVH9imSFckt3HEQ5cFgE5");
    }

    #[test]
    fn test_from_script_hash() {
        let redeem = Script::from_asm("OP_1").expect("asm");
        let addr = Address::from_script_hash(&redeem, Network::Livenet);
        assert_eq!(addr.to_string(), "MTnKRHunzrvFDTK5okuZyrwPjWNnTSRjZi");
    }

    #[test]
    fn test_from_script_outputs_round_trip() {
        for addr in [
            Address::new(h20(PKH), Network::Livenet, AddressKind::PubkeyHash),
            Address::new(h20(SH), Network::Testnet, AddressKind::ScriptHash),
        ] {
            let script = addr.to_script();
            let back = Address::from_script(&script, addr.network).expect("template");
            assert_eq!(back, addr);
            assert_eq!(Address::from_string(&back.to_string()).expect("parse"), addr);
        }
    }

    #[test]
    fn test_from_script_pubkey_hash_in() {
        let sig = "3006020101020101".to_string() + "01";
        let script = Script::from_asm(&format!("{} {}", sig, PUBKEY)).expect("asm");
        let addr = Address::from_script(&script, Network::Testnet).expect("p2pkh input");
        assert_eq!(addr.payload_hash, h20(PKH));
        assert_eq!(addr.kind, AddressKind::PubkeyHash);
    }

    #[test]
    fn test_from_script_script_hash_in() {
        let redeem = Script::build_multisig_out(&[hex::decode(PUBKEY).expect("hex")], 1, true)
            .expect("multisig");
        let script = Script::from_asm(&format!("0 3006020101020101 {}", redeem.to_hex()))
            .expect("asm");
        let addr = Address::from_script(&script, Network::Livenet).expect("p2sh input");
        assert_eq!(addr, Address::from_script_hash(&redeem, Network::Livenet));
    }

    #[test]
    fn test_from_script_unsupported() {
        let script = Script::build_data_out(b"hello").expect("data out");
        assert!(matches!(
            Address::from_script(&script, Network::Livenet),
            Err(AddressError::UnsupportedScriptTemplate(ScriptClass::DataOut))
        ));
        let script = Script::from_asm("OP_1 OP_ADD").expect("asm");
        assert!(matches!(
            Address::from_script(&script, Network::Livenet),
            Err(AddressError::UnsupportedScriptTemplate(ScriptClass::Unknown))
        ));
    }
}
