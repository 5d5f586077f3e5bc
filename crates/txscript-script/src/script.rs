//! Script type - an ordered list of opcodes and data pushes.
//!
//! Scripts appear in transaction inputs (unlocking) and outputs (locking).
//! A `Script` holds decoded chunks; the wire bytes are produced on demand and
//! are byte-identical to whatever the script was decoded from.

use std::fmt;
use std::str::FromStr;

use txscript_primitives::hash::hash160;

use crate::chunk::{decode_script, encode_script, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// Standard size limit for a data-carrier payload under legacy relay policy.
pub const MAX_DATA_OUT_LEGACY: usize = 40;
/// Standard size limit for a data-carrier payload.
pub const MAX_DATA_OUT: usize = 80;

/// Largest number of keys a standard multisig template may list.
pub const MAX_MULTISIG_KEYS: usize = 16;

/// A script, represented as its decoded chunk list.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Script {
    chunks: Vec<ScriptChunk>,
}

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    pub fn new() -> Self {
        Script { chunks: Vec::new() }
    }

    /// Wrap an existing chunk list.
    pub fn from_chunks(chunks: Vec<ScriptChunk>) -> Self {
        Script { chunks }
    }

    /// Decode a script from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - Raw script bytes.
    ///
    /// # Returns
    /// The decoded `Script`, or `TruncatedPush` if a push overruns the input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScriptError> {
        Ok(Script {
            chunks: decode_script(bytes)?,
        })
    }

    /// Decode a script from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a space-separated ASM string.
    ///
    /// Tokens are opcode names (aliases included), `0`, `-1`, `0x..` for an
    /// unnamed opcode byte, or hex data which is pushed with the shortest
    /// push form.
    ///
    /// # Arguments
    /// * `asm` - The ASM text.
    ///
    /// # Returns
    /// A `Script`, or `InvalidAsmToken` for a token that is none of the above.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        for token in asm.split_whitespace() {
            if let Some(op) = Opcode::from_name(token) {
                script.push_opcode(op);
                continue;
            }
            match token {
                "0" => {
                    script.push_opcode(Opcode::Zero);
                }
                "-1" => {
                    script.push_opcode(Opcode::OneNegate);
                }
                _ => {
                    if let Some(raw) = token.strip_prefix("0x") {
                        let byte = u8::from_str_radix(raw, 16)
                            .map_err(|_| ScriptError::InvalidAsmToken(token.to_string()))?;
                        if raw.len() != 2 || (1..=MAX_DIRECT_PUSH).contains(&byte) {
                            return Err(ScriptError::InvalidAsmToken(token.to_string()));
                        }
                        script.chunks.push(ScriptChunk::Op(byte));
                        continue;
                    }
                    let data = hex::decode(token)
                        .map_err(|_| ScriptError::InvalidAsmToken(token.to_string()))?;
                    script.push_data(&data)?;
                }
            }
        }
        Ok(script)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Encode the script to its wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_script(&self.chunks)
    }

    /// Encode the script as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Render the script as space-separated ASM tokens.
    pub fn to_asm(&self) -> String {
        self.chunks
            .iter()
            .map(ScriptChunk::to_asm_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The decoded chunks.
    pub fn chunks(&self) -> &[ScriptChunk] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Size of the wire encoding in bytes.
    pub fn encoded_len(&self) -> usize {
        self.chunks.iter().map(ScriptChunk::encoded_len).sum()
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Append a data push using the shortest push form.
    pub fn push_data(&mut self, data: &[u8]) -> Result<&mut Self, ScriptError> {
        self.chunks.push(ScriptChunk::push(data)?);
        Ok(self)
    }

    /// Append a named opcode.
    pub fn push_opcode(&mut self, op: Opcode) -> &mut Self {
        self.chunks.push(ScriptChunk::op(op));
        self
    }

    /// Append `OP_0`..`OP_16` for a small integer.
    pub fn push_small_int(&mut self, n: u8) -> Result<&mut Self, ScriptError> {
        let op = Opcode::small_int(n).ok_or_else(|| {
            ScriptError::InvalidMultisig(format!("{} does not fit a small integer opcode", n))
        })?;
        Ok(self.push_opcode(op))
    }

    /// `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn build_pubkey_hash_out(hash: &[u8; 20]) -> Script {
        Script::from_chunks(vec![
            ScriptChunk::op(Opcode::Dup),
            ScriptChunk::op(Opcode::Hash160),
            data_chunk(hash),
            ScriptChunk::op(Opcode::EqualVerify),
            ScriptChunk::op(Opcode::CheckSig),
        ])
    }

    /// `OP_HASH160 <hash> OP_EQUAL`.
    pub fn build_script_hash_out(hash: &[u8; 20]) -> Script {
        Script::from_chunks(vec![
            ScriptChunk::op(Opcode::Hash160),
            data_chunk(hash),
            ScriptChunk::op(Opcode::Equal),
        ])
    }

    /// `OP_<m> <pubkey>... OP_<n> OP_CHECKMULTISIG`.
    ///
    /// With `sorted`, keys are ordered by their encoded bytes so that the
    /// same key set always yields the same script.
    ///
    /// # Arguments
    /// * `pubkeys` - Encoded public keys.
    /// * `m` - Number of signatures required.
    /// * `sorted` - Whether to sort the keys first.
    ///
    /// # Returns
    /// The script, or `InvalidMultisig` unless `1 <= m <= n <= 16`.
    pub fn build_multisig_out<K: AsRef<[u8]>>(
        pubkeys: &[K],
        m: usize,
        sorted: bool,
    ) -> Result<Script, ScriptError> {
        let n = pubkeys.len();
        if n == 0 || n > MAX_MULTISIG_KEYS {
            return Err(ScriptError::InvalidMultisig(format!(
                "{} public keys, expected 1..={}",
                n, MAX_MULTISIG_KEYS
            )));
        }
        if m == 0 || m > n {
            return Err(ScriptError::InvalidMultisig(format!(
                "{} required signatures with {} public keys",
                m, n
            )));
        }

        let mut keys: Vec<&[u8]> = pubkeys.iter().map(|k| k.as_ref()).collect();
        if sorted {
            keys.sort();
        }

        let mut script = Script::new();
        script.push_small_int(m as u8)?;
        for key in keys {
            script.push_data(key)?;
        }
        script.push_small_int(n as u8)?;
        script.push_opcode(Opcode::CheckMultiSig);
        Ok(script)
    }

    /// `OP_RETURN <payload>`, or a bare `OP_RETURN` for an empty payload.
    ///
    /// No size limit is applied here; see [`Script::is_standard_data_out`].
    pub fn build_data_out(payload: &[u8]) -> Result<Script, ScriptError> {
        let mut script = Script::new();
        script.push_opcode(Opcode::Return);
        if !payload.is_empty() {
            script.push_data(payload)?;
        }
        Ok(script)
    }

    /// Wrap this script in a pay-to-script-hash locking template.
    pub fn to_script_hash_out(&self) -> Script {
        Script::build_script_hash_out(&hash160(&self.to_bytes()))
    }

    // -----------------------------------------------------------------------
    // Predicates
    // -----------------------------------------------------------------------

    /// True iff every chunk is a push or an opcode no greater than `OP_16`.
    pub fn is_push_only(&self) -> bool {
        self.chunks.iter().all(ScriptChunk::is_push_only)
    }

    /// Relay-policy check for data-carrier outputs.
    ///
    /// True for a data-out template whose payload is at most `max` bytes.
    pub fn is_standard_data_out(&self, max: usize) -> bool {
        self.is_data_out() && self.data_out_payload().map_or(0, <[u8]>::len) <= max
    }

    /// Payload of a data-out script, if it carries one.
    pub fn data_out_payload(&self) -> Option<&[u8]> {
        if !self.is_data_out() {
            return None;
        }
        self.chunks.get(1).and_then(ScriptChunk::data)
    }
}

fn data_chunk(data: &[u8]) -> ScriptChunk {
    ScriptChunk::Push {
        opcode: data.len() as u8,
        data: data.to_vec(),
    }
}

impl From<Vec<ScriptChunk>> for Script {
    fn from(chunks: Vec<ScriptChunk>) -> Self {
        Script::from_chunks(chunks)
    }
}

impl FromStr for Script {
    type Err = ScriptError;

    /// Parse from hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Script::from_hex(s)
    }
}

impl fmt::Display for Script {
    /// Display the script as a lowercase hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_asm())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
