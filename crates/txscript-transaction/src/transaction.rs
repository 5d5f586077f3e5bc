//! Core transaction type.
//!
//! Represents a complete transaction with version, inputs, outputs, and
//! lock time. Supports binary and hex serialization, transaction ids,
//! coinbase detection, signing and signature verification.

use std::fmt;

use txscript_primitives::signature::{Signature, SignatureVerifier, Signer};
use txscript_primitives::{ByteReader, ByteWriter, ChainHash, VarInt};
use txscript_script::Script;

use crate::input::{TransactionInput, COINBASE_OUTPUT_INDEX};
use crate::output::TransactionOutput;
use crate::sighash;
use crate::TransactionError;

/// A transaction: a version, a set of inputs, a set of outputs, and a lock
/// time.
///
/// # Wire format
///
/// | Field        | Size                      |
/// |--------------|---------------------------|
/// | version      | 4 bytes (LE)              |
/// | input count  | VarInt                    |
/// | inputs       | variable (per input)      |
/// | output count | VarInt                    |
/// | outputs      | variable (per output)     |
/// | lock_time    | 4 bytes (LE)              |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    /// Block height or timestamp before which the transaction is not final.
    pub lock_time: u32,
}

impl Transaction {
    /// Create a new empty transaction with version 1 and lock time 0.
    pub fn new() -> Self {
        Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from a hex-encoded string.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction from raw bytes.
    ///
    /// The slice must hold exactly one transaction.
    ///
    /// # Returns
    /// The transaction, or an error if the data is truncated or has
    /// trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if !reader.finished() {
            return Err(TransactionError::TrailingBytes(reader.remaining(), "transaction"));
        }
        Ok(tx)
    }

    /// Deserialize a transaction from a `ByteReader`.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le()?;

        // Counts come off the wire; each entry needs at least one byte so
        // the preallocation is bounded by what is actually left.
        let input_count = reader.read_varint()?.value();
        let mut inputs = Vec::with_capacity(bounded(input_count, reader.remaining()));
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader.read_varint()?.value();
        let mut outputs = Vec::with_capacity(bounded(output_count, reader.remaining()));
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u32_le()?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u32_le(self.version);

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(writer);
        }

        writer.write_u32_le(self.lock_time);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Size of the serialized transaction in bytes.
    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    /// Double SHA-256 of the serialized transaction.
    ///
    /// Displays byte-reversed, the conventional txid form.
    pub fn tx_id(&self) -> ChainHash {
        ChainHash::double_sha256(&self.to_bytes())
    }

    // -----------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------

    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    /// A coinbase has exactly one input, spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        match self.inputs.as_slice() {
            [input] => {
                input.prev_tx_id == ChainHash::default()
                    && input.output_index == COINBASE_OUTPUT_INDEX
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------

    /// Legacy signature hash for one input, in display byte order.
    ///
    /// See [`sighash::signature_hash`].
    pub fn sighash(
        &self,
        input_index: usize,
        subscript: &Script,
        hash_type: u8,
    ) -> Result<[u8; 32], TransactionError> {
        sighash::signature_hash(self, input_index, subscript, hash_type)
    }

    /// Sign one input.
    ///
    /// # Arguments
    /// * `input_index` - The input to sign.
    /// * `subscript`   - The script code the signature commits to, normally
    ///                   the spent output's locking script (or the redeem
    ///                   script for P2SH).
    /// * `hash_type`   - Signature hash type, attached to the result.
    /// * `signer`      - The signing primitive.
    pub fn sign(
        &self,
        input_index: usize,
        subscript: &Script,
        hash_type: u8,
        signer: &dyn Signer,
    ) -> Result<Signature, TransactionError> {
        let digest = self.signing_digest(input_index, subscript, hash_type)?;
        let signature = signer.sign_digest(&digest)?;
        Ok(signature.with_hash_type(hash_type))
    }

    /// Check a signature over one input.
    ///
    /// The signature's own hash type must equal `hash_type`; a signature
    /// carrying another (or none) does not verify.
    pub fn verify_signature(
        &self,
        input_index: usize,
        subscript: &Script,
        hash_type: u8,
        signature: &Signature,
        public_key: &[u8],
        verifier: &dyn SignatureVerifier,
    ) -> Result<bool, TransactionError> {
        if signature.hash_type() != Some(hash_type) {
            return Ok(false);
        }
        let digest = self.signing_digest(input_index, subscript, hash_type)?;
        Ok(verifier.verify_digest(public_key, &digest, signature))
    }

    /// Run an input's unlocking script against the output it spends.
    ///
    /// An unlocking script that does not parse fails verification.
    pub fn verify_input(
        &self,
        input_index: usize,
        prev_locking_script: &Script,
        flags: txscript_script::interpreter::ScriptFlags,
    ) -> bool {
        let unlocking = match self.inputs.get(input_index).map(|i| i.unlocking_script()) {
            Some(Ok(script)) => script,
            _ => return false,
        };
        crate::verify::verify(&unlocking, prev_locking_script, self, input_index, flags)
    }

    /// The sighash in the byte order handed to the signing primitive.
    fn signing_digest(
        &self,
        input_index: usize,
        subscript: &Script,
        hash_type: u8,
    ) -> Result<[u8; 32], TransactionError> {
        let mut digest = self.sighash(input_index, subscript, hash_type)?;
        digest.reverse();
        Ok(digest)
    }
}

fn bounded(count: u64, remaining: usize) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX).min(remaining)
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Transaction {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
