//! Transaction input referencing a previous output.

use txscript_primitives::{ByteReader, ByteWriter, ChainHash};
use txscript_script::{Script, ScriptError};

use crate::TransactionError;

/// Sequence number of a finalized input.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// Output index used by the single input of a coinbase transaction.
pub const COINBASE_OUTPUT_INDEX: u32 = 0xFFFF_FFFF;

/// A single input of a transaction.
///
/// The unlocking script is kept as raw bytes: coinbase inputs carry
/// arbitrary data that need not parse as a script.
///
/// # Wire format
///
/// | Field              | Size             |
/// |--------------------|------------------|
/// | prev_tx_id         | 32 bytes         |
/// | output_index       | 4 bytes (LE)     |
/// | script length      | VarInt           |
/// | script             | variable         |
/// | sequence_number    | 4 bytes (LE)     |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// Id of the transaction whose output is spent, in internal byte order.
    pub prev_tx_id: ChainHash,

    /// Index of the spent output within that transaction.
    pub output_index: u32,

    /// Serialized unlocking script.
    pub script: Vec<u8>,

    pub sequence_number: u32,
}

impl TransactionInput {
    /// Input spending `prev_tx_id:output_index` with an empty unlocking
    /// script and a final sequence number.
    pub fn new(prev_tx_id: ChainHash, output_index: u32) -> Self {
        TransactionInput {
            prev_tx_id,
            output_index,
            script: Vec::new(),
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
        }
    }

    /// Deserialize an input from a `ByteReader`.
    ///
    /// # Returns
    /// `Ok(TransactionInput)`, or `TruncatedInput` if the data runs out.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let prev_tx_id = ChainHash::new(reader.read_array::<32>()?);
        let output_index = reader.read_u32_le()?;
        let script = reader.read_var_bytes()?.to_vec();
        let sequence_number = reader.read_u32_le()?;

        Ok(TransactionInput {
            prev_tx_id,
            output_index,
            script,
            sequence_number,
        })
    }

    /// Serialize this input into a `ByteWriter`.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(self.prev_tx_id.as_bytes());
        writer.write_u32_le(self.output_index);
        writer.write_var_bytes(&self.script);
        writer.write_u32_le(self.sequence_number);
    }

    /// Parse the unlocking script.
    pub fn unlocking_script(&self) -> Result<Script, ScriptError> {
        Script::from_bytes(&self.script)
    }

    pub fn set_unlocking_script(&mut self, script: &Script) {
        self.script = script.to_bytes();
    }
}
