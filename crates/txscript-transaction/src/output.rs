//! Transaction output: a value and the script that locks it.

use txscript_primitives::{ByteReader, ByteWriter};
use txscript_script::{Script, ScriptError};

use crate::TransactionError;

/// A single output of a transaction.
///
/// The locking script is kept as raw bytes so that any output read off the
/// wire, parseable or not, serializes back unchanged.
///
/// # Wire format
///
/// | Field            | Size           |
/// |------------------|----------------|
/// | value            | 8 bytes (LE)   |
/// | script length    | VarInt         |
/// | script           | variable       |
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Amount locked by this output, in the smallest unit.
    pub value: u64,

    /// Serialized locking script.
    pub script: Vec<u8>,
}

impl TransactionOutput {
    /// Output locking `value` with `script`.
    pub fn new(value: u64, script: &Script) -> Self {
        TransactionOutput {
            value,
            script: script.to_bytes(),
        }
    }

    /// Deserialize an output from a `ByteReader`.
    ///
    /// # Returns
    /// `Ok(TransactionOutput)`, or `TruncatedInput` if the data runs out.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let value = reader.read_u64_le()?;
        let script = reader.read_var_bytes()?.to_vec();
        Ok(TransactionOutput { value, script })
    }

    /// Serialize this output into a `ByteWriter`.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64_le(self.value);
        writer.write_var_bytes(&self.script);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Parse the locking script.
    pub fn locking_script(&self) -> Result<Script, ScriptError> {
        Script::from_bytes(&self.script)
    }

    pub fn locking_script_hex(&self) -> String {
        hex::encode(&self.script)
    }
}
