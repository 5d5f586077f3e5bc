//! Legacy signature hash.
//!
//! Computes the digest a transaction signature commits to: a copy of the
//! transaction with input scripts blanked and inputs/outputs pruned per the
//! hash type, serialized with the hash type appended and double-SHA-256'd.

use tracing::debug;

use txscript_primitives::hash::sha256d;
use txscript_primitives::ByteWriter;
use txscript_script::opcodes::Opcode;
use txscript_script::{Script, ScriptChunk};

use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::TransactionError;

pub use txscript_primitives::signature::{
    SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_MASK, SIGHASH_NONE, SIGHASH_SINGLE,
};

/// Digest returned for SIGHASH_SINGLE when the input has no matching
/// output, in the same byte order as [`signature_hash`] results.
///
/// Signatures over this value are valid on chain, so it must be
/// reproduced exactly.
pub const SIGHASH_SINGLE_BUG_DIGEST: [u8; 32] = {
    let mut d = [0u8; 32];
    d[31] = 0x01;
    d
};

/// Compute the legacy signature hash for one input.
///
/// The transaction is copied, never modified.
///
/// # Arguments
/// * `tx`          - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `subscript`   - The script code being satisfied; OP_CODESEPARATORs are
///                   stripped before it is committed to.
/// * `hash_type`   - The signature hash type byte.
///
/// # Returns
/// The double-SHA-256 digest, byte-reversed (display order).
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    subscript: &Script,
    hash_type: u8,
) -> Result<[u8; 32], TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InputIndexOutOfRange {
            index: input_index,
            count: tx.inputs.len(),
        });
    }

    let base_type = hash_type & SIGHASH_MASK;
    if base_type == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        debug!(
            input = input_index,
            outputs = tx.outputs.len(),
            "SIGHASH_SINGLE without a matching output, using the constant digest"
        );
        return Ok(SIGHASH_SINGLE_BUG_DIGEST);
    }

    let mut writer = ByteWriter::with_capacity(tx.size() + 4);
    sighash_copy(tx, input_index, subscript, hash_type).write_to(&mut writer);
    writer.write_u32_le(u32::from(hash_type));

    let mut digest = sha256d(writer.as_bytes());
    digest.reverse();
    Ok(digest)
}

/// The transaction as it is serialized for signing.
fn sighash_copy(tx: &Transaction, input_index: usize, subscript: &Script, hash_type: u8) -> Transaction {
    let mut copy = tx.clone();
    let base_type = hash_type & SIGHASH_MASK;

    let separator = ScriptChunk::op(Opcode::CodeSeparator);
    let script_code = Script::from_chunks(
        subscript
            .chunks()
            .iter()
            .filter(|c| **c != separator)
            .cloned()
            .collect(),
    );

    for (i, input) in copy.inputs.iter_mut().enumerate() {
        if i == input_index {
            input.set_unlocking_script(&script_code);
        } else {
            input.script.clear();
            if base_type == SIGHASH_NONE || base_type == SIGHASH_SINGLE {
                input.sequence_number = 0;
            }
        }
    }

    match base_type {
        SIGHASH_NONE => copy.outputs.clear(),
        SIGHASH_SINGLE => {
            copy.outputs.truncate(input_index + 1);
            for output in copy.outputs.iter_mut().take(input_index) {
                *output = TransactionOutput {
                    value: u64::MAX,
                    script: Vec::new(),
                };
            }
        }
        _ => {}
    }

    if hash_type & SIGHASH_ANYONECANPAY != 0 {
        let input = copy.inputs.swap_remove(input_index);
        copy.inputs = vec![input];
    }

    copy
}
