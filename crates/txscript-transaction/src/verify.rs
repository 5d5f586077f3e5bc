//! Script verification against a transaction.
//!
//! [`TransactionContext`] plugs a transaction into the interpreter so that
//! OP_CHECKSIG and the lock time opcodes see the spending transaction.

use txscript_primitives::ec::Secp256k1Verifier;
use txscript_primitives::signature::{Signature, SignatureVerifier};
use txscript_script::interpreter::{
    Engine, InterpreterError, InterpreterErrorCode, ScriptFlags, TxContext,
};
use txscript_script::Script;

use crate::transaction::Transaction;

/// Interpreter view of a spending transaction.
pub struct TransactionContext<'a> {
    tx: &'a Transaction,
    verifier: &'a dyn SignatureVerifier,
}

impl<'a> TransactionContext<'a> {
    /// Context verifying signatures with `verifier`.
    pub fn new(tx: &'a Transaction, verifier: &'a dyn SignatureVerifier) -> Self {
        TransactionContext { tx, verifier }
    }
}

impl TxContext for TransactionContext<'_> {
    fn verify_signature(
        &self,
        full_sig: &[u8],
        pub_key: &[u8],
        sub_script: &Script,
        input_idx: usize,
        hash_type: u8,
    ) -> Result<bool, InterpreterError> {
        let signature = match Signature::from_tx_format(full_sig) {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };
        self.tx
            .verify_signature(input_idx, sub_script, hash_type, &signature, pub_key, self.verifier)
            .map_err(|e| InterpreterError::new(InterpreterErrorCode::InvalidIndex, e.to_string()))
    }

    fn lock_time(&self) -> u32 {
        self.tx.lock_time
    }

    fn tx_version(&self) -> u32 {
        self.tx.version
    }

    fn input_sequence(&self, input_idx: usize) -> Result<u32, InterpreterError> {
        self.tx
            .inputs
            .get(input_idx)
            .map(|input| input.sequence_number)
            .ok_or_else(|| {
                InterpreterError::new(
                    InterpreterErrorCode::InvalidIndex,
                    format!(
                        "input index {} out of range for {} inputs",
                        input_idx,
                        self.tx.inputs.len()
                    ),
                )
            })
    }
}

/// Verify that `script_sig` satisfies `script_pubkey` for input
/// `input_index` of `tx`, with secp256k1 signatures.
///
/// Failures are logged at debug level with their reason code; use
/// [`Engine::execute`] with a [`TransactionContext`] to inspect them.
pub fn verify(
    script_sig: &Script,
    script_pubkey: &Script,
    tx: &Transaction,
    input_index: usize,
    flags: ScriptFlags,
) -> bool {
    if input_index >= tx.inputs.len() {
        return false;
    }
    let ctx = TransactionContext::new(tx, &Secp256k1Verifier);
    Engine::new().verify(script_sig, script_pubkey, flags, Some(&ctx), input_index)
}
