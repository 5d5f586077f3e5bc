//! Script templates for common spends.
//!
//! Provides the `UnlockingScriptTemplate` trait and a P2PKH implementation
//! for producing locking scripts and signed unlocking scripts.

pub mod p2pkh;

use txscript_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Trait for script templates that produce unlocking scripts.
///
/// `sign` receives the transaction, the input index and the locking script
/// being spent, signs the input and returns the unlocking script.
pub trait UnlockingScriptTemplate {
    fn sign(
        &self,
        tx: &Transaction,
        input_index: usize,
        locking_script: &Script,
    ) -> Result<Script, TransactionError>;

    /// Upper bound on the unlocking script length in bytes.
    fn estimate_length(&self) -> usize;
}
