//! Pay-to-Public-Key-Hash (P2PKH) script template.
//!
//! Creates P2PKH locking scripts (`OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY
//! OP_CHECKSIG`) and unlocking scripts (`<sig> <pubkey>`).

use txscript_primitives::ec::PrivateKey;
use txscript_primitives::signature::SIGHASH_ALL;
use txscript_script::{Address, AddressError, AddressKind, Script, ScriptClass};

use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Create a P2PKH locking script paying to `address`.
///
/// # Returns
/// The 25-byte locking script, or `UnsupportedScriptTemplate` for a
/// script-hash address.
pub fn lock(address: &Address) -> Result<Script, TransactionError> {
    if address.kind != AddressKind::PubkeyHash {
        return Err(AddressError::UnsupportedScriptTemplate(ScriptClass::ScriptHashOut).into());
    }
    Ok(Script::build_pubkey_hash_out(&address.payload_hash))
}

/// Create a P2PKH unlocker.
///
/// # Arguments
/// * `private_key` - The key to sign with.
/// * `hash_type` - Signature hash type. Defaults to `SIGHASH_ALL`.
pub fn unlock(private_key: PrivateKey, hash_type: Option<u8>) -> P2PKH {
    P2PKH {
        private_key,
        hash_type: hash_type.unwrap_or(SIGHASH_ALL),
    }
}

/// P2PKH signing template holding a private key and hash type.
///
/// Produces unlocking scripts of the form
/// `<DER_signature + hash_type> <compressed_pubkey>`.
pub struct P2PKH {
    private_key: PrivateKey,
    hash_type: u8,
}

impl UnlockingScriptTemplate for P2PKH {
    fn sign(
        &self,
        tx: &Transaction,
        input_index: usize,
        locking_script: &Script,
    ) -> Result<Script, TransactionError> {
        let signature = tx.sign(input_index, locking_script, self.hash_type, &self.private_key)?;
        let pub_key = self.private_key.public_key().to_compressed();

        let mut script = Script::new();
        script.push_data(&signature.to_tx_format()?)?;
        script.push_data(&pub_key)?;
        Ok(script)
    }

    /// 1 + 73 (DER signature and hash type) + 1 + 33 (compressed key).
    fn estimate_length(&self) -> usize {
        108
    }
}
