//! Hashing and signature checking operations.

use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use txscript_primitives::signature::{Signature, SIGHASH_ANYONECANPAY, SIGHASH_ALL, SIGHASH_SINGLE};

use crate::chunk::ScriptChunk;
use crate::opcodes::Opcode;
use crate::Script;

use super::error::{InterpreterError, InterpreterErrorCode};
use super::flags::ScriptFlags;
use super::thread::Thread;

pub(crate) enum HashType {
    Ripemd160,
    Sha1,
    Sha256,
    Hash160,
    Hash256,
}

impl HashType {
    fn digest(&self, buf: &[u8]) -> Vec<u8> {
        match self {
            HashType::Ripemd160 => Ripemd160::digest(buf).to_vec(),
            HashType::Sha1 => Sha1::digest(buf).to_vec(),
            HashType::Sha256 => Sha256::digest(buf).to_vec(),
            HashType::Hash160 => Ripemd160::digest(Sha256::digest(buf)).to_vec(),
            HashType::Hash256 => Sha256::digest(Sha256::digest(buf)).to_vec(),
        }
    }
}

/// Drop every minimal push of `sig` and every OP_CODESEPARATOR.
///
/// Only pushes encoded exactly as a fresh minimal push of the signature are
/// removed; the same bytes pushed with another opcode stay.
pub(crate) fn remove_signature(chunks: &mut Vec<ScriptChunk>, sig: &[u8]) {
    let encoded = ScriptChunk::push(sig).ok();
    let separator = ScriptChunk::op(Opcode::CodeSeparator);
    chunks.retain(|c| *c != separator && Some(c) != encoded.as_ref());
}

fn malformed(code: InterpreterErrorCode, msg: &str) -> InterpreterError {
    InterpreterError::new(code, format!("malformed signature: {}", msg))
}

impl<'a> Thread<'a> {
    pub(crate) fn op_hash(&mut self, hash_type: HashType) -> Result<(), InterpreterError> {
        let buf = self.dstack.pop()?;
        self.dstack.push(hash_type.digest(&buf));
        Ok(())
    }

    /// The current script from the last OP_CODESEPARATOR on, with the given
    /// signatures removed.
    pub(crate) fn sub_script(&self, sigs: &[Vec<u8>]) -> Script {
        let chunks = self.scripts[self.script_idx].chunks();
        let separator = ScriptChunk::op(Opcode::CodeSeparator);
        let mut sub: Vec<ScriptChunk> = chunks[self.last_code_sep.min(chunks.len())..]
            .iter()
            .filter(|c| **c != separator)
            .cloned()
            .collect();
        for sig in sigs {
            remove_signature(&mut sub, sig);
        }
        Script::from_chunks(sub)
    }

    /// Encoding checks followed by verification through the tx context.
    ///
    /// An empty signature is a valid encoding that never verifies.
    fn check_sig(
        &self,
        full_sig: &[u8],
        pub_key: &[u8],
        sub_script: &Script,
    ) -> Result<bool, InterpreterError> {
        let split = full_sig.split_last();
        if let Some((&hash_type, sig)) = split {
            self.check_hash_type_encoding(hash_type)?;
            self.check_signature_encoding(sig)?;
        }
        self.check_pub_key_encoding(pub_key)?;

        let hash_type = match split {
            Some((&hash_type, _)) => hash_type,
            None => return Ok(false),
        };
        let ctx = self.tx_context.ok_or_else(|| {
            InterpreterError::new(
                InterpreterErrorCode::InvalidParams,
                "no tx context for checksig".to_string(),
            )
        })?;
        ctx.verify_signature(full_sig, pub_key, sub_script, self.input_idx, hash_type)
    }

    pub(crate) fn op_checksig(&mut self) -> Result<(), InterpreterError> {
        let pub_key = self.dstack.pop()?;
        let full_sig = self.dstack.pop()?;

        let sub_script = self.sub_script(std::slice::from_ref(&full_sig));
        let valid = self.check_sig(&full_sig, &pub_key, &sub_script)?;

        if !valid && self.has_flag(ScriptFlags::NULL_FAIL) && !full_sig.is_empty() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NullFail,
                "signature not empty on failed checksig".to_string(),
            ));
        }
        self.dstack.push_bool(valid);
        Ok(())
    }

    /// `dummy sig... m pubkey... n OP_CHECKMULTISIG`
    ///
    /// Signatures are matched against public keys in order: each signature
    /// must verify under a key after the one that verified the previous
    /// signature. The extra dummy item is consumed unchecked unless
    /// NULL_DUMMY is set.
    pub(crate) fn op_checkmultisig(&mut self) -> Result<(), InterpreterError> {
        let num_keys = self.dstack.pop_int()?.value();
        if num_keys < 0 || num_keys as usize > self.cfg.max_pub_keys_per_multisig {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidPubKeyCount,
                format!(
                    "number of pubkeys {} is outside 0..={}",
                    num_keys, self.cfg.max_pub_keys_per_multisig
                ),
            ));
        }
        let num_keys = num_keys as usize;

        self.num_ops += num_keys;
        self.check_op_count()?;

        let mut pub_keys = Vec::with_capacity(num_keys);
        for _ in 0..num_keys {
            pub_keys.push(self.dstack.pop()?);
        }

        let num_sigs = self.dstack.pop_int()?.value();
        if num_sigs < 0 || num_sigs as usize > num_keys {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidSignatureCount,
                format!("number of signatures {} is outside 0..={}", num_sigs, num_keys),
            ));
        }
        let num_sigs = num_sigs as usize;

        let mut sigs = Vec::with_capacity(num_sigs);
        for _ in 0..num_sigs {
            sigs.push(self.dstack.pop()?);
        }

        let dummy = self.dstack.pop()?;

        let sub_script = self.sub_script(&sigs);

        // Both lists were popped top first, so they are in the same
        // (reversed) order and can be walked together.
        let mut success = true;
        let mut key_idx = 0;
        let mut sig_idx = 0;
        while success && sig_idx < num_sigs {
            if self.check_sig(&sigs[sig_idx], &pub_keys[key_idx], &sub_script)? {
                sig_idx += 1;
            }
            key_idx += 1;
            if num_sigs - sig_idx > num_keys - key_idx {
                success = false;
            }
        }

        if !success && self.has_flag(ScriptFlags::NULL_FAIL) && sigs.iter().any(|s| !s.is_empty()) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NullFail,
                "not all signatures empty on failed checkmultisig".to_string(),
            ));
        }

        if self.has_flag(ScriptFlags::NULL_DUMMY) && !dummy.is_empty() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::SigNullDummy,
                format!("multisig dummy argument has length {} instead of 0", dummy.len()),
            ));
        }

        self.dstack.push_bool(success);
        Ok(())
    }

    pub(crate) fn check_hash_type_encoding(&self, hash_type: u8) -> Result<(), InterpreterError> {
        if !self.has_flag(ScriptFlags::STRICT_ENCODING) {
            return Ok(());
        }
        let base = hash_type & !SIGHASH_ANYONECANPAY;
        if !(SIGHASH_ALL..=SIGHASH_SINGLE).contains(&base) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidSigHashType,
                format!("invalid hash type 0x{:x}", hash_type),
            ));
        }
        Ok(())
    }

    pub(crate) fn check_pub_key_encoding(&self, pub_key: &[u8]) -> Result<(), InterpreterError> {
        if !self.has_flag(ScriptFlags::STRICT_ENCODING) {
            return Ok(());
        }
        match (pub_key.len(), pub_key.first()) {
            (33, Some(0x02)) | (33, Some(0x03)) | (65, Some(0x04)) => Ok(()),
            _ => Err(InterpreterError::new(
                InterpreterErrorCode::PubKeyType,
                "unsupported public key type".to_string(),
            )),
        }
    }

    /// Strict DER checks on a signature without its hash type byte.
    pub(crate) fn check_signature_encoding(&self, sig: &[u8]) -> Result<(), InterpreterError> {
        if !self.has_any(&[
            ScriptFlags::DER_SIGNATURES,
            ScriptFlags::LOW_S,
            ScriptFlags::STRICT_ENCODING,
        ]) {
            return Ok(());
        }
        if sig.is_empty() {
            return Ok(());
        }

        let sig_len = sig.len();
        if sig_len < 8 {
            return Err(malformed(
                InterpreterErrorCode::SigTooShort,
                &format!("too short: {} < 8", sig_len),
            ));
        }
        if sig_len > 72 {
            return Err(malformed(
                InterpreterErrorCode::SigTooLong,
                &format!("too long: {} > 72", sig_len),
            ));
        }
        if sig[0] != 0x30 {
            return Err(malformed(
                InterpreterErrorCode::SigInvalidSeqID,
                &format!("format has wrong type: {:#x}", sig[0]),
            ));
        }
        if sig[1] as usize != sig_len - 2 {
            return Err(malformed(
                InterpreterErrorCode::SigInvalidDataLen,
                &format!("bad length: {} != {}", sig[1], sig_len - 2),
            ));
        }

        let r_len = sig[3] as usize;
        let s_type_offset = 4 + r_len;
        let s_len_offset = s_type_offset + 1;
        if s_type_offset >= sig_len {
            return Err(malformed(
                InterpreterErrorCode::SigMissingSTypeID,
                "S type indicator missing",
            ));
        }
        if s_len_offset >= sig_len {
            return Err(malformed(InterpreterErrorCode::SigMissingSLen, "S length missing"));
        }

        let s_offset = s_len_offset + 1;
        let s_len = sig[s_len_offset] as usize;
        if s_offset + s_len != sig_len {
            return Err(malformed(InterpreterErrorCode::SigInvalidSLen, "invalid S length"));
        }

        if sig[2] != 0x02 {
            return Err(malformed(
                InterpreterErrorCode::SigInvalidRIntID,
                &format!("R integer marker: {:#x} != 0x02", sig[2]),
            ));
        }
        if r_len == 0 {
            return Err(malformed(InterpreterErrorCode::SigZeroRLen, "R length is zero"));
        }
        if sig[4] & 0x80 != 0 {
            return Err(malformed(InterpreterErrorCode::SigNegativeR, "R is negative"));
        }
        if r_len > 1 && sig[4] == 0x00 && sig[5] & 0x80 == 0 {
            return Err(malformed(
                InterpreterErrorCode::SigTooMuchRPadding,
                "R value has too much padding",
            ));
        }

        if sig[s_type_offset] != 0x02 {
            return Err(malformed(
                InterpreterErrorCode::SigInvalidSIntID,
                &format!("S integer marker: {:#x} != 0x02", sig[s_type_offset]),
            ));
        }
        if s_len == 0 {
            return Err(malformed(InterpreterErrorCode::SigZeroSLen, "S length is zero"));
        }
        if sig[s_offset] & 0x80 != 0 {
            return Err(malformed(InterpreterErrorCode::SigNegativeS, "S is negative"));
        }
        if s_len > 1 && sig[s_offset] == 0x00 && sig[s_offset + 1] & 0x80 == 0 {
            return Err(malformed(
                InterpreterErrorCode::SigTooMuchSPadding,
                "S value has too much padding",
            ));
        }

        if self.has_flag(ScriptFlags::LOW_S)
            && !Signature::from_der(sig).map_or(false, |s| s.has_low_s())
        {
            return Err(InterpreterError::new(
                InterpreterErrorCode::SigHighS,
                "signature is not canonical due to unnecessarily high S value".to_string(),
            ));
        }

        Ok(())
    }
}
