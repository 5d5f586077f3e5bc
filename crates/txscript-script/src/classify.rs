//! Script template classification.
//!
//! Classification is a pattern match over the chunk list. The same bytes can
//! classify differently as an input and as an output, so callers pass the
//! context explicitly.

use std::fmt;

use txscript_primitives::signature::is_canonical_tx_der;

use crate::chunk::ScriptChunk;
use crate::opcodes::*;
use crate::Script;

/// Where a script appears in a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptContext {
    /// An unlocking script (scriptSig).
    Input,
    /// A locking script (scriptPubKey).
    Output,
}

/// Recognized script templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptClass {
    PubkeyHashOut,
    PubkeyHashIn,
    ScriptHashOut,
    ScriptHashIn,
    MultisigOut,
    MultisigIn,
    DataOut,
    PubkeyOut,
    PubkeyIn,
    /// No template matched. This is a valid result, not an error.
    Unknown,
}

impl ScriptClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptClass::PubkeyHashOut => "pubkeyhash-out",
            ScriptClass::PubkeyHashIn => "pubkeyhash-in",
            ScriptClass::ScriptHashOut => "scripthash-out",
            ScriptClass::ScriptHashIn => "scripthash-in",
            ScriptClass::MultisigOut => "multisig-out",
            ScriptClass::MultisigIn => "multisig-in",
            ScriptClass::DataOut => "data-out",
            ScriptClass::PubkeyOut => "pubkey-out",
            ScriptClass::PubkeyIn => "pubkey-in",
            ScriptClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ScriptClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `script` as it would be read in `context`.
pub fn classify(script: &Script, context: ScriptContext) -> ScriptClass {
    match context {
        ScriptContext::Input => classify_input(script),
        ScriptContext::Output => classify_output(script),
    }
}

/// Classify a locking script.
pub fn classify_output(script: &Script) -> ScriptClass {
    if script.is_pubkey_hash_out() {
        ScriptClass::PubkeyHashOut
    } else if script.is_script_hash_out() {
        ScriptClass::ScriptHashOut
    } else if script.is_multisig_out() {
        ScriptClass::MultisigOut
    } else if script.is_data_out() {
        ScriptClass::DataOut
    } else if script.is_pubkey_out() {
        ScriptClass::PubkeyOut
    } else {
        ScriptClass::Unknown
    }
}

/// Classify an unlocking script.
pub fn classify_input(script: &Script) -> ScriptClass {
    if script.is_pubkey_in() {
        ScriptClass::PubkeyIn
    } else if script.is_pubkey_hash_in() {
        ScriptClass::PubkeyHashIn
    } else if script.is_multisig_in() {
        ScriptClass::MultisigIn
    } else if script.is_script_hash_in() {
        ScriptClass::ScriptHashIn
    } else {
        ScriptClass::Unknown
    }
}

/// SEC1 shape: 33 bytes with an 0x02/0x03 prefix or 65 bytes with 0x04.
///
/// Only the shape is checked, not curve membership.
pub fn looks_like_public_key(data: &[u8]) -> bool {
    match data.first() {
        Some(0x02) | Some(0x03) => data.len() == 33,
        Some(0x04) => data.len() == 65,
        _ => false,
    }
}

/// A non-empty push starting with the DER sequence tag.
fn looks_like_signature(data: &[u8]) -> bool {
    data.first() == Some(&0x30)
}

fn is_op(chunk: &ScriptChunk, op: Opcode) -> bool {
    *chunk == ScriptChunk::Op(op.to_u8())
}

fn push_of_len(chunk: &ScriptChunk, len: usize) -> bool {
    matches!(chunk.data(), Some(d) if d.len() == len)
}

impl Script {
    /// Classify this script as it would be read in `context`.
    pub fn classify(&self, context: ScriptContext) -> ScriptClass {
        classify(self, context)
    }

    /// Classify this script as a locking script.
    pub fn classify_output(&self) -> ScriptClass {
        classify_output(self)
    }

    /// Classify this script as an unlocking script.
    pub fn classify_input(&self) -> ScriptClass {
        classify_input(self)
    }

    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn is_pubkey_hash_out(&self) -> bool {
        let c = self.chunks();
        c.len() == 5
            && is_op(&c[0], Opcode::Dup)
            && is_op(&c[1], Opcode::Hash160)
            && push_of_len(&c[2], 20)
            && is_op(&c[3], Opcode::EqualVerify)
            && is_op(&c[4], Opcode::CheckSig)
    }

    /// `<sig> <pubkey>`
    pub fn is_pubkey_hash_in(&self) -> bool {
        let c = self.chunks();
        c.len() == 2
            && c[0].data().map_or(false, looks_like_signature)
            && c[1].data().map_or(false, looks_like_public_key)
    }

    /// `OP_HASH160 <20 bytes> OP_EQUAL`
    pub fn is_script_hash_out(&self) -> bool {
        let c = self.chunks();
        c.len() == 3
            && is_op(&c[0], Opcode::Hash160)
            && push_of_len(&c[1], 20)
            && is_op(&c[2], Opcode::Equal)
    }

    /// Two or more chunks whose last push decodes to a recognized locking
    /// template.
    ///
    /// Only the trailing redeem script is inspected, which is why an
    /// `OP_RETURN <redeem>` data output also reads as a P2SH input.
    pub fn is_script_hash_in(&self) -> bool {
        self.redeem_script().is_some()
    }

    /// The trailing redeem script of a P2SH input.
    pub fn redeem_script(&self) -> Option<Script> {
        let c = self.chunks();
        if c.len() < 2 {
            return None;
        }
        let data = c[c.len() - 1].data()?;
        let redeem = Script::from_bytes(data).ok()?;
        match redeem.classify_output() {
            ScriptClass::Unknown => None,
            _ => Some(redeem),
        }
    }

    /// `OP_<m> <pubkey>{n} OP_<n> OP_CHECKMULTISIG` with `1 <= m <= n`.
    pub fn is_multisig_out(&self) -> bool {
        let c = self.chunks();
        if c.len() < 4 || !is_op(&c[c.len() - 1], Opcode::CheckMultiSig) {
            return false;
        }
        let m = match Opcode::small_int_value(c[0].opcode()) {
            Some(m) if m >= 1 && matches!(c[0], ScriptChunk::Op(_)) => m as usize,
            _ => return false,
        };
        let n = match Opcode::small_int_value(c[c.len() - 2].opcode()) {
            Some(n) if matches!(c[c.len() - 2], ScriptChunk::Op(_)) => n as usize,
            _ => return false,
        };
        let keys = &c[1..c.len() - 2];
        keys.len() == n
            && m <= n
            && keys
                .iter()
                .all(|k| k.data().map_or(false, |d| !d.is_empty()))
    }

    /// `OP_0 <sig>...` where every signature is canonical.
    pub fn is_multisig_in(&self) -> bool {
        let c = self.chunks();
        c.len() >= 2
            && c[0] == ScriptChunk::Op(OP_0)
            && c[1..]
                .iter()
                .all(|s| s.data().map_or(false, is_canonical_tx_der))
    }

    /// `OP_RETURN` with at most one data push after it.
    pub fn is_data_out(&self) -> bool {
        let c = self.chunks();
        match c.len() {
            1 => is_op(&c[0], Opcode::Return),
            2 => is_op(&c[0], Opcode::Return) && c[1].data().is_some(),
            _ => false,
        }
    }

    /// `<pubkey> OP_CHECKSIG`
    pub fn is_pubkey_out(&self) -> bool {
        let c = self.chunks();
        c.len() == 2
            && c[0].data().map_or(false, looks_like_public_key)
            && is_op(&c[1], Opcode::CheckSig)
    }

    /// `<sig>`
    pub fn is_pubkey_in(&self) -> bool {
        let c = self.chunks();
        c.len() == 1 && c[0].data().map_or(false, looks_like_signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBKEY: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const SIG: &str = "3044022018b5c2ee1a1b4cd2c8bf04ac5eb3ab3e2fb3b8b6a5d97f0bb8e1c1d9a6e0f4ea\
                       022040b7e4c4e7f4fb6d2b9a1f1c9d3e4b5a6978877665544332211000ffeeddccbb01";

    fn asm(s: &str) -> Script {
        Script::from_asm(s).expect("valid asm")
    }

    fn multisig_redeem() -> Script {
        Script::build_multisig_out(&[hex::decode(PUBKEY).expect("hex")], 1, true)
            .expect("valid multisig")
    }

    // -----------------------------------------------------------------------
    // Outputs
    // -----------------------------------------------------------------------

    #[test]
    fn test_classify_pubkey_hash_out() {
        let s = Script::from_hex("76a914751e76e8199196d454941c45d1b3a323f1433bd688ac")
            .expect("valid script");
        assert_eq!(s.classify_output(), ScriptClass::PubkeyHashOut);
        assert_eq!(s.classify_input(), ScriptClass::Unknown);
    }

    #[test]
    fn test_classify_script_hash_out() {
        let s = multisig_redeem().to_script_hash_out();
        assert_eq!(s.classify_output(), ScriptClass::ScriptHashOut);
    }

    #[test]
    fn test_classify_multisig_out() {
        assert_eq!(multisig_redeem().classify_output(), ScriptClass::MultisigOut);
    }

    #[test]
    fn test_multisig_out_key_count_must_match() {
        let s = asm(&format!("OP_1 {} OP_2 OP_CHECKMULTISIG", PUBKEY));
        assert_eq!(s.classify_output(), ScriptClass::Unknown);
        let s = asm(&format!("OP_2 {} OP_1 OP_CHECKMULTISIG", PUBKEY));
        assert_eq!(s.classify_output(), ScriptClass::Unknown);
    }

    #[test]
    fn test_classify_data_out() {
        assert_eq!(asm("OP_RETURN").classify_output(), ScriptClass::DataOut);
        assert_eq!(asm("OP_RETURN deadbeef").classify_output(), ScriptClass::DataOut);
        assert_eq!(
            asm("OP_RETURN deadbeef cafe").classify_output(),
            ScriptClass::Unknown
        );
    }

    #[test]
    fn test_classify_pubkey_out() {
        let s = asm(&format!("{} OP_CHECKSIG", PUBKEY));
        assert_eq!(s.classify_output(), ScriptClass::PubkeyOut);
        let s = asm("0011 OP_CHECKSIG");
        assert_eq!(s.classify_output(), ScriptClass::Unknown);
    }

    #[test]
    fn test_classify_unknown_output() {
        assert_eq!(asm("OP_1 OP_ADD").classify_output(), ScriptClass::Unknown);
        assert_eq!(Script::new().classify_output(), ScriptClass::Unknown);
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    #[test]
    fn test_classify_pubkey_hash_in() {
        let s = asm(&format!("{} {}", SIG, PUBKEY));
        assert_eq!(s.classify_input(), ScriptClass::PubkeyHashIn);
        assert_eq!(s.classify(ScriptContext::Output), ScriptClass::Unknown);
    }

    #[test]
    fn test_classify_pubkey_in() {
        assert_eq!(asm(SIG).classify_input(), ScriptClass::PubkeyIn);
    }

    #[test]
    fn test_classify_script_hash_in() {
        let redeem = multisig_redeem();
        let s = asm(&format!("0 {} {}", SIG, redeem.to_hex()));
        assert_eq!(s.classify_input(), ScriptClass::ScriptHashIn);
        assert_eq!(s.redeem_script(), Some(redeem));
    }

    #[test]
    fn test_classify_unknown_input() {
        assert_eq!(asm("OP_1 OP_2").classify_input(), ScriptClass::Unknown);
        assert_eq!(Script::new().classify_input(), ScriptClass::Unknown);
    }

    /// An OP_RETURN output whose payload is itself a standard template is a
    /// data output when read as an output and a P2SH spend when read as an
    /// input.
    #[test]
    fn test_data_out_scripthash_in_ambiguity() {
        let redeem = multisig_redeem();
        let s = Script::build_data_out(&redeem.to_bytes()).expect("data out");
        assert_eq!(s.classify(ScriptContext::Output), ScriptClass::DataOut);
        assert_eq!(s.classify(ScriptContext::Input), ScriptClass::ScriptHashIn);
    }

    #[test]
    fn test_looks_like_public_key() {
        assert!(looks_like_public_key(&[0x02; 33]));
        assert!(looks_like_public_key(&[0x04; 65]));
        assert!(!looks_like_public_key(&[0x04; 33]));
        assert!(!looks_like_public_key(&[0x05; 33]));
        assert!(!looks_like_public_key(&[]));
    }

    #[test]
    fn test_class_display() {
        assert_eq!(ScriptClass::PubkeyHashOut.to_string(), "pubkeyhash-out");
        assert_eq!(ScriptClass::Unknown.to_string(), "unknown");
    }
}
