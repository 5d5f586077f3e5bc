//! Script interpreter.
//!
//! Evaluates an unlocking script followed by a locking script (and, for
//! pay-to-script-hash outputs, the redeem script) on a shared data stack.
//!
//! # Architecture
//!
//! The interpreter does not know about transactions. Signature and lock
//! time checks go through a caller supplied [`TxContext`], which the
//! transaction crate implements on top of its signature hash.
//!
//! # Example
//!
//! ```ignore
//! use txscript_script::interpreter::{Engine, ScriptFlags};
//!
//! let engine = Engine::new();
//! engine.execute(&unlocking, &locking, ScriptFlags::P2SH, None, 0)?;
//! ```

pub mod config;
pub mod error;
pub mod flags;
pub mod scriptnum;
pub mod stack;
pub mod thread;

mod ops_arithmetic;
mod ops_crypto;
mod ops_data;
mod ops_flow;
mod ops_stack;

pub use config::Config;
pub use error::{InterpreterError, InterpreterErrorCode};
pub use flags::ScriptFlags;
pub use scriptnum::ScriptNumber;
pub use stack::{cast_to_bool, Stack};

use tracing::debug;

use crate::Script;
use thread::Thread;

/// Transaction data needed by the signature and lock time opcodes.
pub trait TxContext {
    /// Verify a signature against a public key for the given input.
    ///
    /// `full_sig` ends with the hash type byte, passed separately as
    /// `hash_type`. `sub_script` is the script code being signed: the
    /// executing script from the last OP_CODESEPARATOR, with the checked
    /// signatures removed.
    ///
    /// Returns Ok(false) for a signature that does not verify. An error
    /// (such as an input index the transaction does not have) fails the
    /// script.
    fn verify_signature(
        &self,
        full_sig: &[u8],
        pub_key: &[u8],
        sub_script: &Script,
        input_idx: usize,
        hash_type: u8,
    ) -> Result<bool, InterpreterError>;

    fn lock_time(&self) -> u32;

    fn tx_version(&self) -> u32;

    /// Sequence number of the given input.
    fn input_sequence(&self, input_idx: usize) -> Result<u32, InterpreterError>;
}

/// The script execution engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Config,
}

impl Engine {
    pub fn new() -> Self {
        Engine::default()
    }

    /// Engine using non-default resource limits.
    pub fn with_config(config: Config) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute unlocking + locking scripts.
    ///
    /// # Arguments
    /// * `unlocking_script` - The input's unlocking (signature) script.
    /// * `locking_script` - The spent output's locking script.
    /// * `flags` - Verification flags.
    /// * `tx_context` - Transaction context; required only when a signature
    ///   or lock time opcode executes.
    /// * `input_idx` - The input index being verified.
    ///
    /// # Returns
    /// Ok(()) when the scripts leave a true value on the stack, otherwise
    /// the first error encountered.
    pub fn execute(
        &self,
        unlocking_script: &Script,
        locking_script: &Script,
        flags: ScriptFlags,
        tx_context: Option<&dyn TxContext>,
        input_idx: usize,
    ) -> Result<(), InterpreterError> {
        let mut thread = Thread::new(
            unlocking_script,
            locking_script,
            flags,
            self.config,
            tx_context,
            input_idx,
        )?;
        thread.execute()
    }

    /// Like [`Engine::execute`] but reporting only success or failure.
    pub fn verify(
        &self,
        unlocking_script: &Script,
        locking_script: &Script,
        flags: ScriptFlags,
        tx_context: Option<&dyn TxContext>,
        input_idx: usize,
    ) -> bool {
        match self.execute(unlocking_script, locking_script, flags, tx_context, input_idx) {
            Ok(()) => true,
            Err(e) => {
                debug!(input = input_idx, code = %e.code, "script rejected: {}", e.description);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ScriptChunk;

    /// Accepts a signature iff it is the public key followed by a hash type.
    struct EchoContext;

    impl TxContext for EchoContext {
        fn verify_signature(
            &self,
            full_sig: &[u8],
            pub_key: &[u8],
            _sub_script: &Script,
            _input_idx: usize,
            _hash_type: u8,
        ) -> Result<bool, InterpreterError> {
            Ok(&full_sig[..full_sig.len() - 1] == pub_key)
        }

        fn lock_time(&self) -> u32 {
            0
        }

        fn tx_version(&self) -> u32 {
            1
        }

        fn input_sequence(&self, _input_idx: usize) -> Result<u32, InterpreterError> {
            Ok(0xffff_ffff)
        }
    }

    const PK1: &str = "020202020202020202020202020202020202020202020202020202020202020202";
    const PK2: &str = "030303030303030303030303030303030303030303030303030303030303030303";
    const PK3: &str = "021111111111111111111111111111111111111111111111111111111111111111";

    fn sig_for(pk: &str) -> String {
        format!("{}01", pk)
    }

    fn asm(s: &str) -> Script {
        Script::from_asm(s).expect("valid asm")
    }

    fn run(unlock: &str, lock: &str, flags: ScriptFlags) -> Result<(), InterpreterError> {
        Engine::new().execute(&asm(unlock), &asm(lock), flags, Some(&EchoContext), 0)
    }

    fn run_code(unlock: &str, lock: &str, flags: ScriptFlags) -> InterpreterErrorCode {
        run(unlock, lock, flags).expect_err("script should fail").code
    }

    // -----------------------------------------------------------------------
    // Basic evaluation
    // -----------------------------------------------------------------------

    #[test]
    fn test_arithmetic_equal() {
        run("OP_1", "OP_15 OP_ADD OP_16 OP_EQUAL", ScriptFlags::NONE).expect("1 + 15 == 16");
        assert_eq!(
            run_code("OP_1", "OP_2 OP_EQUAL", ScriptFlags::NONE),
            InterpreterErrorCode::EvalFalse
        );
    }

    #[test]
    fn test_both_scripts_empty() {
        assert_eq!(run_code("", "", ScriptFlags::NONE), InterpreterErrorCode::EvalFalse);
    }

    #[test]
    fn test_empty_final_stack() {
        assert_eq!(
            run_code("OP_1", "OP_DROP", ScriptFlags::NONE),
            InterpreterErrorCode::EmptyStack
        );
    }

    /// Negative zero is false.
    #[test]
    fn test_negative_zero_is_false() {
        assert!(!cast_to_bool(&[0x00, 0x80]));
        assert_eq!(run_code("0080", "OP_NOP", ScriptFlags::NONE), InterpreterErrorCode::EvalFalse);
    }

    #[test]
    fn test_op_return_fails() {
        assert_eq!(
            run_code("OP_1", "OP_RETURN", ScriptFlags::NONE),
            InterpreterErrorCode::EarlyReturn
        );
    }

    #[test]
    fn test_alt_stack_does_not_carry_over() {
        assert_eq!(
            run_code("OP_1 OP_TOALTSTACK", "OP_FROMALTSTACK", ScriptFlags::NONE),
            InterpreterErrorCode::InvalidStackOperation
        );
    }

    // -----------------------------------------------------------------------
    // Conditionals
    // -----------------------------------------------------------------------

    #[test]
    fn test_unexecuted_branch_skips_reserved() {
        run("OP_0", "OP_IF OP_VER OP_ELSE OP_1 OP_ENDIF", ScriptFlags::NONE)
            .expect("OP_VER is skipped in an unexecuted branch");
    }

    #[test]
    fn test_disabled_opcode_fails_unexecuted() {
        assert_eq!(
            run_code("OP_0", "OP_IF OP_CAT OP_ENDIF OP_1", ScriptFlags::NONE),
            InterpreterErrorCode::DisabledOpcode
        );
    }

    #[test]
    fn test_verif_fails_unexecuted() {
        assert_eq!(
            run_code("OP_0", "OP_IF OP_VERIF OP_ENDIF OP_1", ScriptFlags::NONE),
            InterpreterErrorCode::ReservedOpcode
        );
    }

    #[test]
    fn test_unbalanced_conditionals() {
        assert_eq!(
            run_code("OP_1", "OP_IF OP_1", ScriptFlags::NONE),
            InterpreterErrorCode::UnbalancedConditional
        );
        assert_eq!(
            run_code("OP_1", "OP_ENDIF", ScriptFlags::NONE),
            InterpreterErrorCode::UnbalancedConditional
        );
        assert_eq!(
            run_code("", "OP_IF OP_ENDIF OP_1", ScriptFlags::NONE),
            InterpreterErrorCode::UnbalancedConditional
        );
    }

    #[test]
    fn test_nested_else() {
        run("OP_1", "OP_IF OP_0 OP_IF OP_0 OP_ELSE OP_1 OP_ENDIF OP_ENDIF", ScriptFlags::NONE)
            .expect("inner else branch leaves true");
    }

    // -----------------------------------------------------------------------
    // Limits
    // -----------------------------------------------------------------------

    #[test]
    fn test_op_count_limit() {
        let nops = |n: usize| vec!["OP_NOP"; n].join(" ");
        run("", &format!("OP_1 {}", nops(201)), ScriptFlags::NONE).expect("201 ops allowed");
        assert_eq!(
            run_code("", &format!("OP_1 {}", nops(202)), ScriptFlags::NONE),
            InterpreterErrorCode::TooManyOperations
        );
    }

    #[test]
    fn test_element_size_limit() {
        let big = hex::encode(vec![0x01u8; 521]);
        assert_eq!(
            run_code(&big, "OP_DROP OP_1", ScriptFlags::NONE),
            InterpreterErrorCode::ElementTooBig
        );
    }

    #[test]
    fn test_custom_config() {
        let engine = Engine::with_config(Config {
            max_ops: 1,
            ..Config::default()
        });
        let result = engine.execute(&asm("OP_1"), &asm("OP_NOP OP_NOP"), ScriptFlags::NONE, None, 0);
        assert_eq!(
            result.expect_err("limit is one op").code,
            InterpreterErrorCode::TooManyOperations
        );
        assert_eq!(engine.config().max_ops, 1);
    }

    // -----------------------------------------------------------------------
    // Flags
    // -----------------------------------------------------------------------

    #[test]
    fn test_minimal_data() {
        let unlock = Script::from_chunks(vec![ScriptChunk::Push {
            opcode: 0x01,
            data: vec![0x05],
        }]);
        let lock = asm("OP_5 OP_EQUAL");
        let engine = Engine::new();
        engine
            .execute(&unlock, &lock, ScriptFlags::NONE, None, 0)
            .expect("non-minimal push allowed without the flag");
        let err = engine
            .execute(&unlock, &lock, ScriptFlags::MINIMAL_DATA, None, 0)
            .expect_err("non-minimal push rejected");
        assert_eq!(err.code, InterpreterErrorCode::MinimalData);
    }

    #[test]
    fn test_clean_stack_requires_p2sh() {
        assert_eq!(
            run_code("OP_1", "OP_1", ScriptFlags::CLEAN_STACK),
            InterpreterErrorCode::InvalidFlags
        );
        assert_eq!(
            run_code("OP_1", "OP_1", ScriptFlags::CLEAN_STACK | ScriptFlags::P2SH),
            InterpreterErrorCode::CleanStack
        );
    }

    #[test]
    fn test_sig_push_only() {
        assert_eq!(
            run_code("OP_1 OP_DUP", "OP_EQUAL", ScriptFlags::SIG_PUSH_ONLY),
            InterpreterErrorCode::NotPushOnly
        );
    }

    #[test]
    fn test_discourage_upgradable_nops() {
        run("OP_1", "OP_NOP5", ScriptFlags::NONE).expect("NOP5 is a no-op");
        assert_eq!(
            run_code("OP_1", "OP_NOP5", ScriptFlags::DISCOURAGE_UPGRADABLE_NOPS),
            InterpreterErrorCode::DiscourageUpgradableNOPs
        );
    }

    // -----------------------------------------------------------------------
    // Pay to script hash
    // -----------------------------------------------------------------------

    #[test]
    fn test_p2sh_evaluates_redeem_script() {
        let redeem = asm("OP_1");
        let lock = redeem.to_script_hash_out();
        let mut unlock = Script::new();
        unlock.push_data(&redeem.to_bytes()).expect("push redeem");

        let engine = Engine::new();
        engine
            .execute(&unlock, &lock, ScriptFlags::P2SH | ScriptFlags::CLEAN_STACK, None, 0)
            .expect("redeem script OP_1 passes");
    }

    #[test]
    fn test_p2sh_false_redeem_script() {
        let redeem = asm("OP_0");
        let lock = redeem.to_script_hash_out();
        let mut unlock = Script::new();
        unlock.push_data(&redeem.to_bytes()).expect("push redeem");

        let engine = Engine::new();
        assert!(engine.verify(&unlock, &lock, ScriptFlags::NONE, None, 0));
        let err = engine
            .execute(&unlock, &lock, ScriptFlags::P2SH, None, 0)
            .expect_err("redeem script leaves false");
        assert_eq!(err.code, InterpreterErrorCode::EvalFalse);
    }

    #[test]
    fn test_p2sh_requires_push_only() {
        let redeem = asm("OP_1");
        let lock = redeem.to_script_hash_out();
        let mut unlock = asm("OP_1 OP_DROP");
        unlock.push_data(&redeem.to_bytes()).expect("push redeem");

        let err = Engine::new()
            .execute(&unlock, &lock, ScriptFlags::P2SH, None, 0)
            .expect_err("unlocking script has OP_DROP");
        assert_eq!(err.code, InterpreterErrorCode::NotPushOnly);
    }

    // -----------------------------------------------------------------------
    // Signatures
    // -----------------------------------------------------------------------

    #[test]
    fn test_checksig_without_context() {
        let err = Engine::new()
            .execute(
                &asm(&sig_for(PK1)),
                &asm(&format!("{} OP_CHECKSIG", PK1)),
                ScriptFlags::NONE,
                None,
                0,
            )
            .expect_err("no context");
        assert_eq!(err.code, InterpreterErrorCode::InvalidParams);
    }

    #[test]
    fn test_checksig() {
        let lock = format!("{} OP_CHECKSIG", PK1);
        run(&sig_for(PK1), &lock, ScriptFlags::NONE).expect("matching signature");
        assert_eq!(
            run_code(&sig_for(PK2), &lock, ScriptFlags::NONE),
            InterpreterErrorCode::EvalFalse
        );
        assert_eq!(
            run_code(&sig_for(PK2), &lock, ScriptFlags::NULL_FAIL),
            InterpreterErrorCode::NullFail
        );
        // An empty signature fails quietly even under NULL_FAIL.
        run("OP_0", &format!("{} OP_CHECKSIG OP_NOT", PK1), ScriptFlags::NULL_FAIL)
            .expect("empty signature is false");
    }

    #[test]
    fn test_checksig_strict_pubkey() {
        // The key is checked even when the signature is empty.
        let lock = "0400 OP_CHECKSIG";
        assert_eq!(
            run_code("OP_0", lock, ScriptFlags::STRICT_ENCODING),
            InterpreterErrorCode::PubKeyType
        );
    }

    #[test]
    fn test_checksig_strict_der() {
        let lock = format!("{} OP_CHECKSIG", PK1);
        // The stand-in signature is not DER.
        assert_eq!(
            run_code(&sig_for(PK1), &lock, ScriptFlags::DER_SIGNATURES),
            InterpreterErrorCode::SigInvalidSeqID
        );
    }

    #[test]
    fn test_checkmultisig_in_order() {
        let lock = format!("OP_2 {} {} {} OP_3 OP_CHECKMULTISIG", PK1, PK2, PK3);
        run(&format!("OP_0 {} {}", sig_for(PK1), sig_for(PK2)), &lock, ScriptFlags::NONE)
            .expect("signatures in key order");
        run(&format!("OP_0 {} {}", sig_for(PK1), sig_for(PK3)), &lock, ScriptFlags::NONE)
            .expect("keys may be skipped");
        assert_eq!(
            run_code(
                &format!("OP_0 {} {}", sig_for(PK2), sig_for(PK1)),
                &lock,
                ScriptFlags::NONE
            ),
            InterpreterErrorCode::EvalFalse
        );
    }

    #[test]
    fn test_checkmultisig_counts() {
        assert_eq!(
            run_code("OP_0", "OP_0 OP_16 OP_5 OP_ADD OP_CHECKMULTISIG", ScriptFlags::NONE),
            InterpreterErrorCode::InvalidPubKeyCount
        );
        assert_eq!(
            run_code("OP_0", &format!("OP_2 {} OP_1 OP_CHECKMULTISIG", PK1), ScriptFlags::NONE),
            InterpreterErrorCode::InvalidSignatureCount
        );
        run("OP_0", "OP_0 OP_0 OP_CHECKMULTISIG", ScriptFlags::NONE).expect("0-of-0 succeeds");
    }

    #[test]
    fn test_checkmultisig_null_dummy() {
        let lock = format!("OP_1 {} OP_1 OP_CHECKMULTISIG", PK1);
        let unlock = format!("OP_1 {}", sig_for(PK1));
        run(&unlock, &lock, ScriptFlags::NONE).expect("dummy unchecked");
        assert_eq!(
            run_code(&unlock, &lock, ScriptFlags::NULL_DUMMY),
            InterpreterErrorCode::SigNullDummy
        );
    }
}
