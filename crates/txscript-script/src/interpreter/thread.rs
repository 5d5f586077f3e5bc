//! Script execution thread - the core interpreter engine.

use tracing::{debug, trace};

use crate::chunk::ScriptChunk;
use crate::opcodes::*;
use crate::Script;

use super::config::Config;
use super::error::{InterpreterError, InterpreterErrorCode};
use super::flags::ScriptFlags;
use super::ops_crypto::HashType;
use super::scriptnum::ScriptNumber;
use super::stack::Stack;
use super::TxContext;

/// Evaluation state for one spend: the unlocking script, the locking script
/// and, for pay-to-script-hash, the redeem script.
pub struct Thread<'a> {
    /// The main data stack.
    pub(crate) dstack: Stack,
    /// The alt stack used by OP_TOALTSTACK and OP_FROMALTSTACK.
    pub(crate) astack: Stack,
    /// One entry per open IF; a branch executes iff no entry is false.
    pub(crate) exec_stack: Vec<bool>,
    pub(crate) cfg: Config,
    /// Unlocking, locking, then the redeem script once it is known.
    pub(crate) scripts: Vec<Script>,
    /// Data stack after the unlocking script, kept for P2SH.
    pub(crate) saved_first_stack: Vec<Vec<u8>>,
    pub(crate) script_idx: usize,
    pub(crate) script_off: usize,
    /// First chunk of the current script covered by signatures.
    pub(crate) last_code_sep: usize,
    /// Non-push opcodes executed in the current script.
    pub(crate) num_ops: usize,
    pub(crate) flags: ScriptFlags,
    /// Whether the locking script is P2SH and the flag enables it.
    pub(crate) bip16: bool,
    pub(crate) tx_context: Option<&'a dyn TxContext>,
    pub(crate) input_idx: usize,
}

impl<'a> Thread<'a> {
    /// Create a new execution thread from unlocking and locking scripts.
    ///
    /// Validates the flag combination and script sizes, and applies the
    /// push-only rules before anything is executed.
    pub fn new(
        unlocking_script: &Script,
        locking_script: &Script,
        flags: ScriptFlags,
        cfg: Config,
        tx_context: Option<&'a dyn TxContext>,
        input_idx: usize,
    ) -> Result<Self, InterpreterError> {
        if flags.has_flag(ScriptFlags::CLEAN_STACK) && !flags.has_flag(ScriptFlags::P2SH) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidFlags,
                "invalid scriptflag combination".to_string(),
            ));
        }

        check_script_size(unlocking_script, &cfg, "unlocking")?;
        check_script_size(locking_script, &cfg, "locking")?;

        if unlocking_script.is_empty() && locking_script.is_empty() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::EvalFalse,
                "false stack entry at end of script execution".to_string(),
            ));
        }

        if flags.has_flag(ScriptFlags::SIG_PUSH_ONLY) && !unlocking_script.is_push_only() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NotPushOnly,
                "signature script is not push only".to_string(),
            ));
        }

        let bip16 = flags.has_flag(ScriptFlags::P2SH) && locking_script.is_script_hash_out();
        if bip16 && !unlocking_script.is_push_only() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NotPushOnly,
                "pay to script hash is not push only".to_string(),
            ));
        }

        let script_idx = if unlocking_script.is_empty() { 1 } else { 0 };
        let require_minimal = flags.has_flag(ScriptFlags::MINIMAL_DATA);
        let max_num_len = cfg.max_script_number_length;

        Ok(Thread {
            dstack: Stack::new(max_num_len, require_minimal),
            astack: Stack::new(max_num_len, require_minimal),
            exec_stack: Vec::new(),
            cfg,
            scripts: vec![unlocking_script.clone(), locking_script.clone()],
            saved_first_stack: Vec::new(),
            script_idx,
            script_off: 0,
            last_code_sep: 0,
            num_ops: 0,
            flags,
            bip16,
            tx_context,
            input_idx,
        })
    }

    pub fn has_flag(&self, flag: ScriptFlags) -> bool {
        self.flags.has_flag(flag)
    }

    pub fn has_any(&self, flags: &[ScriptFlags]) -> bool {
        self.flags.has_any(flags)
    }

    /// True if every enclosing IF branch is being taken.
    pub fn is_branch_executing(&self) -> bool {
        !self.exec_stack.contains(&false)
    }

    /// Run all scripts to completion and check the final stack.
    pub fn execute(&mut self) -> Result<(), InterpreterError> {
        while !self.step()? {}
        self.check_error_condition(true)
    }

    /// Execute one chunk. Returns true when every script has run.
    pub fn step(&mut self) -> Result<bool, InterpreterError> {
        let chunk = match self
            .scripts
            .get(self.script_idx)
            .and_then(|s| s.chunks().get(self.script_off))
        {
            Some(c) => c.clone(),
            None => {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::Internal,
                    format!(
                        "program counter {}:{} is past the end of the scripts",
                        self.script_idx, self.script_off
                    ),
                ))
            }
        };

        self.execute_chunk(&chunk)?;
        self.script_off += 1;

        let combined = self.dstack.depth() + self.astack.depth();
        if combined > self.cfg.max_stack_size {
            return Err(InterpreterError::new(
                InterpreterErrorCode::StackOverflow,
                format!(
                    "combined stack size {} > max allowed {}",
                    combined, self.cfg.max_stack_size
                ),
            ));
        }

        if self.script_off < self.scripts[self.script_idx].len() {
            return Ok(false);
        }

        if !self.exec_stack.is_empty() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::UnbalancedConditional,
                "end of script reached in conditional execution".to_string(),
            ));
        }

        // The alt stack does not carry over between scripts.
        self.astack.clear();
        self.shift_script();

        if self.bip16 {
            match self.script_idx {
                1 => self.saved_first_stack = self.dstack.items().to_vec(),
                2 => self.load_redeem_script()?,
                _ => {}
            }
        }

        if self
            .scripts
            .get(self.script_idx)
            .map_or(false, |s| s.is_empty())
        {
            self.script_idx += 1;
        }

        Ok(self.script_idx >= self.scripts.len())
    }

    fn shift_script(&mut self) {
        self.num_ops = 0;
        self.script_off = 0;
        self.last_code_sep = 0;
        self.script_idx += 1;
    }

    /// Queue the redeem script and restore the stack it runs against.
    fn load_redeem_script(&mut self) -> Result<(), InterpreterError> {
        self.check_error_condition(false)?;

        let mut stack = std::mem::take(&mut self.saved_first_stack);
        let redeem_bytes = stack.pop().ok_or_else(|| {
            InterpreterError::new(
                InterpreterErrorCode::EvalFalse,
                "no redeem script on the stack".to_string(),
            )
        })?;
        let redeem = Script::from_bytes(&redeem_bytes).map_err(|e| {
            InterpreterError::new(
                InterpreterErrorCode::MalformedPush,
                format!("redeem script does not parse: {}", e),
            )
        })?;
        check_script_size(&redeem, &self.cfg, "redeem")?;

        debug!(
            input = self.input_idx,
            redeem_len = redeem_bytes.len(),
            "evaluating p2sh redeem script"
        );

        self.scripts.push(redeem);
        self.dstack.set_items(stack);
        Ok(())
    }

    /// The stack must be non-empty with a true top item.
    ///
    /// `final_script` additionally applies the clean stack rule.
    pub(crate) fn check_error_condition(&mut self, final_script: bool) -> Result<(), InterpreterError> {
        if self.dstack.is_empty() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::EmptyStack,
                "stack empty at end of script execution".to_string(),
            ));
        }

        if final_script && self.has_flag(ScriptFlags::CLEAN_STACK) && self.dstack.depth() != 1 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::CleanStack,
                format!("stack contains {} unexpected items", self.dstack.depth() - 1),
            ));
        }

        if !self.dstack.pop_bool()? {
            return Err(InterpreterError::new(
                InterpreterErrorCode::EvalFalse,
                "false stack entry at end of script execution".to_string(),
            ));
        }
        Ok(())
    }

    fn execute_chunk(&mut self, chunk: &ScriptChunk) -> Result<(), InterpreterError> {
        let op = chunk.opcode();

        if let Some(data) = chunk.data() {
            if data.len() > self.cfg.max_element_size {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::ElementTooBig,
                    format!(
                        "element size {} exceeds max allowed size {}",
                        data.len(),
                        self.cfg.max_element_size
                    ),
                ));
            }
        }

        if op > OP_16 {
            self.num_ops += 1;
            self.check_op_count()?;
        }

        let known = Opcode::from_u8(op);
        if known.map_or(false, Opcode::is_disabled) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::DisabledOpcode,
                format!("attempt to execute disabled opcode {}", opcode_name(op)),
            ));
        }

        let executing = self.is_branch_executing();
        if op <= OP_PUSHDATA4 {
            if executing {
                if self.has_flag(ScriptFlags::MINIMAL_DATA) && !chunk.is_minimal_push() {
                    return Err(InterpreterError::new(
                        InterpreterErrorCode::MinimalData,
                        format!("data push {} is not minimally encoded", chunk.to_asm_string()),
                    ));
                }
                trace!(script = self.script_idx, offset = self.script_off, "push");
                self.dstack.push(chunk.data().map(<[u8]>::to_vec).unwrap_or_default());
            }
            return Ok(());
        }

        if !executing && !known.map_or(false, Opcode::is_conditional) {
            return Ok(());
        }

        trace!(
            script = self.script_idx,
            offset = self.script_off,
            op = %opcode_name(op),
            "exec"
        );
        match known {
            Some(opcode) => self.dispatch_opcode(opcode),
            None => Err(InterpreterError::new(
                InterpreterErrorCode::ReservedOpcode,
                format!("attempt to execute invalid opcode {}", opcode_name(op)),
            )),
        }
    }

    pub(crate) fn check_op_count(&self) -> Result<(), InterpreterError> {
        if self.num_ops > self.cfg.max_ops {
            return Err(InterpreterError::new(
                InterpreterErrorCode::TooManyOperations,
                format!("exceeded max operation limit of {}", self.cfg.max_ops),
            ));
        }
        Ok(())
    }

    fn dispatch_opcode(&mut self, opcode: Opcode) -> Result<(), InterpreterError> {
        match opcode {
            Opcode::Zero | Opcode::PushData1 | Opcode::PushData2 | Opcode::PushData4 => {
                Err(InterpreterError::new(
                    InterpreterErrorCode::Internal,
                    format!("push opcode {} dispatched as an operation", opcode),
                ))
            }
            Opcode::OneNegate => {
                self.dstack.push_int(ScriptNumber::new(-1));
                Ok(())
            }
            Opcode::One
            | Opcode::Two
            | Opcode::Three
            | Opcode::Four
            | Opcode::Five
            | Opcode::Six
            | Opcode::Seven
            | Opcode::Eight
            | Opcode::Nine
            | Opcode::Ten
            | Opcode::Eleven
            | Opcode::Twelve
            | Opcode::Thirteen
            | Opcode::Fourteen
            | Opcode::Fifteen
            | Opcode::Sixteen => {
                let n = Opcode::small_int_value(opcode.to_u8()).unwrap_or_default();
                self.dstack.push_int(ScriptNumber::new(i64::from(n)));
                Ok(())
            }

            // Flow control
            Opcode::Nop => Ok(()),
            Opcode::If => self.op_if(false),
            Opcode::NotIf => self.op_if(true),
            Opcode::Else => self.op_else(opcode),
            Opcode::EndIf => self.op_endif(opcode),
            Opcode::Verify => self.abstract_verify(opcode, InterpreterErrorCode::Verify),
            Opcode::Return => Err(InterpreterError::new(
                InterpreterErrorCode::EarlyReturn,
                "script returned early".to_string(),
            )),
            Opcode::CheckLockTimeVerify => self.op_check_locktime_verify(),
            Opcode::CheckSequenceVerify => self.op_check_sequence_verify(),
            Opcode::Nop1
            | Opcode::Nop4
            | Opcode::Nop5
            | Opcode::Nop6
            | Opcode::Nop7
            | Opcode::Nop8
            | Opcode::Nop9
            | Opcode::Nop10 => self.op_upgradable_nop(opcode),

            // Stack
            Opcode::ToAltStack => self.op_to_alt_stack(),
            Opcode::FromAltStack => self.op_from_alt_stack(),
            Opcode::TwoDrop => self.dstack.drop_n(2),
            Opcode::TwoDup => self.dstack.dup_n(2),
            Opcode::ThreeDup => self.dstack.dup_n(3),
            Opcode::TwoOver => self.dstack.over_n(2),
            Opcode::TwoRot => self.dstack.rot_n(2),
            Opcode::TwoSwap => self.dstack.swap_n(2),
            Opcode::IfDup => self.op_ifdup(),
            Opcode::Depth => {
                let d = self.dstack.depth() as i64;
                self.dstack.push_int(ScriptNumber::new(d));
                Ok(())
            }
            Opcode::Drop => self.dstack.drop_n(1),
            Opcode::Dup => self.dstack.dup_n(1),
            Opcode::Nip => self.dstack.remove_at(1).map(|_| ()),
            Opcode::Over => self.dstack.over_n(1),
            Opcode::Pick => self.op_pick(),
            Opcode::Roll => self.op_roll(),
            Opcode::Rot => self.dstack.rot_n(1),
            Opcode::Swap => self.dstack.swap_n(1),
            Opcode::Tuck => self.dstack.tuck(),

            // Data
            Opcode::Size => self.op_size(),
            Opcode::Equal => self.op_equal(),
            Opcode::EqualVerify => self.op_equalverify(opcode),

            // Arithmetic
            Opcode::OneAdd => self.op_unary_int(|n| n.checked_add(1)),
            Opcode::OneSub => self.op_unary_int(|n| n.checked_sub(1)),
            Opcode::Negate => self.op_unary_int(|n| n.checked_neg()),
            Opcode::Abs => self.op_unary_int(|n| n.checked_abs()),
            Opcode::Not => self.op_unary_int(|n| Some(i64::from(n == 0))),
            Opcode::ZeroNotEqual => self.op_unary_int(|n| Some(i64::from(n != 0))),
            Opcode::Add => self.op_binary_int(|a, b| a.checked_add(b)),
            Opcode::Sub => self.op_binary_int(|a, b| a.checked_sub(b)),
            Opcode::BoolAnd => self.op_binary_bool(|a, b| a != 0 && b != 0),
            Opcode::BoolOr => self.op_binary_bool(|a, b| a != 0 || b != 0),
            Opcode::NumEqual => self.op_binary_bool(|a, b| a == b),
            Opcode::NumEqualVerify => self.op_numequalverify(opcode),
            Opcode::NumNotEqual => self.op_binary_bool(|a, b| a != b),
            Opcode::LessThan => self.op_binary_bool(|a, b| a < b),
            Opcode::GreaterThan => self.op_binary_bool(|a, b| a > b),
            Opcode::LessThanOrEqual => self.op_binary_bool(|a, b| a <= b),
            Opcode::GreaterThanOrEqual => self.op_binary_bool(|a, b| a >= b),
            Opcode::Min => self.op_binary_int(|a, b| Some(a.min(b))),
            Opcode::Max => self.op_binary_int(|a, b| Some(a.max(b))),
            Opcode::Within => self.op_within(),

            // Crypto
            Opcode::Ripemd160 => self.op_hash(HashType::Ripemd160),
            Opcode::Sha1 => self.op_hash(HashType::Sha1),
            Opcode::Sha256 => self.op_hash(HashType::Sha256),
            Opcode::Hash160 => self.op_hash(HashType::Hash160),
            Opcode::Hash256 => self.op_hash(HashType::Hash256),
            Opcode::CodeSeparator => {
                self.last_code_sep = self.script_off + 1;
                Ok(())
            }
            Opcode::CheckSig => self.op_checksig(),
            Opcode::CheckSigVerify => {
                self.op_checksig()?;
                self.abstract_verify(opcode, InterpreterErrorCode::CheckSigVerify)
            }
            Opcode::CheckMultiSig => self.op_checkmultisig(),
            Opcode::CheckMultiSigVerify => {
                self.op_checkmultisig()?;
                self.abstract_verify(opcode, InterpreterErrorCode::CheckMultiSigVerify)
            }

            Opcode::Cat
            | Opcode::Substr
            | Opcode::Left
            | Opcode::Right
            | Opcode::Invert
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::TwoMul
            | Opcode::TwoDiv
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::LShift
            | Opcode::RShift => Err(InterpreterError::new(
                InterpreterErrorCode::DisabledOpcode,
                format!("attempt to execute disabled opcode {}", opcode),
            )),

            Opcode::Reserved
            | Opcode::Ver
            | Opcode::VerIf
            | Opcode::VerNotIf
            | Opcode::Reserved1
            | Opcode::Reserved2
            | Opcode::PubKeyHash
            | Opcode::PubKey
            | Opcode::InvalidOpcode => Err(InterpreterError::new(
                InterpreterErrorCode::ReservedOpcode,
                format!("attempt to execute reserved opcode {}", opcode),
            )),
        }
    }
}

fn check_script_size(script: &Script, cfg: &Config, which: &str) -> Result<(), InterpreterError> {
    let size = script.encoded_len();
    if size > cfg.max_script_size {
        return Err(InterpreterError::new(
            InterpreterErrorCode::ScriptTooBig,
            format!(
                "{} script size {} is larger than the max allowed size {}",
                which, size, cfg.max_script_size
            ),
        ));
    }
    Ok(())
}
