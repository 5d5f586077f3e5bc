//! Flow control and lock time operations.

use crate::opcodes::Opcode;

use super::error::{InterpreterError, InterpreterErrorCode};
use super::flags::ScriptFlags;
use super::stack::cast_to_bool;
use super::thread::Thread;

/// Lock times below this are block heights, at or above are timestamps.
const LOCK_TIME_THRESHOLD: i64 = 500_000_000;

/// Sequence value that marks an input final.
const MAX_TX_IN_SEQUENCE_NUM: u32 = 0xffff_ffff;
/// Sequence bit that disables relative lock time.
const SEQUENCE_LOCK_TIME_DISABLED: i64 = 1 << 31;
/// Sequence bit selecting 512-second units over blocks.
const SEQUENCE_LOCK_TIME_IS_SECONDS: i64 = 1 << 22;
const SEQUENCE_LOCK_TIME_MASK: i64 = 0x0000_ffff;

/// Lock time operands may be one byte wider than ordinary numbers.
const LOCK_TIME_NUM_LEN: usize = 5;

fn unbalanced(opcode: Opcode) -> InterpreterError {
    InterpreterError::new(
        InterpreterErrorCode::UnbalancedConditional,
        format!(
            "encountered opcode {} with no matching opcode to begin conditional execution",
            opcode
        ),
    )
}

impl<'a> Thread<'a> {
    /// OP_IF, or OP_NOTIF when `negate` is set.
    ///
    /// Inside an unexecuted branch nothing is popped and the new branch is
    /// unexecuted too.
    pub(crate) fn op_if(&mut self, negate: bool) -> Result<(), InterpreterError> {
        let mut taken = false;
        if self.is_branch_executing() {
            let cond = self.dstack.pop().map_err(|_| {
                InterpreterError::new(
                    InterpreterErrorCode::UnbalancedConditional,
                    "conditional with an empty stack".to_string(),
                )
            })?;
            taken = cast_to_bool(&cond) != negate;
        }
        self.exec_stack.push(taken);
        Ok(())
    }

    pub(crate) fn op_else(&mut self, opcode: Opcode) -> Result<(), InterpreterError> {
        match self.exec_stack.last_mut() {
            Some(top) => {
                *top = !*top;
                Ok(())
            }
            None => Err(unbalanced(opcode)),
        }
    }

    pub(crate) fn op_endif(&mut self, opcode: Opcode) -> Result<(), InterpreterError> {
        self.exec_stack.pop().map(|_| ()).ok_or_else(|| unbalanced(opcode))
    }

    /// Pop the top item and fail with `code` unless it is true.
    pub(crate) fn abstract_verify(
        &mut self,
        opcode: Opcode,
        code: InterpreterErrorCode,
    ) -> Result<(), InterpreterError> {
        if !self.dstack.pop_bool()? {
            return Err(InterpreterError::new(code, format!("{} failed", opcode)));
        }
        Ok(())
    }

    /// OP_NOP1 and OP_NOP4..OP_NOP10.
    pub(crate) fn op_upgradable_nop(&self, opcode: Opcode) -> Result<(), InterpreterError> {
        if self.has_flag(ScriptFlags::DISCOURAGE_UPGRADABLE_NOPS) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::DiscourageUpgradableNOPs,
                format!("{} reserved for soft-fork upgrades", opcode),
            ));
        }
        Ok(())
    }

    pub(crate) fn op_check_locktime_verify(&mut self) -> Result<(), InterpreterError> {
        if !self.has_flag(ScriptFlags::CHECK_LOCK_TIME_VERIFY) {
            return self.op_upgradable_nop(Opcode::CheckLockTimeVerify);
        }

        let ctx = self.tx_context.ok_or_else(|| {
            InterpreterError::new(
                InterpreterErrorCode::InvalidParams,
                "no tx context for CHECKLOCKTIMEVERIFY".to_string(),
            )
        })?;

        let lock_time = self.dstack.peek_int_with_len(0, LOCK_TIME_NUM_LEN)?.value();
        if lock_time < 0 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NegativeLockTime,
                format!("negative lock time: {}", lock_time),
            ));
        }

        verify_lock_time(i64::from(ctx.lock_time()), LOCK_TIME_THRESHOLD, lock_time)?;

        if ctx.input_sequence(self.input_idx)? == MAX_TX_IN_SEQUENCE_NUM {
            return Err(InterpreterError::new(
                InterpreterErrorCode::UnsatisfiedLockTime,
                "transaction input is finalized".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn op_check_sequence_verify(&mut self) -> Result<(), InterpreterError> {
        if !self.has_flag(ScriptFlags::CHECK_SEQUENCE_VERIFY) {
            return self.op_upgradable_nop(Opcode::CheckSequenceVerify);
        }

        let ctx = self.tx_context.ok_or_else(|| {
            InterpreterError::new(
                InterpreterErrorCode::InvalidParams,
                "no tx context for CHECKSEQUENCEVERIFY".to_string(),
            )
        })?;

        let sequence = self.dstack.peek_int_with_len(0, LOCK_TIME_NUM_LEN)?.value();
        if sequence < 0 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NegativeLockTime,
                format!("negative sequence: {}", sequence),
            ));
        }

        if sequence & SEQUENCE_LOCK_TIME_DISABLED != 0 {
            return Ok(());
        }

        if ctx.tx_version() < 2 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::UnsatisfiedLockTime,
                format!("invalid transaction version: {}", ctx.tx_version()),
            ));
        }

        let tx_sequence = i64::from(ctx.input_sequence(self.input_idx)?);
        if tx_sequence & SEQUENCE_LOCK_TIME_DISABLED != 0 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::UnsatisfiedLockTime,
                format!(
                    "transaction sequence has sequence locktime disabled bit set: 0x{:x}",
                    tx_sequence
                ),
            ));
        }

        let mask = SEQUENCE_LOCK_TIME_IS_SECONDS | SEQUENCE_LOCK_TIME_MASK;
        verify_lock_time(
            tx_sequence & mask,
            SEQUENCE_LOCK_TIME_IS_SECONDS,
            sequence & mask,
        )
    }
}

/// `lock_time` must be of the same kind as `tx_lock_time` and not later.
pub(crate) fn verify_lock_time(
    tx_lock_time: i64,
    threshold: i64,
    lock_time: i64,
) -> Result<(), InterpreterError> {
    if (tx_lock_time < threshold) != (lock_time < threshold) {
        return Err(InterpreterError::new(
            InterpreterErrorCode::UnsatisfiedLockTime,
            format!(
                "mismatched locktime types -- tx locktime {}, stack locktime {}",
                tx_lock_time, lock_time
            ),
        ));
    }
    if lock_time > tx_lock_time {
        return Err(InterpreterError::new(
            InterpreterErrorCode::UnsatisfiedLockTime,
            format!(
                "locktime requirement not satisfied -- locktime is greater than the transaction locktime: {} > {}",
                lock_time, tx_lock_time
            ),
        ));
    }
    Ok(())
}
