//! Numeric operations.
//!
//! Operands are decoded with the configured script number length, so sums
//! of two operands always fit in an `i64`. Overflow is still reported for
//! hosts that configure wider operands.

use crate::opcodes::Opcode;

use super::error::{InterpreterError, InterpreterErrorCode};
use super::scriptnum::ScriptNumber;
use super::thread::Thread;

fn overflow() -> InterpreterError {
    InterpreterError::new(
        InterpreterErrorCode::NumberTooBig,
        "arithmetic result overflows".to_string(),
    )
}

impl<'a> Thread<'a> {
    pub(crate) fn op_unary_int(
        &mut self,
        f: impl FnOnce(i64) -> Option<i64>,
    ) -> Result<(), InterpreterError> {
        let m = self.dstack.pop_int()?;
        let r = f(m.value()).ok_or_else(overflow)?;
        self.dstack.push_int(ScriptNumber::new(r));
        Ok(())
    }

    /// Pops `b` then `a` and pushes `f(a, b)`.
    pub(crate) fn op_binary_int(
        &mut self,
        f: impl FnOnce(i64, i64) -> Option<i64>,
    ) -> Result<(), InterpreterError> {
        let b = self.dstack.pop_int()?;
        let a = self.dstack.pop_int()?;
        let r = f(a.value(), b.value()).ok_or_else(overflow)?;
        self.dstack.push_int(ScriptNumber::new(r));
        Ok(())
    }

    /// Pops `b` then `a` and pushes the boolean `f(a, b)`.
    pub(crate) fn op_binary_bool(
        &mut self,
        f: impl FnOnce(i64, i64) -> bool,
    ) -> Result<(), InterpreterError> {
        let b = self.dstack.pop_int()?;
        let a = self.dstack.pop_int()?;
        self.dstack.push_bool(f(a.value(), b.value()));
        Ok(())
    }

    pub(crate) fn op_numequalverify(&mut self, opcode: Opcode) -> Result<(), InterpreterError> {
        self.op_binary_bool(|a, b| a == b)?;
        self.abstract_verify(opcode, InterpreterErrorCode::NumEqualVerify)
    }

    /// `x min max -> min <= x < max`
    pub(crate) fn op_within(&mut self) -> Result<(), InterpreterError> {
        let max = self.dstack.pop_int()?.value();
        let min = self.dstack.pop_int()?.value();
        let x = self.dstack.pop_int()?.value();
        self.dstack.push_bool(min <= x && x < max);
        Ok(())
    }
}
