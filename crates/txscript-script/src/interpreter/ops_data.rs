//! Byte string operations.

use crate::opcodes::Opcode;

use super::error::{InterpreterError, InterpreterErrorCode};
use super::scriptnum::ScriptNumber;
use super::thread::Thread;

impl<'a> Thread<'a> {
    /// Push the length of the top item without removing it.
    pub(crate) fn op_size(&mut self) -> Result<(), InterpreterError> {
        let len = self.dstack.peek(0)?.len() as i64;
        self.dstack.push_int(ScriptNumber::new(len));
        Ok(())
    }

    pub(crate) fn op_equal(&mut self) -> Result<(), InterpreterError> {
        let a = self.dstack.pop()?;
        let b = self.dstack.pop()?;
        self.dstack.push_bool(a == b);
        Ok(())
    }

    pub(crate) fn op_equalverify(&mut self, opcode: Opcode) -> Result<(), InterpreterError> {
        self.op_equal()?;
        self.abstract_verify(opcode, InterpreterErrorCode::EqualVerify)
    }
}
