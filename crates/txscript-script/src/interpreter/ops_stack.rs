//! Stack manipulation operations.

use super::error::{InterpreterError, InterpreterErrorCode};
use super::stack::cast_to_bool;
use super::thread::Thread;

impl<'a> Thread<'a> {
    pub(crate) fn op_to_alt_stack(&mut self) -> Result<(), InterpreterError> {
        let data = self.dstack.pop()?;
        self.astack.push(data);
        Ok(())
    }

    pub(crate) fn op_from_alt_stack(&mut self) -> Result<(), InterpreterError> {
        let data = self.astack.pop()?;
        self.dstack.push(data);
        Ok(())
    }

    pub(crate) fn op_ifdup(&mut self) -> Result<(), InterpreterError> {
        let so = self.dstack.peek(0)?;
        if cast_to_bool(so) {
            let so = so.to_vec();
            self.dstack.push(so);
        }
        Ok(())
    }

    pub(crate) fn op_pick(&mut self) -> Result<(), InterpreterError> {
        let n = self.pop_stack_index()?;
        self.dstack.pick_n(n)
    }

    pub(crate) fn op_roll(&mut self) -> Result<(), InterpreterError> {
        let n = self.pop_stack_index()?;
        self.dstack.roll_n(n)
    }

    fn pop_stack_index(&mut self) -> Result<usize, InterpreterError> {
        let n = self.dstack.pop_int()?.to_i32();
        usize::try_from(n).map_err(|_| {
            InterpreterError::new(
                InterpreterErrorCode::InvalidStackOperation,
                format!("negative stack index {}", n),
            )
        })
    }
}
