//! Data and alt stacks.

use super::error::{InterpreterError, InterpreterErrorCode};
use super::scriptnum::ScriptNumber;

/// Truth value of a stack element.
///
/// False iff every byte is zero, where a final `0x80` (negative zero) also
/// counts as zero.
pub fn cast_to_bool(t: &[u8]) -> bool {
    for (i, &b) in t.iter().enumerate() {
        if b != 0 {
            return !(i == t.len() - 1 && b == 0x80);
        }
    }
    false
}

/// Canonical stack encoding of a boolean.
pub fn from_bool(v: bool) -> Vec<u8> {
    if v {
        vec![1]
    } else {
        Vec::new()
    }
}

fn bad_index(idx: usize, depth: usize) -> InterpreterError {
    InterpreterError::new(
        InterpreterErrorCode::InvalidStackOperation,
        format!("index {} is invalid for stack size {}", idx, depth),
    )
}

/// A stack of byte strings. Index 0 is the top.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    items: Vec<Vec<u8>>,
    max_num_length: usize,
    require_minimal: bool,
}

impl Stack {
    /// `max_num_length` and `require_minimal` govern numeric pops.
    pub fn new(max_num_length: usize, require_minimal: bool) -> Self {
        Stack {
            items: Vec::new(),
            max_num_length,
            require_minimal,
        }
    }

    pub fn depth(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, data: Vec<u8>) {
        self.items.push(data);
    }

    pub fn push_int(&mut self, n: ScriptNumber) {
        self.push(n.to_bytes());
    }

    pub fn push_bool(&mut self, val: bool) {
        self.push(from_bool(val));
    }

    pub fn pop(&mut self) -> Result<Vec<u8>, InterpreterError> {
        self.remove_at(0)
    }

    pub fn pop_int(&mut self) -> Result<ScriptNumber, InterpreterError> {
        let data = self.pop()?;
        ScriptNumber::from_bytes(&data, self.max_num_length, self.require_minimal)
    }

    /// Pop a number allowing up to `max_len` bytes instead of the default.
    pub fn pop_int_with_len(&mut self, max_len: usize) -> Result<ScriptNumber, InterpreterError> {
        let data = self.pop()?;
        ScriptNumber::from_bytes(&data, max_len, self.require_minimal)
    }

    pub fn pop_bool(&mut self) -> Result<bool, InterpreterError> {
        Ok(cast_to_bool(&self.pop()?))
    }

    pub fn peek(&self, idx: usize) -> Result<&[u8], InterpreterError> {
        let depth = self.items.len();
        if idx >= depth {
            return Err(bad_index(idx, depth));
        }
        Ok(&self.items[depth - idx - 1])
    }

    pub fn peek_int(&self, idx: usize) -> Result<ScriptNumber, InterpreterError> {
        ScriptNumber::from_bytes(self.peek(idx)?, self.max_num_length, self.require_minimal)
    }

    /// Peek a number allowing up to `max_len` bytes instead of the default.
    pub fn peek_int_with_len(
        &self,
        idx: usize,
        max_len: usize,
    ) -> Result<ScriptNumber, InterpreterError> {
        ScriptNumber::from_bytes(self.peek(idx)?, max_len, self.require_minimal)
    }

    pub fn peek_bool(&self, idx: usize) -> Result<bool, InterpreterError> {
        Ok(cast_to_bool(self.peek(idx)?))
    }

    /// Remove and return the item `idx` positions below the top.
    pub fn remove_at(&mut self, idx: usize) -> Result<Vec<u8>, InterpreterError> {
        let depth = self.items.len();
        if idx >= depth {
            return Err(bad_index(idx, depth));
        }
        Ok(self.items.remove(depth - idx - 1))
    }

    /// `x1 x2 -> x2 x1 x2`
    pub fn tuck(&mut self) -> Result<(), InterpreterError> {
        let so2 = self.pop()?;
        let so1 = self.pop()?;
        self.push(so2.clone());
        self.push(so1);
        self.push(so2);
        Ok(())
    }

    pub fn drop_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        if n > self.depth() {
            return Err(bad_index(n - 1, self.depth()));
        }
        self.items.truncate(self.depth() - n);
        Ok(())
    }

    /// Duplicate the top `n` items, preserving their order.
    pub fn dup_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        for _ in 0..n {
            let so = self.peek(n - 1)?.to_vec();
            self.push(so);
        }
        Ok(())
    }

    /// Move the third group of `n` items to the top.
    pub fn rot_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        let entry = 3 * n - 1;
        for _ in 0..n {
            let so = self.remove_at(entry)?;
            self.push(so);
        }
        Ok(())
    }

    /// Swap the top two groups of `n` items.
    pub fn swap_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        let entry = 2 * n - 1;
        for _ in 0..n {
            let so = self.remove_at(entry)?;
            self.push(so);
        }
        Ok(())
    }

    /// Copy the second group of `n` items to the top.
    pub fn over_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        let entry = 2 * n - 1;
        for _ in 0..n {
            let so = self.peek(entry)?.to_vec();
            self.push(so);
        }
        Ok(())
    }

    pub fn pick_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        let so = self.peek(n)?.to_vec();
        self.push(so);
        Ok(())
    }

    pub fn roll_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        let so = self.remove_at(n)?;
        self.push(so);
        Ok(())
    }

    /// Contents from bottom to top.
    pub fn items(&self) -> &[Vec<u8>] {
        &self.items
    }

    /// Replace the contents; the last element becomes the top.
    pub fn set_items(&mut self, items: Vec<Vec<u8>>) {
        self.items = items;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
