/// Error types for script decoding, building and text parsing.
///
/// Execution failures are not here; see
/// [`InterpreterError`](crate::interpreter::InterpreterError).
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// A push declared more bytes than the script has left.
    #[error("truncated push at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedPush {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Push payload longer than a 32-bit length prefix can describe.
    #[error("push data of {0} bytes is too big")]
    DataTooBig(usize),

    /// An ASM token is neither an opcode name nor hex data.
    #[error("invalid asm token '{0}'")]
    InvalidAsmToken(String),

    /// Multisig template parameters are out of range.
    #[error("invalid multisig template: {0}")]
    InvalidMultisig(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}
