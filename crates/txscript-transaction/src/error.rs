/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid for the requested operation.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// An input index past the end of the input list.
    #[error("input index {index} out of range (tx has {count} inputs)")]
    InputIndexOutOfRange { index: usize, count: usize },
    /// Bytes left over after a complete transaction or block was read.
    #[error("trailing {0} bytes after {1}")]
    TrailingBytes(usize, &'static str),
    /// An error occurred while producing a signature.
    #[error("signing error: {0}")]
    SigningError(String),
    /// Compact bits that do not describe a non-negative target.
    #[error("invalid compact target bits 0x{0:08x}")]
    InvalidTarget(u32),
    /// An underlying script error (forwarded from `txscript-script`).
    #[error("script error: {0}")]
    Script(#[from] txscript_script::ScriptError),
    /// An underlying address error (forwarded from `txscript-script`).
    #[error("address error: {0}")]
    Address(#[from] txscript_script::AddressError),
    /// An underlying primitives error, including truncated wire input.
    #[error("primitives error: {0}")]
    Primitives(#[from] txscript_primitives::PrimitivesError),
    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}
