/// Transaction script engine - scripts, classification, addresses and the interpreter.
///
/// Provides the Script type with its chunk codec, text forms and template
/// builders, the opcode table, context-sensitive template classification,
/// address encoding, and a stack-machine interpreter with P2SH support.

pub mod opcodes;
pub mod chunk;
pub mod script;
pub mod classify;
pub mod address;
pub mod interpreter;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use chunk::ScriptChunk;
pub use opcodes::Opcode;
pub use classify::{ScriptClass, ScriptContext};
pub use address::{Address, AddressError, AddressKind, Network, NetworkParams};
