#![deny(missing_docs)]

//! Transaction script engine.
//!
//! Re-exports the member crates: wire codec and signature primitives,
//! scripts with their interpreter, and transactions with sighash and
//! verification.

pub use txscript_primitives as primitives;
pub use txscript_script as script;
pub use txscript_transaction as transaction;

pub use txscript_script::interpreter::ScriptFlags;
pub use txscript_script::{Address, Script, ScriptClass, ScriptContext};
pub use txscript_transaction::{verify, Transaction};
