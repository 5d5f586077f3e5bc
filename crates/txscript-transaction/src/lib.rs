/// Transaction script engine - transactions, signature hashing and blocks.
///
/// Provides the Transaction type with its wire format, the legacy
/// signature hash, signing and script verification against a spending
/// transaction, a P2PKH template, and blocks with compact target bits.

pub mod transaction;
pub mod input;
pub mod output;
pub mod sighash;
pub mod verify;
pub mod template;
pub mod block;

mod error;
pub use error::TransactionError;
pub use transaction::Transaction;
pub use input::TransactionInput;
pub use output::TransactionOutput;
pub use verify::{verify, TransactionContext};
pub use block::{Block, BlockHeader};
