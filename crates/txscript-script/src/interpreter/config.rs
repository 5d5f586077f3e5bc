//! Interpreter resource limits.

use serde::Deserialize;

pub const DEFAULT_MAX_OPS: usize = 201;
pub const DEFAULT_MAX_STACK_SIZE: usize = 1000;
pub const DEFAULT_MAX_SCRIPT_SIZE: usize = 10_000;
pub const DEFAULT_MAX_ELEMENT_SIZE: usize = 520;
pub const DEFAULT_MAX_SCRIPT_NUMBER_LENGTH: usize = 4;
pub const DEFAULT_MAX_PUB_KEYS_PER_MULTISIG: usize = 20;

/// Script execution limits.
///
/// Missing fields take the legacy defaults when deserialized, so a host
/// can override a single limit from JSON or TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Non-push opcodes allowed per script.
    pub max_ops: usize,
    /// Combined depth of the data and alt stacks.
    pub max_stack_size: usize,
    /// Serialized script size in bytes.
    pub max_script_size: usize,
    /// Largest single push in bytes.
    pub max_element_size: usize,
    /// Largest numeric operand in bytes.
    pub max_script_number_length: usize,
    pub max_pub_keys_per_multisig: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_ops: DEFAULT_MAX_OPS,
            max_stack_size: DEFAULT_MAX_STACK_SIZE,
            max_script_size: DEFAULT_MAX_SCRIPT_SIZE,
            max_element_size: DEFAULT_MAX_ELEMENT_SIZE,
            max_script_number_length: DEFAULT_MAX_SCRIPT_NUMBER_LENGTH,
            max_pub_keys_per_multisig: DEFAULT_MAX_PUB_KEYS_PER_MULTISIG,
        }
    }
}
