//! Script verification flags (bitmask).

use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Script verification flags. Each flag enables one extra check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScriptFlags(pub u32);

impl ScriptFlags {
    pub const NONE: ScriptFlags = ScriptFlags(0);
    /// Evaluate pay-to-script-hash redeem scripts.
    pub const P2SH: ScriptFlags = ScriptFlags(1 << 0);
    pub const STRICT_ENCODING: ScriptFlags = ScriptFlags(1 << 1);
    pub const DER_SIGNATURES: ScriptFlags = ScriptFlags(1 << 2);
    pub const LOW_S: ScriptFlags = ScriptFlags(1 << 3);
    /// The CHECKMULTISIG dummy element must be empty.
    pub const NULL_DUMMY: ScriptFlags = ScriptFlags(1 << 4);
    pub const SIG_PUSH_ONLY: ScriptFlags = ScriptFlags(1 << 5);
    pub const MINIMAL_DATA: ScriptFlags = ScriptFlags(1 << 6);
    pub const DISCOURAGE_UPGRADABLE_NOPS: ScriptFlags = ScriptFlags(1 << 7);
    pub const CHECK_LOCK_TIME_VERIFY: ScriptFlags = ScriptFlags(1 << 8);
    pub const CHECK_SEQUENCE_VERIFY: ScriptFlags = ScriptFlags(1 << 9);
    /// Failed signature checks must use empty signatures.
    pub const NULL_FAIL: ScriptFlags = ScriptFlags(1 << 10);
    /// Exactly one element may remain after evaluation. Requires P2SH.
    pub const CLEAN_STACK: ScriptFlags = ScriptFlags(1 << 11);

    /// The usual relay policy set.
    pub const STANDARD: ScriptFlags = ScriptFlags(
        Self::P2SH.0
            | Self::STRICT_ENCODING.0
            | Self::DER_SIGNATURES.0
            | Self::LOW_S.0
            | Self::NULL_DUMMY.0
            | Self::MINIMAL_DATA.0
            | Self::DISCOURAGE_UPGRADABLE_NOPS.0
            | Self::CHECK_LOCK_TIME_VERIFY.0
            | Self::CHECK_SEQUENCE_VERIFY.0
            | Self::NULL_FAIL.0
            | Self::CLEAN_STACK.0,
    );

    pub fn has_flag(self, flag: ScriptFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn has_any(self, flags: &[ScriptFlags]) -> bool {
        flags.iter().any(|f| self.has_flag(*f))
    }

    pub fn add_flag(&mut self, flag: ScriptFlags) {
        self.0 |= flag.0;
    }
}

impl BitOr for ScriptFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        ScriptFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ScriptFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ScriptFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        ScriptFlags(self.0 & rhs.0)
    }
}
