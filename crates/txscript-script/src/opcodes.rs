//! Opcode table.
//!
//! The table is pure data: each entry pairs an enum variant with its
//! canonical `OP_` name and byte value. Execution semantics live in the
//! interpreter; nothing here knows what an opcode does.
//!
//! Direct-push bytes `0x01..=0x4b` are not opcodes in this table. They only
//! ever appear as the push prefix of a [`ScriptChunk::Push`](crate::ScriptChunk).

use std::fmt;

macro_rules! opcode_table {
    ($($variant:ident = $byte:literal => $name:literal,)*) => {
        /// A named script opcode.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum Opcode {
            $(
                #[doc = $name]
                $variant = $byte,
            )*
        }

        /// Every named opcode with its canonical name, in byte order.
        pub const OPCODE_TABLE: &[(Opcode, &str)] = &[$((Opcode::$variant, $name),)*];

        impl Opcode {
            /// Look up the named opcode for a byte, if there is one.
            pub const fn from_u8(byte: u8) -> Option<Opcode> {
                match byte {
                    $($byte => Some(Opcode::$variant),)*
                    _ => None,
                }
            }

            /// Canonical `OP_` name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $name,)*
                }
            }
        }
    };
}

opcode_table! {
    Zero = 0x00 => "OP_0",
    PushData1 = 0x4c => "OP_PUSHDATA1",
    PushData2 = 0x4d => "OP_PUSHDATA2",
    PushData4 = 0x4e => "OP_PUSHDATA4",
    OneNegate = 0x4f => "OP_1NEGATE",
    Reserved = 0x50 => "OP_RESERVED",
    One = 0x51 => "OP_1",
    Two = 0x52 => "OP_2",
    Three = 0x53 => "OP_3",
    Four = 0x54 => "OP_4",
    Five = 0x55 => "OP_5",
    Six = 0x56 => "OP_6",
    Seven = 0x57 => "OP_7",
    Eight = 0x58 => "OP_8",
    Nine = 0x59 => "OP_9",
    Ten = 0x5a => "OP_10",
    Eleven = 0x5b => "OP_11",
    Twelve = 0x5c => "OP_12",
    Thirteen = 0x5d => "OP_13",
    Fourteen = 0x5e => "OP_14",
    Fifteen = 0x5f => "OP_15",
    Sixteen = 0x60 => "OP_16",

    Nop = 0x61 => "OP_NOP",
    Ver = 0x62 => "OP_VER",
    If = 0x63 => "OP_IF",
    NotIf = 0x64 => "OP_NOTIF",
    VerIf = 0x65 => "OP_VERIF",
    VerNotIf = 0x66 => "OP_VERNOTIF",
    Else = 0x67 => "OP_ELSE",
    EndIf = 0x68 => "OP_ENDIF",
    Verify = 0x69 => "OP_VERIFY",
    Return = 0x6a => "OP_RETURN",

    ToAltStack = 0x6b => "OP_TOALTSTACK",
    FromAltStack = 0x6c => "OP_FROMALTSTACK",
    TwoDrop = 0x6d => "OP_2DROP",
    TwoDup = 0x6e => "OP_2DUP",
    ThreeDup = 0x6f => "OP_3DUP",
    TwoOver = 0x70 => "OP_2OVER",
    TwoRot = 0x71 => "OP_2ROT",
    TwoSwap = 0x72 => "OP_2SWAP",
    IfDup = 0x73 => "OP_IFDUP",
    Depth = 0x74 => "OP_DEPTH",
    Drop = 0x75 => "OP_DROP",
    Dup = 0x76 => "OP_DUP",
    Nip = 0x77 => "OP_NIP",
    Over = 0x78 => "OP_OVER",
    Pick = 0x79 => "OP_PICK",
    Roll = 0x7a => "OP_ROLL",
    Rot = 0x7b => "OP_ROT",
    Swap = 0x7c => "OP_SWAP",
    Tuck = 0x7d => "OP_TUCK",

    Cat = 0x7e => "OP_CAT",
    Substr = 0x7f => "OP_SUBSTR",
    Left = 0x80 => "OP_LEFT",
    Right = 0x81 => "OP_RIGHT",
    Size = 0x82 => "OP_SIZE",

    Invert = 0x83 => "OP_INVERT",
    And = 0x84 => "OP_AND",
    Or = 0x85 => "OP_OR",
    Xor = 0x86 => "OP_XOR",
    Equal = 0x87 => "OP_EQUAL",
    EqualVerify = 0x88 => "OP_EQUALVERIFY",
    Reserved1 = 0x89 => "OP_RESERVED1",
    Reserved2 = 0x8a => "OP_RESERVED2",

    OneAdd = 0x8b => "OP_1ADD",
    OneSub = 0x8c => "OP_1SUB",
    TwoMul = 0x8d => "OP_2MUL",
    TwoDiv = 0x8e => "OP_2DIV",
    Negate = 0x8f => "OP_NEGATE",
    Abs = 0x90 => "OP_ABS",
    Not = 0x91 => "OP_NOT",
    ZeroNotEqual = 0x92 => "OP_0NOTEQUAL",
    Add = 0x93 => "OP_ADD",
    Sub = 0x94 => "OP_SUB",
    Mul = 0x95 => "OP_MUL",
    Div = 0x96 => "OP_DIV",
    Mod = 0x97 => "OP_MOD",
    LShift = 0x98 => "OP_LSHIFT",
    RShift = 0x99 => "OP_RSHIFT",
    BoolAnd = 0x9a => "OP_BOOLAND",
    BoolOr = 0x9b => "OP_BOOLOR",
    NumEqual = 0x9c => "OP_NUMEQUAL",
    NumEqualVerify = 0x9d => "OP_NUMEQUALVERIFY",
    NumNotEqual = 0x9e => "OP_NUMNOTEQUAL",
    LessThan = 0x9f => "OP_LESSTHAN",
    GreaterThan = 0xa0 => "OP_GREATERTHAN",
    LessThanOrEqual = 0xa1 => "OP_LESSTHANOREQUAL",
    GreaterThanOrEqual = 0xa2 => "OP_GREATERTHANOREQUAL",
    Min = 0xa3 => "OP_MIN",
    Max = 0xa4 => "OP_MAX",
    Within = 0xa5 => "OP_WITHIN",

    Ripemd160 = 0xa6 => "OP_RIPEMD160",
    Sha1 = 0xa7 => "OP_SHA1",
    Sha256 = 0xa8 => "OP_SHA256",
    Hash160 = 0xa9 => "OP_HASH160",
    Hash256 = 0xaa => "OP_HASH256",
    CodeSeparator = 0xab => "OP_CODESEPARATOR",
    CheckSig = 0xac => "OP_CHECKSIG",
    CheckSigVerify = 0xad => "OP_CHECKSIGVERIFY",
    CheckMultiSig = 0xae => "OP_CHECKMULTISIG",
    CheckMultiSigVerify = 0xaf => "OP_CHECKMULTISIGVERIFY",

    Nop1 = 0xb0 => "OP_NOP1",
    CheckLockTimeVerify = 0xb1 => "OP_CHECKLOCKTIMEVERIFY",
    CheckSequenceVerify = 0xb2 => "OP_CHECKSEQUENCEVERIFY",
    Nop4 = 0xb3 => "OP_NOP4",
    Nop5 = 0xb4 => "OP_NOP5",
    Nop6 = 0xb5 => "OP_NOP6",
    Nop7 = 0xb6 => "OP_NOP7",
    Nop8 = 0xb7 => "OP_NOP8",
    Nop9 = 0xb8 => "OP_NOP9",
    Nop10 = 0xb9 => "OP_NOP10",

    PubKeyHash = 0xfd => "OP_PUBKEYHASH",
    PubKey = 0xfe => "OP_PUBKEY",
    InvalidOpcode = 0xff => "OP_INVALIDOPCODE",
}

/// Alternative names accepted by [`Opcode::from_name`].
const OPCODE_ALIASES: &[(&str, Opcode)] = &[
    ("OP_FALSE", Opcode::Zero),
    ("OP_TRUE", Opcode::One),
    ("OP_NOP2", Opcode::CheckLockTimeVerify),
    ("OP_NOP3", Opcode::CheckSequenceVerify),
];

// Byte values used in match patterns by the codec and interpreter.
pub const OP_0: u8 = Opcode::Zero as u8;
pub const OP_PUSHDATA1: u8 = Opcode::PushData1 as u8;
pub const OP_PUSHDATA2: u8 = Opcode::PushData2 as u8;
pub const OP_PUSHDATA4: u8 = Opcode::PushData4 as u8;
pub const OP_1NEGATE: u8 = Opcode::OneNegate as u8;
pub const OP_1: u8 = Opcode::One as u8;
pub const OP_16: u8 = Opcode::Sixteen as u8;

/// Largest payload a single-byte direct push can carry.
pub const MAX_DIRECT_PUSH: u8 = 0x4b;

impl Opcode {
    /// Look up an opcode by its canonical name or one of its aliases.
    pub fn from_name(name: &str) -> Option<Opcode> {
        OPCODE_TABLE
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(op, _)| *op)
            .or_else(|| {
                OPCODE_ALIASES
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, op)| *op)
            })
    }

    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// The opcode pushing small integer `n` (`OP_0`, `OP_1` .. `OP_16`).
    pub const fn small_int(n: u8) -> Option<Opcode> {
        match n {
            0 => Some(Opcode::Zero),
            1..=16 => Opcode::from_u8(OP_1 - 1 + n),
            _ => None,
        }
    }

    /// Inverse of [`Opcode::small_int`].
    pub const fn small_int_value(byte: u8) -> Option<u8> {
        match byte {
            OP_0 => Some(0),
            OP_1..=OP_16 => Some(byte - (OP_1 - 1)),
            _ => None,
        }
    }

    /// Opcodes that fail whenever they appear, executed or not.
    pub const fn is_disabled(self) -> bool {
        matches!(
            self,
            Opcode::Cat
                | Opcode::Substr
                | Opcode::Left
                | Opcode::Right
                | Opcode::Invert
                | Opcode::And
                | Opcode::Or
                | Opcode::Xor
                | Opcode::TwoMul
                | Opcode::TwoDiv
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
                | Opcode::LShift
                | Opcode::RShift
        )
    }

    /// Flow-control opcodes, evaluated even inside an unexecuted branch.
    pub const fn is_conditional(self) -> bool {
        matches!(
            self,
            Opcode::If
                | Opcode::NotIf
                | Opcode::VerIf
                | Opcode::VerNotIf
                | Opcode::Else
                | Opcode::EndIf
        )
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Human-readable name for any script byte.
///
/// Direct-push bytes render as `OP_DATA_<n>`; unassigned bytes as hex.
pub fn opcode_name(byte: u8) -> String {
    match Opcode::from_u8(byte) {
        Some(op) => op.name().to_string(),
        None if (1..=MAX_DIRECT_PUSH).contains(&byte) => format!("OP_DATA_{}", byte),
        None => format!("0x{:02x}", byte),
    }
}
