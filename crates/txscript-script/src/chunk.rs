//! Script chunk parsing and encoding.
//!
//! A chunk is either a standalone opcode or a data push carrying the push
//! opcode that introduced it. Keeping the push opcode makes decoding
//! lossless: a decoded chunk list re-encodes to exactly the input bytes,
//! including non-minimal `OP_PUSHDATA` forms.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScriptChunk {
    /// A standalone opcode byte, including `OP_0` and `OP_1`..`OP_16`.
    Op(u8),
    /// A data push. `opcode` is the direct length byte (`0x01..=0x4b`) or
    /// one of `OP_PUSHDATA1/2/4`.
    Push { opcode: u8, data: Vec<u8> },
}

impl ScriptChunk {
    /// Build a push chunk using the shortest push opcode for `data`.
    ///
    /// Empty data becomes `OP_0`.
    ///
    /// # Arguments
    /// * `data` - The bytes to push.
    ///
    /// # Returns
    /// The chunk, or `DataTooBig` if the payload exceeds a 32-bit length.
    pub fn push(data: &[u8]) -> Result<Self, ScriptError> {
        let len = data.len();
        if len == 0 {
            return Ok(ScriptChunk::Op(OP_0));
        }
        let opcode = if len <= MAX_DIRECT_PUSH as usize {
            len as u8
        } else if len <= 0xff {
            OP_PUSHDATA1
        } else if len <= 0xffff {
            OP_PUSHDATA2
        } else if len as u64 <= u32::MAX as u64 {
            OP_PUSHDATA4
        } else {
            return Err(ScriptError::DataTooBig(len));
        };
        Ok(ScriptChunk::Push {
            opcode,
            data: data.to_vec(),
        })
    }

    /// Chunk for a named opcode.
    pub fn op(opcode: Opcode) -> Self {
        ScriptChunk::Op(opcode.to_u8())
    }

    /// The leading byte of this chunk on the wire.
    pub fn opcode(&self) -> u8 {
        match self {
            ScriptChunk::Op(op) => *op,
            ScriptChunk::Push { opcode, .. } => *opcode,
        }
    }

    /// Pushed bytes, or `None` for a standalone opcode.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            ScriptChunk::Op(_) => None,
            ScriptChunk::Push { data, .. } => Some(data),
        }
    }

    /// True if the chunk only pushes a value: any push, or an opcode up to
    /// `OP_16`. `OP_RESERVED` (0x50) falls inside that range and counts.
    pub fn is_push_only(&self) -> bool {
        self.opcode() <= OP_16
    }

    /// True if this push uses the shortest encoding for its data.
    ///
    /// Single bytes 1..=16 and 0x81 must use `OP_1`..`OP_16` / `OP_1NEGATE`,
    /// and empty data must use `OP_0`. Non-push opcodes are always minimal.
    pub fn is_minimal_push(&self) -> bool {
        let (opcode, data) = match self {
            ScriptChunk::Op(_) => return true,
            ScriptChunk::Push { opcode, data } => (*opcode, data),
        };
        let len = data.len();
        if len == 0 {
            return false;
        }
        if len == 1 && ((1..=16).contains(&data[0]) || data[0] == 0x81) {
            return false;
        }
        if len <= MAX_DIRECT_PUSH as usize {
            return opcode as usize == len;
        }
        if len <= 0xff {
            return opcode == OP_PUSHDATA1;
        }
        if len <= 0xffff {
            return opcode == OP_PUSHDATA2;
        }
        true
    }

    /// Append the wire encoding of this chunk to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            ScriptChunk::Op(op) => out.push(*op),
            ScriptChunk::Push { opcode, data } => {
                out.push(*opcode);
                match *opcode {
                    OP_PUSHDATA1 => out.push(data.len() as u8),
                    OP_PUSHDATA2 => out.extend_from_slice(&(data.len() as u16).to_le_bytes()),
                    OP_PUSHDATA4 => out.extend_from_slice(&(data.len() as u32).to_le_bytes()),
                    _ => {}
                }
                out.extend_from_slice(data);
            }
        }
    }

    /// Number of bytes this chunk occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        match self {
            ScriptChunk::Op(_) => 1,
            ScriptChunk::Push { opcode, data } => {
                let prefix = match *opcode {
                    OP_PUSHDATA1 => 2,
                    OP_PUSHDATA2 => 3,
                    OP_PUSHDATA4 => 5,
                    _ => 1,
                };
                prefix + data.len()
            }
        }
    }

    /// ASM token for this chunk.
    ///
    /// Pushes render as hex, `OP_0` and empty pushes as `0`, `OP_1NEGATE`
    /// as `-1`, named opcodes by name and unassigned bytes as `0x..`.
    pub fn to_asm_string(&self) -> String {
        match self {
            ScriptChunk::Push { data, .. } if data.is_empty() => "0".to_string(),
            ScriptChunk::Push { data, .. } => hex::encode(data),
            ScriptChunk::Op(OP_0) => "0".to_string(),
            ScriptChunk::Op(OP_1NEGATE) => "-1".to_string(),
            ScriptChunk::Op(op) => opcode_name(*op),
        }
    }
}

/// Decode raw script bytes into chunks.
///
/// `0x01..=0x4b` push that many bytes; `OP_PUSHDATA1/2/4` read an 8/16/32
/// bit little-endian length first. Every other byte, `OP_RETURN` included,
/// is a standalone opcode.
///
/// # Arguments
/// * `bytes` - The raw script bytes to decode.
///
/// # Returns
/// The chunk list, or `TruncatedPush` if a push runs past the end.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let offset = pos;
        let opcode = bytes[pos];
        pos += 1;

        let prefix_width = match opcode {
            0x01..=MAX_DIRECT_PUSH => 0,
            OP_PUSHDATA1 => 1,
            OP_PUSHDATA2 => 2,
            OP_PUSHDATA4 => 4,
            _ => {
                chunks.push(ScriptChunk::Op(opcode));
                continue;
            }
        };

        let len_bytes = take(bytes, &mut pos, prefix_width, offset)?;
        let len = match prefix_width {
            0 => opcode as usize,
            1 => len_bytes[0] as usize,
            2 => u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize,
            _ => u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]])
                as usize,
        };
        let data = take(bytes, &mut pos, len, offset)?.to_vec();
        chunks.push(ScriptChunk::Push { opcode, data });
    }

    Ok(chunks)
}

fn take<'a>(
    bytes: &'a [u8],
    pos: &mut usize,
    n: usize,
    offset: usize,
) -> Result<&'a [u8], ScriptError> {
    let available = bytes.len() - *pos;
    if n > available {
        return Err(ScriptError::TruncatedPush {
            offset,
            needed: n,
            available,
        });
    }
    let out = &bytes[*pos..*pos + n];
    *pos += n;
    Ok(out)
}

/// Encode chunks back into raw script bytes.
pub fn encode_script(chunks: &[ScriptChunk]) -> Vec<u8> {
    let mut out = Vec::with_capacity(chunks.iter().map(ScriptChunk::encoded_len).sum());
    for chunk in chunks {
        chunk.encode_into(&mut out);
    }
    out
}
