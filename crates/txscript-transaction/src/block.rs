//! Blocks and block headers.
//!
//! Includes the merkle root over transaction ids and the compact "bits"
//! encoding of the proof-of-work target.

use num_bigint::BigUint;
use num_traits::Zero;

use txscript_primitives::{ByteReader, ByteWriter, ChainHash, VarInt};

use crate::transaction::Transaction;
use crate::TransactionError;

/// Serialized size of a block header.
pub const BLOCK_HEADER_LEN: usize = 80;

/// Sign bit of the compact mantissa.
const COMPACT_SIGN_BIT: u32 = 0x0080_0000;
const COMPACT_MANTISSA_MASK: u32 = 0x007f_ffff;

/// An 80-byte block header.
///
/// # Wire format
///
/// | Field        | Size          |
/// |--------------|---------------|
/// | version      | 4 bytes (LE)  |
/// | prev_block   | 32 bytes      |
/// | merkle_root  | 32 bytes      |
/// | timestamp    | 4 bytes (LE)  |
/// | bits         | 4 bytes (LE)  |
/// | nonce        | 4 bytes (LE)  |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block: ChainHash,
    pub merkle_root: ChainHash,
    /// Seconds since the Unix epoch.
    pub timestamp: u32,
    /// Proof-of-work target in compact form.
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let header = Self::read_from(&mut reader)?;
        if !reader.finished() {
            return Err(TransactionError::TrailingBytes(reader.remaining(), "block header"));
        }
        Ok(header)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        Ok(BlockHeader {
            version: reader.read_u32_le()?,
            prev_block: ChainHash::new(reader.read_array::<32>()?),
            merkle_root: ChainHash::new(reader.read_array::<32>()?),
            timestamp: reader.read_u32_le()?,
            bits: reader.read_u32_le()?,
            nonce: reader.read_u32_le()?,
        })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u32_le(self.version);
        writer.write_bytes(self.prev_block.as_bytes());
        writer.write_bytes(self.merkle_root.as_bytes());
        writer.write_u32_le(self.timestamp);
        writer.write_u32_le(self.bits);
        writer.write_u32_le(self.nonce);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(BLOCK_HEADER_LEN);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Double SHA-256 of the serialized header.
    pub fn hash(&self) -> ChainHash {
        ChainHash::double_sha256(&self.to_bytes())
    }

    /// The proof-of-work target encoded in `bits`.
    pub fn target(&self) -> Result<BigUint, TransactionError> {
        compact_to_target(self.bits)
    }

    /// True if the header hash, read as a number, does not exceed the target.
    pub fn meets_target(&self) -> bool {
        match self.target() {
            Ok(target) if !target.is_zero() => {
                BigUint::from_bytes_le(self.hash().as_bytes()) <= target
            }
            _ => false,
        }
    }
}

/// A block: a header and its transactions, coinbase first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let header = BlockHeader::read_from(&mut reader)?;
        let count = reader.read_varint()?.value();
        let mut transactions =
            Vec::with_capacity(usize::try_from(count).unwrap_or(usize::MAX).min(reader.remaining()));
        for _ in 0..count {
            transactions.push(Transaction::read_from(&mut reader)?);
        }
        if !reader.finished() {
            return Err(TransactionError::TrailingBytes(reader.remaining(), "block"));
        }
        Ok(Block {
            header,
            transactions,
        })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(BLOCK_HEADER_LEN + 256);
        self.header.write_to(&mut writer);
        writer.write_varint(VarInt::from(self.transactions.len()));
        for tx in &self.transactions {
            tx.write_to(&mut writer);
        }
        writer.into_bytes()
    }

    pub fn hash(&self) -> ChainHash {
        self.header.hash()
    }

    /// Merkle root of this block's transaction ids.
    pub fn compute_merkle_root(&self) -> ChainHash {
        let ids: Vec<ChainHash> = self.transactions.iter().map(Transaction::tx_id).collect();
        merkle_root(&ids)
    }

    /// True if the header commits to exactly these transactions.
    pub fn has_valid_merkle_root(&self) -> bool {
        self.compute_merkle_root() == self.header.merkle_root
    }
}

/// Merkle root over leaf hashes.
///
/// Each level pairs adjacent hashes and double-SHA-256s their
/// concatenation; an odd level pairs its last hash with itself. An empty
/// list gives the all-zero hash.
pub fn merkle_root(leaves: &[ChainHash]) -> ChainHash {
    if leaves.is_empty() {
        return ChainHash::default();
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(left.as_bytes());
                buf[32..].copy_from_slice(right.as_bytes());
                ChainHash::double_sha256(&buf)
            })
            .collect();
    }
    level[0]
}

/// Decode compact bits: `mantissa * 2^(8 * (exponent - 3))`.
///
/// The top byte is the exponent, the low 23 bits the mantissa. A set sign
/// bit with a non-zero mantissa is a negative target and is rejected.
pub fn compact_to_target(bits: u32) -> Result<BigUint, TransactionError> {
    let exponent = bits >> 24;
    let mantissa = bits & COMPACT_MANTISSA_MASK;
    if bits & COMPACT_SIGN_BIT != 0 && mantissa != 0 {
        return Err(TransactionError::InvalidTarget(bits));
    }
    let mantissa = BigUint::from(mantissa);
    Ok(if exponent <= 3 {
        mantissa >> (8 * (3 - exponent) as usize)
    } else {
        mantissa << (8 * (exponent - 3) as usize)
    })
}

/// Encode a target in compact form, the inverse of [`compact_to_target`]
/// up to the precision the 23-bit mantissa keeps.
pub fn target_to_compact(target: &BigUint) -> u32 {
    let mut size = target.to_bytes_be().len() as u32;
    if target.is_zero() {
        size = 0;
    }
    let mut compact = if size <= 3 {
        let low = target.to_u32_digits().first().copied().unwrap_or(0);
        low << (8 * (3 - size))
    } else {
        let shifted: BigUint = target >> (8 * (size - 3) as usize);
        shifted.to_u32_digits().first().copied().unwrap_or(0)
    };
    // Keep the sign bit clear by moving one byte into the exponent.
    if compact & COMPACT_SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }
    compact | (size << 24)
}
