//! Binary codec for the wire formats of scripts, transactions and blocks.
//!
//! Provides the compact `VarInt`, a cursor-based `ByteReader` and an
//! append-only `ByteWriter`. Every multi-byte integer is little-endian.
//! Reading past the end of the buffer is always a `TruncatedInput` error.

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// VarInt
// ---------------------------------------------------------------------------

/// A compact variable-length integer.
///
/// Values below `0xfd` take one byte. Larger values are prefixed with
/// `0xfd`, `0xfe` or `0xff` followed by a 16, 32 or 64-bit little-endian
/// value respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Decode a VarInt from the front of a byte slice.
    ///
    /// # Arguments
    /// * `data` - Byte slice starting with a VarInt encoding.
    ///
    /// # Returns
    /// A tuple of `(VarInt, bytes_consumed)`, or `TruncatedInput` when the
    /// slice ends inside the encoding.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), PrimitivesError> {
        let mut reader = ByteReader::new(data);
        let value = reader.read_varint()?;
        Ok((value, reader.position()))
    }

    /// Return the wire-format byte length of this VarInt (1, 3, 5 or 9).
    pub fn length(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    /// Encode the VarInt into a new byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.length());
        let v = self.0;
        match self.length() {
            1 => buf.push(v as u8),
            3 => {
                buf.push(0xfd);
                buf.extend_from_slice(&(v as u16).to_le_bytes());
            }
            5 => {
                buf.push(0xfe);
                buf.extend_from_slice(&(v as u32).to_le_bytes());
            }
            _ => {
                buf.push(0xff);
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        buf
    }

    /// Return the underlying u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VarInt {
    fn from(v: u64) -> Self {
        VarInt(v)
    }
}

impl From<usize> for VarInt {
    fn from(v: usize) -> Self {
        VarInt(v as u64)
    }
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// A cursor over a borrowed byte slice.
///
/// Each `read_*` call advances the cursor. A failed read leaves the cursor
/// where it was.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Arguments
    /// * `n` - Number of bytes to read.
    ///
    /// # Returns
    /// A byte slice of length `n`, or `TruncatedInput` if fewer remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        let available = self.remaining();
        if n > available {
            return Err(PrimitivesError::TruncatedInput {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read exactly `N` bytes into a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian i32.
    pub fn read_i32_le(&mut self) -> Result<i32, PrimitivesError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u64.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a compact variable-length integer.
    ///
    /// # Returns
    /// The decoded `VarInt`. The cursor is restored if the prefix byte is
    /// present but its payload is truncated.
    pub fn read_varint(&mut self) -> Result<VarInt, PrimitivesError> {
        let start = self.pos;
        let result = match self.read_u8()? {
            0xff => self.read_u64_le(),
            0xfe => self.read_u32_le().map(u64::from),
            0xfd => self.read_u16_le().map(u64::from),
            b => Ok(u64::from(b)),
        };
        match result {
            Ok(v) => Ok(VarInt(v)),
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    /// Read a VarInt length prefix followed by that many bytes.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let start = self.pos;
        let len = self.read_varint()?.value();
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        self.read_bytes(len).map_err(|e| {
            self.pos = start;
            e
        })
    }

    /// Return the current cursor offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Return the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Return true once every byte has been consumed.
    pub fn finished(&self) -> bool {
        self.pos >= self.data.len()
    }
}

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// An append-only byte buffer for building wire encodings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a little-endian u16.
    pub fn write_u16_le(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u32.
    pub fn write_u32_le(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian i32.
    pub fn write_i32_le(&mut self, val: i32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u64.
    pub fn write_u64_le(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a compact variable-length integer.
    pub fn write_varint(&mut self, varint: VarInt) {
        self.buf.extend_from_slice(&varint.to_bytes());
    }

    /// Append a VarInt length prefix followed by the bytes.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_varint(VarInt::from(bytes.len()));
        self.write_bytes(bytes);
    }

    /// Concatenate buffers produced by other writers onto this one.
    pub fn concat<'b, I>(&mut self, parts: I)
    where
        I: IntoIterator<Item = &'b [u8]>,
    {
        for part in parts {
            self.buf.extend_from_slice(part);
        }
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return the bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Return true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- VarInt --

    #[test]
    fn test_varint_encodings() {
        let cases: Vec<(u64, Vec<u8>)> = vec![
            (0, vec![0x00]),
            (1, vec![0x01]),
            (252, vec![0xfc]),
            (253, vec![0xfd, 0xfd, 0x00]),
            (65535, vec![0xfd, 0xff, 0xff]),
            (65536, vec![0xfe, 0x00, 0x00, 0x01, 0x00]),
            (4294967295, vec![0xfe, 0xff, 0xff, 0xff, 0xff]),
            (4294967296, vec![0xff, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00]),
            (u64::MAX, vec![0xff; 9]),
        ];

        for (value, expected) in cases {
            let vi = VarInt(value);
            assert_eq!(vi.to_bytes(), expected, "encoding mismatch for {}", value);
            assert_eq!(vi.length(), expected.len(), "length mismatch for {}", value);
            let (decoded, used) = VarInt::from_bytes(&expected).expect("decode");
            assert_eq!(decoded, vi);
            assert_eq!(used, expected.len());
        }
    }

    #[test]
    fn test_varint_truncated_payload() {
        let err = VarInt::from_bytes(&[0xfe, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, PrimitivesError::TruncatedInput { needed: 4, available: 2, .. }));
        assert!(VarInt::from_bytes(&[]).is_err());
    }

    // -- ByteReader / ByteWriter --

    #[test]
    fn test_reader_writer_roundtrip() {
        let mut writer = ByteWriter::new();
        writer.write_u8(0x42);
        writer.write_u16_le(0x1234);
        writer.write_u32_le(0xDEADBEEF);
        writer.write_i32_le(-2);
        writer.write_u64_le(0x0102030405060708);
        writer.write_varint(VarInt(300));
        writer.write_var_bytes(b"hello");

        let data = writer.into_bytes();
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_le().unwrap(), 0xDEADBEEF);
        assert_eq!(reader.read_i32_le().unwrap(), -2);
        assert_eq!(reader.read_u64_le().unwrap(), 0x0102030405060708);
        assert_eq!(reader.read_varint().unwrap(), VarInt(300));
        assert_eq!(reader.read_var_bytes().unwrap(), b"hello");
        assert!(reader.finished());
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_reader_never_zero_fills() {
        let mut reader = ByteReader::new(&[0x01, 0x02, 0x03]);
        let err = reader.read_u32_le().unwrap_err();
        assert!(matches!(
            err,
            PrimitivesError::TruncatedInput { offset: 0, needed: 4, available: 3 }
        ));
        // A failed read does not move the cursor.
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u16_le().unwrap(), 0x0201);
        assert!(!reader.finished());
    }

    #[test]
    fn test_var_bytes_length_exceeds_buffer() {
        let mut reader = ByteReader::new(&[0x05, 0xaa, 0xbb]);
        assert!(reader.read_var_bytes().is_err());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_writer_concat() {
        let mut a = ByteWriter::with_capacity(8);
        a.write_u8(1);
        let mut b = ByteWriter::new();
        b.write_u16_le(0x0302);
        let c = [4u8, 5];
        a.concat([b.as_bytes(), &c[..]]);
        assert_eq!(a.as_bytes(), &[1, 2, 3, 4, 5]);
        assert_eq!(a.len(), 5);
        assert!(!a.is_empty());
    }
}
