//! Bounds-checked cursor over raw account data

use solana_sdk::pubkey::Pubkey;
use crate::shared::errors::DecodeError;

/// Cursor-style reader over an account buffer.
///
/// All reads are little-endian and advance the offset. A read that would run
/// past the end of the buffer fails with `DecodeError::OutOfBounds` and leaves
/// the offset untouched.
#[derive(Debug, Clone)]
pub struct AccountReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> AccountReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Start reading at a fixed offset
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::OutOfBounds {
                offset: self.offset,
                needed: n,
                len: self.data.len(),
            })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.read_fixed_bytes::<1>()?;
        Ok(byte)
    }

    pub fn read_u64_le(&mut self) -> Result<u64, DecodeError> {
        self.read_fixed_bytes::<8>().map(u64::from_le_bytes)
    }

    pub fn read_u128_le(&mut self) -> Result<u128, DecodeError> {
        self.read_fixed_bytes::<16>().map(u128::from_le_bytes)
    }

    pub fn read_pubkey(&mut self) -> Result<Pubkey, DecodeError> {
        self.read_fixed_bytes::<32>().map(Pubkey::new_from_array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian_and_advances() {
        let mut data = Vec::new();
        data.push(0xAB);
        data.extend_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
        data.extend_from_slice(&(u128::MAX - 5).to_le_bytes());
        data.extend_from_slice(&[9u8; 32]);

        let mut reader = AccountReader::new(&data);
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
        assert_eq!(reader.read_u64_le().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(reader.read_u128_le().unwrap(), u128::MAX - 5);
        assert_eq!(reader.read_pubkey().unwrap(), Pubkey::new_from_array([9u8; 32]));
        assert_eq!(reader.offset(), 57);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_out_of_bounds_read_fails_without_advancing() {
        let data = [0u8; 10];
        let mut reader = AccountReader::at(&data, 4);

        let err = reader.read_u64_le().unwrap_err();
        assert_eq!(
            err,
            DecodeError::OutOfBounds { offset: 4, needed: 8, len: 10 }
        );
        assert_eq!(reader.offset(), 4);

        assert!(reader.skip(6).is_ok());
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn test_offset_overflow_is_out_of_bounds() {
        let data = [0u8; 4];
        let mut reader = AccountReader::at(&data, usize::MAX);
        assert!(matches!(
            reader.read_bytes(2),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }
}
