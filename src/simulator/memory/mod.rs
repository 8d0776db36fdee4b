//!
//! The Word Store: a flat, byte-addressed, little-endian block of main memory.
//! Programs are loaded at address 0 and instructions are fetched from here.
//!

use crate::error::MemoryError;
use byteorder::{ByteOrder, LittleEndian};

/// Default size of main memory, in bytes
pub const DEFAULT_SIZE: usize = 4096;

#[derive(Debug, Clone)]
pub struct Memory {
    data: Vec<u8>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    /// Number of addressable bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Is `[i, i + n)` out of memory bounds?
    fn out_of_bounds(&self, i: usize, n: usize) -> bool {
        i.checked_add(n).map_or(true, |end| end > self.data.len())
    }

    /// Reads `n` bytes starting at the `i`-th byte of the memory with some reading function `read`
    fn get_with<T, F>(&self, i: usize, n: usize, read: F) -> Result<T, MemoryError>
    where
        F: FnOnce(&[u8]) -> T,
    {
        if self.out_of_bounds(i, n) {
            return Err(MemoryError::OutOfBounds {
                address: i as u32,
                len: n,
            });
        }
        Ok(read(&self.data[i..i + n]))
    }

    /// Writes the value `x` to the `n` bytes starting at `i`, with some writing function `write`
    fn set_with<T, F>(&mut self, i: usize, n: usize, x: T, write: F) -> Result<(), MemoryError>
    where
        F: FnOnce(&mut [u8], T),
    {
        if self.out_of_bounds(i, n) {
            return Err(MemoryError::OutOfBounds {
                address: i as u32,
                len: n,
            });
        }
        write(&mut self.data[i..i + n], x);
        Ok(())
    }

    pub fn read(&self, i: usize, buf: &mut [u8]) -> Result<(), MemoryError> {
        self.get_with(i, buf.len(), |v| buf.copy_from_slice(v))
    }

    pub fn write(&mut self, i: usize, bytes: &[u8]) -> Result<(), MemoryError> {
        self.set_with(i, bytes.len(), bytes, |v, x| v.copy_from_slice(x))
    }

    pub fn get_byte(&self, i: usize) -> Result<u8, MemoryError> {
        self.get_with(i, 1, |v| v[0])
    }

    pub fn set_byte(&mut self, i: usize, x: u8) -> Result<(), MemoryError> {
        self.set_with(i, 1, x, |v, x| v[0] = x)
    }

    pub fn get_half(&self, i: usize) -> Result<u16, MemoryError> {
        self.get_with(i, 2, LittleEndian::read_u16)
    }

    pub fn set_half(&mut self, i: usize, x: u16) -> Result<(), MemoryError> {
        self.set_with(i, 2, x, LittleEndian::write_u16)
    }

    pub fn get_word(&self, i: usize) -> Result<u32, MemoryError> {
        self.get_with(i, 4, LittleEndian::read_u32)
    }

    pub fn set_word(&mut self, i: usize, x: u32) -> Result<(), MemoryError> {
        self.set_with(i, 4, x, LittleEndian::write_u32)
    }

    /// Reads `count` consecutive words starting at byte `i`
    pub fn get_words(&self, i: usize, count: usize) -> Result<Vec<u32>, MemoryError> {
        let n = count.checked_mul(4).unwrap_or(usize::MAX);
        self.get_with(i, n, |v| v.chunks_exact(4).map(LittleEndian::read_u32).collect())
    }

    /// Writes all of `words` starting at byte `i`, or nothing at all if they don't fit
    pub fn set_words(&mut self, i: usize, words: &[u32]) -> Result<(), MemoryError> {
        let n = words.len() * 4;
        self.set_with(i, n, words, |v, x| LittleEndian::write_u32_into(x, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_is_little_endian() {
        let mut memory = Memory::new(16);
        memory.set_word(4, 0x1122_3344).unwrap();
        assert_eq!(memory.get_byte(4), Ok(0x44));
        assert_eq!(memory.get_byte(7), Ok(0x11));
        assert_eq!(memory.get_half(5), Ok(0x2233));
        assert_eq!(memory.get_word(4), Ok(0x1122_3344));
    }

    #[test]
    fn test_unaligned_access() {
        let mut memory = Memory::new(16);
        memory.set_word(3, 0xdead_beef).unwrap();
        assert_eq!(memory.get_word(3), Ok(0xdead_beef));
        assert_eq!(memory.get_byte(6), Ok(0xde));
    }

    #[test]
    fn test_bounds() {
        let mut memory = Memory::new(16);
        assert!(memory.get_word(12).is_ok());
        assert_eq!(
            memory.get_word(13),
            Err(MemoryError::OutOfBounds {
                address: 13,
                len: 4
            })
        );
        assert!(memory.set_byte(16, 1).is_err());
        assert!(memory.get_half(usize::MAX).is_err());
    }

    #[test]
    fn test_words_are_all_or_nothing() {
        let mut memory = Memory::new(8);
        assert!(memory.set_words(4, &[1, 2]).is_err());
        assert_eq!(memory.get_words(0, 2), Ok(vec![0, 0]));

        memory.set_words(0, &[7, 9]).unwrap();
        assert_eq!(memory.get_words(0, 2), Ok(vec![7, 9]));
        assert!(memory.get_words(4, 2).is_err());
    }
}
