//! Bit-level packing of convolutional symbols.
//!
//! Bytes are read and written most significant bit first. Multi-bit values
//! travel least significant bit first, so the output of generator polynomial
//! 0 is the first bit on the wire.

use bitvec::prelude::*;

/// Sequential bit writer
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bits: BitVec<u8, Msb0>,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with room for `bits` bits
    pub fn with_capacity(bits: usize) -> Self {
        BitWriter {
            bits: BitVec::with_capacity(bits),
        }
    }

    /// Discards everything written so far, keeping the allocation
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Number of bits written
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Writes the low `n` bits of `value`, bit 0 first
    pub fn write(&mut self, value: u32, n: usize) {
        for i in 0..n {
            self.bits.push((value >> i) & 1 == 1);
        }
    }

    /// Writes `bits` in order
    pub fn write_bitlist<T: BitStore, O: BitOrder>(&mut self, bits: &BitSlice<T, O>) {
        self.bits.extend(bits.iter().by_vals());
    }

    /// Writes `bits` last to first
    pub fn write_bitlist_reversed<T: BitStore, O: BitOrder>(&mut self, bits: &BitSlice<T, O>) {
        self.bits.extend(bits.iter().rev().map(|bit| *bit));
    }

    /// The completed bytes; a trailing partial byte is left out
    pub fn whole_bytes(&self) -> Vec<u8> {
        let whole = self.bits.len() / 8;
        self.bits.as_raw_slice()[..whole].to_vec()
    }

    /// All written bits, with the final partial byte padded with zeros
    pub fn padded_bytes(&self) -> Vec<u8> {
        let mut bytes = self.bits.as_raw_slice().to_vec();
        let tail = self.bits.len() % 8;
        if tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= 0xffu8 << (8 - tail);
            }
        }
        bytes
    }
}

/// Sequential bit reader over a byte slice
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        BitReader {
            bits: bytes.view_bits::<Msb0>(),
            position: 0,
        }
    }

    /// Number of bits not yet read
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.position
    }

    /// Reads the next `n` bits; the first bit read becomes bit 0 of the result.
    /// Reading past the end yields zeros.
    pub fn read(&mut self, n: usize) -> u32 {
        let end = (self.position + n).min(self.bits.len());
        let value = self.bits[self.position..end]
            .iter()
            .by_vals()
            .enumerate()
            .fold(0u32, |acc, (i, bit)| acc | (u32::from(bit) << i));
        self.position = end;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_lsb_first_msb_packed() {
        let mut writer = BitWriter::new();
        writer.write(0b01, 2);
        writer.write(0b110, 3);
        writer.write(0b101, 3);
        // bits on the wire: 1 0 | 0 1 1 | 1 0 1
        assert_eq!(writer.len(), 8);
        assert_eq!(writer.whole_bytes(), vec![0b1001_1101]);
    }

    #[test]
    fn test_padding() {
        let mut writer = BitWriter::with_capacity(16);
        writer.write(0xff, 8);
        writer.write(0b111, 3);
        assert_eq!(writer.whole_bytes(), vec![0xff]);
        assert_eq!(writer.padded_bytes(), vec![0xff, 0b1110_0000]);
    }

    #[test]
    fn test_reversed_bitlist() {
        let bits = bits![u8, Lsb0; 1, 1, 0, 0, 0, 0, 1, 0];
        let mut forward = BitWriter::new();
        forward.write_bitlist(bits);
        let mut reversed = BitWriter::new();
        reversed.write_bitlist_reversed(bits);
        assert_eq!(forward.whole_bytes(), vec![0b1100_0010]);
        assert_eq!(reversed.whole_bytes(), vec![0b0100_0011]);
    }

    #[test]
    fn test_clear_reuses_writer() {
        let mut writer = BitWriter::new();
        writer.write(0xff, 8);
        writer.write(0xff, 4);
        writer.clear();
        assert!(writer.is_empty());
        writer.write(0, 4);
        assert_eq!(writer.padded_bytes(), vec![0]);
    }

    #[test]
    fn test_reader_round_trip() {
        let mut writer = BitWriter::new();
        let values = [(0b10u32, 2usize), (0b011, 3), (0b1, 1), (0b1101, 4), (0b0, 2)];
        for &(value, n) in &values {
            writer.write(value, n);
        }
        let bytes = writer.padded_bytes();

        let mut reader = BitReader::new(&bytes);
        for &(value, n) in &values {
            assert_eq!(reader.read(n), value);
        }
        assert_eq!(reader.remaining(), 4);
        assert_eq!(reader.read(8), 0);
        assert_eq!(reader.remaining(), 0);
    }
}
