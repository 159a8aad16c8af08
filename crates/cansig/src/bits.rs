//! Low-level bit placement utilities for frame payloads.
//!
//! Bits are numbered the way CAN databases number them: bit `n` is bit `n % 8`
//! (0 = least significant) of byte `n / 8`. A little endian ("Intel") signal
//! names its least significant bit and grows towards higher bit numbers. A big
//! endian ("Motorola") signal names its most significant bit and continues
//! downwards through the byte, then into the high bits of the next byte.

use crate::errors::CodecError;

/// Byte ordering of a signal inside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Intel: low-order byte first.
    #[default]
    LittleEndian,
    /// Motorola: high-order byte first.
    BigEndian,
}

/// Returns a mask with the low `bits` bits set (`bits` may be 0..=64).
pub fn mask(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Width of the smallest storage integer (8, 16, 32 or 64) holding `bit_length` bits.
pub fn storage_bits(bit_length: usize) -> usize {
    match bit_length {
        0..=8 => 8,
        9..=16 => 16,
        17..=32 => 32,
        _ => 64,
    }
}

/// Reinterprets the low `bit_length` bits of `raw` as a two's complement number
/// held in a `storage_bits`-wide integer and widens it to `i64`.
///
/// When bit `bit_length - 1` is set, every bit from `bit_length` up to
/// `storage_bits` is set before the reinterpretation.
pub fn sign_extend(raw: u64, bit_length: usize, storage_bits: usize) -> i64 {
    if bit_length == 0 {
        return 0;
    }

    let bit_length = bit_length.min(64);
    let storage_bits = storage_bits.clamp(bit_length, 64);
    let mut value = raw & mask(bit_length);

    if bit_length < storage_bits && value & (1u64 << (bit_length - 1)) != 0 {
        value |= mask(storage_bits) & !mask(bit_length);
    }

    let shift = 64 - storage_bits;
    ((value << shift) as i64) >> shift
}

/// Bytes touched by a signal, and where value bit 0 lands inside them.
///
/// The touched bytes are read as one little (Intel) or big (Motorola) endian
/// integer of at most nine bytes; value bit 0 sits `shift` bits above its
/// least significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSpan {
    pub first_byte: usize,
    pub last_byte: usize,
    pub shift: u32,
    pub bit_length: usize,
    pub byte_order: ByteOrder,
}

impl BitSpan {
    /// Computes the span of a `bit_length`-bit signal starting at `start_bit`.
    pub fn new(start_bit: usize, bit_length: usize, byte_order: ByteOrder) -> Self {
        let bit_length = bit_length.clamp(1, 64);

        match byte_order {
            ByteOrder::LittleEndian => BitSpan {
                first_byte: start_bit / 8,
                last_byte: start_bit.saturating_add(bit_length - 1) / 8,
                shift: (start_bit % 8) as u32,
                bit_length,
                byte_order,
            },
            ByteOrder::BigEndian => {
                // Position counted from the MSB of byte 0.
                let msb = ((start_bit / 8) * 8).saturating_add(7 - start_bit % 8);
                let lsb = msb.saturating_add(bit_length - 1);

                BitSpan {
                    first_byte: start_bit / 8,
                    last_byte: lsb / 8,
                    shift: (7 - lsb % 8) as u32,
                    bit_length,
                    byte_order,
                }
            }
        }
    }

    /// Number of frame bytes this span needs.
    pub fn required_len(&self) -> usize {
        self.last_byte + 1
    }

    fn byte_index(&self, i: usize) -> usize {
        match self.byte_order {
            ByteOrder::LittleEndian => self.first_byte + i,
            ByteOrder::BigEndian => self.last_byte - i,
        }
    }

    fn byte_count(&self) -> usize {
        self.last_byte - self.first_byte + 1
    }

    /// ORs the low `bit_length` bits of `raw` into `data`. Other bits are untouched.
    ///
    /// `data` must be at least [BitSpan::required_len] bytes long.
    pub fn write(&self, data: &mut [u8], raw: u64) {
        let wide = ((raw & mask(self.bit_length)) as u128) << self.shift;

        for i in 0..self.byte_count() {
            data[self.byte_index(i)] |= (wide >> (8 * i)) as u8;
        }
    }

    /// Reads the unsigned `bit_length`-bit value covered by this span.
    ///
    /// `data` must be at least [BitSpan::required_len] bytes long.
    pub fn read(&self, data: &[u8]) -> u64 {
        let mut wide = 0u128;

        for i in 0..self.byte_count() {
            wide |= (data[self.byte_index(i)] as u128) << (8 * i);
        }

        ((wide >> self.shift) as u64) & mask(self.bit_length)
    }

    /// Per-byte masks of the bits this span occupies in a frame of `frame_len` bytes.
    pub fn occupancy(&self, frame_len: usize) -> Vec<u8> {
        let mut out = vec![0u8; frame_len.max(self.required_len())];
        self.write(&mut out, u64::MAX);
        out.truncate(frame_len);
        out
    }

    pub(crate) fn check(&self, len: usize) -> Result<(), CodecError> {
        if self.last_byte >= len {
            return Err(CodecError::OutOfBounds {
                end_byte: self.last_byte,
                len,
            });
        }

        Ok(())
    }
}

/// Packs the low `bit_length` bits of `raw` into `data` at `start_bit`, OR-ing
/// into the existing content.
pub fn pack_bits(
    data: &mut [u8],
    start_bit: usize,
    bit_length: usize,
    byte_order: ByteOrder,
    raw: u64,
) -> Result<(), CodecError> {
    let span = BitSpan::new(start_bit, bit_length, byte_order);
    span.check(data.len())?;
    span.write(data, raw);

    Ok(())
}

/// Unpacks the unsigned `bit_length`-bit value at `start_bit` from `data`.
pub fn unpack_bits(
    data: &[u8],
    start_bit: usize,
    bit_length: usize,
    byte_order: ByteOrder,
) -> Result<u64, CodecError> {
    let span = BitSpan::new(start_bit, bit_length, byte_order);
    span.check(data.len())?;

    Ok(span.read(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask(0), 0);
        assert_eq!(mask(1), 1);
        assert_eq!(mask(12), 0xfff);
        assert_eq!(mask(64), u64::MAX);
    }

    #[test]
    fn test_storage_bits() {
        assert_eq!(storage_bits(1), 8);
        assert_eq!(storage_bits(8), 8);
        assert_eq!(storage_bits(9), 16);
        assert_eq!(storage_bits(32), 32);
        assert_eq!(storage_bits(33), 64);
        assert_eq!(storage_bits(64), 64);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0b11111111, 8, 8), -1);
        assert_eq!(sign_extend(0b100, 3, 8), -4);
        assert_eq!(sign_extend(0b011, 3, 8), 3);
        assert_eq!(sign_extend(0x800, 12, 16), -2048);
        assert_eq!(sign_extend(0x7ff, 12, 16), 2047);
        assert_eq!(sign_extend(1, 1, 8), -1);
        assert_eq!(sign_extend(0, 1, 8), 0);
    }

    #[test]
    fn test_sign_extend_full_width() {
        assert_eq!(sign_extend(u64::MAX, 64, 64), -1);
        assert_eq!(sign_extend(1u64 << 63, 64, 64), i64::MIN);
        assert_eq!(sign_extend(0xffff_ffff, 32, 32), -1);
        assert_eq!(sign_extend(0x8000_0000, 32, 32), i32::MIN as i64);
        assert_eq!(sign_extend(1u64 << 32, 33, 64), -(1i64 << 32));
        assert_eq!(sign_extend(1u64 << 62, 63, 64), -(1i64 << 62));
    }

    #[test]
    fn test_sign_extend_ignores_bits_above_length() {
        assert_eq!(sign_extend(0xf05, 4, 8), 5);
    }

    #[test]
    fn test_span_little_endian() {
        let span = BitSpan::new(4, 12, ByteOrder::LittleEndian);
        assert_eq!(span.first_byte, 0);
        assert_eq!(span.last_byte, 1);
        assert_eq!(span.shift, 4);
    }

    #[test]
    fn test_span_big_endian() {
        // MSB in bit 0 of byte 0, then all of byte 1, then the top three bits of byte 2.
        let span = BitSpan::new(0, 12, ByteOrder::BigEndian);
        assert_eq!(span.first_byte, 0);
        assert_eq!(span.last_byte, 2);
        assert_eq!(span.shift, 5);

        let span = BitSpan::new(7, 64, ByteOrder::BigEndian);
        assert_eq!(span.first_byte, 0);
        assert_eq!(span.last_byte, 7);
        assert_eq!(span.shift, 0);
    }

    #[test]
    fn test_pack_little_endian() {
        let mut data = [0u8; 8];
        pack_bits(&mut data, 4, 12, ByteOrder::LittleEndian, 0xabc).unwrap();
        assert_eq!(data[..2], [0xc0, 0xab]);

        let mut data = [0u8; 8];
        pack_bits(&mut data, 0, 64, ByteOrder::LittleEndian, 0x0102030405060708).unwrap();
        assert_eq!(data, 0x0102030405060708u64.to_le_bytes());
    }

    #[test]
    fn test_pack_big_endian() {
        let mut data = [0u8; 8];
        pack_bits(&mut data, 0, 12, ByteOrder::BigEndian, 0x801).unwrap();
        assert_eq!(data[..3], [0x01, 0x00, 0x20]);

        let mut data = [0u8; 8];
        pack_bits(&mut data, 7, 64, ByteOrder::BigEndian, 0x0102030405060708).unwrap();
        assert_eq!(data, 0x0102030405060708u64.to_be_bytes());
    }

    #[test]
    fn test_pack_keeps_other_bits() {
        let mut data = [0b1000_0001u8, 0xff];
        pack_bits(&mut data, 6, 6, ByteOrder::BigEndian, 20).unwrap();
        assert_eq!(data, [0b1010_1001, 0xff]);
    }

    #[test]
    fn test_pack_truncates_to_length() {
        let mut data = [0u8; 2];
        pack_bits(&mut data, 2, 3, ByteOrder::LittleEndian, 0xff).unwrap();
        assert_eq!(data, [0b0001_1100, 0]);
    }

    #[test]
    fn test_unpack_ignores_neighbours() {
        let data = [0xa9, 0xff, 0xff];
        assert_eq!(unpack_bits(&data, 6, 6, ByteOrder::BigEndian).unwrap(), 20);
        assert_eq!(unpack_bits(&data, 7, 1, ByteOrder::BigEndian).unwrap(), 1);
        assert_eq!(unpack_bits(&data, 0, 12, ByteOrder::BigEndian).unwrap(), 0xfff);
        assert_eq!(unpack_bits(&data, 3, 2, ByteOrder::LittleEndian).unwrap(), 0b01);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut data = [0u8; 2];
        assert_eq!(
            pack_bits(&mut data, 12, 8, ByteOrder::LittleEndian, 1).unwrap_err(),
            CodecError::OutOfBounds {
                end_byte: 2,
                len: 2
            }
        );
        assert_eq!(
            unpack_bits(&data, 15, 9, ByteOrder::BigEndian).unwrap_err(),
            CodecError::OutOfBounds {
                end_byte: 2,
                len: 2
            }
        );

        // Start bits near usize::MAX saturate instead of wrapping around.
        for byte_order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            assert!(matches!(
                unpack_bits(&data, usize::MAX, 8, byte_order),
                Err(CodecError::OutOfBounds { len: 2, .. })
            ));
        }
    }

    #[test]
    fn test_occupancy() {
        let span = BitSpan::new(0, 12, ByteOrder::BigEndian);
        assert_eq!(span.occupancy(8), vec![0x01, 0xff, 0xe0, 0, 0, 0, 0, 0]);
    }
}
