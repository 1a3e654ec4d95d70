//! Bounds-checked random access over the byte region being decoded.

use crate::{ExifError, ExifResult};

/// Byte order of the TIFF stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    /// little endian byte order ("II")
    LittleEndian,
    /// big endian byte order ("MM")
    BigEndian,
}

/// Reader over a borrowed byte region that is aware of the byte order.
///
/// Offsets are absolute and signed; a negative offset fails the same way a
/// read past the end does. The byte order is mutable because a makernote
/// subtree may momentarily override it, but callers that do so restore the
/// previous order on exit.
///
/// Reads fail only on geometry, never on content.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    byte_order: ByteOrder,
}

impl<'a> ByteReader<'a> {
    /// Wraps a byte region. The byte order starts big-endian and is
    /// normally replaced as soon as the TIFF header is parsed.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_order: ByteOrder::BigEndian,
        }
    }

    /// Total length of the byte region.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the byte region is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Borrow `count` bytes starting at `offset`, verifying the whole run
    /// lies inside the region.
    pub fn read_bytes(&self, offset: i64, count: i64) -> ExifResult<&'a [u8]> {
        let end = offset.checked_add(count);
        match end {
            Some(end) if offset >= 0 && count >= 0 && end <= self.data.len() as i64 => {
                Ok(&self.data[offset as usize..end as usize])
            }
            _ => Err(ExifError::BufferBounds {
                offset,
                requested: count,
                length: self.data.len(),
            }),
        }
    }

    #[inline(always)]
    fn read_array<const N: usize>(&self, offset: i64) -> ExifResult<[u8; N]> {
        let bytes = self.read_bytes(offset, N as i64)?;
        Ok(bytes.try_into().unwrap())
    }

    /// Reads a u8
    #[inline(always)]
    pub fn read_u8(&self, offset: i64) -> ExifResult<u8> {
        Ok(self.read_array::<1>(offset)?[0])
    }

    /// Reads an i8
    #[inline(always)]
    pub fn read_i8(&self, offset: i64) -> ExifResult<i8> {
        Ok(self.read_array::<1>(offset)?[0] as i8)
    }

    /// Reads a u16
    #[inline(always)]
    pub fn read_u16(&self, offset: i64) -> ExifResult<u16> {
        let n = self.read_array::<2>(offset)?;
        Ok(match self.byte_order {
            ByteOrder::LittleEndian => u16::from_le_bytes(n),
            ByteOrder::BigEndian => u16::from_be_bytes(n),
        })
    }

    /// Reads an i16
    #[inline(always)]
    pub fn read_i16(&self, offset: i64) -> ExifResult<i16> {
        let n = self.read_array::<2>(offset)?;
        Ok(match self.byte_order {
            ByteOrder::LittleEndian => i16::from_le_bytes(n),
            ByteOrder::BigEndian => i16::from_be_bytes(n),
        })
    }

    /// Reads a u32
    #[inline(always)]
    pub fn read_u32(&self, offset: i64) -> ExifResult<u32> {
        let n = self.read_array::<4>(offset)?;
        Ok(match self.byte_order {
            ByteOrder::LittleEndian => u32::from_le_bytes(n),
            ByteOrder::BigEndian => u32::from_be_bytes(n),
        })
    }

    /// Reads an i32
    #[inline(always)]
    pub fn read_i32(&self, offset: i64) -> ExifResult<i32> {
        let n = self.read_array::<4>(offset)?;
        Ok(match self.byte_order {
            ByteOrder::LittleEndian => i32::from_le_bytes(n),
            ByteOrder::BigEndian => i32::from_be_bytes(n),
        })
    }

    /// Reads an f32
    #[inline(always)]
    pub fn read_f32(&self, offset: i64) -> ExifResult<f32> {
        Ok(f32::from_bits(self.read_u32(offset)?))
    }

    /// Reads an f64
    #[inline(always)]
    pub fn read_f64(&self, offset: i64) -> ExifResult<f64> {
        let n = self.read_array::<8>(offset)?;
        Ok(f64::from_bits(match self.byte_order {
            ByteOrder::LittleEndian => u64::from_le_bytes(n),
            ByteOrder::BigEndian => u64::from_be_bytes(n),
        }))
    }

    /// Reads exactly `count` bytes as a Latin-1 string.
    pub fn read_string(&self, offset: i64, count: i64) -> ExifResult<String> {
        let bytes = self.read_bytes(offset, count)?;
        Ok(latin1(bytes))
    }

    /// Reads up to `max` bytes as a Latin-1 string, stopping at the first
    /// NUL or at the end of the region, whichever comes first.
    pub fn read_null_terminated_string(&self, offset: i64, max: usize) -> ExifResult<String> {
        if offset < 0 || offset > self.data.len() as i64 {
            return Err(ExifError::BufferBounds {
                offset,
                requested: 1,
                length: self.data.len(),
            });
        }
        let start = offset as usize;
        let available = (self.data.len() - start).min(max);
        let bytes = &self.data[start..start + available];
        let terminated = bytes.iter().position(|&b| b == 0).unwrap_or(available);
        Ok(latin1(&bytes[..terminated]))
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
