//! Bounds-checked primitive reads over the raw TIFF byte buffer.

use bytes::Bytes;

use crate::error::{TiffError, TiffResult};

/// TIFF byte order, from the first two header bytes (`II` or `MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Random-access reader over the whole file with the header's byte order.
///
/// Every read is bounds-checked; a read past the end reports which
/// structure was being read rather than panicking.
pub struct TiffReader {
    data: Bytes,
    order: ByteOrder,
}

impl TiffReader {
    pub fn new(data: Bytes, order: ByteOrder) -> Self {
        Self { data, order }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn slice(&self, offset: usize, len: usize, what: &'static str) -> TiffResult<&[u8]> {
        let end = offset.checked_add(len).ok_or(TiffError::Truncated(what))?;
        self.data
            .get(offset..end)
            .ok_or(TiffError::Truncated(what))
    }

    pub fn read_u8(&self, offset: usize, what: &'static str) -> TiffResult<u8> {
        Ok(self.slice(offset, 1, what)?[0])
    }

    pub fn read_u16(&self, offset: usize, what: &'static str) -> TiffResult<u16> {
        let bytes: [u8; 2] = self.slice(offset, 2, what)?.try_into().unwrap();
        Ok(match self.order {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_u32(&self, offset: usize, what: &'static str) -> TiffResult<u32> {
        let bytes: [u8; 4] = self.slice(offset, 4, what)?.try_into().unwrap();
        Ok(match self.order {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    pub fn read_f32(&self, offset: usize, what: &'static str) -> TiffResult<f32> {
        Ok(f32::from_bits(self.read_u32(offset, what)?))
    }

    pub fn read_f64(&self, offset: usize, what: &'static str) -> TiffResult<f64> {
        let bytes: [u8; 8] = self.slice(offset, 8, what)?.try_into().unwrap();
        Ok(match self.order {
            ByteOrder::Little => f64::from_le_bytes(bytes),
            ByteOrder::Big => f64::from_be_bytes(bytes),
        })
    }
}
