//! Fixed-width signed-integer wire codec.
//!
//! Little-endian two's complement, exactly `BYTE_WIDTH` bytes per element.
//! `unpack` consumes from the front of a borrowed byte cursor so the framing
//! layer can keep reading subsequent columns out of the same buffer.

use ethnum::I256;

use crate::{Error, Result};

pub(crate) fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if input.len() < n {
        return Err(Error::Corrupt(format!(
            "truncated column data: need {n} bytes, have {}",
            input.len()
        )));
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Ok(head)
}

fn checked_byte_len(count: usize, elem_size: usize) -> Result<usize> {
    count
        .checked_mul(elem_size)
        .ok_or_else(|| Error::Corrupt("row count overflows byte length".to_string()))
}

/// A signed integer width usable as the transport representation of a scaled
/// decimal column.
pub trait WireInt: Copy + Eq + Sized {
    const BYTE_WIDTH: usize;

    /// Raw bit pattern emitted for null slots. The wire format has no
    /// per-value null tag, so null rows still occupy a full-width slot;
    /// nullness itself travels in the out-of-band bitmap.
    const NULL_SENTINEL: Self;

    fn write_le(self, out: &mut Vec<u8>);

    /// Reads one value from exactly `BYTE_WIDTH` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Appends `values` to `out` in wire order.
    fn pack(values: &[Self], out: &mut Vec<u8>) {
        out.reserve(values.len() * Self::BYTE_WIDTH);
        for &v in values {
            v.write_le(out);
        }
    }

    /// Reads `count` values off the front of `input`, advancing the cursor.
    fn unpack(input: &mut &[u8], count: usize) -> Result<Vec<Self>> {
        let byte_len = checked_byte_len(count, Self::BYTE_WIDTH)?;
        let bytes = take(input, byte_len)?;
        let mut values = Vec::with_capacity(count);
        for chunk in bytes.chunks_exact(Self::BYTE_WIDTH) {
            values.push(Self::read_le(chunk));
        }
        Ok(values)
    }
}

impl WireInt for i32 {
    const BYTE_WIDTH: usize = 4;
    const NULL_SENTINEL: Self = 0;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&bytes[..4]);
        Self::from_le_bytes(buf)
    }

    fn pack(values: &[Self], out: &mut Vec<u8>) {
        let byte_len = values.len() * Self::BYTE_WIDTH;
        out.reserve(byte_len);
        #[cfg(target_endian = "little")]
        {
            let bytes =
                unsafe { std::slice::from_raw_parts(values.as_ptr() as *const u8, byte_len) };
            out.extend_from_slice(bytes);
        }
        #[cfg(not(target_endian = "little"))]
        for &v in values {
            v.write_le(out);
        }
    }

    fn unpack(input: &mut &[u8], count: usize) -> Result<Vec<Self>> {
        let byte_len = checked_byte_len(count, Self::BYTE_WIDTH)?;
        let bytes = take(input, byte_len)?;
        let mut values = vec![0i32; count];
        #[cfg(target_endian = "little")]
        {
            let dst = unsafe {
                std::slice::from_raw_parts_mut(values.as_mut_ptr() as *mut u8, byte_len)
            };
            dst.copy_from_slice(bytes);
        }
        #[cfg(not(target_endian = "little"))]
        for (i, chunk) in bytes.chunks_exact(Self::BYTE_WIDTH).enumerate() {
            values[i] = Self::read_le(chunk);
        }
        Ok(values)
    }
}

impl WireInt for i64 {
    const BYTE_WIDTH: usize = 8;
    const NULL_SENTINEL: Self = 0;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes[..8]);
        Self::from_le_bytes(buf)
    }

    fn pack(values: &[Self], out: &mut Vec<u8>) {
        let byte_len = values.len() * Self::BYTE_WIDTH;
        out.reserve(byte_len);
        #[cfg(target_endian = "little")]
        {
            let bytes =
                unsafe { std::slice::from_raw_parts(values.as_ptr() as *const u8, byte_len) };
            out.extend_from_slice(bytes);
        }
        #[cfg(not(target_endian = "little"))]
        for &v in values {
            v.write_le(out);
        }
    }

    fn unpack(input: &mut &[u8], count: usize) -> Result<Vec<Self>> {
        let byte_len = checked_byte_len(count, Self::BYTE_WIDTH)?;
        let bytes = take(input, byte_len)?;
        let mut values = vec![0i64; count];
        #[cfg(target_endian = "little")]
        {
            let dst = unsafe {
                std::slice::from_raw_parts_mut(values.as_mut_ptr() as *mut u8, byte_len)
            };
            dst.copy_from_slice(bytes);
        }
        #[cfg(not(target_endian = "little"))]
        for (i, chunk) in bytes.chunks_exact(Self::BYTE_WIDTH).enumerate() {
            values[i] = Self::read_le(chunk);
        }
        Ok(values)
    }
}

impl WireInt for i128 {
    const BYTE_WIDTH: usize = 16;
    const NULL_SENTINEL: Self = 0;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(&bytes[..16]);
        Self::from_le_bytes(buf)
    }

    fn pack(values: &[Self], out: &mut Vec<u8>) {
        let byte_len = values.len() * Self::BYTE_WIDTH;
        out.reserve(byte_len);
        #[cfg(target_endian = "little")]
        {
            let bytes =
                unsafe { std::slice::from_raw_parts(values.as_ptr() as *const u8, byte_len) };
            out.extend_from_slice(bytes);
        }
        #[cfg(not(target_endian = "little"))]
        for &v in values {
            v.write_le(out);
        }
    }

    fn unpack(input: &mut &[u8], count: usize) -> Result<Vec<Self>> {
        let byte_len = checked_byte_len(count, Self::BYTE_WIDTH)?;
        let bytes = take(input, byte_len)?;
        let mut values = vec![0i128; count];
        #[cfg(target_endian = "little")]
        {
            let dst = unsafe {
                std::slice::from_raw_parts_mut(values.as_mut_ptr() as *mut u8, byte_len)
            };
            dst.copy_from_slice(bytes);
        }
        #[cfg(not(target_endian = "little"))]
        for (i, chunk) in bytes.chunks_exact(Self::BYTE_WIDTH).enumerate() {
            values[i] = Self::read_le(chunk);
        }
        Ok(values)
    }
}

// I256 goes through the portable per-element paths: its two-word in-memory
// layout is not a stable little-endian byte slab.
impl WireInt for I256 {
    const BYTE_WIDTH: usize = 32;
    const NULL_SENTINEL: Self = I256::ZERO;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 32];
        buf.copy_from_slice(&bytes[..32]);
        Self::from_le_bytes(buf)
    }
}
