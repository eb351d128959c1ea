//! Fixed-width little-endian field codec
//!
//! Every record in this crate is laid out with these helpers. Fields are never
//! self-describing: the caller passes the offset from the record layout and the
//! helper either touches exactly `width` bytes or fails with
//! [`Error::BufferTooSmall`].

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::ops::Range;

/// Largest value representable in a 24-bit field
pub const U24_MAX: u32 = 0x00FF_FFFF;

#[inline]
fn span(len: usize, offset: usize, width: usize) -> Result<Range<usize>> {
    match offset.checked_add(width) {
        Some(end) if end <= len => Ok(offset..end),
        _ => Err(Error::buffer_too_small(offset, width, len)),
    }
}

/// Read a byte
pub fn get_u8(buf: &[u8], offset: usize) -> Result<u8> {
    let range = span(buf.len(), offset, 1)?;
    Ok(buf[range.start])
}

/// Write a byte
pub fn put_u8(buf: &mut [u8], offset: usize, value: u8) -> Result<()> {
    let range = span(buf.len(), offset, 1)?;
    buf[range.start] = value;
    Ok(())
}

/// Read a 24-bit little-endian integer
pub fn get_u24(buf: &[u8], offset: usize) -> Result<u32> {
    let range = span(buf.len(), offset, 3)?;
    Ok(LittleEndian::read_u24(&buf[range]))
}

/// Write a 24-bit little-endian integer
///
/// Values above [`U24_MAX`] are refused rather than truncated.
pub fn put_u24(buf: &mut [u8], offset: usize, value: u32) -> Result<()> {
    if value > U24_MAX {
        return Err(Error::invalid_field(
            "u24",
            format!("{:#x} does not fit in 24 bits", value),
        ));
    }
    let range = span(buf.len(), offset, 3)?;
    LittleEndian::write_u24(&mut buf[range], value);
    Ok(())
}

/// Read a 32-bit little-endian integer
pub fn get_u32(buf: &[u8], offset: usize) -> Result<u32> {
    let range = span(buf.len(), offset, 4)?;
    Ok(LittleEndian::read_u32(&buf[range]))
}

/// Write a 32-bit little-endian integer
pub fn put_u32(buf: &mut [u8], offset: usize, value: u32) -> Result<()> {
    let range = span(buf.len(), offset, 4)?;
    LittleEndian::write_u32(&mut buf[range], value);
    Ok(())
}

/// Read a 64-bit little-endian integer
pub fn get_u64(buf: &[u8], offset: usize) -> Result<u64> {
    let range = span(buf.len(), offset, 8)?;
    Ok(LittleEndian::read_u64(&buf[range]))
}

/// Write a 64-bit little-endian integer
pub fn put_u64(buf: &mut [u8], offset: usize, value: u64) -> Result<()> {
    let range = span(buf.len(), offset, 8)?;
    LittleEndian::write_u64(&mut buf[range], value);
    Ok(())
}

/// Read a fixed-size byte array
pub fn get_bytes<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    let range = span(buf.len(), offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[range]);
    Ok(out)
}

/// Write a byte slice verbatim
pub fn put_bytes(buf: &mut [u8], offset: usize, value: &[u8]) -> Result<()> {
    let range = span(buf.len(), offset, value.len())?;
    buf[range].copy_from_slice(value);
    Ok(())
}

/// Read `N` consecutive 32-bit little-endian words
pub fn get_u32_words<const N: usize>(buf: &[u8], offset: usize) -> Result<[u32; N]> {
    let range = span(buf.len(), offset, N * 4)?;
    let mut out = [0u32; N];
    LittleEndian::read_u32_into(&buf[range], &mut out);
    Ok(out)
}

/// Write consecutive 32-bit little-endian words
pub fn put_u32_words(buf: &mut [u8], offset: usize, words: &[u32]) -> Result<()> {
    let range = span(buf.len(), offset, words.len() * 4)?;
    LittleEndian::write_u32_into(words, &mut buf[range]);
    Ok(())
}

/// Read `N` consecutive 64-bit little-endian words
pub fn get_u64_words<const N: usize>(buf: &[u8], offset: usize) -> Result<[u64; N]> {
    let range = span(buf.len(), offset, N * 8)?;
    let mut out = [0u64; N];
    LittleEndian::read_u64_into(&buf[range], &mut out);
    Ok(out)
}

/// Write consecutive 64-bit little-endian words
pub fn put_u64_words(buf: &mut [u8], offset: usize, words: &[u64]) -> Result<()> {
    let range = span(buf.len(), offset, words.len() * 8)?;
    LittleEndian::write_u64_into(words, &mut buf[range]);
    Ok(())
}

/// Check that a buffer has exactly the size of a fixed record
pub fn expect_len(record: &'static str, buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() != expected {
        return Err(Error::size_mismatch(record, expected, buf.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_u32_little_endian() {
        let mut buf = [0u8; 8];
        put_u32(&mut buf, 2, 0xDEADBEEF).unwrap();
        assert_eq!(buf, [0, 0, 0xEF, 0xBE, 0xAD, 0xDE, 0, 0]);
        assert_eq!(get_u32(&buf, 2).unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn test_u24() {
        let mut buf = [0xAAu8; 4];
        put_u24(&mut buf, 1, 0x123456).unwrap();
        assert_eq!(buf, [0xAA, 0x56, 0x34, 0x12]);
        assert_eq!(get_u24(&buf, 1).unwrap(), 0x123456);

        let err = put_u24(&mut buf, 0, U24_MAX + 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidField);
        // Refused values leave the buffer untouched
        assert_eq!(buf, [0xAA, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn test_u64_and_words() {
        let mut buf = [0u8; 24];
        put_u64(&mut buf, 0, 0x0102030405060708).unwrap();
        assert_eq!(&buf[..8], &[8, 7, 6, 5, 4, 3, 2, 1]);

        put_u32_words(&mut buf, 8, &[1, 2, 3, 4]).unwrap();
        assert_eq!(get_u32_words::<4>(&buf, 8).unwrap(), [1, 2, 3, 4]);
        assert_eq!(get_u64_words::<1>(&buf, 0).unwrap(), [0x0102030405060708]);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buf = [0u8; 6];
        let err = get_u32(&buf, 3).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                offset: 3,
                width: 4,
                len: 6
            }
        ));
        assert!(put_u64(&mut buf, 0, 1).is_err());
        assert!(get_bytes::<7>(&buf, 0).is_err());
        assert!(get_u8(&buf, 6).is_err());
        assert!(get_u32(&buf, usize::MAX).is_err());
        // Failed writes do not touch the buffer
        assert_eq!(buf, [0u8; 6]);
    }

    #[test]
    fn test_expect_len() {
        assert!(expect_len("find", &[0u8; 16], 16).is_ok());
        let err = expect_len("find", &[0u8; 17], 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeMismatch);
    }
}
