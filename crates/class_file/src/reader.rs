//! Big-endian primitive reads against a borrowed class file buffer.
//!
//! Every read takes the buffer and an absolute offset and checks its bounds first, so a
//! malformed class file surfaces as [`ClassFileError::Truncated`] instead of a panic.

use byteorder::{BigEndian, ByteOrder};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Fails with [`ClassFileError::Truncated`] unless `required` bytes are available at `offset`.
#[inline]
pub fn check_length(bytes: &[u8], offset: usize, required: u64) -> Result<()> {
    match (offset as u64).checked_add(required) {
        Some(end) if end <= bytes.len() as u64 => Ok(()),
        _ => Err(truncated(bytes, offset, required)),
    }
}

#[cold]
#[inline(never)]
fn truncated(bytes: &[u8], offset: usize, required: u64) -> ClassFileError {
    ClassFileError::Truncated {
        offset,
        required,
        length: bytes.len(),
    }
}

#[inline]
fn window(bytes: &[u8], offset: usize, size: usize) -> Result<&[u8]> {
    check_length(bytes, offset, size as u64)?;
    Ok(&bytes[offset..offset + size])
}

#[inline]
pub fn read_u8(bytes: &[u8], offset: usize) -> Result<u8> {
    Ok(window(bytes, offset, 1)?[0])
}

#[inline]
pub fn read_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    Ok(Endian::read_u16(window(bytes, offset, 2)?))
}

#[inline]
pub fn read_i32(bytes: &[u8], offset: usize) -> Result<i32> {
    Ok(Endian::read_i32(window(bytes, offset, 4)?))
}

#[inline]
pub fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    Ok(Endian::read_u32(window(bytes, offset, 4)?))
}

#[inline]
pub fn read_i64(bytes: &[u8], offset: usize) -> Result<i64> {
    Ok(Endian::read_i64(window(bytes, offset, 8)?))
}

#[inline]
pub fn read_f32(bytes: &[u8], offset: usize) -> Result<f32> {
    Ok(Endian::read_f32(window(bytes, offset, 4)?))
}

#[inline]
pub fn read_f64(bytes: &[u8], offset: usize) -> Result<f64> {
    Ok(Endian::read_f64(window(bytes, offset, 8)?))
}

/// Returns the `length` bytes starting at `offset`.
pub fn read_bytes(bytes: &[u8], offset: usize, length: u32) -> Result<&[u8]> {
    check_length(bytes, offset, length as u64)?;
    Ok(&bytes[offset..offset + length as usize])
}

/// Narrows `bytes` so that it ends where the payload at `offset` of `length` bytes ends.
///
/// Offsets into the returned slice stay absolute.
pub(crate) fn payload(bytes: &[u8], offset: usize, length: u32) -> Result<&[u8]> {
    check_length(bytes, offset, length as u64)?;
    Ok(&bytes[..offset + length as usize])
}


#[cfg(test)]
mod check_length_tests {
    use super::*;

    #[test]
    fn it_should_accept_a_read_ending_at_the_end_of_the_data() {
        assert!(check_length(&[0u8; 10], 0, 10).is_ok());
        assert!(check_length(&[0u8; 10], 10, 0).is_ok());
    }

    #[test]
    fn it_should_reject_a_read_past_the_end_of_the_data() {
        assert!(matches!(
            check_length(&[0u8; 10], 0, 11),
            Err(ClassFileError::Truncated {
                offset: 0,
                required: 11,
                length: 10
            })
        ));
    }

    #[test]
    fn it_should_not_overflow_on_huge_lengths() {
        assert!(check_length(&[0u8; 10], usize::MAX, u32::MAX as u64).is_err());
    }

    #[test]
    fn it_should_narrow_a_payload_without_shifting_offsets() {
        let data = [0, 1, 2, 3, 4, 5];
        let narrowed = payload(&data, 2, 3).unwrap();

        assert_eq!(&[0, 1, 2, 3, 4], narrowed);
        assert!(read_u16(narrowed, 4).is_err());
    }
}
