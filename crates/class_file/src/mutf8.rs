//! Decoding of the modified UTF-8 used for strings in class files.
//!
//! The format differs from standard UTF-8 in two ways: the NUL character is written with the
//! two byte form, and characters outside the basic multilingual plane are written as two three
//! byte sequences, one per UTF-16 surrogate. The decoded strings are [`JavaStr`]s, so unpaired
//! surrogates survive decoding.
//!
//! See <https://docs.oracle.com/javase/specs/jvms/se22/html/jvms-4.html#jvms-4.4.7>.

use std::borrow::Cow;

use java_string::{JavaCodePoint, JavaStr, JavaString};

use crate::{reader, ClassFileError, Result};

/// Decodes `count` bytes of modified UTF-8 starting at `offset`.
///
/// Pure ASCII input is borrowed from `bytes`, anything else is decoded into an owned string.
pub fn decode(bytes: &[u8], offset: usize, count: u32) -> Result<Cow<'_, JavaStr>> {
    let data = reader::read_bytes(bytes, offset, count)?;

    if data.iter().all(|&b| b != 0 && b < 0x80) {
        let ascii = std::str::from_utf8(data).map_err(|_| invalid(offset))?;
        return Ok(Cow::Borrowed(JavaStr::from_str(ascii)));
    }

    let mut string = JavaString::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let start = i;
        let x = data[i];
        let unit = if x & 0x80 == 0 {
            if x == 0 {
                return Err(invalid(offset + start));
            }
            i += 1;
            x as u32
        } else if x & 0xe0 == 0xc0 {
            let y = continuation(data, i + 1).ok_or_else(|| invalid(offset + start))?;
            i += 2;
            (x as u32 & 0x1f) << 6 | y
        } else if x & 0xf0 == 0xe0 {
            let y = continuation(data, i + 1).ok_or_else(|| invalid(offset + start))?;
            let z = continuation(data, i + 2).ok_or_else(|| invalid(offset + start))?;
            i += 3;
            (x as u32 & 0x0f) << 12 | y << 6 | z
        } else {
            return Err(invalid(offset + start));
        };

        let code_unit = JavaCodePoint::from_u32(unit).ok_or_else(|| invalid(offset + start))?;
        string.push_java(code_unit);
    }

    Ok(Cow::Owned(string))
}

/// The low six bits of the byte at `index`, if it is a `10xxxxxx` continuation byte.
fn continuation(data: &[u8], index: usize) -> Option<u32> {
    data.get(index)
        .filter(|&&b| b & 0xc0 == 0x80)
        .map(|&b| (b & 0x3f) as u32)
}

fn invalid(offset: usize) -> ClassFileError {
    ClassFileError::InvalidUtf8 { offset }
}
