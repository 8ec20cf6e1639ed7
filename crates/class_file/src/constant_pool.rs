use std::{borrow::Cow, fmt};

use java_string::JavaStr;
#[cfg(feature = "sync")]
use once_cell::sync::OnceCell;
#[cfg(not(feature = "sync"))]
use once_cell::unsync::OnceCell;

use crate::{
    mutf8,
    reader::{check_length, read_f32, read_f64, read_i32, read_i64, read_u16, read_u8},
    ClassFileError, Result,
};

/// Offset of the `constant_pool_count` item.
const COUNT_OFFSET: usize = 8;
/// Offset of the first `cp_info` structure.
const FIRST_ENTRY_OFFSET: usize = 10;

/// The tags of the `cp_info` structures known to class files up to version 49.
pub mod tag {
    /// Reported for the slot following a `Long` or `Double` entry, which holds no entry.
    pub const UNUSABLE: u8 = 0;
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELD_REF: u8 = 9;
    pub const METHOD_REF: u8 = 10;
    pub const INTERFACE_METHOD_REF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
}

/// A random access view of the constant pool of a class file.
///
/// The pool only records where each entry starts; entries are decoded from the underlying
/// buffer when they are asked for. Decoded strings are cached per index, so repeated lookups
/// return the same string without decoding it again.
pub struct ConstantPool<'a> {
    bytes: &'a [u8],
    /// `offsets[0]` is the offset of the class header following the pool, `offsets[i]` the
    /// offset of the tag of entry `i`.
    offsets: Vec<usize>,
    strings: Vec<OnceCell<Cow<'a, JavaStr>>>,
}

impl<'a> ConstantPool<'a> {
    /// Indexes the constant pool of the class file in `bytes`.
    pub fn build(bytes: &'a [u8]) -> Result<Self> {
        let count = read_u16(bytes, COUNT_OFFSET)? as usize;
        let mut offsets = vec![0; count.max(1)];

        let mut cursor = FIRST_ENTRY_OFFSET;
        let mut index = 1;
        while index < count {
            offsets[index] = cursor;

            let tag = read_u8(bytes, cursor)?;
            let size = match tag {
                tag::UTF8 => 3 + read_u16(bytes, cursor + 1)? as usize,
                tag::INTEGER
                | tag::FLOAT
                | tag::FIELD_REF
                | tag::METHOD_REF
                | tag::INTERFACE_METHOD_REF
                | tag::NAME_AND_TYPE => 5,
                tag::LONG | tag::DOUBLE => 9,
                tag::CLASS | tag::STRING => 3,
                _ => return Err(ClassFileError::BadConstantTag { tag, offset: cursor }),
            };
            check_length(bytes, cursor, size as u64)?;

            // Longs and doubles take up two entries; the second one repeats the offset of the
            // first so that it can be recognised as unusable.
            if tag == tag::LONG || tag == tag::DOUBLE {
                index += 1;
                if index < count {
                    offsets[index] = cursor;
                }
            }

            cursor += size;
            index += 1;
        }
        offsets[0] = cursor;

        log::trace!(
            "indexed {} constant pool entries ending at offset {}",
            count.saturating_sub(1),
            cursor
        );

        let strings = std::iter::repeat_with(OnceCell::new)
            .take(offsets.len())
            .collect();

        Ok(Self {
            bytes,
            offsets,
            strings,
        })
    }

    /// The buffer the pool was built from.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The number of slots in the pool, which is one less than `constant_pool_count`.
    pub fn constant_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// The offset of the class header, immediately after the last pool entry.
    pub fn class_header_offset(&self) -> usize {
        self.offsets[0]
    }

    /// The offset of the tag of entry `index`.
    pub fn entry_offset(&self, index: u16) -> Result<usize> {
        Ok(self.offsets[self.check_range(index)?])
    }

    /// The tag of entry `index`, [`tag::UNUSABLE`] for the slot after a long or double.
    pub fn entry_type(&self, index: u16) -> Result<u8> {
        self.tag_at(index).map(|(tag, _)| tag)
    }

    pub fn utf(&self, index: u16) -> Result<&JavaStr> {
        self.utf_entry(index).map(|s| &**s)
    }

    /// The internal name of the class entry `index`.
    pub fn class_name(&self, index: u16) -> Result<&JavaStr> {
        let offset = self.expect(index, tag::CLASS, "Class")?;
        self.cached(index, || {
            let name_index = read_u16(self.bytes, offset + 1)?;
            self.utf_entry(name_index).map(Cow::clone)
        })
    }

    /// The value of the string entry `index`.
    pub fn string(&self, index: u16) -> Result<&JavaStr> {
        let offset = self.expect(index, tag::STRING, "String")?;
        self.cached(index, || {
            let string_index = read_u16(self.bytes, offset + 1)?;
            self.utf_entry(string_index).map(Cow::clone)
        })
    }

    pub fn integer(&self, index: u16) -> Result<i32> {
        let offset = self.expect(index, tag::INTEGER, "Integer")?;
        read_i32(self.bytes, offset + 1)
    }

    pub fn float(&self, index: u16) -> Result<f32> {
        let offset = self.expect(index, tag::FLOAT, "Float")?;
        read_f32(self.bytes, offset + 1)
    }

    pub fn long(&self, index: u16) -> Result<i64> {
        let offset = self.expect(index, tag::LONG, "Long")?;
        read_i64(self.bytes, offset + 1)
    }

    pub fn double(&self, index: u16) -> Result<f64> {
        let offset = self.expect(index, tag::DOUBLE, "Double")?;
        read_f64(self.bytes, offset + 1)
    }

    pub fn name_of_name_and_type(&self, index: u16) -> Result<&JavaStr> {
        let offset = self.expect(index, tag::NAME_AND_TYPE, "NameAndType")?;
        self.utf(read_u16(self.bytes, offset + 1)?)
    }

    pub fn type_of_name_and_type(&self, index: u16) -> Result<&JavaStr> {
        let offset = self.expect(index, tag::NAME_AND_TYPE, "NameAndType")?;
        self.utf(read_u16(self.bytes, offset + 3)?)
    }

    /// The class a field, method or interface method reference belongs to.
    pub fn class_of_ref(&self, index: u16) -> Result<&JavaStr> {
        let offset = self.expect_ref(index)?;
        self.class_name(read_u16(self.bytes, offset + 1)?)
    }

    pub fn name_of_ref(&self, index: u16) -> Result<&JavaStr> {
        let offset = self.expect_ref(index)?;
        self.name_of_name_and_type(read_u16(self.bytes, offset + 3)?)
    }

    pub fn type_of_ref(&self, index: u16) -> Result<&JavaStr> {
        let offset = self.expect_ref(index)?;
        self.type_of_name_and_type(read_u16(self.bytes, offset + 3)?)
    }

    fn utf_entry(&self, index: u16) -> Result<&Cow<'a, JavaStr>> {
        let offset = self.expect(index, tag::UTF8, "Utf8")?;
        self.strings[index as usize].get_or_try_init(|| {
            let length = read_u16(self.bytes, offset + 1)?;
            mutf8::decode(self.bytes, offset + 3, length as u32)
        })
    }

    /// Resolves the string of entry `index` once. The tag of the entry must already be checked.
    fn cached(
        &self,
        index: u16,
        resolve: impl FnOnce() -> Result<Cow<'a, JavaStr>>,
    ) -> Result<&JavaStr> {
        self.strings[index as usize]
            .get_or_try_init(resolve)
            .map(|s| &**s)
    }

    fn check_range(&self, index: u16) -> Result<usize> {
        let i = index as usize;
        if i < 1 || i >= self.offsets.len() {
            return Err(ClassFileError::IndexOutOfRange {
                index,
                bound: self.offsets.len(),
            });
        }
        Ok(i)
    }

    fn tag_at(&self, index: u16) -> Result<(u8, usize)> {
        let i = self.check_range(index)?;
        let offset = self.offsets[i];
        if i > 1 && self.offsets[i - 1] == offset {
            return Ok((tag::UNUSABLE, offset));
        }
        Ok((read_u8(self.bytes, offset)?, offset))
    }

    fn expect(&self, index: u16, expected_tag: u8, expected: &'static str) -> Result<usize> {
        match self.tag_at(index)? {
            (tag, offset) if tag == expected_tag => Ok(offset),
            (actual, offset) => Err(ClassFileError::UnexpectedTag {
                expected,
                actual,
                offset,
            }),
        }
    }

    fn expect_ref(&self, index: u16) -> Result<usize> {
        match self.tag_at(index)? {
            (tag::FIELD_REF | tag::METHOD_REF | tag::INTERFACE_METHOD_REF, offset) => Ok(offset),
            (actual, offset) => Err(ClassFileError::UnexpectedTag {
                expected: "Fieldref, Methodref or InterfaceMethodref",
                actual,
                offset,
            }),
        }
    }
}

impl fmt::Debug for ConstantPool<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantPool")
            .field("constant_count", &self.constant_count())
            .field("class_header_offset", &self.class_header_offset())
            .finish()
    }
}
