//! Annotations and their element values.
//!
//! ```text
//! annotation {
//!     u2 type_index;
//!     u2 num_element_value_pairs;
//!     {   u2            element_name_index;
//!         element_value value;
//!     } element_value_pairs[num_element_value_pairs];
//! }
//! ```
//!
//! Both functions return the offset just after the bytes they consumed, so a caller can chain
//! them over a list. Nested annotations and arrays count towards [`MAX_NESTING`].

use std::borrow::Cow;

use java_string::JavaStr;

use crate::{
    reader::{read_u16, read_u8},
    AnnotationValue, ArrayValue, ClassFileError, ClassFileVisitor, ConstantPool, Result,
};

/// How deeply annotations and arrays may nest inside one element value.
pub const MAX_NESTING: usize = 256;

/// Decodes the annotation at `offset`.
pub fn annotation<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<usize> {
    Decoder { bytes, pool, visitor }.annotation(offset, 0)
}

/// Decodes the element value whose tag is at `offset`.
pub fn element_value<V: ClassFileVisitor + ?Sized>(
    name: Option<&JavaStr>,
    bytes: &[u8],
    offset: usize,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<usize> {
    Decoder { bytes, pool, visitor }.element_value(name, offset, 0)
}

struct Decoder<'b, 'p, 'c, V: ?Sized> {
    bytes: &'b [u8],
    pool: &'p ConstantPool<'c>,
    visitor: &'b mut V,
}

impl<V: ClassFileVisitor + ?Sized> Decoder<'_, '_, '_, V> {
    fn annotation(&mut self, offset: usize, depth: usize) -> Result<usize> {
        let (bytes, pool) = (self.bytes, self.pool);
        let type_name = pool.utf(read_u16(bytes, offset)?)?;
        let pair_count = read_u16(bytes, offset + 2)?;
        self.visitor.on_annotation_start(type_name)?;

        let mut cursor = offset + 4;
        for _ in 0..pair_count {
            let name = pool.utf(read_u16(bytes, cursor)?)?;
            cursor = self.element_value(Some(name), cursor + 2, depth)?;
        }

        self.visitor.on_annotation_end()?;
        Ok(cursor)
    }

    fn element_value(
        &mut self,
        name: Option<&JavaStr>,
        offset: usize,
        depth: usize,
    ) -> Result<usize> {
        let (bytes, pool) = (self.bytes, self.pool);
        match read_u8(bytes, offset)? {
            b'e' => {
                let type_name = pool.utf(read_u16(bytes, offset + 1)?)?;
                let constant = pool.utf(read_u16(bytes, offset + 3)?)?;
                self.visitor.on_annotation_enum(name, type_name, constant)?;
                Ok(offset + 5)
            }
            b'@' => {
                let depth = nested(depth, offset)?;
                self.visitor.on_annotation_nested_start(name)?;
                let cursor = self.annotation(offset + 1, depth)?;
                self.visitor.on_annotation_nested_end()?;
                Ok(cursor)
            }
            b'[' => self.array(name, offset, nested(depth, offset)?),
            tag => {
                let value = constant(tag, bytes, offset, pool)?;
                self.visitor.on_annotation_value(name, value)?;
                Ok(offset + 3)
            }
        }
    }

    /// Arrays of constants are collected into a single [`ArrayValue`], arrays of anything else
    /// are reported element by element between `on_array_start` and `on_array_end`.
    fn array(&mut self, name: Option<&JavaStr>, offset: usize, depth: usize) -> Result<usize> {
        let bytes = self.bytes;
        let size = read_u16(bytes, offset + 1)?;
        let mut cursor = offset + 3;

        if size == 0 {
            self.visitor.on_array_start(name, 0)?;
            self.visitor.on_array_end()?;
            return Ok(cursor);
        }

        match read_u8(bytes, cursor)? {
            element_tag @ (b'@' | b'e' | b'[') => {
                self.visitor.on_array_start(name, size)?;
                for _ in 0..size {
                    check_tag(element_tag, bytes, cursor)?;
                    cursor = self.element_value(None, cursor, depth)?;
                }
                self.visitor.on_array_end()?;
                Ok(cursor)
            }
            element_tag => {
                let value = constants(element_tag, size, bytes, cursor, self.pool)?;
                self.visitor.on_annotation_value(name, AnnotationValue::Array(value))?;
                Ok(cursor + 3 * size as usize)
            }
        }
    }
}

fn nested(depth: usize, offset: usize) -> Result<usize> {
    if depth >= MAX_NESTING {
        return Err(ClassFileError::NestingTooDeep {
            limit: MAX_NESTING,
            offset,
        });
    }
    Ok(depth + 1)
}

/// Resolves a `const_value_index` or `class_info_index` element value.
fn constant<'p>(
    tag: u8,
    bytes: &[u8],
    offset: usize,
    pool: &'p ConstantPool<'_>,
) -> Result<AnnotationValue<'p>> {
    let index = || read_u16(bytes, offset + 1);
    Ok(match tag {
        b'B' => AnnotationValue::Byte(pool.integer(index()?)? as i8),
        b'C' => AnnotationValue::Char(pool.integer(index()?)? as u16),
        b'D' => AnnotationValue::Double(pool.double(index()?)?),
        b'F' => AnnotationValue::Float(pool.float(index()?)?),
        b'I' => AnnotationValue::Int(pool.integer(index()?)?),
        b'J' => AnnotationValue::Long(pool.long(index()?)?),
        b'S' => AnnotationValue::Short(pool.integer(index()?)? as i16),
        b'Z' => AnnotationValue::Boolean(pool.integer(index()?)? != 0),
        b's' | b'c' => AnnotationValue::String(Cow::Borrowed(pool.utf(index()?)?)),
        _ => return Err(ClassFileError::UnknownValueTag { tag, offset }),
    })
}

fn constants<'p>(
    tag: u8,
    size: u16,
    bytes: &[u8],
    offset: usize,
    pool: &'p ConstantPool<'_>,
) -> Result<ArrayValue<'p>> {
    let elements = ConstantElements {
        tag,
        size,
        bytes,
        offset,
    };
    Ok(match tag {
        b'B' => ArrayValue::Byte(elements.read(|i| Ok(pool.integer(i)? as i8))?),
        b'C' => ArrayValue::Char(elements.read(|i| Ok(pool.integer(i)? as u16))?),
        b'D' => ArrayValue::Double(elements.read(|i| pool.double(i))?),
        b'F' => ArrayValue::Float(elements.read(|i| pool.float(i))?),
        b'I' => ArrayValue::Int(elements.read(|i| pool.integer(i))?),
        b'J' => ArrayValue::Long(elements.read(|i| pool.long(i))?),
        b'S' => ArrayValue::Short(elements.read(|i| Ok(pool.integer(i)? as i16))?),
        b'Z' => ArrayValue::Boolean(elements.read(|i| Ok(pool.integer(i)? != 0))?),
        b's' | b'c' => ArrayValue::String(elements.read(|i| pool.utf(i).map(Cow::Borrowed))?),
        _ => return Err(ClassFileError::UnknownValueTag { tag, offset }),
    })
}

/// The elements of an array of constants, each a tag followed by a pool index.
struct ConstantElements<'b> {
    tag: u8,
    size: u16,
    bytes: &'b [u8],
    offset: usize,
}

impl ConstantElements<'_> {
    fn read<T>(&self, mut resolve: impl FnMut(u16) -> Result<T>) -> Result<Vec<T>> {
        let mut values = Vec::with_capacity(self.size as usize);
        let mut cursor = self.offset;
        for _ in 0..self.size {
            check_tag(self.tag, self.bytes, cursor)?;
            values.push(resolve(read_u16(self.bytes, cursor + 1)?)?);
            cursor += 3;
        }
        Ok(values)
    }
}

fn check_tag(expected: u8, bytes: &[u8], offset: usize) -> Result<()> {
    match read_u8(bytes, offset)? {
        actual if actual == expected => Ok(()),
        actual => Err(ClassFileError::BadArrayTag {
            expected,
            actual,
            offset,
        }),
    }
}
