use std::{fmt, ops::RangeInclusive};

use bitflags::bitflags;
use java_string::JavaStr;

use crate::{
    attributes::{self, AttributeContext},
    reader::{check_length, read_u16, read_u32},
    AccessFlags, ClassFileError, ClassFileVisitor, ConstantPool, MemberKind, Result,
};

const MAGIC: u32 = 0xCAFEBABE;

/// From JDK 1.0.2 up to and including Java 5.
const SUPPORTED_VERSIONS: RangeInclusive<u16> = 45..=49;

/// `magic`, `minor_version`, `major_version` and `constant_pool_count`.
const PREAMBLE_LENGTH: u64 = 10;

bitflags! {
    /// The parts of a class file [`ClassFile::process`] reports.
    pub struct Sections: u8 {
        const FIELDS = 0b001;
        const METHODS = 0b010;
        const CLASS_ATTRIBUTES = 0b100;
    }
}

/// An indexed class file, borrowing the buffer it was parsed from.
///
/// Parsing checks the structure of the whole class file and records where the constant pool
/// entries, fields, methods and class attributes start, but decodes nothing beyond that.
/// Names are resolved when they are asked for and attributes when they are processed.
pub struct ClassFile<'a> {
    bytes: &'a [u8],
    constant_pool: ConstantPool<'a>,
    minor_version: u16,
    major_version: u16,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces_offset: usize,
    interfaces_count: u16,
    field_offsets: Vec<usize>,
    method_offsets: Vec<usize>,
    attributes_offset: usize,
}

impl<'a> ClassFile<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        check_length(bytes, 0, PREAMBLE_LENGTH)?;

        let magic = read_u32(bytes, 0)?;
        if magic != MAGIC {
            return Err(ClassFileError::BadMagic { actual: magic });
        }

        let minor_version = read_u16(bytes, 4)?;
        let major_version = read_u16(bytes, 6)?;
        if !SUPPORTED_VERSIONS.contains(&major_version) {
            return Err(ClassFileError::BadVersion {
                major: major_version,
                minor: minor_version,
            });
        }

        let constant_pool = ConstantPool::build(bytes)?;

        let header = constant_pool.class_header_offset();
        let access_flags = read_u16(bytes, header)?;
        let this_class = read_u16(bytes, header + 2)?;
        let super_class = read_u16(bytes, header + 4)?;
        let interfaces_count = read_u16(bytes, header + 6)?;
        let interfaces_offset = header + 8;
        check_length(bytes, interfaces_offset, 2 * interfaces_count as u64)?;

        let cursor = interfaces_offset + 2 * interfaces_count as usize;
        let (field_offsets, cursor) = members(bytes, cursor)?;
        let (method_offsets, cursor) = members(bytes, cursor)?;
        let attributes_offset = cursor;

        let consumed = attributes::skip(bytes, attributes_offset)?;
        if consumed != bytes.len() {
            return Err(ClassFileError::TrailingBytes {
                consumed,
                length: bytes.len(),
            });
        }

        log::debug!(
            "parsed class file version {}.{}: {} constants, {} fields, {} methods",
            major_version,
            minor_version,
            constant_pool.constant_count(),
            field_offsets.len(),
            method_offsets.len()
        );

        Ok(Self {
            bytes,
            constant_pool,
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces_offset,
            interfaces_count,
            field_offsets,
            method_offsets,
            attributes_offset,
        })
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn constant_pool(&self) -> &ConstantPool<'a> {
        &self.constant_pool
    }

    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    pub fn access_flags(&self) -> u16 {
        self.access_flags
    }

    /// The access flags as a set. Bits without a meaning are dropped.
    pub fn access(&self) -> AccessFlags {
        AccessFlags::from_bits_truncate(self.access_flags)
    }

    pub fn class_name(&self) -> Result<&JavaStr> {
        self.constant_pool.class_name(self.this_class)
    }

    /// The name of the direct superclass, `None` for `java/lang/Object`.
    pub fn super_class_name(&self) -> Result<Option<&JavaStr>> {
        // If the value of the super_class item is zero, then this class file must represent
        // the class Object, the only class or interface without a direct superclass.
        match self.super_class {
            0 => Ok(None),
            index => self.constant_pool.class_name(index).map(Some),
        }
    }

    pub fn interfaces_count(&self) -> usize {
        self.interfaces_count as usize
    }

    /// The names of the direct superinterfaces, in the order they were declared.
    pub fn interfaces(&self) -> Result<Vec<&JavaStr>> {
        (0..self.interfaces_count as usize)
            .map(|i| {
                let index = read_u16(self.bytes, self.interfaces_offset + 2 * i)?;
                self.constant_pool.class_name(index)
            })
            .collect()
    }

    pub fn fields_count(&self) -> usize {
        self.field_offsets.len()
    }

    pub fn methods_count(&self) -> usize {
        self.method_offsets.len()
    }

    /// The offsets of the `field_info` structures.
    pub fn field_offsets(&self) -> &[usize] {
        &self.field_offsets
    }

    /// The offsets of the `method_info` structures.
    pub fn method_offsets(&self) -> &[usize] {
        &self.method_offsets
    }

    /// The offset of the `attributes_count` of the class.
    pub fn attributes_offset(&self) -> usize {
        self.attributes_offset
    }

    pub fn field_access(&self, index: usize) -> Result<u16> {
        read_u16(self.bytes, self.member(MemberKind::Field, index)?)
    }

    pub fn field_name(&self, index: usize) -> Result<&JavaStr> {
        self.member_utf(MemberKind::Field, index, 2)
    }

    pub fn field_descriptor(&self, index: usize) -> Result<&JavaStr> {
        self.member_utf(MemberKind::Field, index, 4)
    }

    pub fn method_access(&self, index: usize) -> Result<u16> {
        read_u16(self.bytes, self.member(MemberKind::Method, index)?)
    }

    pub fn method_name(&self, index: usize) -> Result<&JavaStr> {
        self.member_utf(MemberKind::Method, index, 2)
    }

    pub fn method_descriptor(&self, index: usize) -> Result<&JavaStr> {
        self.member_utf(MemberKind::Method, index, 4)
    }

    /// Reports the selected sections to `visitor`: every field with its attributes, then
    /// every method with its attributes, then the attributes of the class.
    pub fn process<V: ClassFileVisitor + ?Sized>(
        &self,
        visitor: &mut V,
        sections: Sections,
    ) -> Result<()> {
        if sections.contains(Sections::FIELDS) {
            for &offset in &self.field_offsets {
                let (name, descriptor, access) = self.member_header(offset)?;
                visitor.on_field(name, descriptor, access)?;
                self.walk(AttributeContext::Field, offset + 6, visitor)?;
            }
        }

        if sections.contains(Sections::METHODS) {
            for &offset in &self.method_offsets {
                let (name, descriptor, access) = self.member_header(offset)?;
                visitor.on_method(name, descriptor, access)?;
                self.walk(AttributeContext::Method, offset + 6, visitor)?;
            }
        }

        if sections.contains(Sections::CLASS_ATTRIBUTES) {
            self.walk(AttributeContext::Class, self.attributes_offset, visitor)?;
        }

        Ok(())
    }

    fn walk<V: ClassFileVisitor + ?Sized>(
        &self,
        context: AttributeContext,
        offset: usize,
        visitor: &mut V,
    ) -> Result<()> {
        attributes::walk(context, self.bytes, offset, &self.constant_pool, visitor)?;
        Ok(())
    }

    fn member(&self, kind: MemberKind, index: usize) -> Result<usize> {
        let offsets = match kind {
            MemberKind::Field => &self.field_offsets,
            MemberKind::Method => &self.method_offsets,
        };
        offsets
            .get(index)
            .copied()
            .ok_or(ClassFileError::BadMemberIndex {
                kind,
                given: index,
                count: offsets.len(),
            })
    }

    fn member_utf(&self, kind: MemberKind, index: usize, field: usize) -> Result<&JavaStr> {
        let offset = self.member(kind, index)?;
        self.constant_pool.utf(read_u16(self.bytes, offset + field)?)
    }

    fn member_header(&self, offset: usize) -> Result<(&JavaStr, &JavaStr, u16)> {
        let access = read_u16(self.bytes, offset)?;
        let name = self.constant_pool.utf(read_u16(self.bytes, offset + 2)?)?;
        let descriptor = self.constant_pool.utf(read_u16(self.bytes, offset + 4)?)?;
        Ok((name, descriptor, access))
    }
}

/// Records the offset of each `field_info` or `method_info` in the table at `offset` and
/// returns them with the offset just after the table.
fn members(bytes: &[u8], offset: usize) -> Result<(Vec<usize>, usize)> {
    let count = read_u16(bytes, offset)?;
    let mut offsets = Vec::with_capacity(count as usize);
    let mut cursor = offset + 2;
    for _ in 0..count {
        offsets.push(cursor);
        // access_flags, name_index and descriptor_index
        check_length(bytes, cursor, 6)?;
        cursor = attributes::skip(bytes, cursor + 6)?;
    }
    Ok((offsets, cursor))
}

impl fmt::Debug for ClassFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassFile")
            .field("version", &(self.major_version, self.minor_version))
            .field("constant_pool", &self.constant_pool)
            .field("access_flags", &self.access())
            .field("interfaces_count", &self.interfaces_count)
            .field("fields_count", &self.fields_count())
            .field("methods_count", &self.methods_count())
            .field("length", &self.bytes.len())
            .finish()
    }
}
