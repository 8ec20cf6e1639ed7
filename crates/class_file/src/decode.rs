//! Decoders for the attributes defined up to class file version 49.
//!
//! Every decoder takes the buffer, the offset and length of an attribute payload as handed to
//! [`ClassFileVisitor::on_attribute`], the constant pool, and the visitor to report to. None of
//! them read past the end of the payload.

use std::borrow::Cow;

use java_string::JavaStr;

use crate::{
    annotations,
    attributes::{self, names, AttributeContext},
    constant_pool::tag,
    mutf8,
    reader::{check_length, payload, read_u16, read_u32, read_u8},
    ClassFileError, ClassFileVisitor, ConstantPool, ConstantValue, Result,
};

/// `ConstantValue`, attached to fields.
pub fn constant_value<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    length: u32,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let bytes = payload(bytes, offset, length)?;
    let index = read_u16(bytes, offset)?;
    let value = match pool.entry_type(index)? {
        tag::INTEGER => ConstantValue::Int(pool.integer(index)?),
        tag::LONG => ConstantValue::Long(pool.long(index)?),
        tag::FLOAT => ConstantValue::Float(pool.float(index)?),
        tag::DOUBLE => ConstantValue::Double(pool.double(index)?),
        tag::STRING => ConstantValue::String(Cow::Borrowed(pool.string(index)?)),
        tag => return Err(ClassFileError::BadConstantValueRef { tag, offset }),
    };
    visitor.on_constant_value(value)
}

/// `Exceptions`, the checked exceptions a method declares.
pub fn exceptions<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    length: u32,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let bytes = payload(bytes, offset, length)?;
    let count = read_u16(bytes, offset)?;
    let names = (0..count as usize)
        .map(|i| pool.class_name(read_u16(bytes, offset + 2 + 2 * i)?))
        .collect::<Result<Vec<_>>>()?;
    visitor.on_exceptions(&names)
}

/// `Code`, the body of a method.
///
/// Reports the bytecode as a range of `bytes`, then the exception handlers, then walks the
/// nested attributes in the [`AttributeContext::Code`] context.
pub fn code<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    length: u32,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let bytes = payload(bytes, offset, length)?;
    let max_stack = read_u16(bytes, offset)?;
    let max_locals = read_u16(bytes, offset + 2)?;
    let code_length = read_u32(bytes, offset + 4)?;
    let code_offset = offset + 8;
    check_length(bytes, code_offset, code_length as u64)?;
    visitor.on_code_start(max_stack, max_locals, bytes, code_offset, code_length, pool)?;

    let mut cursor = code_offset + code_length as usize;
    let handler_count = read_u16(bytes, cursor)?;
    cursor += 2;
    for _ in 0..handler_count {
        let start_pc = read_u16(bytes, cursor)?;
        let end_pc = read_u16(bytes, cursor + 2)?;
        let handler_pc = read_u16(bytes, cursor + 4)?;
        // A catch type of zero catches everything.
        let catch_type = optional(read_u16(bytes, cursor + 6)?, |i| pool.class_name(i))?;
        visitor.on_exception_handler(start_pc, end_pc, handler_pc, catch_type)?;
        cursor += 8;
    }

    attributes::walk(AttributeContext::Code, bytes, cursor, pool, visitor)?;
    visitor.on_code_end()
}

pub fn deprecated<V: ClassFileVisitor + ?Sized>(
    _bytes: &[u8],
    offset: usize,
    length: u32,
    _pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    marker(names::DEPRECATED, offset, length)?;
    visitor.on_deprecated()
}

pub fn synthetic<V: ClassFileVisitor + ?Sized>(
    _bytes: &[u8],
    offset: usize,
    length: u32,
    _pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    marker(names::SYNTHETIC, offset, length)?;
    visitor.on_synthetic()
}

fn marker(kind: &'static str, offset: usize, length: u32) -> Result<()> {
    if length != 0 {
        return Err(ClassFileError::NonZeroMarker { kind, offset });
    }
    Ok(())
}

pub fn source_file<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    length: u32,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let bytes = payload(bytes, offset, length)?;
    visitor.on_source_file(pool.utf(read_u16(bytes, offset)?)?)
}

/// `SourceDebugExtension`, whose whole payload is a modified UTF-8 string.
pub fn source_debug<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    length: u32,
    _pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let text = mutf8::decode(bytes, offset, length)?;
    visitor.on_source_debug(&text)
}

pub fn signature<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    length: u32,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let bytes = payload(bytes, offset, length)?;
    visitor.on_signature(pool.utf(read_u16(bytes, offset)?)?)
}

/// `EnclosingMethod`, attached to local and anonymous classes. The method is absent for
/// classes declared in initializers.
pub fn enclosing_method<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    length: u32,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let bytes = payload(bytes, offset, length)?;
    let class = pool.class_name(read_u16(bytes, offset)?)?;
    match read_u16(bytes, offset + 2)? {
        0 => visitor.on_enclosing_method(class, None, None),
        method => visitor.on_enclosing_method(
            class,
            Some(pool.name_of_name_and_type(method)?),
            Some(pool.type_of_name_and_type(method)?),
        ),
    }
}

/// `InnerClasses`. Zero indices, as found for anonymous and top level classes, are reported
/// as `None`.
pub fn inner_classes<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    length: u32,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let bytes = payload(bytes, offset, length)?;
    let count = read_u16(bytes, offset)?;
    let mut cursor = offset + 2;
    for _ in 0..count {
        let inner = optional(read_u16(bytes, cursor)?, |i| pool.class_name(i))?;
        let outer = optional(read_u16(bytes, cursor + 2)?, |i| pool.class_name(i))?;
        let inner_name = optional(read_u16(bytes, cursor + 4)?, |i| pool.utf(i))?;
        let access = read_u16(bytes, cursor + 6)?;
        visitor.on_inner_class(inner, outer, inner_name, access)?;
        cursor += 8;
    }
    Ok(())
}

/// `RuntimeVisibleAnnotations` and `RuntimeInvisibleAnnotations`. The group is reported
/// under the attribute name it was found with.
pub fn annotations<V: ClassFileVisitor + ?Sized>(
    name: &JavaStr,
    bytes: &[u8],
    offset: usize,
    length: u32,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let bytes = payload(bytes, offset, length)?;
    visitor.on_annotation_group(name)?;
    annotation_list(bytes, offset, pool, visitor)?;
    Ok(())
}

/// `RuntimeVisibleParameterAnnotations` and `RuntimeInvisibleParameterAnnotations`.
pub fn parameter_annotations<V: ClassFileVisitor + ?Sized>(
    name: &JavaStr,
    bytes: &[u8],
    offset: usize,
    length: u32,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let bytes = payload(bytes, offset, length)?;
    visitor.on_annotation_group(name)?;

    let parameters = read_u8(bytes, offset)?;
    let mut cursor = offset + 1;
    for parameter in 0..parameters {
        visitor.on_parameter_annotations(parameter, read_u16(bytes, cursor)?)?;
        cursor = annotation_list(bytes, cursor, pool, visitor)?;
    }
    Ok(())
}

/// `AnnotationDefault`, the default of an annotation interface element. The value is
/// reported without a name.
pub fn annotation_default<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    length: u32,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<()> {
    let bytes = payload(bytes, offset, length)?;
    visitor.on_annotation_group(JavaStr::from_str(names::ANNOTATION_DEFAULT))?;
    annotations::element_value(None, bytes, offset, pool, visitor)?;
    Ok(())
}

fn annotation_list<V: ClassFileVisitor + ?Sized>(
    bytes: &[u8],
    offset: usize,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<usize> {
    let count = read_u16(bytes, offset)?;
    let mut cursor = offset + 2;
    for _ in 0..count {
        cursor = annotations::annotation(bytes, cursor, pool, visitor)?;
    }
    Ok(cursor)
}

fn optional<'p>(
    index: u16,
    resolve: impl FnOnce(u16) -> Result<&'p JavaStr>,
) -> Result<Option<&'p JavaStr>> {
    match index {
        0 => Ok(None),
        index => resolve(index).map(Some),
    }
}
