use java_string::JavaStr;

use crate::{
    reader::{check_length, read_u16, read_u32},
    ClassFileVisitor, ConstantPool, Result,
};

/// Where an attribute list is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeContext {
    Class,
    Field,
    Method,
    /// The attributes of a `Code` attribute.
    Code,
}

/// Names of the attributes the decoders in [`decode`](crate::decode) understand, and of a
/// few common ones they don't.
pub mod names {
    pub const CONSTANT_VALUE: &str = "ConstantValue";
    pub const CODE: &str = "Code";
    pub const EXCEPTIONS: &str = "Exceptions";
    pub const INNER_CLASSES: &str = "InnerClasses";
    pub const ENCLOSING_METHOD: &str = "EnclosingMethod";
    pub const SYNTHETIC: &str = "Synthetic";
    pub const SIGNATURE: &str = "Signature";
    pub const SOURCE_FILE: &str = "SourceFile";
    pub const SOURCE_DEBUG_EXTENSION: &str = "SourceDebugExtension";
    pub const LINE_NUMBER_TABLE: &str = "LineNumberTable";
    pub const LOCAL_VARIABLE_TABLE: &str = "LocalVariableTable";
    pub const LOCAL_VARIABLE_TYPE_TABLE: &str = "LocalVariableTypeTable";
    pub const DEPRECATED: &str = "Deprecated";
    pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
    pub const RUNTIME_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";
    pub const RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS: &str = "RuntimeVisibleParameterAnnotations";
    pub const RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS: &str =
        "RuntimeInvisibleParameterAnnotations";
    pub const ANNOTATION_DEFAULT: &str = "AnnotationDefault";
}

/// Compares a decoded attribute name against one of the [`names`].
pub fn is_named(name: &JavaStr, constant: &str) -> bool {
    name == JavaStr::from_str(constant)
}

/// Walks the attribute list starting at `offset`, reporting every attribute to the visitor.
///
/// Payloads are not interpreted. Returns the offset just after the list.
pub fn walk<V: ClassFileVisitor + ?Sized>(
    context: AttributeContext,
    bytes: &[u8],
    offset: usize,
    pool: &ConstantPool<'_>,
    visitor: &mut V,
) -> Result<usize> {
    let count = read_u16(bytes, offset)?;
    let mut cursor = offset + 2;
    for _ in 0..count {
        let name = pool.utf(read_u16(bytes, cursor)?)?;
        let length = read_u32(bytes, cursor + 2)?;
        let payload = cursor + 6;
        check_length(bytes, payload, length as u64)?;

        log::trace!("{context:?} attribute {name:?} at offset {payload}, {length} bytes");
        visitor.on_attribute(context, name, bytes, payload, length, pool)?;

        cursor = payload + length as usize;
    }
    Ok(cursor)
}

/// Steps over the attribute list starting at `offset` without resolving any names.
pub(crate) fn skip(bytes: &[u8], offset: usize) -> Result<usize> {
    let count = read_u16(bytes, offset)?;
    let mut cursor = offset + 2;
    for _ in 0..count {
        let length = read_u32(bytes, cursor + 2)?;
        check_length(bytes, cursor + 6, length as u64)?;
        cursor += 6 + length as usize;
    }
    Ok(cursor)
}
