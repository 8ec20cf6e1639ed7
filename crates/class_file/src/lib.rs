// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

//! A streaming reader for class files of versions 45 to 49.
//!
//! [`ClassFile::parse`] checks the structure of a class file held in memory and indexes its
//! constant pool and member tables without copying anything out of the buffer.
//! [`ClassFile::process`] then walks the fields, methods and attributes and reports them to a
//! [`ClassFileVisitor`], which can opt into typed events through the decoders in [`decode`].

mod access_flags;
pub mod annotations;
pub mod attributes;
mod class_file;
pub mod constant_pool;
pub mod decode;
mod error;
pub mod mutf8;
pub mod reader;
mod visitor;

pub use self::class_file::{ClassFile, Sections};
pub use access_flags::AccessFlags;
pub use attributes::AttributeContext;
pub use constant_pool::ConstantPool;
pub use error::{ClassFileError, MemberKind};
pub use visitor::{AnnotationValue, ArrayValue, ClassFileVisitor, ConstantValue};

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
