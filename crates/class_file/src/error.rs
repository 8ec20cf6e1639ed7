use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error("Class file truncated: {required} bytes required at offset {offset} but the data is only {length} bytes long")]
    Truncated {
        offset: usize,
        required: u64,
        length: usize,
    },
    #[error("Invalid magic identifier: 0x{actual:X}")]
    BadMagic { actual: u32 },
    #[error("Unsupported class file version {major}.{minor}")]
    BadVersion { major: u16, minor: u16 },
    #[error("Class definition ends at offset {consumed} when the class data is {length} bytes long")]
    TrailingBytes { consumed: usize, length: usize },
    #[error("Invalid cp info tag {tag} at offset {offset}")]
    BadConstantTag { tag: u8, offset: usize },
    #[error("Constant pool index {index} is not in the range [1, {bound})")]
    IndexOutOfRange { index: u16, bound: usize },
    #[error("Expected {expected} constant pool entry, found tag {actual} at offset {offset}")]
    UnexpectedTag {
        expected: &'static str,
        actual: u8,
        offset: usize,
    },
    #[error("Invalid {kind} index {given}, the class has {count} {kind}s")]
    BadMemberIndex {
        kind: MemberKind,
        given: usize,
        count: usize,
    },
    #[error("Invalid modified utf8 at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("{kind} attribute with non-zero length at offset {offset}")]
    NonZeroMarker { kind: &'static str, offset: usize },
    #[error("ConstantValue attribute at offset {offset} references constant pool entry with tag {tag}")]
    BadConstantValueRef { tag: u8, offset: usize },
    #[error("Unknown element value tag {:?} at offset {offset}", as_char(.tag))]
    UnknownValueTag { tag: u8, offset: usize },
    #[error(
        "Bad array element tag at offset {offset}: expected {:?}, found {:?}",
        as_char(.expected),
        as_char(.actual)
    )]
    BadArrayTag {
        expected: u8,
        actual: u8,
        offset: usize,
    },
    #[error("Element value at offset {offset} nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize, offset: usize },
    #[error("Visitor aborted: {0}")]
    Visitor(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ClassFileError {
    /// Wraps an error raised by a visitor so it can travel through the parser.
    pub fn visitor(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ClassFileError::Visitor(error.into())
    }
}

fn as_char(tag: &u8) -> char {
    *tag as char
}

/// The member table a [`ClassFileError::BadMemberIndex`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Field => f.write_str("field"),
            MemberKind::Method => f.write_str("method"),
        }
    }
}
