//! The callback surface the parser streams class file events to.
//!
//! Every hook has a default implementation that does nothing, so a visitor only implements
//! the events it is interested in. A hook that returns an error aborts processing; the error
//! is handed back to the caller unchanged.

use std::borrow::Cow;

use java_string::JavaStr;

use crate::{attributes::AttributeContext, ConstantPool, Result};

/// The value of a `ConstantValue` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue<'p> {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Cow<'p, JavaStr>),
}

impl ConstantValue<'_> {
    pub fn into_owned(self) -> ConstantValue<'static> {
        match self {
            ConstantValue::Int(v) => ConstantValue::Int(v),
            ConstantValue::Long(v) => ConstantValue::Long(v),
            ConstantValue::Float(v) => ConstantValue::Float(v),
            ConstantValue::Double(v) => ConstantValue::Double(v),
            ConstantValue::String(s) => ConstantValue::String(Cow::Owned(s.into_owned())),
        }
    }
}

/// A constant element value of an annotation.
///
/// Class literals are reported as their descriptor string. Enum constants, nested
/// annotations and arrays of either have their own hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue<'p> {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    /// A UTF-16 code unit.
    Char(u16),
    Boolean(bool),
    Float(f32),
    Double(f64),
    String(Cow<'p, JavaStr>),
    Array(ArrayValue<'p>),
}

/// An array of constants, all of the same element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValue<'p> {
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Char(Vec<u16>),
    Boolean(Vec<bool>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    String(Vec<Cow<'p, JavaStr>>),
}

impl AnnotationValue<'_> {
    pub fn into_owned(self) -> AnnotationValue<'static> {
        match self {
            AnnotationValue::Byte(v) => AnnotationValue::Byte(v),
            AnnotationValue::Short(v) => AnnotationValue::Short(v),
            AnnotationValue::Int(v) => AnnotationValue::Int(v),
            AnnotationValue::Long(v) => AnnotationValue::Long(v),
            AnnotationValue::Char(v) => AnnotationValue::Char(v),
            AnnotationValue::Boolean(v) => AnnotationValue::Boolean(v),
            AnnotationValue::Float(v) => AnnotationValue::Float(v),
            AnnotationValue::Double(v) => AnnotationValue::Double(v),
            AnnotationValue::String(s) => AnnotationValue::String(Cow::Owned(s.into_owned())),
            AnnotationValue::Array(array) => AnnotationValue::Array(array.into_owned()),
        }
    }
}

impl ArrayValue<'_> {
    pub fn into_owned(self) -> ArrayValue<'static> {
        match self {
            ArrayValue::Byte(v) => ArrayValue::Byte(v),
            ArrayValue::Short(v) => ArrayValue::Short(v),
            ArrayValue::Int(v) => ArrayValue::Int(v),
            ArrayValue::Long(v) => ArrayValue::Long(v),
            ArrayValue::Char(v) => ArrayValue::Char(v),
            ArrayValue::Boolean(v) => ArrayValue::Boolean(v),
            ArrayValue::Float(v) => ArrayValue::Float(v),
            ArrayValue::Double(v) => ArrayValue::Double(v),
            ArrayValue::String(v) => ArrayValue::String(
                v.into_iter()
                    .map(|s| Cow::Owned(s.into_owned()))
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArrayValue::Byte(v) => v.len(),
            ArrayValue::Short(v) => v.len(),
            ArrayValue::Int(v) => v.len(),
            ArrayValue::Long(v) => v.len(),
            ArrayValue::Char(v) => v.len(),
            ArrayValue::Boolean(v) => v.len(),
            ArrayValue::Float(v) => v.len(),
            ArrayValue::Double(v) => v.len(),
            ArrayValue::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receives the events of [`ClassFile::process`](crate::ClassFile::process) and of the
/// decoders in [`decode`](crate::decode).
///
/// The parser never decodes an attribute payload on its own. Attributes are reported through
/// [`on_attribute`](Self::on_attribute), and a visitor that wants the typed events of a known
/// attribute calls the matching decoder from there, passing itself along:
///
/// ```ignore
/// fn on_method_attribute(
///     &mut self,
///     name: &JavaStr,
///     bytes: &[u8],
///     offset: usize,
///     length: u32,
///     pool: &ConstantPool<'_>,
/// ) -> Result<()> {
///     if attributes::is_named(name, attributes::names::CODE) {
///         decode::code(bytes, offset, length, pool, self)?;
///     }
///     Ok(())
/// }
/// ```
#[allow(unused_variables)]
pub trait ClassFileVisitor {
    fn on_field(&mut self, name: &JavaStr, descriptor: &JavaStr, access: u16) -> Result<()> {
        Ok(())
    }

    fn on_method(&mut self, name: &JavaStr, descriptor: &JavaStr, access: u16) -> Result<()> {
        Ok(())
    }

    /// Called for every attribute the dispatcher walks over. `offset` is the offset of the
    /// payload, just after the attribute header.
    ///
    /// The default implementation forwards to the hook of the given context.
    fn on_attribute(
        &mut self,
        context: AttributeContext,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        match context {
            AttributeContext::Class => self.on_class_attribute(name, bytes, offset, length, pool),
            AttributeContext::Field => self.on_field_attribute(name, bytes, offset, length, pool),
            AttributeContext::Method => {
                self.on_method_attribute(name, bytes, offset, length, pool)
            }
            AttributeContext::Code => self.on_code_attribute(name, bytes, offset, length, pool),
        }
    }

    fn on_class_attribute(
        &mut self,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        Ok(())
    }

    fn on_field_attribute(
        &mut self,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        Ok(())
    }

    fn on_method_attribute(
        &mut self,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        Ok(())
    }

    fn on_code_attribute(
        &mut self,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        Ok(())
    }

    /// The bytecode of a method starts at `offset` and is `length` bytes long.
    fn on_code_start(
        &mut self,
        max_stack: u16,
        max_locals: u16,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        Ok(())
    }

    /// `catch_type` is `None` for handlers that catch everything, as used by `finally`.
    fn on_exception_handler(
        &mut self,
        start_pc: u16,
        end_pc: u16,
        handler_pc: u16,
        catch_type: Option<&JavaStr>,
    ) -> Result<()> {
        Ok(())
    }

    fn on_code_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_exceptions(&mut self, names: &[&JavaStr]) -> Result<()> {
        Ok(())
    }

    fn on_constant_value(&mut self, value: ConstantValue<'_>) -> Result<()> {
        Ok(())
    }

    fn on_deprecated(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_synthetic(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_source_file(&mut self, name: &JavaStr) -> Result<()> {
        Ok(())
    }

    fn on_source_debug(&mut self, text: &JavaStr) -> Result<()> {
        Ok(())
    }

    fn on_signature(&mut self, signature: &JavaStr) -> Result<()> {
        Ok(())
    }

    fn on_enclosing_method(
        &mut self,
        class: &JavaStr,
        name: Option<&JavaStr>,
        descriptor: Option<&JavaStr>,
    ) -> Result<()> {
        Ok(())
    }

    fn on_inner_class(
        &mut self,
        inner: Option<&JavaStr>,
        outer: Option<&JavaStr>,
        inner_name: Option<&JavaStr>,
        access: u16,
    ) -> Result<()> {
        Ok(())
    }

    /// Starts the annotations of an annotation attribute, named after the attribute.
    fn on_annotation_group(&mut self, attribute_name: &JavaStr) -> Result<()> {
        Ok(())
    }

    /// Starts the `count` annotations of the parameter at `parameter`.
    fn on_parameter_annotations(&mut self, parameter: u8, count: u16) -> Result<()> {
        Ok(())
    }

    fn on_annotation_start(&mut self, type_name: &JavaStr) -> Result<()> {
        Ok(())
    }

    fn on_annotation_end(&mut self) -> Result<()> {
        Ok(())
    }

    /// `name` is `None` for array elements and annotation defaults.
    fn on_annotation_value(
        &mut self,
        name: Option<&JavaStr>,
        value: AnnotationValue<'_>,
    ) -> Result<()> {
        Ok(())
    }

    fn on_annotation_enum(
        &mut self,
        name: Option<&JavaStr>,
        type_name: &JavaStr,
        constant: &JavaStr,
    ) -> Result<()> {
        Ok(())
    }

    fn on_array_start(&mut self, name: Option<&JavaStr>, size: u16) -> Result<()> {
        Ok(())
    }

    fn on_array_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_annotation_nested_start(&mut self, name: Option<&JavaStr>) -> Result<()> {
        Ok(())
    }

    fn on_annotation_nested_end(&mut self) -> Result<()> {
        Ok(())
    }
}
