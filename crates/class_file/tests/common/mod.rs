#![allow(dead_code)]

use std::collections::HashMap;

use fade_class_file::{
    attributes::{is_named, names},
    decode, AnnotationValue, AttributeContext, ClassFileVisitor, ConstantPool, ConstantValue,
    Result,
};
use java_string::{JavaStr, JavaString};

pub fn js(s: &str) -> JavaString {
    JavaStr::from_str(s).to_owned()
}

/// Assembles class files in memory.
///
/// Pool entries are appended in the order they are asked for, and Utf8 entries are shared.
pub struct ClassBuilder {
    minor: u16,
    major: u16,
    pool: Vec<u8>,
    next_index: u16,
    utf_indices: HashMap<String, u16>,
    access: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
    pub fn new(name: &str, super_name: Option<&str>) -> Self {
        let mut builder = Self {
            minor: 3,
            major: 45,
            pool: vec![],
            next_index: 1,
            utf_indices: HashMap::new(),
            access: 0x0021,
            this_class: 0,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        };
        builder.this_class = builder.class(name);
        if let Some(super_name) = super_name {
            builder.super_class = builder.class(super_name);
        }
        builder
    }

    pub fn version(mut self, minor: u16, major: u16) -> Self {
        self.minor = minor;
        self.major = major;
        self
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    fn entry(&mut self, bytes: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.pool.extend_from_slice(bytes);
        self.next_index += slots;
        index
    }

    pub fn utf(&mut self, s: &str) -> u16 {
        if let Some(&index) = self.utf_indices.get(s) {
            return index;
        }
        let mut bytes = vec![1];
        bytes.extend_from_slice(&(s.len() as u16).to_be_bytes());
        bytes.extend_from_slice(s.as_bytes());
        let index = self.entry(&bytes, 1);
        self.utf_indices.insert(s.to_owned(), index);
        index
    }

    /// A Utf8 entry holding raw bytes, for strings outside of ASCII.
    pub fn raw_utf(&mut self, data: &[u8]) -> u16 {
        let mut bytes = vec![1];
        bytes.extend_from_slice(&(data.len() as u16).to_be_bytes());
        bytes.extend_from_slice(data);
        self.entry(&bytes, 1)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name = self.utf(name);
        self.entry(&with_indices(7, &[name]), 1)
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let value = self.utf(value);
        self.entry(&with_indices(8, &[value]), 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut bytes = vec![3];
        bytes.extend_from_slice(&value.to_be_bytes());
        self.entry(&bytes, 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut bytes = vec![5];
        bytes.extend_from_slice(&value.to_be_bytes());
        self.entry(&bytes, 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let mut bytes = vec![6];
        bytes.extend_from_slice(&value.to_bits().to_be_bytes());
        self.entry(&bytes, 2)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf(name);
        let descriptor = self.utf(descriptor);
        self.entry(&with_indices(12, &[name, descriptor]), 1)
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(class);
        let name_and_type = self.name_and_type(name, descriptor);
        self.entry(&with_indices(10, &[class, name_and_type]), 1)
    }

    /// An `attribute_info` with the given name and payload.
    pub fn attribute(&mut self, name: &str, payload: &[u8]) -> Vec<u8> {
        let mut bytes = self.utf(name).to_be_bytes().to_vec();
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    pub fn interface(&mut self, name: &str) {
        let index = self.class(name);
        self.interfaces.push(index);
    }

    pub fn field(&mut self, access: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) {
        let member = self.member(access, name, descriptor, attributes);
        self.fields.push(member);
    }

    pub fn method(&mut self, access: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) {
        let member = self.member(access, name, descriptor, attributes);
        self.methods.push(member);
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) {
        self.attributes.push(attribute);
    }

    fn member(
        &mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) -> Vec<u8> {
        let name = self.utf(name);
        let descriptor = self.utf(descriptor);
        let mut bytes = vec![];
        for item in [access, name, descriptor] {
            bytes.extend_from_slice(&item.to_be_bytes());
        }
        bytes.extend_from_slice(&list(&attributes));
        bytes
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = vec![0xca, 0xfe, 0xba, 0xbe];
        bytes.extend_from_slice(&self.minor.to_be_bytes());
        bytes.extend_from_slice(&self.major.to_be_bytes());
        bytes.extend_from_slice(&self.next_index.to_be_bytes());
        bytes.extend_from_slice(&self.pool);
        bytes.extend_from_slice(&self.access.to_be_bytes());
        bytes.extend_from_slice(&self.this_class.to_be_bytes());
        bytes.extend_from_slice(&self.super_class.to_be_bytes());
        bytes.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend_from_slice(&interface.to_be_bytes());
        }
        bytes.extend_from_slice(&list(&self.fields));
        bytes.extend_from_slice(&list(&self.methods));
        bytes.extend_from_slice(&list(&self.attributes));
        bytes
    }
}

fn with_indices(tag: u8, indices: &[u16]) -> Vec<u8> {
    let mut bytes = vec![tag];
    for index in indices {
        bytes.extend_from_slice(&index.to_be_bytes());
    }
    bytes
}

/// A `u2` count followed by the items.
fn list(items: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = (items.len() as u16).to_be_bytes().to_vec();
    for item in items {
        bytes.extend_from_slice(item);
    }
    bytes
}

/// A `Code` payload without exception handlers or attributes.
pub fn code(max_stack: u16, max_locals: u16, code: &[u8]) -> Vec<u8> {
    let mut bytes = max_stack.to_be_bytes().to_vec();
    bytes.extend_from_slice(&max_locals.to_be_bytes());
    bytes.extend_from_slice(&(code.len() as u32).to_be_bytes());
    bytes.extend_from_slice(code);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes
}

/// `public class org.realityforge.fade.data.EmptyClass` as compiled by javac 1.1.
pub fn empty_class() -> Vec<u8> {
    let mut builder =
        ClassBuilder::new("org/realityforge/fade/data/EmptyClass", Some("java/lang/Object"));
    let init = builder.method_ref("java/lang/Object", "<init>", "()V");
    let [hi, lo] = init.to_be_bytes();
    let body = code(1, 1, &[0x2a, 0xb7, hi, lo, 0xb1]);
    let code = builder.attribute("Code", &body);
    builder.method(0x0001, "<init>", "()V", vec![code]);
    let source_file = builder.utf("EmptyClass.java").to_be_bytes();
    let source_file = builder.attribute("SourceFile", &source_file);
    builder.class_attribute(source_file);
    builder.build()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Field(JavaString, JavaString, u16),
    Method(JavaString, JavaString, u16),
    Attribute(AttributeContext, JavaString),
    CodeStart(u16, u16, u32),
    ExceptionHandler(Option<JavaString>),
    CodeEnd,
    Exceptions(Vec<JavaString>),
    ConstantValue(ConstantValue<'static>),
    Deprecated,
    Synthetic,
    SourceFile(JavaString),
    Signature(JavaString),
    InnerClass(Option<JavaString>, Option<JavaString>, Option<JavaString>, u16),
    EnclosingMethod(JavaString, Option<JavaString>, Option<JavaString>),
    AnnotationGroup(JavaString),
    AnnotationStart(JavaString),
    AnnotationEnd,
    Value(Option<JavaString>, AnnotationValue<'static>),
}

/// Decodes every attribute it knows and records the events.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl ClassFileVisitor for Recorder {
    fn on_field(&mut self, name: &JavaStr, descriptor: &JavaStr, access: u16) -> Result<()> {
        self.events.push(Event::Field(name.to_owned(), descriptor.to_owned(), access));
        Ok(())
    }

    fn on_method(&mut self, name: &JavaStr, descriptor: &JavaStr, access: u16) -> Result<()> {
        self.events.push(Event::Method(name.to_owned(), descriptor.to_owned(), access));
        Ok(())
    }

    fn on_attribute(
        &mut self,
        context: AttributeContext,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        self.events.push(Event::Attribute(context, name.to_owned()));

        if is_named(name, names::CODE) {
            decode::code(bytes, offset, length, pool, self)
        } else if is_named(name, names::CONSTANT_VALUE) {
            decode::constant_value(bytes, offset, length, pool, self)
        } else if is_named(name, names::EXCEPTIONS) {
            decode::exceptions(bytes, offset, length, pool, self)
        } else if is_named(name, names::DEPRECATED) {
            decode::deprecated(bytes, offset, length, pool, self)
        } else if is_named(name, names::SYNTHETIC) {
            decode::synthetic(bytes, offset, length, pool, self)
        } else if is_named(name, names::SOURCE_FILE) {
            decode::source_file(bytes, offset, length, pool, self)
        } else if is_named(name, names::SIGNATURE) {
            decode::signature(bytes, offset, length, pool, self)
        } else if is_named(name, names::INNER_CLASSES) {
            decode::inner_classes(bytes, offset, length, pool, self)
        } else if is_named(name, names::ENCLOSING_METHOD) {
            decode::enclosing_method(bytes, offset, length, pool, self)
        } else if is_named(name, names::RUNTIME_VISIBLE_ANNOTATIONS) {
            decode::annotations(name, bytes, offset, length, pool, self)
        } else {
            Ok(())
        }
    }

    fn on_code_start(
        &mut self,
        max_stack: u16,
        max_locals: u16,
        _bytes: &[u8],
        _offset: usize,
        length: u32,
        _pool: &ConstantPool<'_>,
    ) -> Result<()> {
        self.events.push(Event::CodeStart(max_stack, max_locals, length));
        Ok(())
    }

    fn on_exception_handler(
        &mut self,
        _start_pc: u16,
        _end_pc: u16,
        _handler_pc: u16,
        catch_type: Option<&JavaStr>,
    ) -> Result<()> {
        self.events.push(Event::ExceptionHandler(catch_type.map(JavaStr::to_owned)));
        Ok(())
    }

    fn on_code_end(&mut self) -> Result<()> {
        self.events.push(Event::CodeEnd);
        Ok(())
    }

    fn on_exceptions(&mut self, names: &[&JavaStr]) -> Result<()> {
        self.events.push(Event::Exceptions(
            names.iter().map(|name| (*name).to_owned()).collect(),
        ));
        Ok(())
    }

    fn on_constant_value(&mut self, value: ConstantValue<'_>) -> Result<()> {
        self.events.push(Event::ConstantValue(value.into_owned()));
        Ok(())
    }

    fn on_deprecated(&mut self) -> Result<()> {
        self.events.push(Event::Deprecated);
        Ok(())
    }

    fn on_synthetic(&mut self) -> Result<()> {
        self.events.push(Event::Synthetic);
        Ok(())
    }

    fn on_source_file(&mut self, name: &JavaStr) -> Result<()> {
        self.events.push(Event::SourceFile(name.to_owned()));
        Ok(())
    }

    fn on_signature(&mut self, signature: &JavaStr) -> Result<()> {
        self.events.push(Event::Signature(signature.to_owned()));
        Ok(())
    }

    fn on_inner_class(
        &mut self,
        inner: Option<&JavaStr>,
        outer: Option<&JavaStr>,
        inner_name: Option<&JavaStr>,
        access: u16,
    ) -> Result<()> {
        self.events.push(Event::InnerClass(
            inner.map(JavaStr::to_owned),
            outer.map(JavaStr::to_owned),
            inner_name.map(JavaStr::to_owned),
            access,
        ));
        Ok(())
    }

    fn on_enclosing_method(
        &mut self,
        class: &JavaStr,
        name: Option<&JavaStr>,
        descriptor: Option<&JavaStr>,
    ) -> Result<()> {
        self.events.push(Event::EnclosingMethod(
            class.to_owned(),
            name.map(JavaStr::to_owned),
            descriptor.map(JavaStr::to_owned),
        ));
        Ok(())
    }

    fn on_annotation_group(&mut self, attribute_name: &JavaStr) -> Result<()> {
        self.events.push(Event::AnnotationGroup(attribute_name.to_owned()));
        Ok(())
    }

    fn on_annotation_start(&mut self, type_name: &JavaStr) -> Result<()> {
        self.events.push(Event::AnnotationStart(type_name.to_owned()));
        Ok(())
    }

    fn on_annotation_end(&mut self) -> Result<()> {
        self.events.push(Event::AnnotationEnd);
        Ok(())
    }

    fn on_annotation_value(
        &mut self,
        name: Option<&JavaStr>,
        value: AnnotationValue<'_>,
    ) -> Result<()> {
        self.events.push(Event::Value(name.map(JavaStr::to_owned), value.into_owned()));
        Ok(())
    }
}
