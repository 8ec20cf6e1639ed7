use std::{env, fs::File};

use fade_class_file::{
    attributes::{is_named, names},
    decode, AnnotationValue, ClassFile, ClassFileVisitor, ConstantPool, ConstantValue, Result,
    Sections,
};
use java_string::JavaStr;
use memmap::Mmap;

fn main() {
    pretty_env_logger::init();

    for path in env::args().skip(1) {
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Cannot open {}: {}", path, e);
                continue;
            }
        };
        let mmap = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(e) => {
                log::warn!("Cannot map {}: {}", path, e);
                continue;
            }
        };

        if let Err(e) = dump(&mmap) {
            log::warn!("Cannot read {}: {}", path, e);
        }
    }
}

fn dump(bytes: &[u8]) -> Result<()> {
    let class_file = ClassFile::parse(bytes)?;

    println!(
        "class {} ({}.{}, {:?})",
        class_file.class_name()?,
        class_file.major_version(),
        class_file.minor_version(),
        class_file.access()
    );
    if let Some(super_class) = class_file.super_class_name()? {
        println!("  extends {}", super_class);
    }
    for interface in class_file.interfaces()? {
        println!("  implements {}", interface);
    }

    class_file.process(&mut Printer { depth: 1 }, Sections::all())
}

struct Printer {
    depth: usize,
}

impl Printer {
    fn line(&self, text: std::fmt::Arguments) {
        println!("{:indent$}{}", "", text, indent = self.depth * 2);
    }

    fn decode(
        &mut self,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        self.line(format_args!("@{} ({} bytes)", name, length));
        self.depth += 1;
        let result = self.decode_payload(name, bytes, offset, length, pool);
        self.depth -= 1;
        result
    }

    fn decode_payload(
        &mut self,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        if is_named(name, names::RUNTIME_VISIBLE_ANNOTATIONS)
            || is_named(name, names::RUNTIME_INVISIBLE_ANNOTATIONS)
        {
            return decode::annotations(name, bytes, offset, length, pool, self);
        }
        if is_named(name, names::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS)
            || is_named(name, names::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS)
        {
            return decode::parameter_annotations(name, bytes, offset, length, pool, self);
        }

        let decoders: [(&str, Decoder); 11] = [
            (names::CODE, decode::code),
            (names::CONSTANT_VALUE, decode::constant_value),
            (names::EXCEPTIONS, decode::exceptions),
            (names::DEPRECATED, decode::deprecated),
            (names::SYNTHETIC, decode::synthetic),
            (names::SOURCE_FILE, decode::source_file),
            (names::SOURCE_DEBUG_EXTENSION, decode::source_debug),
            (names::SIGNATURE, decode::signature),
            (names::ENCLOSING_METHOD, decode::enclosing_method),
            (names::INNER_CLASSES, decode::inner_classes),
            (names::ANNOTATION_DEFAULT, decode::annotation_default),
        ];
        match decoders.iter().find(|(known, _)| is_named(name, known)) {
            Some((_, decoder)) => decoder(bytes, offset, length, pool, self),
            None => Ok(()),
        }
    }
}

type Decoder = fn(&[u8], usize, u32, &ConstantPool<'_>, &mut Printer) -> Result<()>;

impl ClassFileVisitor for Printer {
    fn on_field(&mut self, name: &JavaStr, descriptor: &JavaStr, access: u16) -> Result<()> {
        self.line(format_args!("field {} {} (0x{:04x})", name, descriptor, access));
        Ok(())
    }

    fn on_method(&mut self, name: &JavaStr, descriptor: &JavaStr, access: u16) -> Result<()> {
        self.line(format_args!("method {}{} (0x{:04x})", name, descriptor, access));
        Ok(())
    }

    fn on_class_attribute(
        &mut self,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        self.decode(name, bytes, offset, length, pool)
    }

    fn on_field_attribute(
        &mut self,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        self.depth += 1;
        let result = self.decode(name, bytes, offset, length, pool);
        self.depth -= 1;
        result
    }

    fn on_method_attribute(
        &mut self,
        name: &JavaStr,
        bytes: &[u8],
        offset: usize,
        length: u32,
        pool: &ConstantPool<'_>,
    ) -> Result<()> {
        self.depth += 1;
        let result = self.decode(name, bytes, offset, length, pool);
        self.depth -= 1;
        result
    }

    fn on_code_attribute(
        &mut self,
        name: &JavaStr,
        _bytes: &[u8],
        _offset: usize,
        length: u32,
        _pool: &ConstantPool<'_>,
    ) -> Result<()> {
        self.line(format_args!("@{} ({} bytes)", name, length));
        Ok(())
    }

    fn on_code_start(
        &mut self,
        max_stack: u16,
        max_locals: u16,
        _bytes: &[u8],
        offset: usize,
        length: u32,
        _pool: &ConstantPool<'_>,
    ) -> Result<()> {
        self.line(format_args!(
            "stack {}, locals {}, {} bytes of code at {}",
            max_stack, max_locals, length, offset
        ));
        Ok(())
    }

    fn on_exception_handler(
        &mut self,
        start_pc: u16,
        end_pc: u16,
        handler_pc: u16,
        catch_type: Option<&JavaStr>,
    ) -> Result<()> {
        let catch_type = catch_type.unwrap_or(JavaStr::from_str("any"));
        self.line(format_args!(
            "[{}, {}) -> {} catches {}",
            start_pc, end_pc, handler_pc, catch_type
        ));
        Ok(())
    }

    fn on_exceptions(&mut self, names: &[&JavaStr]) -> Result<()> {
        for name in names {
            self.line(format_args!("throws {}", name));
        }
        Ok(())
    }

    fn on_constant_value(&mut self, value: ConstantValue<'_>) -> Result<()> {
        self.line(format_args!("= {:?}", value));
        Ok(())
    }

    fn on_deprecated(&mut self) -> Result<()> {
        self.line(format_args!("deprecated"));
        Ok(())
    }

    fn on_synthetic(&mut self) -> Result<()> {
        self.line(format_args!("synthetic"));
        Ok(())
    }

    fn on_source_file(&mut self, name: &JavaStr) -> Result<()> {
        self.line(format_args!("{}", name));
        Ok(())
    }

    fn on_source_debug(&mut self, text: &JavaStr) -> Result<()> {
        self.line(format_args!("{:?}", text));
        Ok(())
    }

    fn on_signature(&mut self, signature: &JavaStr) -> Result<()> {
        self.line(format_args!("{}", signature));
        Ok(())
    }

    fn on_enclosing_method(
        &mut self,
        class: &JavaStr,
        name: Option<&JavaStr>,
        descriptor: Option<&JavaStr>,
    ) -> Result<()> {
        match name.zip(descriptor) {
            Some((name, descriptor)) => {
                self.line(format_args!("{}.{}{}", class, name, descriptor))
            }
            None => self.line(format_args!("{}", class)),
        }
        Ok(())
    }

    fn on_inner_class(
        &mut self,
        inner: Option<&JavaStr>,
        outer: Option<&JavaStr>,
        inner_name: Option<&JavaStr>,
        access: u16,
    ) -> Result<()> {
        self.line(format_args!(
            "{:?} in {:?} as {:?} (0x{:04x})",
            inner, outer, inner_name, access
        ));
        Ok(())
    }

    fn on_parameter_annotations(&mut self, parameter: u8, count: u16) -> Result<()> {
        self.line(format_args!("parameter {}: {} annotations", parameter, count));
        Ok(())
    }

    fn on_annotation_start(&mut self, type_name: &JavaStr) -> Result<()> {
        self.line(format_args!("{} {{", type_name));
        self.depth += 1;
        Ok(())
    }

    fn on_annotation_end(&mut self) -> Result<()> {
        self.depth -= 1;
        self.line(format_args!("}}"));
        Ok(())
    }

    fn on_annotation_value(
        &mut self,
        name: Option<&JavaStr>,
        value: AnnotationValue<'_>,
    ) -> Result<()> {
        self.line(format_args!("{:?} = {:?}", name, value));
        Ok(())
    }

    fn on_annotation_enum(
        &mut self,
        name: Option<&JavaStr>,
        type_name: &JavaStr,
        constant: &JavaStr,
    ) -> Result<()> {
        self.line(format_args!("{:?} = {}.{}", name, type_name, constant));
        Ok(())
    }

    fn on_array_start(&mut self, name: Option<&JavaStr>, size: u16) -> Result<()> {
        self.line(format_args!("{:?} = [{}]", name, size));
        self.depth += 1;
        Ok(())
    }

    fn on_array_end(&mut self) -> Result<()> {
        self.depth -= 1;
        Ok(())
    }

    fn on_annotation_nested_start(&mut self, name: Option<&JavaStr>) -> Result<()> {
        self.line(format_args!("{:?} =", name));
        Ok(())
    }
}
