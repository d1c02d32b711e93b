use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// Python backend. Structs become `@dataclass`es with `Optional[T]`
/// annotations; encode/decode are module-level functions over `bytes`
/// using `struct.pack`/`struct.unpack` for the fixed-width atoms.
pub struct PythonBackend;

impl Backend for PythonBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{}.py", snake_case(package))
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::with_indent("    ");
        w.line("from __future__ import annotations");
        w.line("");
        w.line("import struct");
        w.line("from dataclasses import dataclass, field");
        w.line("from typing import List, Optional");
        w.line("");
        emit_runtime(&mut w);
        for s in &plan.structs {
            emit_struct(&mut w, s);
        }
        for s in &plan.structs {
            emit_struct_codec(&mut w, s);
        }
        for m in &plan.messages {
            emit_message_codec(&mut w, &m.name, &m.ty, plan);
        }
        w.finish()
    }
}

fn snake_case(package: &str) -> String {
    let cleaned: String =
        package.chars().map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' }).collect();
    if cleaned.is_empty() {
        "ffiregen".to_string()
    } else {
        cleaned
    }
}

fn python_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Int8 | PrimitiveKind::Int16 | PrimitiveKind::Int32 | PrimitiveKind::Int64 => "int",
        PrimitiveKind::Float32 | PrimitiveKind::Float64 => "float",
        PrimitiveKind::String => "str",
    }
}

fn python_type(ty: &TypeIr) -> String {
    let base = match ty {
        TypeIr::Primitive { kind, .. } => python_primitive(*kind).to_string(),
        TypeIr::Array { element, .. } => format!("List[{}]", python_type(element)),
        TypeIr::StructRef { name, .. } => name.clone(),
    };
    if ty.is_optional() {
        format!("Optional[{base}]")
    } else {
        base
    }
}

fn struct_pack_fmt(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "<B",
        PrimitiveKind::Int8 => "<b",
        PrimitiveKind::Int16 => "<h",
        PrimitiveKind::Int32 => "<i",
        PrimitiveKind::Int64 => "<q",
        PrimitiveKind::Float32 => "<f",
        PrimitiveKind::Float64 => "<d",
        PrimitiveKind::String => unreachable!("string has no fixed struct format"),
    }
}

fn emit_runtime(w: &mut CodeWriter) {
    w.open("class DecodeError(Exception):", "");
    w.line("pass");
    w.close("");
    w.line("");
    w.open("class _Writer:", "");
    w.open("def __init__(self):", "");
    w.line("self.buf = bytearray()");
    w.close("");
    w.line("");
    w.open("def put_u16(self, v):", "");
    w.line("self.buf += struct.pack(\"<H\", v)");
    w.close("");
    w.line("");
    w.open("def put_string(self, v):", "");
    w.line("encoded = v.encode(\"utf-8\")");
    w.line("self.put_u16(len(encoded))");
    w.line("self.buf += encoded");
    w.close("");
    w.close("");
    w.line("");
    w.open("class _Reader:", "");
    w.open("def __init__(self, data):", "");
    w.line("self.data = data");
    w.line("self.pos = 0");
    w.close("");
    w.line("");
    w.open("def take(self, n):", "");
    w.open("if self.pos + n > len(self.data):", "");
    w.line("raise DecodeError(\"ffire: unexpected end of input\")");
    w.close("");
    w.line("out = self.data[self.pos:self.pos + n]");
    w.line("self.pos += n");
    w.line("return out");
    w.close("");
    w.line("");
    w.open("def read_u16(self):", "");
    w.line("return struct.unpack(\"<H\", self.take(2))[0]");
    w.close("");
    w.line("");
    w.open("def read_string(self):", "");
    w.line("n = self.read_u16()");
    w.line("raw = self.take(n)");
    w.open("try:", "");
    w.line("return raw.decode(\"utf-8\")");
    w.close_open("", "except UnicodeDecodeError:", "");
    w.line("raise DecodeError(\"ffire: invalid UTF-8\") from None");
    w.close("");
    w.line("");
    w.line("@property");
    w.open("def remaining(self):", "");
    w.line("return len(self.data) - self.pos");
    w.close("");
    w.close("");
    w.line("");
}

fn emit_struct(w: &mut CodeWriter, s: &StructIr) {
    w.line("@dataclass");
    w.open(&format!("class {}:", s.name), "");
    for f in &s.fields {
        let default = if f.ty.is_optional() { " = None" } else { "" };
        w.line(&format!("{}: {}{}", f.name, python_type(&f.ty), default));
    }
    w.close("");
    w.line("");
}

fn emit_struct_codec(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("def _encode_{}(w: _Writer, v: {}):", snake_case(&s.name), s.name), "");
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.close("");
    w.line("");

    w.open(&format!("def _decode_{}(r: _Reader) -> {}:", snake_case(&s.name), s.name), "");
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &f.name);
    }
    let args: Vec<String> = s.fields.iter().map(|f| format!("{}={}", f.name, f.name)).collect();
    w.line(&format!("return {}({})", s.name, args.join(", ")));
    w.close("");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, plan: &Plan) {
    let py_ty = python_type(ty);
    let _ = plan;

    w.open(&format!("def encode_{}(v: {py_ty}) -> bytes:", snake_case(name)), "");
    w.line("w = _Writer()");
    emit_encode_value(w, ty, "v");
    w.line("return bytes(w.buf)");
    w.close("");
    w.line("");

    w.open(&format!("def decode_{}(data: bytes) -> {py_ty}:", snake_case(name)), "");
    w.line("r = _Reader(data)");
    emit_decode_value(w, ty, "v");
    w.line("return v");
    w.close("");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        w.open(&format!("if {expr} is None:"), "");
        w.line("w.buf.append(0x00)");
        w.close_open("", "else:", "");
        w.line("w.buf.append(0x01)");
        emit_encode_bare(w, ty, expr);
        w.close("");
        return;
    }
    emit_encode_bare(w, ty, expr);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::String => w.line(&format!("w.put_string({expr})")),
            other => w.line(&format!("w.buf += struct.pack(\"{}\", {expr})", struct_pack_fmt(*other))),
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("w.put_u16(len({expr}))"));
            w.open(&format!("for item in {expr}:"), "");
            emit_encode_value(w, element, "item");
            w.close("");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("_encode_{}(w, {expr})", snake_case(name))),
    }
}

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    if ty.is_optional() {
        w.open("if r.take(1)[0] == 0:", "");
        w.line(&format!("{dest} = None"));
        w.close_open("", "else:", "");
        emit_decode_bare(w, ty, dest);
        w.close("");
        return;
    }
    emit_decode_bare(w, ty, dest);
}

fn emit_decode_bare(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    match ty {
        TypeIr::Primitive { kind: PrimitiveKind::String, .. } => w.line(&format!("{dest} = r.read_string()")),
        TypeIr::Primitive { kind, .. } => {
            w.line(&format!("{dest} = struct.unpack(\"{}\", r.take({}))[0]", struct_pack_fmt(*kind), kind_width(*kind)));
        }
        TypeIr::Array { element, .. } => {
            w.line(&format!("{dest} = []"));
            w.line("_n = r.read_u16()");
            w.open("for _ in range(_n):", "");
            emit_decode_value(w, element, "_item");
            w.line(&format!("{dest}.append(_item)"));
            w.close("");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("{dest} = _decode_{}(r)", snake_case(name))),
    }
}

fn kind_width(kind: PrimitiveKind) -> usize {
    match kind {
        PrimitiveKind::Bool | PrimitiveKind::Int8 => 1,
        PrimitiveKind::Int16 => 2,
        PrimitiveKind::Int32 | PrimitiveKind::Float32 => 4,
        PrimitiveKind::Int64 | PrimitiveKind::Float64 => 8,
        PrimitiveKind::String => unreachable!("string has no fixed width"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build_plan;
    use crate::options::{GenerateOptions, Target};

    fn schema(src: &str) -> ffire_schema::Schema {
        ffire_parser::parse(src).unwrap()
    }

    #[test]
    fn renders_dataclass_and_codec() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let plan = build_plan(&s);
        let code = PythonBackend.render(&plan, &GenerateOptions::new(Target::Python));
        assert!(code.contains("@dataclass"));
        assert!(code.contains("class Device:"));
        assert!(code.contains("def encode_message(v: Device) -> bytes:"));
        assert!(code.contains("def decode_message(data: bytes) -> Device:"));
    }
}
