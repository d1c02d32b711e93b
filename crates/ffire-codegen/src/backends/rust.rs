use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::buffer_size::static_size;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// Rust backend. Emitted code is a single `#![no_std]`-free module with no
/// external dependencies (the generated artifact should not force a
/// `Cargo.toml` edit on its consumer); `Option<T>` is the optional
/// representation for every case, matching the host toolchain's own
/// `Option`-based model.
pub struct RustBackend;

impl Backend for RustBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{}.rs", snake_case(package))
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::new();
        w.line("#![allow(dead_code)]");
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

fn rust_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Int8 => "i8",
        PrimitiveKind::Int16 => "i16",
        PrimitiveKind::Int32 => "i32",
        PrimitiveKind::Int64 => "i64",
        PrimitiveKind::Float32 => "f32",
        PrimitiveKind::Float64 => "f64",
        PrimitiveKind::String => "String",
    }
}

fn rust_type(ty: &TypeIr) -> String {
    let base = match ty {
        TypeIr::Primitive { kind, .. } => rust_primitive(*kind).to_string(),
        TypeIr::Array { element, .. } => format!("Vec<{}>", rust_type(element)),
        TypeIr::StructRef { name, .. } => name.clone(),
    };
    if ty.is_optional() {
        format!("Option<{base}>")
    } else {
        base
    }
}

fn emit_runtime(w: &mut CodeWriter) {
    w.line("#[derive(Debug)]");
    w.open("pub enum DecodeError", "{");
    w.line("UnexpectedEof,");
    w.line("InvalidUtf8,");
    w.close("}");
    w.line("");
    w.open("impl std::fmt::Display for DecodeError", "{");
    w.open("fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result", "{");
    w.open("match self", "{");
    w.line("DecodeError::UnexpectedEof => write!(f, \"ffire: unexpected end of input\"),");
    w.line("DecodeError::InvalidUtf8 => write!(f, \"ffire: invalid UTF-8\"),");
    w.close("}");
    w.close("}");
    w.close("}");
    w.line("");
    w.line("impl std::error::Error for DecodeError {}");
    w.line("");
    w.open("struct Reader<'a>", "{");
    w.line("data: &'a [u8],");
    w.line("pos: usize,");
    w.close("}");
    w.line("");
    w.open("impl<'a> Reader<'a>", "{");
    w.line("fn new(data: &'a [u8]) -> Self { Self { data, pos: 0 } }");
    w.line("");
    w.open("fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError>", "{");
    w.line("if self.pos + n > self.data.len() { return Err(DecodeError::UnexpectedEof); }");
    w.line("let out = &self.data[self.pos..self.pos + n];");
    w.line("self.pos += n;");
    w.line("Ok(out)");
    w.close("}");
    w.line("");
    w.line("fn bool(&mut self) -> Result<bool, DecodeError> { Ok(self.take(1)?[0] != 0) }");
    w.line("fn i8(&mut self) -> Result<i8, DecodeError> { Ok(self.take(1)?[0] as i8) }");
    w.open("fn i16(&mut self) -> Result<i16, DecodeError>", "{");
    w.line("Ok(i16::from_le_bytes(self.take(2)?.try_into().unwrap()))");
    w.close("}");
    w.open("fn i32(&mut self) -> Result<i32, DecodeError>", "{");
    w.line("Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))");
    w.close("}");
    w.open("fn i64(&mut self) -> Result<i64, DecodeError>", "{");
    w.line("Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))");
    w.close("}");
    w.open("fn f32(&mut self) -> Result<f32, DecodeError>", "{");
    w.line("Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))");
    w.close("}");
    w.open("fn f64(&mut self) -> Result<f64, DecodeError>", "{");
    w.line("Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))");
    w.close("}");
    w.open("fn u16(&mut self) -> Result<u16, DecodeError>", "{");
    w.line("Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))");
    w.close("}");
    w.open("fn string(&mut self) -> Result<String, DecodeError>", "{");
    w.line("let n = self.u16()? as usize;");
    w.line("let bytes = self.take(n)?;");
    w.line("String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)");
    w.close("}");
    w.close("}");
    w.line("");
}

fn emit_struct(w: &mut CodeWriter, s: &StructIr) {
    w.line("#[derive(Debug, Clone, PartialEq)]");
    w.open(&format!("pub struct {}", s.name), "{");
    for f in &s.fields {
        w.line(&format!("pub {}: {},", f.name, rust_type(&f.ty)));
    }
    w.close("}");
    w.line("");
}

fn emit_struct_codec(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("fn encode_{}(buf: &mut Vec<u8>, v: &{})", snake_case(&s.name), s.name), "{");
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.close("}");
    w.line("");

    w.open(
        &format!("fn decode_{}(r: &mut Reader<'_>) -> Result<{}, DecodeError>", snake_case(&s.name), s.name),
        "{",
    );
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("let {}", f.name));
    }
    let args: Vec<String> = s.fields.iter().map(|f| f.name.clone()).collect();
    w.line(&format!("Ok({} {{ {} }})", s.name, args.join(", ")));
    w.close("}");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, plan: &Plan) {
    let rust_ty = rust_type(ty);
    let cap_hint = static_size(plan, ty).unwrap_or(64);

    w.open(&format!("pub fn encode_{}(v: &{rust_ty}) -> Vec<u8>", snake_case(name)), "{");
    w.line(&format!("let mut buf = Vec::with_capacity({cap_hint});"));
    emit_encode_value(w, ty, "v");
    w.line("buf");
    w.close("}");
    w.line("");

    w.open(
        &format!("pub fn decode_{}(data: &[u8]) -> Result<{rust_ty}, DecodeError>", snake_case(name)),
        "{",
    );
    w.line("let mut r = Reader::new(data);");
    emit_decode_value(w, ty, "let v");
    w.line("Ok(v)");
    w.close("}");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        w.open(&format!("match &{expr}"), "{");
        w.line("None => buf.push(0x00),");
        w.open("Some(inner) =>", "{");
        w.line("buf.push(0x01);");
        emit_encode_bare(w, ty, "inner");
        w.close("}");
        w.close("}");
        return;
    }
    emit_encode_bare(w, ty, expr);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::Bool => w.line(&format!("buf.push(u8::from(*{expr}));")),
            PrimitiveKind::Int8 => w.line(&format!("buf.push(*{expr} as u8);")),
            PrimitiveKind::Int16 => w.line(&format!("buf.extend_from_slice(&{expr}.to_le_bytes());")),
            PrimitiveKind::Int32 => w.line(&format!("buf.extend_from_slice(&{expr}.to_le_bytes());")),
            PrimitiveKind::Int64 => w.line(&format!("buf.extend_from_slice(&{expr}.to_le_bytes());")),
            PrimitiveKind::Float32 => w.line(&format!("buf.extend_from_slice(&{expr}.to_le_bytes());")),
            PrimitiveKind::Float64 => w.line(&format!("buf.extend_from_slice(&{expr}.to_le_bytes());")),
            PrimitiveKind::String => {
                w.line(&format!("buf.extend_from_slice(&({expr}.len() as u16).to_le_bytes());"));
                w.line(&format!("buf.extend_from_slice({expr}.as_bytes());"));
            }
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("buf.extend_from_slice(&({expr}.len() as u16).to_le_bytes());"));
            w.open(&format!("for item in {expr}"), "{");
            emit_encode_value(w, element, "item");
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("encode_{}(buf, {expr});", snake_case(name))),
    }
}

fn rust_read_expr(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "r.bool()?",
        PrimitiveKind::Int8 => "r.i8()?",
        PrimitiveKind::Int16 => "r.i16()?",
        PrimitiveKind::Int32 => "r.i32()?",
        PrimitiveKind::Int64 => "r.i64()?",
        PrimitiveKind::Float32 => "r.f32()?",
        PrimitiveKind::Float64 => "r.f64()?",
        PrimitiveKind::String => "r.string()?",
    }
}

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest_decl: &str) {
    if ty.is_optional() {
        w.line("let present = r.take(1)?[0] != 0;");
        w.open(&format!("{dest_decl} = if present"), "{");
        match ty {
            TypeIr::Primitive { kind, .. } => w.line(&format!("Some({})", rust_read_expr(*kind))),
            TypeIr::StructRef { name, .. } => w.line(&format!("Some(decode_{}(r)?)", snake_case(name))),
            TypeIr::Array { .. } => {
                emit_array_decode_block(w, ty, "items");
                w.line("Some(items)");
            }
        }
        w.close_open("}", "else", "{");
        w.line("None");
        w.close("};");
        return;
    }
    match ty {
        TypeIr::Primitive { kind, .. } => w.line(&format!("{dest_decl} = {};", rust_read_expr(*kind))),
        TypeIr::StructRef { name, .. } => w.line(&format!("{dest_decl} = decode_{}(r)?;", snake_case(name))),
        TypeIr::Array { .. } => {
            emit_array_decode_block(w, ty, "items");
            w.line(&format!("{dest_decl} = items;"));
        }
    }
}

/// Emits the element-loop for an array type, binding the result to `var`.
fn emit_array_decode_block(w: &mut CodeWriter, ty: &TypeIr, var: &str) {
    let TypeIr::Array { element, .. } = ty else { unreachable!("caller guarantees an array type") };
    w.line("let n = r.u16()? as usize;");
    w.line(&format!("let mut {var}: Vec<{}> = Vec::with_capacity(n);", rust_type(element)));
    w.open("for _ in 0..n", "{");
    emit_decode_value(w, element, "let item");
    w.line(&format!("{var}.push(item);"));
    w.close("}");
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
    fn renders_struct_and_codec() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let plan = build_plan(&s);
        let code = RustBackend.render(&plan, &GenerateOptions::new(Target::Rust));
        assert!(code.contains("pub struct Device"));
        assert!(code.contains("pub fn encode_message(v: &Device) -> Vec<u8>"));
        assert!(code.contains("pub fn decode_message(data: &[u8]) -> Result<Device, DecodeError>"));
    }

    #[test]
    fn optional_field_uses_option() {
        let s = schema("package demo\ntype Message = *int32\n");
        let plan = build_plan(&s);
        let code = RustBackend.render(&plan, &GenerateOptions::new(Target::Rust));
        assert!(code.contains("Option<i32>"));
    }
}
