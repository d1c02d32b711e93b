use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::buffer_size::static_size;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// C# backend. Nullable value types (`int?`, `bool?`, …) carry the
/// optional-primitive case; classes are reference types already, so an
/// optional struct or array is just the plain class/`List<T>` with `null`
/// standing in for absent — no extra wrapper needed.
pub struct CSharpBackend;

impl Backend for CSharpBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{}.cs", pascal_namespace(package))
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::new();
        w.line("using System;");
        w.line("using System.Collections.Generic;");
        w.line("using System.Text;");
        w.line("");
        w.open(&format!("namespace {}", pascal_namespace(&plan.package)), "{");
        emit_runtime(&mut w);
        for s in &plan.structs {
            emit_struct(&mut w, s);
        }
        emit_codec_class(&mut w, plan);
        w.close("}");
        w.finish()
    }
}

fn pascal_namespace(package: &str) -> String {
    let mut out = String::new();
    for part in package.split(|c: char| !c.is_alphanumeric()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        "FfireGen".to_string()
    } else {
        out
    }
}

fn cs_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Int8 => "sbyte",
        PrimitiveKind::Int16 => "short",
        PrimitiveKind::Int32 => "int",
        PrimitiveKind::Int64 => "long",
        PrimitiveKind::Float32 => "float",
        PrimitiveKind::Float64 => "double",
        PrimitiveKind::String => "string",
    }
}

fn cs_type(ty: &TypeIr) -> String {
    match ty {
        TypeIr::Primitive { kind: PrimitiveKind::String, .. } => "string".to_string(),
        TypeIr::Primitive { kind, optional } => {
            let base = cs_primitive(*kind);
            if *optional {
                format!("{base}?")
            } else {
                base.to_string()
            }
        }
        TypeIr::Array { element, .. } => format!("List<{}>", cs_type(element)),
        TypeIr::StructRef { name, .. } => name.clone(),
    }
}

fn emit_runtime(w: &mut CodeWriter) {
    w.open("internal static class FfireCodec", "{");
    w.line("public static void PutU16(List<byte> buf, ushort v) { buf.Add((byte)v); buf.Add((byte)(v >> 8)); }");
    w.line("public static void PutU32(List<byte> buf, uint v) { for (int i = 0; i < 4; i++) buf.Add((byte)(v >> (8 * i))); }");
    w.line("public static void PutU64(List<byte> buf, ulong v) { for (int i = 0; i < 8; i++) buf.Add((byte)(v >> (8 * i))); }");
    w.line("public static void PutString(List<byte> buf, string v) { var bytes = Encoding.UTF8.GetBytes(v); PutU16(buf, (ushort)bytes.Length); buf.AddRange(bytes); }");
    w.line("");
    w.open("public sealed class Reader", "{");
    w.line("private readonly byte[] _data;");
    w.line("private int _pos;");
    w.open("public Reader(byte[] data)", "{");
    w.line("_data = data;");
    w.line("_pos = 0;");
    w.close("}");
    w.open("public byte ReadByte()", "{");
    w.line("if (_pos >= _data.Length) throw new InvalidOperationException(\"ffire: unexpected end of input\");");
    w.line("return _data[_pos++];");
    w.close("}");
    w.open("public byte[] ReadN(int n)", "{");
    w.line("if (_pos + n > _data.Length) throw new InvalidOperationException(\"ffire: unexpected end of input\");");
    w.line("var slice = new byte[n];");
    w.line("Array.Copy(_data, _pos, slice, 0, n);");
    w.line("_pos += n;");
    w.line("return slice;");
    w.close("}");
    w.open("public ushort ReadU16()", "{");
    w.line("var b = ReadN(2);");
    w.line("return (ushort)(b[0] | (b[1] << 8));");
    w.close("}");
    w.open("public uint ReadU32()", "{");
    w.line("var b = ReadN(4);");
    w.line("return (uint)(b[0] | (b[1] << 8) | (b[2] << 16) | (b[3] << 24));");
    w.close("}");
    w.open("public ulong ReadU64()", "{");
    w.line("var b = ReadN(8);");
    w.line("ulong v = 0;");
    w.line("for (int i = 0; i < 8; i++) v |= (ulong)b[i] << (8 * i);");
    w.line("return v;");
    w.close("}");
    w.line("public string ReadString() { var n = ReadU16(); var b = ReadN(n); return Encoding.UTF8.GetString(b); }");
    w.line("public int Remaining => _data.Length - _pos;");
    w.close("}");
    w.close("}");
    w.line("");
}

fn emit_struct(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("public sealed class {}", s.name), "{");
    for f in &s.fields {
        w.line(&format!("public {} {} {{ get; set; }}", cs_type(&f.ty), f.name));
    }
    w.close("}");
    w.line("");
}

fn emit_codec_class(w: &mut CodeWriter, plan: &Plan) {
    w.open("public static class Codec", "{");
    for s in &plan.structs {
        emit_struct_encode(w, s);
        emit_struct_decode(w, s);
    }
    for m in &plan.messages {
        emit_message_codec(w, &m.name, &m.ty, plan);
    }
    w.close("}");
}

fn emit_struct_encode(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("internal static void Encode{}(List<byte> buf, {} v)", s.name, s.name), "{");
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.close("}");
    w.line("");
}

fn emit_struct_decode(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("internal static {} Decode{}(Reader r)", s.name, s.name), "{");
    w.line(&format!("var v = new {}();", s.name));
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, plan: &Plan) {
    let cs_ty = cs_type(ty);
    let cap_hint = static_size(plan, ty).unwrap_or(64);

    w.open(&format!("public static byte[] Encode{name}({cs_ty} v)"), "{");
    w.line(&format!("var buf = new List<byte>({cap_hint});"));
    emit_encode_value(w, ty, "v");
    w.line("return buf.ToArray();");
    w.close("}");
    w.line("");

    w.open(&format!("public static {cs_ty} Decode{name}(byte[] data)"), "{");
    w.line("var r = new Reader(data);");
    w.line(&format!("{cs_ty} v = default;"));
    emit_decode_value(w, ty, "v");
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        w.open(&format!("if ({expr} == null)"), "{");
        w.line("buf.Add(0x00);");
        w.close_open("}", "else", "{");
        w.line("buf.Add(0x01);");
        match ty {
            TypeIr::Primitive { kind, .. } if *kind != PrimitiveKind::String => {
                emit_encode_bare(w, ty, &format!("{expr}.Value"));
            }
            _ => emit_encode_bare(w, ty, expr),
        }
        w.close("}");
        return;
    }
    emit_encode_bare(w, ty, expr);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::Bool => w.line(&format!("buf.Add((byte)({expr} ? 1 : 0));")),
            PrimitiveKind::Int8 => w.line(&format!("buf.Add(unchecked((byte){expr}));")),
            PrimitiveKind::Int16 => w.line(&format!("FfireCodec.PutU16(buf, unchecked((ushort){expr}));")),
            PrimitiveKind::Int32 => w.line(&format!("FfireCodec.PutU32(buf, unchecked((uint){expr}));")),
            PrimitiveKind::Int64 => w.line(&format!("FfireCodec.PutU64(buf, unchecked((ulong){expr}));")),
            PrimitiveKind::Float32 => {
                w.line(&format!("FfireCodec.PutU32(buf, BitConverter.ToUInt32(BitConverter.GetBytes({expr}), 0));"));
            }
            PrimitiveKind::Float64 => {
                w.line(&format!("FfireCodec.PutU64(buf, BitConverter.ToUInt64(BitConverter.GetBytes({expr}), 0));"));
            }
            PrimitiveKind::String => w.line(&format!("FfireCodec.PutString(buf, {expr});")),
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("FfireCodec.PutU16(buf, (ushort){expr}.Count);"));
            w.open(&format!("foreach (var item in {expr})"), "{");
            emit_encode_value(w, element, "item");
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => {
            w.line(&format!("Encode{name}(buf, {expr});"));
        }
    }
}

fn cs_read_expr(kind: PrimitiveKind) -> String {
    match kind {
        PrimitiveKind::Bool => "r.ReadByte() != 0".to_string(),
        PrimitiveKind::Int8 => "unchecked((sbyte)r.ReadByte())".to_string(),
        PrimitiveKind::Int16 => "unchecked((short)r.ReadU16())".to_string(),
        PrimitiveKind::Int32 => "unchecked((int)r.ReadU32())".to_string(),
        PrimitiveKind::Int64 => "unchecked((long)r.ReadU64())".to_string(),
        PrimitiveKind::Float32 => "BitConverter.ToSingle(BitConverter.GetBytes(r.ReadU32()), 0)".to_string(),
        PrimitiveKind::Float64 => "BitConverter.ToDouble(BitConverter.GetBytes(r.ReadU64()), 0)".to_string(),
        PrimitiveKind::String => "r.ReadString()".to_string(),
    }
}

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    if ty.is_optional() {
        w.open("if (r.ReadByte() == 0)", "{");
        w.line(&format!("{dest} = null;"));
        w.close_open("}", "else", "{");
        emit_decode_bare(w, ty, dest);
        w.close("}");
        return;
    }
    emit_decode_bare(w, ty, dest);
}

fn emit_decode_bare(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => w.line(&format!("{dest} = {};", cs_read_expr(*kind))),
        TypeIr::Array { element, .. } => {
            w.open("{", "");
            w.line("var n = r.ReadU16();");
            w.line(&format!("var items = new List<{}>(n);", cs_type(element)));
            w.open("for (var i = 0; i < n; i++)", "{");
            w.line(&format!("{} item;", cs_type(element)));
            emit_decode_value(w, element, "item");
            w.line("items.Add(item);");
            w.close("}");
            w.line(&format!("{dest} = items;"));
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("{dest} = Decode{name}(r);")),
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
    fn renders_class_and_codec() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let plan = build_plan(&s);
        let code = CSharpBackend.render(&plan, &GenerateOptions::new(Target::CSharp));
        assert!(code.contains("namespace Demo"));
        assert!(code.contains("public sealed class Device"));
        assert!(code.contains("public static byte[] EncodeMessage(Device v)"));
        assert!(code.contains("public static Device DecodeMessage(byte[] data)"));
    }

    #[test]
    fn optional_primitive_uses_nullable_value_type() {
        let s = schema("package demo\ntype Message = *int32\n");
        let plan = build_plan(&s);
        let code = CSharpBackend.render(&plan, &GenerateOptions::new(Target::CSharp));
        assert!(code.contains("int? v"));
    }
}
