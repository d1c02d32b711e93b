use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::buffer_size::static_size;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// Dart backend. `?` marks every optional (primitive, `List`, or class
/// instance alike) the same way Swift's does; `dart:typed_data`'s
/// `ByteData` gives little-endian reads/writes without hand-rolled shifts.
pub struct DartBackend;

impl Backend for DartBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{}.dart", snake_case_package(package))
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::new();
        w.line("import 'dart:convert';");
        w.line("import 'dart:typed_data';");
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

fn snake_case_package(package: &str) -> String {
    let cleaned: String =
        package.chars().map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' }).collect();
    if cleaned.is_empty() {
        "ffiregen".to_string()
    } else {
        cleaned
    }
}

fn dart_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Int8 | PrimitiveKind::Int16 | PrimitiveKind::Int32 | PrimitiveKind::Int64 => "int",
        PrimitiveKind::Float32 | PrimitiveKind::Float64 => "double",
        PrimitiveKind::String => "String",
    }
}

fn dart_type(ty: &TypeIr) -> String {
    let base = match ty {
        TypeIr::Primitive { kind, .. } => dart_primitive(*kind).to_string(),
        TypeIr::Array { element, .. } => format!("List<{}>", dart_type(element)),
        TypeIr::StructRef { name, .. } => name.clone(),
    };
    if ty.is_optional() {
        format!("{base}?")
    } else {
        base
    }
}

fn emit_runtime(w: &mut CodeWriter) {
    w.open("class FfireWriter", "{");
    w.line("final BytesBuilder _buf = BytesBuilder();");
    w.line("Uint8List toBytes() => _buf.toBytes();");
    w.line("void putBool(bool v) => _buf.addByte(v ? 1 : 0);");
    w.open("void putU16(int v)", "{");
    w.line("final b = ByteData(2)..setUint16(0, v, Endian.little);");
    w.line("_buf.add(b.buffer.asUint8List());");
    w.close("}");
    w.open("void putI32(int v)", "{");
    w.line("final b = ByteData(4)..setInt32(0, v, Endian.little);");
    w.line("_buf.add(b.buffer.asUint8List());");
    w.close("}");
    w.open("void putI64(int v)", "{");
    w.line("final b = ByteData(8)..setInt64(0, v, Endian.little);");
    w.line("_buf.add(b.buffer.asUint8List());");
    w.close("}");
    w.line("void putI8(int v) => _buf.addByte(v & 0xFF);");
    w.open("void putI16(int v)", "{");
    w.line("final b = ByteData(2)..setInt16(0, v, Endian.little);");
    w.line("_buf.add(b.buffer.asUint8List());");
    w.close("}");
    w.open("void putF32(double v)", "{");
    w.line("final b = ByteData(4)..setFloat32(0, v, Endian.little);");
    w.line("_buf.add(b.buffer.asUint8List());");
    w.close("}");
    w.open("void putF64(double v)", "{");
    w.line("final b = ByteData(8)..setFloat64(0, v, Endian.little);");
    w.line("_buf.add(b.buffer.asUint8List());");
    w.close("}");
    w.open("void putString(String v)", "{");
    w.line("final bytes = utf8.encode(v);");
    w.line("putU16(bytes.length);");
    w.line("_buf.add(bytes);");
    w.close("}");
    w.close("}");
    w.line("");
    w.open("class FfireReader", "{");
    w.line("FfireReader(Uint8List data) : _data = ByteData.sublistView(data), _len = data.length;");
    w.line("final ByteData _data;");
    w.line("final int _len;");
    w.line("int _pos = 0;");
    w.open("void _need(int n)", "{");
    w.line("if (_pos + n > _len) throw StateError('ffire: unexpected end of input');");
    w.close("}");
    w.line("bool readBool() { _need(1); final v = _data.getUint8(_pos); _pos += 1; return v != 0; }");
    w.line("int readI8() { _need(1); final v = _data.getInt8(_pos); _pos += 1; return v; }");
    w.line("int readI16() { _need(2); final v = _data.getInt16(_pos, Endian.little); _pos += 2; return v; }");
    w.line("int readU16() { _need(2); final v = _data.getUint16(_pos, Endian.little); _pos += 2; return v; }");
    w.line("int readI32() { _need(4); final v = _data.getInt32(_pos, Endian.little); _pos += 4; return v; }");
    w.line("int readI64() { _need(8); final v = _data.getInt64(_pos, Endian.little); _pos += 8; return v; }");
    w.line("double readF32() { _need(4); final v = _data.getFloat32(_pos, Endian.little); _pos += 4; return v; }");
    w.line("double readF64() { _need(8); final v = _data.getFloat64(_pos, Endian.little); _pos += 8; return v; }");
    w.open("String readString()", "{");
    w.line("final n = readU16();");
    w.line("_need(n);");
    w.line("final bytes = _data.buffer.asUint8List(_data.offsetInBytes + _pos, n);");
    w.line("_pos += n;");
    w.line("return utf8.decode(bytes);");
    w.close("}");
    w.line("int get remaining => _len - _pos;");
    w.close("}");
    w.line("");
}

fn emit_struct(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("class {}", s.name), "{");
    w.line(&format!("{}({{", s.name));
    for f in &s.fields {
        let req = if f.ty.is_optional() { "" } else { "required " };
        w.line(&format!("    {req}this.{},", f.name));
    }
    w.line("});");
    for f in &s.fields {
        w.line(&format!("final {} {};", dart_type(&f.ty), f.name));
    }
    w.close("}");
    w.line("");
}

fn emit_struct_codec(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("void _encode{}(FfireWriter w, {} v)", s.name, s.name), "{");
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.close("}");
    w.line("");

    w.open(&format!("{} _decode{}(FfireReader r)", s.name, s.name), "{");
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("final {}", f.name));
    }
    let args: Vec<String> = s.fields.iter().map(|f| format!("{}: {}", f.name, f.name)).collect();
    w.line(&format!("return {}({});", s.name, args.join(", ")));
    w.close("}");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, plan: &Plan) {
    let dart_ty = dart_type(ty);
    let cap_hint = static_size(plan, ty).unwrap_or(64);

    w.open(&format!("Uint8List encode{name}({dart_ty} v)"), "{");
    w.line("final w = FfireWriter();");
    w.line(&format!("// hint: typical encoding is ~{cap_hint} bytes"));
    emit_encode_value(w, ty, "v");
    w.line("return w.toBytes();");
    w.close("}");
    w.line("");

    w.open(&format!("{dart_ty} decode{name}(Uint8List data)"), "{");
    w.line("final r = FfireReader(data);");
    emit_decode_value(w, ty, "final v");
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        w.open(&format!("if ({expr} == null)"), "{");
        w.line("w.putBool(false);");
        w.close_open("}", "else", "{");
        w.line("w.putBool(true);");
        emit_encode_bare(w, ty, expr);
        w.close("}");
        return;
    }
    emit_encode_bare(w, ty, expr);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::Bool => w.line(&format!("w.putBool({expr});")),
            PrimitiveKind::Int8 => w.line(&format!("w.putI8({expr});")),
            PrimitiveKind::Int16 => w.line(&format!("w.putI16({expr});")),
            PrimitiveKind::Int32 => w.line(&format!("w.putI32({expr});")),
            PrimitiveKind::Int64 => w.line(&format!("w.putI64({expr});")),
            PrimitiveKind::Float32 => w.line(&format!("w.putF32({expr});")),
            PrimitiveKind::Float64 => w.line(&format!("w.putF64({expr});")),
            PrimitiveKind::String => w.line(&format!("w.putString({expr});")),
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("w.putU16({expr}.length);"));
            w.open(&format!("for (final item in {expr})"), "{");
            emit_encode_value(w, element, "item");
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("_encode{name}(w, {expr});")),
    }
}

fn dart_read_expr(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "r.readBool()",
        PrimitiveKind::Int8 => "r.readI8()",
        PrimitiveKind::Int16 => "r.readI16()",
        PrimitiveKind::Int32 => "r.readI32()",
        PrimitiveKind::Int64 => "r.readI64()",
        PrimitiveKind::Float32 => "r.readF32()",
        PrimitiveKind::Float64 => "r.readF64()",
        PrimitiveKind::String => "r.readString()",
    }
}

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest_decl: &str) {
    if ty.is_optional() {
        let var = dest_decl.trim_start_matches("final ").to_string();
        w.line(&format!("{} {var};", dart_type(ty)));
        w.open("if (!r.readBool())", "{");
        w.line(&format!("{var} = null;"));
        w.close_open("}", "else", "{");
        emit_decode_bare(w, ty, &var);
        w.close("}");
        return;
    }
    emit_decode_bare(w, ty, dest_decl);
}

fn emit_decode_bare(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => w.line(&format!("{dest} = {};", dart_read_expr(*kind))),
        TypeIr::Array { element, .. } => {
            let var = dest.trim_start_matches("final ").to_string();
            w.line(&format!("final n_{var} = r.readU16();"));
            w.line(&format!("final items_{var} = <{}>[];", dart_type(element)));
            w.open(&format!("for (var i = 0; i < n_{var}; i++)"), "{");
            emit_decode_value(w, element, "final item");
            w.line(&format!("items_{var}.add(item);"));
            w.close("}");
            w.line(&format!("{dest} = items_{var};"));
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("{dest} = _decode{name}(r);")),
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
        let code = DartBackend.render(&plan, &GenerateOptions::new(Target::Dart));
        assert!(code.contains("class Device"));
        assert!(code.contains("Uint8List encodeMessage(Device v)"));
        assert!(code.contains("Device decodeMessage(Uint8List data)"));
    }
}
