use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::buffer_size::static_size;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// Swift backend. `?` is the native optional marker for every case
/// (primitive, array, struct alike), matching §9's "use native nullability
/// where it exists" guidance directly.
pub struct SwiftBackend;

impl Backend for SwiftBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{}.swift", sanitize(package))
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::new();
        w.line("import Foundation");
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

fn sanitize(package: &str) -> String {
    let cleaned: String = package.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect();
    if cleaned.is_empty() {
        "FfireGen".to_string()
    } else {
        cleaned
    }
}

fn swift_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "Bool",
        PrimitiveKind::Int8 => "Int8",
        PrimitiveKind::Int16 => "Int16",
        PrimitiveKind::Int32 => "Int32",
        PrimitiveKind::Int64 => "Int64",
        PrimitiveKind::Float32 => "Float",
        PrimitiveKind::Float64 => "Double",
        PrimitiveKind::String => "String",
    }
}

fn swift_type(ty: &TypeIr) -> String {
    let base = match ty {
        TypeIr::Primitive { kind, .. } => swift_primitive(*kind).to_string(),
        TypeIr::Array { element, .. } => format!("[{}]", swift_type_bare(element)),
        TypeIr::StructRef { name, .. } => name.clone(),
    };
    if ty.is_optional() {
        format!("{base}?")
    } else {
        base
    }
}

fn swift_type_bare(ty: &TypeIr) -> String {
    swift_type(ty)
}

fn emit_runtime(w: &mut CodeWriter) {
    w.line("enum FfireError: Error { case unexpectedEOF, invalidUTF8 }");
    w.line("");
    w.open("final class FfireWriter", "{");
    w.line("var buf: [UInt8] = []");
    w.line("func putBool(_ v: Bool) { buf.append(v ? 1 : 0) }");
    w.line("func putU8(_ v: UInt8) { buf.append(v) }");
    w.open("func putU16(_ v: UInt16)", "{");
    w.line("buf.append(UInt8(v & 0xFF))");
    w.line("buf.append(UInt8((v >> 8) & 0xFF))");
    w.close("}");
    w.open("func putU32(_ v: UInt32)", "{");
    w.line("for i in 0..<4 { buf.append(UInt8((v >> (8 * UInt32(i))) & 0xFF)) }");
    w.close("}");
    w.open("func putU64(_ v: UInt64)", "{");
    w.line("for i in 0..<8 { buf.append(UInt8((v >> (8 * UInt64(i))) & 0xFF)) }");
    w.close("}");
    w.line("func putI8(_ v: Int8) { putU8(UInt8(bitPattern: v)) }");
    w.line("func putI16(_ v: Int16) { putU16(UInt16(bitPattern: v)) }");
    w.line("func putI32(_ v: Int32) { putU32(UInt32(bitPattern: v)) }");
    w.line("func putI64(_ v: Int64) { putU64(UInt64(bitPattern: v)) }");
    w.line("func putF32(_ v: Float) { putU32(v.bitPattern) }");
    w.line("func putF64(_ v: Double) { putU64(v.bitPattern) }");
    w.open("func putString(_ v: String)", "{");
    w.line("let bytes = Array(v.utf8)");
    w.line("putU16(UInt16(bytes.count))");
    w.line("buf.append(contentsOf: bytes)");
    w.close("}");
    w.close("}");
    w.line("");
    w.open("final class FfireReader", "{");
    w.line("let data: [UInt8]");
    w.line("var pos: Int = 0");
    w.line("init(_ data: [UInt8]) { self.data = data }");
    w.open("func readByte() throws -> UInt8", "{");
    w.line("guard pos < data.count else { throw FfireError.unexpectedEOF }");
    w.line("let b = data[pos]; pos += 1; return b");
    w.close("}");
    w.open("func readN(_ n: Int) throws -> [UInt8]", "{");
    w.line("guard pos + n <= data.count else { throw FfireError.unexpectedEOF }");
    w.line("let b = Array(data[pos..<pos + n]); pos += n; return b");
    w.close("}");
    w.open("func readU16() throws -> UInt16", "{");
    w.line("let b = try readN(2)");
    w.line("return UInt16(b[0]) | (UInt16(b[1]) << 8)");
    w.close("}");
    w.open("func readU32() throws -> UInt32", "{");
    w.line("let b = try readN(4)");
    w.line("var v: UInt32 = 0");
    w.line("for i in 0..<4 { v |= UInt32(b[i]) << (8 * UInt32(i)) }");
    w.line("return v");
    w.close("}");
    w.open("func readU64() throws -> UInt64", "{");
    w.line("let b = try readN(8)");
    w.line("var v: UInt64 = 0");
    w.line("for i in 0..<8 { v |= UInt64(b[i]) << (8 * UInt64(i)) }");
    w.line("return v");
    w.close("}");
    w.line("func readBool() throws -> Bool { try readByte() != 0 }");
    w.line("func readI8() throws -> Int8 { Int8(bitPattern: try readByte()) }");
    w.line("func readI16() throws -> Int16 { Int16(bitPattern: try readU16()) }");
    w.line("func readI32() throws -> Int32 { Int32(bitPattern: try readU32()) }");
    w.line("func readI64() throws -> Int64 { Int64(bitPattern: try readU64()) }");
    w.line("func readF32() throws -> Float { Float(bitPattern: try readU32()) }");
    w.line("func readF64() throws -> Double { Double(bitPattern: try readU64()) }");
    w.open("func readString() throws -> String", "{");
    w.line("let n = try readU16()");
    w.line("let bytes = try readN(Int(n))");
    w.line("guard let s = String(bytes: bytes, encoding: .utf8) else { throw FfireError.invalidUTF8 }");
    w.line("return s");
    w.close("}");
    w.line("var remaining: Int { data.count - pos }");
    w.close("}");
    w.line("");
}

fn emit_struct(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("struct {}", s.name), "{");
    for f in &s.fields {
        let default = if f.ty.is_optional() { " = nil" } else { "" };
        w.line(&format!("var {}: {}{}", f.name, swift_type(&f.ty), default));
    }
    w.close("}");
    w.line("");
}

fn emit_struct_codec(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("func encode{}(_ w: FfireWriter, _ v: {})", s.name, s.name), "{");
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.close("}");
    w.line("");

    w.open(&format!("func decode{}(_ r: FfireReader) throws -> {}", s.name, s.name), "{");
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("let {}", f.name));
    }
    let args: Vec<String> = s.fields.iter().map(|f| format!("{}: {}", f.name, f.name)).collect();
    w.line(&format!("return {}({})", s.name, args.join(", ")));
    w.close("}");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, plan: &Plan) {
    let swift_ty = swift_type(ty);
    let cap_hint = static_size(plan, ty).unwrap_or(64);

    w.open(&format!("func encode{name}(_ v: {swift_ty}) -> [UInt8]"), "{");
    w.line("let w = FfireWriter()");
    w.line(&format!("w.buf.reserveCapacity({cap_hint})"));
    emit_encode_value(w, ty, "v");
    w.line("return w.buf");
    w.close("}");
    w.line("");

    w.open(&format!("func decode{name}(_ data: [UInt8]) throws -> {swift_ty}"), "{");
    w.line("let r = FfireReader(data)");
    emit_decode_value(w, ty, "let v");
    w.line("return v");
    w.close("}");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        w.open(&format!("if let unwrapped = {expr}"), "{");
        w.line("w.putU8(0x01)");
        emit_encode_bare(w, ty, "unwrapped");
        w.close_open("}", "else", "{");
        w.line("w.putU8(0x00)");
        w.close("}");
        return;
    }
    emit_encode_bare(w, ty, expr);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::Bool => w.line(&format!("w.putBool({expr})")),
            PrimitiveKind::Int8 => w.line(&format!("w.putI8({expr})")),
            PrimitiveKind::Int16 => w.line(&format!("w.putI16({expr})")),
            PrimitiveKind::Int32 => w.line(&format!("w.putI32({expr})")),
            PrimitiveKind::Int64 => w.line(&format!("w.putI64({expr})")),
            PrimitiveKind::Float32 => w.line(&format!("w.putF32({expr})")),
            PrimitiveKind::Float64 => w.line(&format!("w.putF64({expr})")),
            PrimitiveKind::String => w.line(&format!("w.putString({expr})")),
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("w.putU16(UInt16({expr}.count))"));
            w.open(&format!("for item in {expr}"), "{");
            emit_encode_value(w, element, "item");
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("encode{name}(w, {expr})")),
    }
}

/// `dest_decl` is either `"let name"` (fresh binding) or `"var name"` /
/// `"name"` (existing mutable binding to assign into).
fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest_decl: &str) {
    if ty.is_optional() {
        let var_name = dest_decl.trim_start_matches("let ").trim_start_matches("var ").to_string();
        w.line(&format!("var {var_name}: {}", swift_type(ty)));
        w.open("if try r.readByte() == 0", "{");
        w.line(&format!("{var_name} = nil"));
        w.close_open("}", "else", "{");
        emit_decode_bare(w, ty, &var_name);
        w.close("}");
        return;
    }
    emit_decode_bare(w, ty, dest_decl);
}

/// `dest` is either a fresh `"let name"`/`"var name"` declaration or a bare
/// name referring to an already-declared mutable variable; both read the
/// same as `{dest} = {rhs}` in Swift.
fn emit_decode_bare(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    let assign = |w: &mut CodeWriter, rhs: String| w.line(&format!("{dest} = {rhs}"));
    match ty {
        TypeIr::Primitive { kind, .. } => assign(w, format!("try {}", swift_read_expr(*kind))),
        TypeIr::Array { element, .. } => {
            let var = dest.trim_start_matches("let ").trim_start_matches("var ").to_string();
            w.line(&format!("var items_{var}: [{}] = []", swift_type_bare(element)));
            w.line(&format!("let n_{var} = try r.readU16()"));
            w.open(&format!("for _ in 0..<n_{var}"), "{");
            emit_decode_value(w, element, "let item");
            w.line(&format!("items_{var}.append(item)"));
            w.close("}");
            assign(w, format!("items_{var}"));
        }
        TypeIr::StructRef { name, .. } => assign(w, format!("try decode{name}(r)")),
    }
}

fn swift_read_expr(kind: PrimitiveKind) -> &'static str {
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
        let code = SwiftBackend.render(&plan, &GenerateOptions::new(Target::Swift));
        assert!(code.contains("struct Device"));
        assert!(code.contains("func encodeMessage(_ v: Device) -> [UInt8]"));
        assert!(code.contains("func decodeMessage(_ data: [UInt8]) throws -> Device"));
    }

    #[test]
    fn optional_field_defaults_to_nil() {
        let s = schema("package demo\ntype Message = Device\ntype Device struct {\n  Nickname *string\n}\n");
        let plan = build_plan(&s);
        let code = SwiftBackend.render(&plan, &GenerateOptions::new(Target::Swift));
        assert!(code.contains("var Nickname: String? = nil"));
    }
}
