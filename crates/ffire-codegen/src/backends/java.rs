use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::buffer_size::static_size;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// Java backend. Optional primitives use the boxed wrapper types (`Integer`,
/// `Boolean`, …) so `null` is available as the absent sentinel; structs,
/// `String`, and `List<T>` are reference types already.
pub struct JavaBackend;

impl Backend for JavaBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{}.java", class_name(package))
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::new();
        w.line(&format!("package {};", dotted_package(&plan.package)));
        w.line("");
        w.line("import java.nio.charset.StandardCharsets;");
        w.line("import java.util.ArrayList;");
        w.line("import java.util.List;");
        w.line("");
        w.open(&format!("public final class {}", class_name(&plan.package)), "{");
        w.line(&format!("private {}() {{}}", class_name(&plan.package)));
        w.line("");
        emit_runtime(&mut w);
        for s in &plan.structs {
            emit_struct(&mut w, s);
        }
        for s in &plan.structs {
            emit_struct_encode(&mut w, s);
            emit_struct_decode(&mut w, s);
        }
        for m in &plan.messages {
            emit_message_codec(&mut w, &m.name, &m.ty, plan);
        }
        w.close("}");
        w.finish()
    }
}

fn class_name(package: &str) -> String {
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
        format!("{out}Codec")
    }
}

fn dotted_package(package: &str) -> String {
    let cleaned: String = package
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '.' })
        .collect();
    if cleaned.is_empty() {
        "ffiregen".to_string()
    } else {
        cleaned
    }
}

fn java_boxed(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "Boolean",
        PrimitiveKind::Int8 => "Byte",
        PrimitiveKind::Int16 => "Short",
        PrimitiveKind::Int32 => "Integer",
        PrimitiveKind::Int64 => "Long",
        PrimitiveKind::Float32 => "Float",
        PrimitiveKind::Float64 => "Double",
        PrimitiveKind::String => "String",
    }
}

fn java_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "boolean",
        PrimitiveKind::Int8 => "byte",
        PrimitiveKind::Int16 => "short",
        PrimitiveKind::Int32 => "int",
        PrimitiveKind::Int64 => "long",
        PrimitiveKind::Float32 => "float",
        PrimitiveKind::Float64 => "double",
        PrimitiveKind::String => "String",
    }
}

fn java_type(ty: &TypeIr) -> String {
    match ty {
        TypeIr::Primitive { kind: PrimitiveKind::String, .. } => "String".to_string(),
        TypeIr::Primitive { kind, optional } => {
            if *optional {
                java_boxed(*kind).to_string()
            } else {
                java_primitive(*kind).to_string()
            }
        }
        TypeIr::Array { element, .. } => format!("List<{}>", java_type(element)),
        TypeIr::StructRef { name, .. } => name.clone(),
    }
}

fn emit_runtime(w: &mut CodeWriter) {
    w.line("public static final class Reader {");
    w.line("    private final byte[] data;");
    w.line("    private int pos;");
    w.line("    public Reader(byte[] data) { this.data = data; this.pos = 0; }");
    w.open("public int readByte()", "{");
    w.line("if (pos >= data.length) throw new IllegalStateException(\"ffire: unexpected end of input\");");
    w.line("return data[pos++] & 0xFF;");
    w.close("}");
    w.open("public byte[] readN(int n)", "{");
    w.line("if (pos + n > data.length) throw new IllegalStateException(\"ffire: unexpected end of input\");");
    w.line("byte[] out = new byte[n];");
    w.line("System.arraycopy(data, pos, out, 0, n);");
    w.line("pos += n;");
    w.line("return out;");
    w.close("}");
    w.open("public int readU16()", "{");
    w.line("byte[] b = readN(2);");
    w.line("return (b[0] & 0xFF) | ((b[1] & 0xFF) << 8);");
    w.close("}");
    w.open("public long readU32()", "{");
    w.line("byte[] b = readN(4);");
    w.line("long v = 0;");
    w.line("for (int i = 0; i < 4; i++) v |= (long) (b[i] & 0xFF) << (8 * i);");
    w.line("return v;");
    w.close("}");
    w.open("public long readU64()", "{");
    w.line("byte[] b = readN(8);");
    w.line("long v = 0;");
    w.line("for (int i = 0; i < 8; i++) v |= (long) (b[i] & 0xFF) << (8 * i);");
    w.line("return v;");
    w.close("}");
    w.line("public String readString() { int n = readU16(); return new String(readN(n), StandardCharsets.UTF_8); }");
    w.line("public int remaining() { return data.length - pos; }");
    w.line("}");
    w.line("");
    w.line("private static void putU16(List<Byte> buf, int v) { buf.add((byte) v); buf.add((byte) (v >> 8)); }");
    w.line("private static void putU32(List<Byte> buf, long v) { for (int i = 0; i < 4; i++) buf.add((byte) (v >> (8 * i))); }");
    w.line("private static void putU64(List<Byte> buf, long v) { for (int i = 0; i < 8; i++) buf.add((byte) (v >> (8 * i))); }");
    w.open("private static void putString(List<Byte> buf, String v)", "{");
    w.line("byte[] bytes = v.getBytes(StandardCharsets.UTF_8);");
    w.line("putU16(buf, bytes.length);");
    w.line("for (byte b : bytes) buf.add(b);");
    w.close("}");
    w.open("private static byte[] toArray(List<Byte> buf)", "{");
    w.line("byte[] out = new byte[buf.size()];");
    w.line("for (int i = 0; i < out.length; i++) out[i] = buf.get(i);");
    w.line("return out;");
    w.close("}");
    w.line("");
}

fn emit_struct(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("public static final class {}", s.name), "{");
    for f in &s.fields {
        w.line(&format!("public {} {};", java_type(&f.ty), f.name));
    }
    w.close("}");
    w.line("");
}

fn emit_struct_encode(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("private static void encode{}(List<Byte> buf, {} v)", s.name, s.name), "{");
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.close("}");
    w.line("");
}

fn emit_struct_decode(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("private static {} decode{}(Reader r)", s.name, s.name), "{");
    w.line(&format!("{} v = new {}();", s.name, s.name));
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, plan: &Plan) {
    let java_ty = java_type(ty);
    let cap_hint = static_size(plan, ty).unwrap_or(64);

    w.open(&format!("public static byte[] encode{name}({java_ty} v)"), "{");
    w.line(&format!("List<Byte> buf = new ArrayList<>({cap_hint});"));
    emit_encode_value(w, ty, "v");
    w.line("return toArray(buf);");
    w.close("}");
    w.line("");

    w.open(&format!("public static {java_ty} decode{name}(byte[] data)"), "{");
    w.line("Reader r = new Reader(data);");
    w.line(&format!("{java_ty} v;"));
    emit_decode_value_top(w, ty, "v");
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_decode_value_top(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    // Java locals can't be assigned inside a nested block and read after
    // unless definitely assigned on every path; the generated decoders
    // always assign on every branch, which javac accepts.
    emit_decode_value(w, ty, dest);
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        w.open(&format!("if ({expr} == null)"), "{");
        w.line("buf.add((byte) 0x00);");
        w.close_open("}", "else", "{");
        w.line("buf.add((byte) 0x01);");
        emit_encode_bare(w, ty, expr);
        w.close("}");
        return;
    }
    emit_encode_bare(w, ty, expr);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::Bool => w.line(&format!("buf.add((byte) ({expr} ? 1 : 0));")),
            PrimitiveKind::Int8 => w.line(&format!("buf.add((byte) ({expr}));")),
            PrimitiveKind::Int16 => w.line(&format!("putU16(buf, {expr});")),
            PrimitiveKind::Int32 => w.line(&format!("putU32(buf, {expr});")),
            PrimitiveKind::Int64 => w.line(&format!("putU64(buf, {expr});")),
            PrimitiveKind::Float32 => w.line(&format!("putU32(buf, Float.floatToRawIntBits({expr}) & 0xFFFFFFFFL);")),
            PrimitiveKind::Float64 => w.line(&format!("putU64(buf, Double.doubleToRawLongBits({expr}));")),
            PrimitiveKind::String => w.line(&format!("putString(buf, {expr});")),
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("putU16(buf, {expr}.size());"));
            w.open(&format!("for ({} item : {expr})", java_type(element)), "{");
            emit_encode_value(w, element, "item");
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("encode{name}(buf, {expr});")),
    }
}

fn java_read_expr(kind: PrimitiveKind) -> String {
    match kind {
        PrimitiveKind::Bool => "r.readByte() != 0".to_string(),
        PrimitiveKind::Int8 => "(byte) r.readByte()".to_string(),
        PrimitiveKind::Int16 => "(short) r.readU16()".to_string(),
        PrimitiveKind::Int32 => "(int) r.readU32()".to_string(),
        PrimitiveKind::Int64 => "r.readU64()".to_string(),
        PrimitiveKind::Float32 => "Float.intBitsToFloat((int) r.readU32())".to_string(),
        PrimitiveKind::Float64 => "Double.longBitsToDouble(r.readU64())".to_string(),
        PrimitiveKind::String => "r.readString()".to_string(),
    }
}

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    if ty.is_optional() {
        w.open("if (r.readByte() == 0)", "{");
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
        TypeIr::Primitive { kind, .. } => w.line(&format!("{dest} = {};", java_read_expr(*kind))),
        TypeIr::Array { element, .. } => {
            w.open("{", "");
            w.line("int n = r.readU16();");
            w.line(&format!("List<{}> items = new ArrayList<>(n);", java_type(element)));
            w.open("for (int i = 0; i < n; i++)", "{");
            w.line(&format!("{} item;", java_type(element)));
            emit_decode_value(w, element, "item");
            w.line("items.add(item);");
            w.close("}");
            w.line(&format!("{dest} = items;"));
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("{dest} = decode{name}(r);")),
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
        let code = JavaBackend.render(&plan, &GenerateOptions::new(Target::Java));
        assert!(code.contains("package demo;"));
        assert!(code.contains("public static final class Device"));
        assert!(code.contains("public static byte[] encodeMessage"));
    }

    #[test]
    fn optional_primitive_uses_boxed_type() {
        let s = schema("package demo\ntype Message = *int32\n");
        let plan = build_plan(&s);
        let code = JavaBackend.render(&plan, &GenerateOptions::new(Target::Java));
        assert!(code.contains("Integer v"));
    }
}
