use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::buffer_size::static_size;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// Zig backend. `?T` is the native optional for every case; decode errors
/// use Zig's error-union return type (`!T`) rather than a sentinel, per
/// the target's idiomatic error-handling convention.
pub struct ZigBackend;

impl Backend for ZigBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{}.zig", snake_case(package))
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::new();
        w.line("const std = @import(\"std\");");
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

fn zig_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Int8 => "i8",
        PrimitiveKind::Int16 => "i16",
        PrimitiveKind::Int32 => "i32",
        PrimitiveKind::Int64 => "i64",
        PrimitiveKind::Float32 => "f32",
        PrimitiveKind::Float64 => "f64",
        PrimitiveKind::String => "[]const u8",
    }
}

fn zig_type(ty: &TypeIr) -> String {
    let base = match ty {
        TypeIr::Primitive { kind, .. } => zig_primitive(*kind).to_string(),
        TypeIr::Array { element, .. } => format!("[]{}", zig_type(element)),
        TypeIr::StructRef { name, .. } => name.clone(),
    };
    if ty.is_optional() {
        format!("?{base}")
    } else {
        base
    }
}

fn emit_runtime(w: &mut CodeWriter) {
    w.line("pub const DecodeError = error{ UnexpectedEof, InvalidUtf8 };");
    w.line("");
    w.open("pub const Reader = struct", "{");
    w.line("data: []const u8,");
    w.line("pos: usize = 0,");
    w.line("");
    w.open("pub fn take(self: *Reader, n: usize) DecodeError![]const u8", "{");
    w.line("if (self.pos + n > self.data.len) return DecodeError.UnexpectedEof;");
    w.line("const out = self.data[self.pos .. self.pos + n];");
    w.line("self.pos += n;");
    w.line("return out;");
    w.close("}");
    w.line("");
    w.open("pub fn readBool(self: *Reader) DecodeError!bool", "{");
    w.line("return (try self.take(1))[0] != 0;");
    w.close("}");
    w.line("pub fn readI8(self: *Reader) DecodeError!i8 { return @bitCast((try self.take(1))[0]); }");
    w.open("pub fn readI16(self: *Reader) DecodeError!i16", "{");
    w.line("const b = try self.take(2);");
    w.line("return std.mem.readInt(i16, b[0..2], .little);");
    w.close("}");
    w.open("pub fn readI32(self: *Reader) DecodeError!i32", "{");
    w.line("const b = try self.take(4);");
    w.line("return std.mem.readInt(i32, b[0..4], .little);");
    w.close("}");
    w.open("pub fn readI64(self: *Reader) DecodeError!i64", "{");
    w.line("const b = try self.take(8);");
    w.line("return std.mem.readInt(i64, b[0..8], .little);");
    w.close("}");
    w.open("pub fn readU16(self: *Reader) DecodeError!u16", "{");
    w.line("const b = try self.take(2);");
    w.line("return std.mem.readInt(u16, b[0..2], .little);");
    w.close("}");
    w.open("pub fn readF32(self: *Reader) DecodeError!f32", "{");
    w.line("const bits = try self.readU32();");
    w.line("return @bitCast(bits);");
    w.close("}");
    w.open("pub fn readU32(self: *Reader) DecodeError!u32", "{");
    w.line("const b = try self.take(4);");
    w.line("return std.mem.readInt(u32, b[0..4], .little);");
    w.close("}");
    w.open("pub fn readF64(self: *Reader) DecodeError!f64", "{");
    w.line("const bits = try self.readU64();");
    w.line("return @bitCast(bits);");
    w.close("}");
    w.open("pub fn readU64(self: *Reader) DecodeError!u64", "{");
    w.line("const b = try self.take(8);");
    w.line("return std.mem.readInt(u64, b[0..8], .little);");
    w.close("}");
    w.open("pub fn readString(self: *Reader) DecodeError![]const u8", "{");
    w.line("const n = try self.readU16();");
    w.line("const bytes = try self.take(n);");
    w.line("if (!std.unicode.utf8ValidateSlice(bytes)) return DecodeError.InvalidUtf8;");
    w.line("return bytes;");
    w.close("}");
    w.close("};");
    w.line("");
    w.open("fn putU16(buf: *std.ArrayList(u8), v: u16) !void", "{");
    w.line("try buf.append(@truncate(v));");
    w.line("try buf.append(@truncate(v >> 8));");
    w.close("}");
    w.open("fn putU32(buf: *std.ArrayList(u8), v: u32) !void", "{");
    w.line("var i: u5 = 0;");
    w.line("while (i < 4) : (i += 1) try buf.append(@truncate(v >> (8 * i)));");
    w.close("}");
    w.open("fn putU64(buf: *std.ArrayList(u8), v: u64) !void", "{");
    w.line("var i: u6 = 0;");
    w.line("while (i < 8) : (i += 1) try buf.append(@truncate(v >> (8 * i)));");
    w.close("}");
    w.open("fn putString(buf: *std.ArrayList(u8), v: []const u8) !void", "{");
    w.line("try putU16(buf, @truncate(v.len));");
    w.line("try buf.appendSlice(v);");
    w.close("}");
    w.line("");
}

fn emit_struct(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("pub const {} = struct", s.name), "{");
    for f in &s.fields {
        let default = if f.ty.is_optional() { " = null" } else { "" };
        w.line(&format!("{}: {}{},", f.name, zig_type(&f.ty), default));
    }
    w.close("};");
    w.line("");
}

fn emit_struct_codec(w: &mut CodeWriter, s: &StructIr) {
    w.open(
        &format!("fn encode{}(buf: *std.ArrayList(u8), v: {}) !void", s.name, s.name),
        "{",
    );
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.close("}");
    w.line("");

    w.open(&format!("fn decode{}(r: *Reader) !{}", s.name, s.name), "{");
    w.line(&format!("var v: {} = undefined;", s.name));
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, plan: &Plan) {
    let zig_ty = zig_type(ty);
    let cap_hint = static_size(plan, ty).unwrap_or(64);

    w.open(
        &format!("pub fn encode{name}(allocator: std.mem.Allocator, v: {zig_ty}) ![]u8"),
        "{",
    );
    w.line("var buf = std.ArrayList(u8).init(allocator);");
    w.line(&format!("try buf.ensureTotalCapacity({cap_hint});"));
    emit_encode_value(w, ty, "v");
    w.line("return buf.toOwnedSlice();");
    w.close("}");
    w.line("");

    w.open(&format!("pub fn decode{name}(data: []const u8) !{zig_ty}"), "{");
    w.line("var r = Reader{ .data = data };");
    w.line(&format!("var v: {zig_ty} = undefined;"));
    emit_decode_value(w, ty, "v");
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        w.open(&format!("if ({expr}) |unwrapped|"), "{");
        w.line("try buf.append(0x01);");
        emit_encode_bare(w, ty, "unwrapped");
        w.close_open("}", "else", "{");
        w.line("try buf.append(0x00);");
        w.close("}");
        return;
    }
    emit_encode_bare(w, ty, expr);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::Bool => w.line(&format!("try buf.append(if ({expr}) 1 else 0);")),
            PrimitiveKind::Int8 => w.line(&format!("try buf.append(@bitCast({expr}));")),
            PrimitiveKind::Int16 => w.line(&format!("try putU16(buf, @bitCast({expr}));")),
            PrimitiveKind::Int32 => w.line(&format!("try putU32(buf, @bitCast({expr}));")),
            PrimitiveKind::Int64 => w.line(&format!("try putU64(buf, @bitCast({expr}));")),
            PrimitiveKind::Float32 => w.line(&format!("try putU32(buf, @bitCast({expr}));")),
            PrimitiveKind::Float64 => w.line(&format!("try putU64(buf, @bitCast({expr}));")),
            PrimitiveKind::String => w.line(&format!("try putString(buf, {expr});")),
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("try putU16(buf, @truncate({expr}.len));"));
            w.open(&format!("for ({expr}) |item|"), "{");
            emit_encode_value(w, element, "item");
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("try encode{name}(buf, {expr});")),
    }
}

fn zig_read_expr(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "try r.readBool()",
        PrimitiveKind::Int8 => "try r.readI8()",
        PrimitiveKind::Int16 => "try r.readI16()",
        PrimitiveKind::Int32 => "try r.readI32()",
        PrimitiveKind::Int64 => "try r.readI64()",
        PrimitiveKind::Float32 => "try r.readF32()",
        PrimitiveKind::Float64 => "try r.readF64()",
        PrimitiveKind::String => "try r.readString()",
    }
}

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    if ty.is_optional() {
        w.open("if ((try r.readBool()))", "{");
        emit_decode_bare(w, ty, dest);
        w.close_open("}", "else", "{");
        w.line(&format!("{dest} = null;"));
        w.close("}");
        return;
    }
    emit_decode_bare(w, ty, dest);
}

fn emit_decode_bare(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => w.line(&format!("{dest} = {};", zig_read_expr(*kind))),
        TypeIr::Array { element, .. } => {
            w.open("{", "");
            w.line("const n = try r.readU16();");
            w.line(&format!("var items = try std.ArrayList({}).initCapacity(std.heap.page_allocator, n);", zig_type(element)));
            w.line("var i: u16 = 0;");
            w.open("while (i < n) : (i += 1)", "{");
            w.line(&format!("var item: {} = undefined;", zig_type(element)));
            emit_decode_value(w, element, "item");
            w.line("items.appendAssumeCapacity(item);");
            w.close("}");
            w.line(&format!("{dest} = try items.toOwnedSlice();"));
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("{dest} = try decode{name}(r);")),
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
        let code = ZigBackend.render(&plan, &GenerateOptions::new(Target::Zig));
        assert!(code.contains("pub const Device = struct"));
        assert!(code.contains("pub fn encodeMessage"));
        assert!(code.contains("pub fn decodeMessage"));
    }
}
