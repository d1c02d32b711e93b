use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::buffer_size::static_size;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// C++ backend. Self-referential structs need indirection regardless of
/// optionality representation, so optional struct fields become
/// `std::unique_ptr<T>` (also giving the nullable semantics for free);
/// optional primitives and arrays use `std::optional<T>`.
pub struct CppBackend;

impl Backend for CppBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{package}.hpp")
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::new();
        w.line("#pragma once");
        w.line("");
        w.line("#include <cstdint>");
        w.line("#include <cstring>");
        w.line("#include <memory>");
        w.line("#include <optional>");
        w.line("#include <stdexcept>");
        w.line("#include <string>");
        w.line("#include <vector>");
        w.line("");
        w.open(&format!("namespace {}", plan.package), "{");
        emit_runtime(&mut w);
        for s in &plan.structs {
            emit_struct_decl(&mut w, s);
        }
        for s in &plan.structs {
            emit_struct_codec(&mut w, s);
        }
        for m in &plan.messages {
            emit_message_codec(&mut w, &m.name, &m.ty, plan);
        }
        w.close("}");
        w.finish()
    }
}

fn cpp_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Int8 => "int8_t",
        PrimitiveKind::Int16 => "int16_t",
        PrimitiveKind::Int32 => "int32_t",
        PrimitiveKind::Int64 => "int64_t",
        PrimitiveKind::Float32 => "float",
        PrimitiveKind::Float64 => "double",
        PrimitiveKind::String => "std::string",
    }
}

fn cpp_type(ty: &TypeIr) -> String {
    match ty {
        TypeIr::Primitive { kind, optional } => {
            let base = cpp_primitive(*kind);
            if *optional {
                format!("std::optional<{base}>")
            } else {
                base.to_string()
            }
        }
        TypeIr::Array { element, optional } => {
            let vec = format!("std::vector<{}>", cpp_type(element));
            if *optional {
                format!("std::optional<{vec}>")
            } else {
                vec
            }
        }
        TypeIr::StructRef { name, optional } => {
            if *optional {
                format!("std::unique_ptr<{name}>")
            } else {
                name.clone()
            }
        }
    }
}

fn emit_runtime(w: &mut CodeWriter) {
    w.line("namespace detail {");
    w.line("");
    w.line("inline void put_u16(std::vector<uint8_t>& buf, uint16_t v) {");
    w.line("    buf.push_back(static_cast<uint8_t>(v));");
    w.line("    buf.push_back(static_cast<uint8_t>(v >> 8));");
    w.line("}");
    w.line("");
    w.line("inline void put_u32(std::vector<uint8_t>& buf, uint32_t v) {");
    w.line("    for (int i = 0; i < 4; ++i) buf.push_back(static_cast<uint8_t>(v >> (8 * i)));");
    w.line("}");
    w.line("");
    w.line("inline void put_u64(std::vector<uint8_t>& buf, uint64_t v) {");
    w.line("    for (int i = 0; i < 8; ++i) buf.push_back(static_cast<uint8_t>(v >> (8 * i)));");
    w.line("}");
    w.line("");
    w.line("inline void put_string(std::vector<uint8_t>& buf, const std::string& s) {");
    w.line("    put_u16(buf, static_cast<uint16_t>(s.size()));");
    w.line("    buf.insert(buf.end(), s.begin(), s.end());");
    w.line("}");
    w.line("");
    w.line("class Reader {");
    w.line("public:");
    w.line("    Reader(const uint8_t* data, size_t len) : data_(data), len_(len), pos_(0) {}");
    w.line("");
    w.line("    uint8_t byte() {");
    w.line("        if (pos_ >= len_) throw std::runtime_error(\"ffire: unexpected end of input\");");
    w.line("        return data_[pos_++];");
    w.line("    }");
    w.line("");
    w.line("    const uint8_t* take(size_t n) {");
    w.line("        if (pos_ + n > len_) throw std::runtime_error(\"ffire: unexpected end of input\");");
    w.line("        const uint8_t* p = data_ + pos_;");
    w.line("        pos_ += n;");
    w.line("        return p;");
    w.line("    }");
    w.line("");
    w.line("    uint16_t u16() {");
    w.line("        const uint8_t* p = take(2);");
    w.line("        return static_cast<uint16_t>(p[0]) | (static_cast<uint16_t>(p[1]) << 8);");
    w.line("    }");
    w.line("");
    w.line("    uint32_t u32() {");
    w.line("        const uint8_t* p = take(4);");
    w.line("        uint32_t v = 0;");
    w.line("        for (int i = 0; i < 4; ++i) v |= static_cast<uint32_t>(p[i]) << (8 * i);");
    w.line("        return v;");
    w.line("    }");
    w.line("");
    w.line("    uint64_t u64() {");
    w.line("        const uint8_t* p = take(8);");
    w.line("        uint64_t v = 0;");
    w.line("        for (int i = 0; i < 8; ++i) v |= static_cast<uint64_t>(p[i]) << (8 * i);");
    w.line("        return v;");
    w.line("    }");
    w.line("");
    w.line("    bool boolean() { return byte() != 0; }");
    w.line("    int8_t i8() { return static_cast<int8_t>(byte()); }");
    w.line("    int16_t i16() { return static_cast<int16_t>(u16()); }");
    w.line("    int32_t i32() { return static_cast<int32_t>(u32()); }");
    w.line("    int64_t i64() { return static_cast<int64_t>(u64()); }");
    w.line("");
    w.line("    float f32() {");
    w.line("        uint32_t bits = u32();");
    w.line("        float v;");
    w.line("        std::memcpy(&v, &bits, sizeof(v));");
    w.line("        return v;");
    w.line("    }");
    w.line("");
    w.line("    double f64() {");
    w.line("        uint64_t bits = u64();");
    w.line("        double v;");
    w.line("        std::memcpy(&v, &bits, sizeof(v));");
    w.line("        return v;");
    w.line("    }");
    w.line("");
    w.line("    std::string string() {");
    w.line("        uint16_t n = u16();");
    w.line("        const uint8_t* p = take(n);");
    w.line("        return std::string(reinterpret_cast<const char*>(p), n);");
    w.line("    }");
    w.line("");
    w.line("    size_t remaining() const { return len_ - pos_; }");
    w.line("");
    w.line("private:");
    w.line("    const uint8_t* data_;");
    w.line("    size_t len_;");
    w.line("    size_t pos_;");
    w.line("};");
    w.line("");
    w.line("} // namespace detail");
    w.line("");
}

fn emit_struct_decl(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("struct {}", s.name), "{");
    for f in &s.fields {
        w.line(&format!("{} {};", cpp_type(&f.ty), f.name));
    }
    w.close("};");
    w.line("");
}

fn emit_struct_codec(w: &mut CodeWriter, s: &StructIr) {
    w.open(
        &format!("inline void encode_{}(std::vector<uint8_t>& buf, const {}& v)", s.name, s.name),
        "{",
    );
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.close("}");
    w.line("");

    w.open(&format!("inline {} decode_{}(detail::Reader& r)", s.name, s.name), "{");
    w.line(&format!("{} v;", s.name));
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, plan: &Plan) {
    let cpp_ty = cpp_type(ty);
    let cap_hint = static_size(plan, ty).unwrap_or(64);

    w.open(&format!("inline std::vector<uint8_t> Encode{name}(const {cpp_ty}& v)"), "{");
    w.line("std::vector<uint8_t> buf;");
    w.line(&format!("buf.reserve({cap_hint});"));
    emit_encode_value(w, ty, "v");
    w.line("return buf;");
    w.close("}");
    w.line("");

    w.open(&format!("inline {cpp_ty} Decode{name}(const std::vector<uint8_t>& data)"), "{");
    w.line("detail::Reader r(data.data(), data.size());");
    w.line(&format!("{cpp_ty} v;"));
    emit_decode_value(w, ty, "v");
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        match ty {
            TypeIr::StructRef { .. } => {
                w.open(&format!("if (!{expr})"), "{");
                w.line("buf.push_back(0x00);");
                w.close_open("}", "else", "{");
                w.line("buf.push_back(0x01);");
                emit_encode_bare(w, ty, &format!("(*{expr})"));
                w.close("}");
            }
            _ => {
                w.open(&format!("if (!{expr}.has_value())"), "{");
                w.line("buf.push_back(0x00);");
                w.close_open("}", "else", "{");
                w.line("buf.push_back(0x01);");
                emit_encode_bare(w, ty, &format!("(*{expr})"));
                w.close("}");
            }
        }
        return;
    }
    emit_encode_bare(w, ty, expr);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::Bool => w.line(&format!("buf.push_back({expr} ? 0x01 : 0x00);")),
            PrimitiveKind::Int8 => w.line(&format!("buf.push_back(static_cast<uint8_t>({expr}));")),
            PrimitiveKind::Int16 => w.line(&format!("detail::put_u16(buf, static_cast<uint16_t>({expr}));")),
            PrimitiveKind::Int32 => w.line(&format!("detail::put_u32(buf, static_cast<uint32_t>({expr}));")),
            PrimitiveKind::Int64 => w.line(&format!("detail::put_u64(buf, static_cast<uint64_t>({expr}));")),
            PrimitiveKind::Float32 => {
                w.line("{");
                w.line(&format!("    uint32_t bits; std::memcpy(&bits, &{expr}, sizeof(bits));"));
                w.line("    detail::put_u32(buf, bits);");
                w.line("}");
            }
            PrimitiveKind::Float64 => {
                w.line("{");
                w.line(&format!("    uint64_t bits; std::memcpy(&bits, &{expr}, sizeof(bits));"));
                w.line("    detail::put_u64(buf, bits);");
                w.line("}");
            }
            PrimitiveKind::String => w.line(&format!("detail::put_string(buf, {expr});")),
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("detail::put_u16(buf, static_cast<uint16_t>({expr}.size()));"));
            w.open(&format!("for (const auto& item : {expr})"), "{");
            emit_encode_value(w, element, "item");
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => {
            w.line(&format!("encode_{name}(buf, {expr});"));
        }
    }
}

fn cpp_read_expr(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "r.boolean()",
        PrimitiveKind::Int8 => "r.i8()",
        PrimitiveKind::Int16 => "r.i16()",
        PrimitiveKind::Int32 => "r.i32()",
        PrimitiveKind::Int64 => "r.i64()",
        PrimitiveKind::Float32 => "r.f32()",
        PrimitiveKind::Float64 => "r.f64()",
        PrimitiveKind::String => "r.string()",
    }
}

fn strip_optional(ty: &TypeIr) -> TypeIr {
    match ty {
        TypeIr::Primitive { kind, .. } => TypeIr::Primitive { kind: *kind, optional: false },
        TypeIr::Array { element, .. } => TypeIr::Array { element: element.clone(), optional: false },
        TypeIr::StructRef { name, .. } => TypeIr::StructRef { name: name.clone(), optional: false },
    }
}

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    if ty.is_optional() {
        w.open("if (r.byte() == 0)", "{");
        match ty {
            TypeIr::StructRef { .. } => w.line(&format!("{dest}.reset();")),
            _ => w.line(&format!("{dest} = std::nullopt;")),
        }
        w.close_open("}", "else", "{");
        let bare = strip_optional(ty);
        match ty {
            TypeIr::StructRef { name, .. } => {
                w.line(&format!("{dest} = std::make_unique<{name}>(decode_{name}(r));"));
            }
            _ => {
                w.open("{", "");
                w.line(&format!("{} tmp;", cpp_type(&bare)));
                emit_decode_bare(w, &bare, "tmp");
                w.line(&format!("{dest} = std::move(tmp);"));
                w.close("}");
            }
        }
        w.close("}");
        return;
    }
    emit_decode_bare(w, ty, dest);
}

fn emit_decode_bare(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => {
            w.line(&format!("{dest} = {};", cpp_read_expr(*kind)));
        }
        TypeIr::Array { element, .. } => {
            w.open("{", "");
            w.line("uint16_t n = r.u16();");
            w.line(&format!("{dest}.clear();"));
            w.line(&format!("{dest}.reserve(n);"));
            w.open("for (uint16_t i = 0; i < n; ++i)", "{");
            w.line(&format!("{} item;", cpp_type(element)));
            emit_decode_value(w, element, "item");
            w.line(&format!("{dest}.push_back(std::move(item));"));
            w.close("}");
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => {
            w.line(&format!("{dest} = decode_{name}(r);"));
        }
    }
}
