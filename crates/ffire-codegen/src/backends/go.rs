use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::buffer_size::static_size;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// Go backend. Optional primitives and structs become pointers; optional
/// arrays stay plain slices, since `nil` already distinguishes absent from
/// empty — the native-nullability choice §9 asks every target to make.
pub struct GoBackend;

impl Backend for GoBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{package}.go")
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::new();
        w.line(&format!("package {}", sanitize_package(&plan.package)));
        w.line("");
        w.open("import", "(");
        w.line("\"encoding/binary\"");
        w.line("\"errors\"");
        w.line("\"math\"");
        w.line("\"unicode/utf8\"");
        w.close(")");
        w.line("");
        emit_runtime(&mut w);

        for s in &plan.structs {
            emit_struct_decl(&mut w, s, plan);
            emit_struct_encode(&mut w, s, plan);
            emit_struct_decode(&mut w, s, plan);
        }

        for m in &plan.messages {
            emit_message_codec(&mut w, &m.name, &m.ty, plan);
        }

        w.finish()
    }
}

fn sanitize_package(package: &str) -> String {
    let cleaned: String = package
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "ffiregen".to_string()
    } else {
        cleaned
    }
}

fn go_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Int8 => "int8",
        PrimitiveKind::Int16 => "int16",
        PrimitiveKind::Int32 => "int32",
        PrimitiveKind::Int64 => "int64",
        PrimitiveKind::Float32 => "float32",
        PrimitiveKind::Float64 => "float64",
        PrimitiveKind::String => "string",
    }
}

fn go_type(ty: &TypeIr) -> String {
    match ty {
        TypeIr::Primitive { kind, optional } => {
            let base = go_primitive(*kind);
            if *optional {
                format!("*{base}")
            } else {
                base.to_string()
            }
        }
        TypeIr::Array { element, .. } => format!("[]{}", go_type(element)),
        TypeIr::StructRef { name, optional } => {
            if *optional {
                format!("*{name}")
            } else {
                name.clone()
            }
        }
    }
}

fn emit_runtime(w: &mut CodeWriter) {
    w.line("func ffireAppendUint16(buf []byte, v uint16) []byte {");
    w.line("    return append(buf, byte(v), byte(v>>8))");
    w.line("}");
    w.line("");
    w.line("func ffireAppendInt16(buf []byte, v int16) []byte { return ffireAppendUint16(buf, uint16(v)) }");
    w.line("");
    w.line("func ffireAppendUint32(buf []byte, v uint32) []byte {");
    w.line("    return append(buf, byte(v), byte(v>>8), byte(v>>16), byte(v>>24))");
    w.line("}");
    w.line("");
    w.line("func ffireAppendInt32(buf []byte, v int32) []byte { return ffireAppendUint32(buf, uint32(v)) }");
    w.line("");
    w.line("func ffireAppendUint64(buf []byte, v uint64) []byte {");
    w.line(
        "    return append(buf, byte(v), byte(v>>8), byte(v>>16), byte(v>>24), byte(v>>32), byte(v>>40), byte(v>>48), byte(v>>56))",
    );
    w.line("}");
    w.line("");
    w.line("func ffireAppendInt64(buf []byte, v int64) []byte { return ffireAppendUint64(buf, uint64(v)) }");
    w.line("");
    w.line("func ffireAppendFloat32(buf []byte, v float32) []byte { return ffireAppendUint32(buf, math.Float32bits(v)) }");
    w.line("");
    w.line("func ffireAppendFloat64(buf []byte, v float64) []byte { return ffireAppendUint64(buf, math.Float64bits(v)) }");
    w.line("");
    w.line("func ffireAppendString(buf []byte, v string) []byte {");
    w.line("    buf = ffireAppendUint16(buf, uint16(len(v)))");
    w.line("    return append(buf, v...)");
    w.line("}");
    w.line("");
    w.line("type ffireReader struct {");
    w.line("    data []byte");
    w.line("    pos  int");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readByte() (byte, error) {");
    w.line("    if r.pos >= len(r.data) {");
    w.line("        return 0, errors.New(\"ffire: unexpected end of input\")");
    w.line("    }");
    w.line("    b := r.data[r.pos]");
    w.line("    r.pos++");
    w.line("    return b, nil");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readN(n int) ([]byte, error) {");
    w.line("    if r.pos+n > len(r.data) {");
    w.line("        return nil, errors.New(\"ffire: unexpected end of input\")");
    w.line("    }");
    w.line("    b := r.data[r.pos : r.pos+n]");
    w.line("    r.pos += n");
    w.line("    return b, nil");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readBool() (bool, error) {");
    w.line("    b, err := r.readByte()");
    w.line("    return b != 0, err");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readInt8() (int8, error) {");
    w.line("    b, err := r.readByte()");
    w.line("    return int8(b), err");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readUint16() (uint16, error) {");
    w.line("    b, err := r.readN(2)");
    w.line("    if err != nil {");
    w.line("        return 0, err");
    w.line("    }");
    w.line("    return binary.LittleEndian.Uint16(b), nil");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readInt16() (int16, error) {");
    w.line("    v, err := r.readUint16()");
    w.line("    return int16(v), err");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readInt32() (int32, error) {");
    w.line("    b, err := r.readN(4)");
    w.line("    if err != nil {");
    w.line("        return 0, err");
    w.line("    }");
    w.line("    return int32(binary.LittleEndian.Uint32(b)), nil");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readInt64() (int64, error) {");
    w.line("    b, err := r.readN(8)");
    w.line("    if err != nil {");
    w.line("        return 0, err");
    w.line("    }");
    w.line("    return int64(binary.LittleEndian.Uint64(b)), nil");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readFloat32() (float32, error) {");
    w.line("    b, err := r.readN(4)");
    w.line("    if err != nil {");
    w.line("        return 0, err");
    w.line("    }");
    w.line("    return math.Float32frombits(binary.LittleEndian.Uint32(b)), nil");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readFloat64() (float64, error) {");
    w.line("    b, err := r.readN(8)");
    w.line("    if err != nil {");
    w.line("        return 0, err");
    w.line("    }");
    w.line("    return math.Float64frombits(binary.LittleEndian.Uint64(b)), nil");
    w.line("}");
    w.line("");
    w.line("func (r *ffireReader) readString() (string, error) {");
    w.line("    n, err := r.readUint16()");
    w.line("    if err != nil {");
    w.line("        return \"\", err");
    w.line("    }");
    w.line("    b, err := r.readN(int(n))");
    w.line("    if err != nil {");
    w.line("        return \"\", err");
    w.line("    }");
    w.line("    if !utf8.Valid(b) {");
    w.line("        return \"\", errors.New(\"ffire: invalid UTF-8\")");
    w.line("    }");
    w.line("    return string(b), nil");
    w.line("}");
    w.line("");
}

fn emit_struct_decl(w: &mut CodeWriter, s: &StructIr, _plan: &Plan) {
    w.open(&format!("type {} struct", s.name), "{");
    for f in &s.fields {
        w.line(&format!("{} {} `json:\"{}\"`", f.name, go_type(&f.ty), f.json_name));
    }
    w.close("}");
    w.line("");
}

fn emit_struct_encode(w: &mut CodeWriter, s: &StructIr, plan: &Plan) {
    w.open(&format!("func encode{}(buf []byte, v {}) []byte", s.name, s.name), "{");
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name), plan);
    }
    w.line("return buf");
    w.close("}");
    w.line("");
}

fn emit_struct_decode(w: &mut CodeWriter, s: &StructIr, plan: &Plan) {
    w.open(&format!("func decode{}(r *ffireReader) ({}, error)", s.name, s.name), "{");
    w.line(&format!("var v {}", s.name));
    let mut counter = 0u32;
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("v.{}", f.name), "v", plan, &mut counter);
    }
    w.line("return v, nil");
    w.close("}");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, plan: &Plan) {
    let go_ty = go_type(ty);
    let cap_hint = static_size(plan, ty).unwrap_or(64);

    w.open(&format!("func Encode{name}(v {go_ty}) []byte"), "{");
    w.line(&format!("buf := make([]byte, 0, {cap_hint})"));
    emit_encode_value(w, ty, "v", plan);
    w.line("return buf");
    w.close("}");
    w.line("");

    w.open(&format!("func Decode{name}(data []byte) ({go_ty}, error)"), "{");
    w.line("r := &ffireReader{data: data}");
    w.line(&format!("var v {go_ty}"));
    let mut counter = 0u32;
    emit_decode_value(w, ty, "v", "v", plan, &mut counter);
    w.line("return v, nil");
    w.close("}");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str, plan: &Plan) {
    if ty.is_optional() {
        match ty {
            TypeIr::Array { .. } => {
                w.open(&format!("if {expr} == nil"), "{");
                w.line("buf = append(buf, 0x00)");
                w.close_open("}", "else", "{");
                w.line("buf = append(buf, 0x01)");
                emit_encode_bare(w, ty, expr, plan);
                w.close("}");
            }
            _ => {
                w.open(&format!("if {expr} == nil"), "{");
                w.line("buf = append(buf, 0x00)");
                w.close_open("}", "else", "{");
                w.line("buf = append(buf, 0x01)");
                emit_encode_bare(w, ty, &format!("(*{expr})"), plan);
                w.close("}");
            }
        }
        return;
    }
    emit_encode_bare(w, ty, expr, plan);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str, plan: &Plan) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::Bool => {
                w.line(&format!("if {expr} {{ buf = append(buf, 0x01) }} else {{ buf = append(buf, 0x00) }}"));
            }
            PrimitiveKind::Int8 => w.line(&format!("buf = append(buf, byte({expr}))")),
            PrimitiveKind::Int16 => w.line(&format!("buf = ffireAppendInt16(buf, {expr})")),
            PrimitiveKind::Int32 => w.line(&format!("buf = ffireAppendInt32(buf, {expr})")),
            PrimitiveKind::Int64 => w.line(&format!("buf = ffireAppendInt64(buf, {expr})")),
            PrimitiveKind::Float32 => w.line(&format!("buf = ffireAppendFloat32(buf, {expr})")),
            PrimitiveKind::Float64 => w.line(&format!("buf = ffireAppendFloat64(buf, {expr})")),
            PrimitiveKind::String => w.line(&format!("buf = ffireAppendString(buf, {expr})")),
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("buf = ffireAppendUint16(buf, uint16(len({expr})))"));
            w.open(&format!("for _, item := range {expr}"), "{");
            emit_encode_value(w, element, "item", plan);
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => {
            w.line(&format!("buf = encode{name}(buf, {expr})"));
        }
    }
}

fn go_read_call(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "r.readBool()",
        PrimitiveKind::Int8 => "r.readInt8()",
        PrimitiveKind::Int16 => "r.readInt16()",
        PrimitiveKind::Int32 => "r.readInt32()",
        PrimitiveKind::Int64 => "r.readInt64()",
        PrimitiveKind::Float32 => "r.readFloat32()",
        PrimitiveKind::Float64 => "r.readFloat64()",
        PrimitiveKind::String => "r.readString()",
    }
}

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest: &str, zero: &str, plan: &Plan, counter: &mut u32) {
    if ty.is_optional() {
        *counter += 1;
        let present = format!("present{counter}");
        w.line(&format!("{present}, err := r.readByte()"));
        w.open("if err != nil", "{");
        w.line(&format!("return {zero}, err"));
        w.close("}");
        w.open(&format!("if {present} == 0"), "{");
        w.line(&format!("{dest} = nil"));
        w.close_open("}", "else", "{");
        emit_decode_inner(w, ty, dest, zero, plan, counter, true);
        w.close("}");
        return;
    }
    emit_decode_inner(w, ty, dest, zero, plan, counter, false);
}

fn emit_decode_inner(w: &mut CodeWriter, ty: &TypeIr, dest: &str, zero: &str, plan: &Plan, counter: &mut u32, boxed: bool) {
    match ty {
        TypeIr::Primitive { kind, .. } => {
            *counter += 1;
            let tmp = format!("v{counter}");
            w.line(&format!("{tmp}, err := {}", go_read_call(*kind)));
            w.open("if err != nil", "{");
            w.line(&format!("return {zero}, err"));
            w.close("}");
            if boxed {
                w.line(&format!("{dest} = &{tmp}"));
            } else {
                w.line(&format!("{dest} = {tmp}"));
            }
        }
        TypeIr::Array { element, .. } => {
            *counter += 1;
            let len_var = format!("n{counter}");
            w.line(&format!("{len_var}, err := r.readUint16()"));
            w.open("if err != nil", "{");
            w.line(&format!("return {zero}, err"));
            w.close("}");
            let slice_var = format!("items{counter}");
            w.line(&format!("{slice_var} := make([]{}, 0, {len_var})", go_type(element)));
            w.open(&format!("for i := uint16(0); i < {len_var}; i++"), "{");
            let elem_var = format!("item{counter}");
            w.line(&format!("var {elem_var} {}", go_type(element)));
            emit_decode_value(w, element, &elem_var, zero, plan, counter);
            w.line(&format!("{slice_var} = append({slice_var}, {elem_var})"));
            w.close("}");
            w.line(&format!("{dest} = {slice_var}"));
        }
        TypeIr::StructRef { name, .. } => {
            *counter += 1;
            let tmp = format!("s{counter}");
            w.line(&format!("{tmp}, err := decode{name}(r)"));
            w.open("if err != nil", "{");
            w.line(&format!("return {zero}, err"));
            w.close("}");
            if boxed {
                w.line(&format!("{dest} = &{tmp}"));
            } else {
                w.line(&format!("{dest} = {tmp}"));
            }
        }
    }
    let _ = plan;
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
    fn renders_struct_and_message_codec() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let plan = build_plan(&s);
        let code = GoBackend.render(&plan, &GenerateOptions::new(Target::Go));
        assert!(code.contains("package demo"));
        assert!(code.contains("type Device struct {"));
        assert!(code.contains("func EncodeMessage(v Device) []byte"));
        assert!(code.contains("func DecodeMessage(data []byte) (Device, error)"));
        assert!(code.contains("func encodeDevice(buf []byte, v Device) []byte"));
    }

    #[test]
    fn self_referential_struct_uses_pointer() {
        let s = schema("package demo\ntype Message = Node\ntype Node struct {\n  Next *Node\n}\n");
        let plan = build_plan(&s);
        let code = GoBackend.render(&plan, &GenerateOptions::new(Target::Go));
        assert!(code.contains("Next *Node"));
    }
}
