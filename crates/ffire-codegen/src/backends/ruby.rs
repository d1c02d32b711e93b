use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// Ruby backend. Structs become plain attr-accessor classes built with
/// `Struct.new`-free keyword initializers; `nil` stands in for every
/// absent optional. Binary IO runs through `Array#pack`/`String#unpack`
/// with explicit little-endian directives.
pub struct RubyBackend;

impl Backend for RubyBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{}.rb", snake_case(package))
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::with_indent("  ");
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

fn pack_directive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool | PrimitiveKind::Int8 => "c",
        PrimitiveKind::Int16 => "s<",
        PrimitiveKind::Int32 => "l<",
        PrimitiveKind::Int64 => "q<",
        PrimitiveKind::Float32 => "e",
        PrimitiveKind::Float64 => "E",
        PrimitiveKind::String => unreachable!("string has no fixed pack directive"),
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

fn emit_runtime(w: &mut CodeWriter) {
    w.open("class FfireDecodeError < StandardError", "");
    w.close("end");
    w.line("");
    w.open("class FfireWriter", "");
    w.open("def initialize", "");
    w.line("@buf = String.new(encoding: Encoding::ASCII_8BIT)");
    w.close("end");
    w.line("");
    w.line("attr_reader :buf");
    w.line("");
    w.line("def put_bool(v) = @buf << [v ? 1 : 0].pack(\"c\")");
    w.line("def put_i8(v) = @buf << [v].pack(\"c\")");
    w.line("def put_i16(v) = @buf << [v].pack(\"s<\")");
    w.line("def put_i32(v) = @buf << [v].pack(\"l<\")");
    w.line("def put_i64(v) = @buf << [v].pack(\"q<\")");
    w.line("def put_f32(v) = @buf << [v].pack(\"e\")");
    w.line("def put_f64(v) = @buf << [v].pack(\"E\")");
    // Length prefixes (§5) are `uint16`, distinct from the signed `int16`
    // schema primitive: a length in [32768, 65535] must not round-trip
    // through a signed 16-bit directive.
    w.line("def put_u16(v) = @buf << [v].pack(\"S<\")");
    w.open("def put_string(v)", "");
    w.line("encoded = v.b");
    w.line("put_u16(encoded.bytesize)");
    w.line("@buf << encoded");
    w.close("end");
    w.close("end");
    w.line("");
    w.open("class FfireReader", "");
    w.open("def initialize(data)", "");
    w.line("@data = data.b");
    w.line("@pos = 0");
    w.close("end");
    w.line("");
    w.open("def take(n)", "");
    w.open("if @pos + n > @data.bytesize", "");
    w.line("raise FfireDecodeError, \"ffire: unexpected end of input\"");
    w.close("end");
    w.line("out = @data.byteslice(@pos, n)");
    w.line("@pos += n");
    w.line("out");
    w.close("end");
    w.line("");
    w.line("def read_bool = take(1).unpack1(\"c\") != 0");
    w.line("def read_i8 = take(1).unpack1(\"c\")");
    w.line("def read_i16 = take(2).unpack1(\"s<\")");
    w.line("def read_i32 = take(4).unpack1(\"l<\")");
    w.line("def read_i64 = take(8).unpack1(\"q<\")");
    w.line("def read_f32 = take(4).unpack1(\"e\")");
    w.line("def read_f64 = take(8).unpack1(\"E\")");
    w.line("def read_u16 = take(2).unpack1(\"S<\")");
    w.open("def read_string", "");
    w.line("n = read_u16");
    w.line("raw = take(n)");
    w.line("raw.force_encoding(Encoding::UTF_8)");
    w.open("raise FfireDecodeError, \"ffire: invalid UTF-8\" unless raw.valid_encoding?", "");
    w.close("");
    w.line("raw");
    w.close("end");
    w.line("");
    w.open("def remaining", "");
    w.line("@data.bytesize - @pos");
    w.close("end");
    w.close("end");
    w.line("");
}

fn emit_struct(w: &mut CodeWriter, s: &StructIr) {
    let attrs: Vec<String> = s.fields.iter().map(|f| format!(":{}", f.name)).collect();
    w.open(&format!("class {}", s.name), "");
    w.line(&format!("attr_accessor {}", attrs.join(", ")));
    w.line("");
    let kwargs: Vec<String> = s
        .fields
        .iter()
        .map(|f| if f.ty.is_optional() { format!("{}: nil", f.name) } else { format!("{}:", f.name) })
        .collect();
    w.open(&format!("def initialize({})", kwargs.join(", ")), "");
    for f in &s.fields {
        w.line(&format!("@{0} = {0}", f.name));
    }
    w.close("end");
    w.close("end");
    w.line("");
}

fn emit_struct_codec(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("def ffire_encode_{}(w, v)", snake_case(&s.name)), "");
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.close("end");
    w.line("");

    w.open(&format!("def ffire_decode_{}(r)", snake_case(&s.name)), "");
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("{}_", f.name));
    }
    let args: Vec<String> = s.fields.iter().map(|f| format!("{0}: {0}_", f.name)).collect();
    w.line(&format!("{}.new({})", s.name, args.join(", ")));
    w.close("end");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, _plan: &Plan) {
    w.open(&format!("def ffire_encode_{}(v)", snake_case(name)), "");
    w.line("w = FfireWriter.new");
    emit_encode_value(w, ty, "v");
    w.line("w.buf");
    w.close("end");
    w.line("");

    w.open(&format!("def ffire_decode_{}(data)", snake_case(name)), "");
    w.line("r = FfireReader.new(data)");
    emit_decode_value(w, ty, "v");
    w.line("v");
    w.close("end");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        w.open(&format!("if {expr}.nil?"), "");
        w.line("w.put_bool(false)");
        w.close_open("", "else", "");
        w.line("w.put_bool(true)");
        emit_encode_bare(w, ty, expr);
        w.close("end");
        return;
    }
    emit_encode_bare(w, ty, expr);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::Bool => w.line(&format!("w.put_bool({expr})")),
            PrimitiveKind::Int8 => w.line(&format!("w.put_i8({expr})")),
            PrimitiveKind::Int16 => w.line(&format!("w.put_i16({expr})")),
            PrimitiveKind::Int32 => w.line(&format!("w.put_i32({expr})")),
            PrimitiveKind::Int64 => w.line(&format!("w.put_i64({expr})")),
            PrimitiveKind::Float32 => w.line(&format!("w.put_f32({expr})")),
            PrimitiveKind::Float64 => w.line(&format!("w.put_f64({expr})")),
            PrimitiveKind::String => w.line(&format!("w.put_string({expr})")),
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("w.put_u16({expr}.length)"));
            w.open(&format!("{expr}.each do |item|"), "");
            emit_encode_value(w, element, "item");
            w.close("end");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("ffire_encode_{}(w, {expr})", snake_case(name))),
    }
}

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    if ty.is_optional() {
        w.open("if !r.read_bool", "");
        w.line(&format!("{dest} = nil"));
        w.close_open("", "else", "");
        emit_decode_bare(w, ty, dest);
        w.close("end");
        return;
    }
    emit_decode_bare(w, ty, dest);
}

fn emit_decode_bare(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => {
            let _ = kind_width(*kind);
            let _ = pack_directive(*kind);
            let reader = match kind {
                PrimitiveKind::Bool => "read_bool",
                PrimitiveKind::Int8 => "read_i8",
                PrimitiveKind::Int16 => "read_i16",
                PrimitiveKind::Int32 => "read_i32",
                PrimitiveKind::Int64 => "read_i64",
                PrimitiveKind::Float32 => "read_f32",
                PrimitiveKind::Float64 => "read_f64",
                PrimitiveKind::String => "read_string",
            };
            w.line(&format!("{dest} = r.{reader}"));
        }
        TypeIr::Array { element, .. } => {
            w.line(&format!("{dest} = []"));
            w.line("_n = r.read_u16");
            w.open("_n.times do", "");
            emit_decode_value(w, element, "_item");
            w.line(&format!("{dest} << _item"));
            w.close("end");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("{dest} = ffire_decode_{}(r)", snake_case(name))),
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
        let code = RubyBackend.render(&plan, &GenerateOptions::new(Target::Ruby));
        assert!(code.contains("class Device"));
        assert!(code.contains("def ffire_encode_message(v)"));
        assert!(code.contains("def ffire_decode_message(data)"));
    }

    #[test]
    fn optional_field_defaults_to_nil() {
        let s = schema("package demo\ntype Message = Device\ntype Device struct {\n  Nickname *string\n}\n");
        let plan = build_plan(&s);
        let code = RubyBackend.render(&plan, &GenerateOptions::new(Target::Ruby));
        assert!(code.contains("Nickname: nil"));
    }

    #[test]
    fn array_and_string_lengths_use_the_unsigned_directive() {
        let s = schema("package demo\ntype Message = []int32\n");
        let plan = build_plan(&s);
        let code = RubyBackend.render(&plan, &GenerateOptions::new(Target::Ruby));
        assert!(code.contains("w.put_u16(v.length)"));
        assert!(code.contains("r.read_u16"));
        assert!(code.contains("pack(\"S<\")"));
    }
}
