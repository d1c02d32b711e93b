use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// PHP backend. Structs become plain public-property classes; `?T`
/// nullable typed properties cover optionals. Encoding/decoding runs
/// through a small runtime pair (`FfireWriter`/`FfireReader`) that uses
/// `pack`/`unpack` for the fixed-width little-endian atoms.
pub struct PhpBackend;

impl Backend for PhpBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{}.php", snake_case(package))
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::new();
        w.line("<?php");
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

fn php_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Int8
        | PrimitiveKind::Int16
        | PrimitiveKind::Int32
        | PrimitiveKind::Int64 => "int",
        PrimitiveKind::Float32 | PrimitiveKind::Float64 => "float",
        PrimitiveKind::String => "string",
    }
}

fn php_type(ty: &TypeIr) -> String {
    let base = match ty {
        TypeIr::Primitive { kind, .. } => php_primitive(*kind).to_string(),
        TypeIr::Array { .. } => "array".to_string(),
        TypeIr::StructRef { name, .. } => name.clone(),
    };
    if ty.is_optional() {
        format!("?{base}")
    } else {
        base
    }
}

fn pack_fmt(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool | PrimitiveKind::Int8 => "c",
        PrimitiveKind::Int16 => "v",
        PrimitiveKind::Int32 => "V",
        PrimitiveKind::Int64 => "P",
        PrimitiveKind::Float32 => "g",
        PrimitiveKind::Float64 => "e",
        PrimitiveKind::String => unreachable!("string has no fixed pack format"),
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
    w.open("final class FfireDecodeError extends \\RuntimeException", "{");
    w.close("}");
    w.line("");
    w.open("final class FfireWriter", "{");
    w.line("public string $buf = \"\";");
    w.line("");
    w.line("public function putBool(bool $v): void { $this->buf .= pack(\"c\", $v ? 1 : 0); }");
    w.line("public function putI8(int $v): void { $this->buf .= pack(\"c\", $v); }");
    w.line("public function putI16(int $v): void { $this->buf .= pack(\"v\", $v & 0xffff); }");
    w.line("public function putI32(int $v): void { $this->buf .= pack(\"V\", $v & 0xffffffff); }");
    w.line("public function putI64(int $v): void { $this->buf .= pack(\"P\", $v); }");
    w.line("public function putF32(float $v): void { $this->buf .= pack(\"g\", $v); }");
    w.line("public function putF64(float $v): void { $this->buf .= pack(\"e\", $v); }");
    // Length prefixes (§5) are `uint16`, distinct from the signed `int16`
    // schema primitive: a length in [32768, 65535] must not round-trip
    // through the sign-extending `putI16`/`readI16` pair.
    w.line("public function putU16(int $v): void { $this->buf .= pack(\"v\", $v & 0xffff); }");
    w.open("public function putString(string $v): void", "{");
    w.line("$encoded = $v;");
    w.line("$this->putU16(strlen($encoded));");
    w.line("$this->buf .= $encoded;");
    w.close("}");
    w.close("}");
    w.line("");
    w.open("final class FfireReader", "{");
    w.line("private int $pos = 0;");
    w.line("");
    w.open("public function __construct(private string $data)", "{");
    w.close("}");
    w.line("");
    w.open("private function take(int $n): string", "{");
    w.open("if ($this->pos + $n > strlen($this->data))", "{");
    w.line("throw new FfireDecodeError(\"ffire: unexpected end of input\");");
    w.close("}");
    w.line("$out = substr($this->data, $this->pos, $n);");
    w.line("$this->pos += $n;");
    w.line("return $out;");
    w.close("}");
    w.line("");
    w.line("public function readBool(): bool { return unpack(\"c\", $this->take(1))[1] !== 0; }");
    w.line("public function readI8(): int { return unpack(\"c\", $this->take(1))[1]; }");
    w.open("public function readI16(): int", "{");
    w.line("$u = unpack(\"v\", $this->take(2))[1];");
    w.line("return $u >= 0x8000 ? $u - 0x10000 : $u;");
    w.close("}");
    w.open("public function readI32(): int", "{");
    w.line("$u = unpack(\"V\", $this->take(4))[1];");
    w.line("return $u >= 0x80000000 ? $u - 0x100000000 : $u;");
    w.close("}");
    w.line("public function readI64(): int { return unpack(\"P\", $this->take(8))[1]; }");
    w.line("public function readF32(): float { return unpack(\"g\", $this->take(4))[1]; }");
    w.line("public function readF64(): float { return unpack(\"e\", $this->take(8))[1]; }");
    w.line("public function readU16(): int { return unpack(\"v\", $this->take(2))[1]; }");
    w.open("public function readString(): string", "{");
    w.line("$n = $this->readU16();");
    w.line("$raw = $this->take($n);");
    w.open("if (!mb_check_encoding($raw, \"UTF-8\"))", "{");
    w.line("throw new FfireDecodeError(\"ffire: invalid UTF-8\");");
    w.close("}");
    w.line("return $raw;");
    w.close("}");
    w.close("}");
    w.line("");
}

fn emit_struct(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("final class {}", s.name), "{");
    for f in &s.fields {
        let default = if f.ty.is_optional() { " = null" } else { "" };
        w.line(&format!("public {} ${}{};", php_type(&f.ty), f.name, default));
    }
    w.close("}");
    w.line("");
}

fn emit_struct_codec(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("function ffire_encode_{}(FfireWriter $w, {} $v): void", snake_case(&s.name), s.name), "{");
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("$v->{}", f.name));
    }
    w.close("}");
    w.line("");

    w.open(&format!("function ffire_decode_{}(FfireReader $r): {}", snake_case(&s.name), s.name), "{");
    w.line(&format!("$v = new {}();", s.name));
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("$v->{}", f.name));
    }
    w.line("return $v;");
    w.close("}");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, _plan: &Plan) {
    let php_ty = php_type(ty);

    w.open(&format!("function ffire_encode_{}({php_ty} $v): string", snake_case(name)), "{");
    w.line("$w = new FfireWriter();");
    emit_encode_value(w, ty, "$v");
    w.line("return $w->buf;");
    w.close("}");
    w.line("");

    w.open(&format!("function ffire_decode_{}(string $data): {php_ty}", snake_case(name)), "{");
    w.line("$r = new FfireReader($data);");
    emit_decode_value(w, ty, "$v");
    w.line("return $v;");
    w.close("}");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        w.open(&format!("if ({expr} === null)"), "{");
        w.line("$w->putBool(false);");
        w.close_open("}", "else", "{");
        w.line("$w->putBool(true);");
        emit_encode_bare(w, ty, expr);
        w.close("}");
        return;
    }
    emit_encode_bare(w, ty, expr);
}

fn emit_encode_bare(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    match ty {
        TypeIr::Primitive { kind, .. } => match kind {
            PrimitiveKind::Bool => w.line(&format!("$w->putBool({expr});")),
            PrimitiveKind::Int8 => w.line(&format!("$w->putI8({expr});")),
            PrimitiveKind::Int16 => w.line(&format!("$w->putI16({expr});")),
            PrimitiveKind::Int32 => w.line(&format!("$w->putI32({expr});")),
            PrimitiveKind::Int64 => w.line(&format!("$w->putI64({expr});")),
            PrimitiveKind::Float32 => w.line(&format!("$w->putF32({expr});")),
            PrimitiveKind::Float64 => w.line(&format!("$w->putF64({expr});")),
            PrimitiveKind::String => w.line(&format!("$w->putString({expr});")),
        },
        TypeIr::Array { element, .. } => {
            w.line(&format!("$w->putU16(count({expr}));"));
            w.open(&format!("foreach ({expr} as $item)"), "{");
            emit_encode_value(w, element, "$item");
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("ffire_encode_{}($w, {expr});", snake_case(name))),
    }
}

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    if ty.is_optional() {
        w.open("if (!$r->readBool())", "{");
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
        TypeIr::Primitive { kind: PrimitiveKind::Bool, .. } => w.line(&format!("{dest} = $r->readBool();")),
        TypeIr::Primitive { kind, .. } => {
            let _ = kind_width(*kind);
            let _ = pack_fmt(*kind);
            let reader = match kind {
                PrimitiveKind::Int8 => "readI8",
                PrimitiveKind::Int16 => "readI16",
                PrimitiveKind::Int32 => "readI32",
                PrimitiveKind::Int64 => "readI64",
                PrimitiveKind::Float32 => "readF32",
                PrimitiveKind::Float64 => "readF64",
                PrimitiveKind::String => "readString",
                PrimitiveKind::Bool => "readBool",
            };
            w.line(&format!("{dest} = $r->{reader}();"));
        }
        TypeIr::Array { element, .. } => {
            w.line(&format!("{dest} = [];"));
            w.line("$_n = $r->readU16();");
            w.open("for ($_i = 0; $_i < $_n; $_i++)", "{");
            emit_decode_value(w, element, "$_item");
            w.line(&format!("{dest}[] = $_item;"));
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("{dest} = ffire_decode_{}($r);", snake_case(name))),
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
        let code = PhpBackend.render(&plan, &GenerateOptions::new(Target::Php));
        assert!(code.contains("final class Device"));
        assert!(code.contains("function ffire_encode_message(Device $v): string"));
        assert!(code.contains("function ffire_decode_message(string $data): Device"));
    }

    #[test]
    fn optional_field_is_nullable() {
        let s = schema("package demo\ntype Message = Device\ntype Device struct {\n  Nickname *string\n}\n");
        let plan = build_plan(&s);
        let code = PhpBackend.render(&plan, &GenerateOptions::new(Target::Php));
        assert!(code.contains("public ?string $Nickname = null;"));
    }

    #[test]
    fn int16_and_int32_readers_sign_extend_the_unsigned_unpack_result() {
        let s = schema("package demo\ntype Message = int32\n");
        let plan = build_plan(&s);
        let code = PhpBackend.render(&plan, &GenerateOptions::new(Target::Php));
        assert!(code.contains("$u >= 0x8000 ? $u - 0x10000 : $u"));
        assert!(code.contains("$u >= 0x80000000 ? $u - 0x100000000 : $u"));
    }

    #[test]
    fn array_and_string_lengths_use_the_unsigned_reader() {
        let s = schema("package demo\ntype Message = []int32\n");
        let plan = build_plan(&s);
        let code = PhpBackend.render(&plan, &GenerateOptions::new(Target::Php));
        assert!(code.contains("$w->putU16(count($v));"));
        assert!(code.contains("$_n = $r->readU16();"));
    }
}
