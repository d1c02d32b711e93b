use ffire_schema::PrimitiveKind;

use crate::backend::Backend;
use crate::ir::{Plan, StructIr, TypeIr};
use crate::options::GenerateOptions;
use crate::writer::CodeWriter;

/// JavaScript backend. Plain object literals stand in for structs (no
/// native class requirement in the wire contract); `null` is the absent
/// sentinel for every optional case, matching the target's own idiom.
/// `DataView` gives little-endian reads/writes without manual bit shifts.
pub struct JsBackend;

impl Backend for JsBackend {
    fn file_name(&self, package: &str) -> String {
        format!("{}.js", snake_case(package))
    }

    fn render(&self, plan: &Plan, _options: &GenerateOptions) -> String {
        let mut w = CodeWriter::new();
        emit_runtime(&mut w);
        for s in &plan.structs {
            emit_struct_codec(&mut w, s);
        }
        for m in &plan.messages {
            emit_message_codec(&mut w, &m.name, &m.ty, plan);
        }
        w.open("module.exports =", "{");
        for m in &plan.messages {
            w.line(&format!("encode{0}, decode{0},", m.name));
        }
        w.close("};");
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

fn emit_runtime(w: &mut CodeWriter) {
    w.line("class FfireDecodeError extends Error {}");
    w.line("");
    w.open("class FfireWriter", "{");
    w.open("constructor()", "{");
    w.line("this.bytes = [];");
    w.close("}");
    w.line("putBool(v) { this.bytes.push(v ? 1 : 0); }");
    w.line("putI8(v) { this.bytes.push(v & 0xff); }");
    w.open("putU16(v)", "{");
    w.line("this.bytes.push(v & 0xff, (v >>> 8) & 0xff);");
    w.close("}");
    w.line("putI16(v) { this.putU16(v & 0xffff); }");
    w.open("putU32(v)", "{");
    w.line("for (let i = 0; i < 4; i++) this.bytes.push((v >>> (8 * i)) & 0xff);");
    w.close("}");
    w.line("putI32(v) { this.putU32(v >>> 0); }");
    w.open("putU64(v)", "{");
    w.line("let big = BigInt.asUintN(64, BigInt(v));");
    w.line("for (let i = 0; i < 8; i++) { this.bytes.push(Number(big & 0xffn)); big >>= 8n; }");
    w.close("}");
    w.line("putI64(v) { this.putU64(v); }");
    w.open("putF32(v)", "{");
    w.line("const buf = new ArrayBuffer(4);");
    w.line("new DataView(buf).setFloat32(0, v, true);");
    w.line("this.bytes.push(...new Uint8Array(buf));");
    w.close("}");
    w.open("putF64(v)", "{");
    w.line("const buf = new ArrayBuffer(8);");
    w.line("new DataView(buf).setFloat64(0, v, true);");
    w.line("this.bytes.push(...new Uint8Array(buf));");
    w.close("}");
    w.open("putString(v)", "{");
    w.line("const encoded = new TextEncoder().encode(v);");
    w.line("this.putU16(encoded.length);");
    w.line("this.bytes.push(...encoded);");
    w.close("}");
    w.close("}");
    w.line("");
    w.open("class FfireReader", "{");
    w.open("constructor(data)", "{");
    w.line("this.data = data;");
    w.line("this.pos = 0;");
    w.close("}");
    w.open("_take(n)", "{");
    w.line("if (this.pos + n > this.data.length) throw new FfireDecodeError(\"ffire: unexpected end of input\");");
    w.line("const out = this.data.subarray(this.pos, this.pos + n);");
    w.line("this.pos += n;");
    w.line("return out;");
    w.close("}");
    w.line("readBool() { return this._take(1)[0] !== 0; }");
    w.line("readI8() { const v = this._take(1)[0]; return v > 127 ? v - 256 : v; }");
    w.open("readU16()", "{");
    w.line("const b = this._take(2);");
    w.line("return b[0] | (b[1] << 8);");
    w.close("}");
    w.open("readI16()", "{");
    w.line("const v = this.readU16();");
    w.line("return v > 0x7fff ? v - 0x10000 : v;");
    w.close("}");
    w.open("readU32()", "{");
    w.line("const b = this._take(4);");
    w.line("return (b[0] | (b[1] << 8) | (b[2] << 16) | (b[3] << 24)) >>> 0;");
    w.close("}");
    w.line("readI32() { return this.readU32() | 0; }");
    w.open("readU64()", "{");
    w.line("const b = this._take(8);");
    w.line("let v = 0n;");
    w.line("for (let i = 7; i >= 0; i--) v = (v << 8n) | BigInt(b[i]);");
    w.line("return v;");
    w.close("}");
    w.line("readI64() { return BigInt.asIntN(64, this.readU64()); }");
    w.open("readF32()", "{");
    w.line("const b = this._take(4);");
    w.line("return new DataView(b.buffer, b.byteOffset, 4).getFloat32(0, true);");
    w.close("}");
    w.open("readF64()", "{");
    w.line("const b = this._take(8);");
    w.line("return new DataView(b.buffer, b.byteOffset, 8).getFloat64(0, true);");
    w.close("}");
    w.open("readString()", "{");
    w.line("const n = this.readU16();");
    w.line("const bytes = this._take(n);");
    w.line("return new TextDecoder(\"utf-8\", { fatal: true }).decode(bytes);");
    w.close("}");
    w.line("get remaining() { return this.data.length - this.pos; }");
    w.close("}");
    w.line("");
}

fn emit_struct_codec(w: &mut CodeWriter, s: &StructIr) {
    w.open(&format!("function encode{}Into(w, v)", s.name), "{");
    for f in &s.fields {
        emit_encode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.close("}");
    w.line("");

    w.open(&format!("function decode{}From(r)", s.name), "{");
    w.line("const v = {};");
    for f in &s.fields {
        emit_decode_value(w, &f.ty, &format!("v.{}", f.name));
    }
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_message_codec(w: &mut CodeWriter, name: &str, ty: &TypeIr, _plan: &Plan) {
    w.open(&format!("function encode{name}(v)"), "{");
    w.line("const w = new FfireWriter();");
    emit_encode_value(w, ty, "v");
    w.line("return Uint8Array.from(w.bytes);");
    w.close("}");
    w.line("");

    w.open(&format!("function decode{name}(data)"), "{");
    w.line("const r = new FfireReader(data);");
    w.line("let v;");
    emit_decode_value(w, ty, "v");
    w.line("return v;");
    w.close("}");
    w.line("");
}

fn emit_encode_value(w: &mut CodeWriter, ty: &TypeIr, expr: &str) {
    if ty.is_optional() {
        w.open(&format!("if ({expr} === null || {expr} === undefined)"), "{");
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
            w.open(&format!("for (const item of {expr})"), "{");
            emit_encode_value(w, element, "item");
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("encode{name}Into(w, {expr});")),
    }
}

fn js_read_expr(kind: PrimitiveKind) -> &'static str {
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

fn emit_decode_value(w: &mut CodeWriter, ty: &TypeIr, dest: &str) {
    if ty.is_optional() {
        w.open("if (!r.readBool())", "{");
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
        TypeIr::Primitive { kind, .. } => w.line(&format!("{dest} = {};", js_read_expr(*kind))),
        TypeIr::Array { element, .. } => {
            w.open("{", "");
            w.line("const n = r.readU16();");
            w.line("const items = [];");
            w.open("for (let i = 0; i < n; i++)", "{");
            w.line("let item;");
            emit_decode_value(w, element, "item");
            w.line("items.push(item);");
            w.close("}");
            w.line(&format!("{dest} = items;"));
            w.close("}");
        }
        TypeIr::StructRef { name, .. } => w.line(&format!("{dest} = decode{name}From(r);")),
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
    fn renders_codec_and_exports() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let plan = build_plan(&s);
        let code = JsBackend.render(&plan, &GenerateOptions::new(Target::Js));
        assert!(code.contains("function encodeMessage(v)"));
        assert!(code.contains("function decodeMessage(data)"));
        assert!(code.contains("module.exports"));
    }
}
