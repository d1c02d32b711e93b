//! Cross-language source generator for the ffire wire format (§4.6).
//!
//! Every backend renders the same [`ir::Plan`] — a flattened, dependency
//! ordered view of a schema's structs and messages — so a bug in the shared
//! walker surfaces identically in every target instead of being
//! rediscovered per backend. The wire layout itself lives in `ffire-wire`;
//! this crate only has to reproduce it in each target's own syntax.

mod backend;
mod backends;
mod buffer_size;
mod error;
mod ir;
mod options;
mod writer;

pub use backend::Backend;
pub use error::CodegenError;
pub use ir::{build_plan, FieldIr, MessageIr, Plan, StructIr, TypeIr};
pub use options::{GenerateOptions, GeneratedFile, OptimizeLevel, Target};

use ffire_schema::Schema;

fn backend_for(target: Target) -> Box<dyn Backend> {
    match target {
        Target::Go => Box::new(backends::go::GoBackend),
        Target::Cpp => Box::new(backends::cpp::CppBackend),
        Target::CSharp => Box::new(backends::csharp::CSharpBackend),
        Target::Java => Box::new(backends::java::JavaBackend),
        Target::Swift => Box::new(backends::swift::SwiftBackend),
        Target::Dart => Box::new(backends::dart::DartBackend),
        Target::Rust => Box::new(backends::rust::RustBackend),
        Target::Zig => Box::new(backends::zig::ZigBackend),
        Target::Python => Box::new(backends::python::PythonBackend),
        Target::Js => Box::new(backends::js::JsBackend),
        Target::Php => Box::new(backends::php::PhpBackend),
        Target::Ruby => Box::new(backends::ruby::RubyBackend),
        Target::Ts => Box::new(backends::ts::TsBackend),
    }
}

/// `GeneratePackage({schema, target, options}) -> Ok | Error`, per §6.
///
/// Output-directory writing is the external build-orchestration
/// collaborator's job (§1); this returns the rendered artifact(s) in
/// memory so the caller decides where (and whether) to persist them.
pub fn generate_package(schema: &Schema, options: &GenerateOptions) -> Result<GeneratedFile, CodegenError> {
    tracing::info!(
        target = options.target.as_str(),
        messages = schema.messages().len(),
        "generating package"
    );
    let plan = ir::build_plan(schema);
    let backend = backend_for(options.target);
    let source = backend.render(&plan, options);
    let file_name = backend.file_name(&plan.package);
    Ok(GeneratedFile { file_name, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(src: &str) -> Schema {
        ffire_parser::parse(src).unwrap()
    }

    #[test]
    fn generates_a_file_per_target() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        for target in [
            Target::Go,
            Target::Cpp,
            Target::CSharp,
            Target::Java,
            Target::Swift,
            Target::Dart,
            Target::Rust,
            Target::Zig,
            Target::Python,
            Target::Js,
            Target::Php,
            Target::Ruby,
            Target::Ts,
        ] {
            let options = GenerateOptions::new(target);
            let file = generate_package(&s, &options).unwrap();
            assert!(!file.source.is_empty(), "{target:?} produced empty source");
            assert!(file.source.contains("Device"), "{target:?} missing struct name");
        }
    }
}
