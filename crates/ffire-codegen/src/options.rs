/// The 13 supported code-generation targets, per §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Go,
    Cpp,
    CSharp,
    Java,
    Swift,
    Dart,
    Rust,
    Zig,
    Python,
    Js,
    Php,
    Ruby,
    Ts,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Go => "go",
            Target::Cpp => "cpp",
            Target::CSharp => "csharp",
            Target::Java => "java",
            Target::Swift => "swift",
            Target::Dart => "dart",
            Target::Rust => "rust",
            Target::Zig => "zig",
            Target::Python => "python",
            Target::Js => "js",
            Target::Php => "php",
            Target::Ruby => "ruby",
            Target::Ts => "ts",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "go" => Target::Go,
            "cpp" => Target::Cpp,
            "csharp" => Target::CSharp,
            "java" => Target::Java,
            "swift" => Target::Swift,
            "dart" => Target::Dart,
            "rust" => Target::Rust,
            "zig" => Target::Zig,
            "python" => Target::Python,
            "js" => Target::Js,
            "php" => Target::Php,
            "ruby" => Target::Ruby,
            "ts" => Target::Ts,
            _ => return None,
        })
    }
}

/// Generator optimization level, per §6. The core rewrite's backends do
/// not branch on this beyond preserving the field (the original grammar's
/// notion of optimization is an external build-orchestration concern, §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizeLevel {
    #[default]
    O0,
    O1,
    O2,
}

impl OptimizeLevel {
    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            0 => Some(OptimizeLevel::O0),
            1 => Some(OptimizeLevel::O1),
            2 => Some(OptimizeLevel::O2),
            _ => None,
        }
    }
}

/// `GeneratePackage` options, per §6. `no_compile` and `output_dir` are
/// plumbing for the external build-orchestration collaborator (§1) and are
/// not read by any backend here; they are carried so the option struct
/// matches the toolchain's documented surface.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub target: Target,
    pub optimize: OptimizeLevel,
    pub no_compile: bool,
}

impl GenerateOptions {
    pub fn new(target: Target) -> Self {
        Self { target, optimize: OptimizeLevel::default(), no_compile: false }
    }
}

/// A generated source artifact: a suggested file name and its contents.
/// `GeneratePackage` may produce more than one of these for targets that
/// split declarations and implementation (none currently do; the field
/// exists so a future multi-file backend doesn't change the return shape).
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub source: String,
}
