/// Raw type expression as written in schema source, before named-reference
/// resolution (§4.1). This is intentionally a separate type from
/// `ffire_schema::Type`: the AST can hold unresolved identifiers and nests
/// `*`/`[]` prefixes in source order, neither of which the resolved model
/// permits.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// An identifier: either a primitive keyword or a reference to a
    /// previously (or later) declared named type.
    Named { name: String, line: usize },
    Array(Box<TypeExpr>),
    Optional(Box<TypeExpr>),
    Struct(Vec<FieldDecl>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub tag: Option<String>,
    pub line: usize,
}

/// A top-level declaration: either a message alias (`type Name = Expr`) or
/// a named type (`type Name Expr`), per §4.1.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Message {
        name: String,
        target: TypeExpr,
        line: usize,
    },
    Named {
        name: String,
        target: TypeExpr,
        line: usize,
    },
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Message { name, .. } => name,
            Decl::Named { name, .. } => name,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Decl::Message { line, .. } => *line,
            Decl::Named { line, .. } => *line,
        }
    }
}

/// A fully tokenized and parsed (but not yet resolved) schema file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub package: String,
    pub decls: Vec<Decl>,
}
