//! Schema source parser and two-pass named-type resolver.
//!
//! Mirrors the lexer/parser → two-pass-resolver pipeline `ParserDatabase`
//! uses in Prisma's `datamodel-parser` crate (name resolution, then type
//! resolution, as two independent walks over the same AST) adapted to the
//! much smaller grammar in §4.1.

mod ast;
mod error;
mod lexer;
mod parser;
mod resolver;

pub use ast::{Decl, FieldDecl, ParsedFile, TypeExpr};
pub use error::ParseError;

use ffire_schema::Schema;

/// `Parse(source) -> Schema | Error`, per §6.
pub fn parse(source: &str) -> Result<Schema, ParseError> {
    tracing::debug!(bytes = source.len(), "parsing schema source");
    let tokens = lexer::tokenize(source)?;
    let file = parser::Parser::new(&tokens).parse_file()?;
    resolver::resolve(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_string_message_end_to_end() {
        let schema = parse("package demo\ntype Message = string\n").unwrap();
        assert_eq!(schema.package(), "demo");
        assert!(schema.message("Message").is_some());
    }

    #[test]
    fn surfaces_syntax_errors() {
        let err = parse("package demo\ntype X =\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
