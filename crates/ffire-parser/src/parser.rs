use crate::ast::{Decl, FieldDecl, ParsedFile, TypeExpr};
use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

/// Recursive-descent parser over a pre-lexed token stream. Mirrors the
/// grammar in §4.1:
///
/// ```text
/// file      ::= "package" ident decl*
/// decl      ::= "type" ident ( "=" type_expr | type_expr )
/// type_expr ::= ident | "[" "]" type_expr | "*" type_expr | "struct" "{" field* "}"
/// field     ::= ident type_expr [tag]
/// ```
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_file(mut self) -> Result<ParsedFile, ParseError> {
        self.expect_keyword("package")?;
        let package = self.expect_ident()?;

        let mut decls = Vec::new();
        while !self.at_eof() {
            decls.push(self.parse_decl()?);
        }

        Ok(ParsedFile { package, decls })
    }

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let line = self.current_line();
        self.expect_keyword("type")?;
        let name = self.expect_ident()?;

        if self.peek_is(&TokenKind::Equals) {
            self.advance();
            let target = self.parse_type_expr()?;
            Ok(Decl::Message { name, target, line })
        } else {
            let target = self.parse_type_expr()?;
            Ok(Decl::Named { name, target, line })
        }
    }

    fn parse_type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        let line = self.current_line();
        match self.peek_kind() {
            TokenKind::Star => {
                self.advance();
                let inner = self.parse_type_expr()?;
                Ok(TypeExpr::Optional(Box::new(inner)))
            }
            TokenKind::LBracket => {
                self.advance();
                if let TokenKind::Number(n) = self.peek_kind().clone() {
                    return Err(ParseError::UnsupportedConstruct {
                        line,
                        construct: format!("fixed-size array [{n}]T"),
                    });
                }
                self.expect(&TokenKind::RBracket, "expected ']' to close array prefix")?;
                let inner = self.parse_type_expr()?;
                Ok(TypeExpr::Array(Box::new(inner)))
            }
            TokenKind::Ident(name) if name == "map" => Err(ParseError::UnsupportedConstruct {
                line,
                construct: "map type".to_string(),
            }),
            TokenKind::Ident(name) if name == "struct" => {
                self.advance();
                self.expect(&TokenKind::LBrace, "expected '{' to open struct body")?;
                let fields = self.parse_fields()?;
                self.expect(&TokenKind::RBrace, "expected '}' to close struct body")?;
                Ok(TypeExpr::Struct(fields))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(TypeExpr::Named { name, line })
            }
            other => Err(ParseError::Syntax {
                line,
                message: format!("expected a type expression, found {other:?}"),
            }),
        }
    }

    fn parse_fields(&mut self) -> Result<Vec<FieldDecl>, ParseError> {
        let mut fields = Vec::new();
        while !self.peek_is(&TokenKind::RBrace) && !self.at_eof() {
            let line = self.current_line();
            let name = self.expect_ident()?;
            let ty = self.parse_type_expr()?;
            let tag = match self.peek_kind() {
                TokenKind::Tag(content) => {
                    let content = content.clone();
                    self.advance();
                    Some(content)
                }
                _ => None,
            };
            fields.push(FieldDecl { name, ty, tag, line });
        }
        Ok(fields)
    }

    // ------------------------------------------------------------- helpers

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn current_line(&self) -> usize {
        self.tokens[self.pos].line
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos];
        if !matches!(tok.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<(), ParseError> {
        if self.peek_is(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Syntax {
                line: self.current_line(),
                message: format!("{message}, found {:?}", self.peek_kind()),
            })
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::Syntax {
                line: self.current_line(),
                message: format!("expected an identifier, found {other:?}"),
            }),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Ident(name) if name == keyword => {
                self.advance();
                Ok(())
            }
            other => Err(ParseError::Syntax {
                line: self.current_line(),
                message: format!("expected keyword '{keyword}', found {other:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(src: &str) -> ParsedFile {
        let tokens = tokenize(src).unwrap();
        Parser::new(&tokens).parse_file().unwrap()
    }

    #[test]
    fn parses_package_and_message_alias() {
        let file = parse("package demo\ntype Message = string\n");
        assert_eq!(file.package, "demo");
        assert_eq!(file.decls.len(), 1);
        assert!(matches!(file.decls[0], Decl::Message { .. }));
    }

    #[test]
    fn parses_named_struct_with_pointer_array_prefixes() {
        let file = parse(
            "package demo\ntype Device struct {\n  Name string\n  Tags *[]string `json:\"tags\"`\n}\n",
        );
        let Decl::Named { target, .. } = &file.decls[0] else {
            panic!("expected named decl");
        };
        let TypeExpr::Struct(fields) = target else {
            panic!("expected struct");
        };
        assert_eq!(fields.len(), 2);
        // *[]string -> Optional(Array(Named("string")))
        assert!(matches!(fields[1].ty, TypeExpr::Optional(_)));
        if let TypeExpr::Optional(inner) = &fields[1].ty {
            assert!(matches!(**inner, TypeExpr::Array(_)));
        }
    }

    #[test]
    fn rejects_malformed_source() {
        let tokens = tokenize("package demo\ntype X =\n").unwrap();
        assert!(Parser::new(&tokens).parse_file().is_err());
    }
}
