use std::collections::{HashMap, HashSet};

use ffire_schema::{ArrayType, Field, Message, PrimitiveKind, PrimitiveType, Schema, StructType, Type};

use crate::ast::{Decl, FieldDecl, ParsedFile, TypeExpr};
use crate::error::ParseError;

/// Resolves a parsed file's named references into a frozen `Schema`,
/// per §4.1's two-pass description:
///
/// 1. Collect all declarations and register each under its name
///    (`DuplicateName` on collision).
/// 2. Walk each declaration's type expression, replacing identifiers with
///    concrete types. Named *struct* declarations are registered with a
///    placeholder field cell before their fields are resolved, so a field
///    that refers back to the struct (directly, or through another struct)
///    ties the knot instead of recursing forever — see
///    `ffire_schema::StructType`'s doc comment.
pub fn resolve(file: ParsedFile) -> Result<Schema, ParseError> {
    if file.package.trim().is_empty() {
        return Err(ParseError::Syntax {
            line: 1,
            message: "package identifier must not be empty".to_string(),
        });
    }

    let mut by_name: HashMap<String, &Decl> = HashMap::new();
    for decl in &file.decls {
        if by_name.insert(decl.name().to_string(), decl).is_some() {
            return Err(ParseError::DuplicateName(decl.name().to_string()));
        }
    }

    let mut resolver = Resolver {
        decls: by_name,
        resolved: HashMap::new(),
        in_progress: HashSet::new(),
    };

    let mut named_types = Vec::new();
    let mut messages = Vec::new();

    for decl in &file.decls {
        match decl {
            Decl::Named { name, .. } => {
                let ty = resolver.resolve_decl(decl)?;
                named_types.push((name.clone(), ty));
            }
            Decl::Message { name, .. } => {
                let ty = resolver.resolve_decl(decl)?;
                messages.push(Message {
                    name: name.clone(),
                    target: ty,
                });
            }
        }
    }

    tracing::debug!(package = %file.package, named = named_types.len(), messages = messages.len(), "schema resolved");

    Ok(Schema::new(file.package, named_types, messages))
}

struct Resolver<'a> {
    decls: HashMap<String, &'a Decl>,
    resolved: HashMap<String, Type>,
    in_progress: HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn resolve_decl(&mut self, decl: &Decl) -> Result<Type, ParseError> {
        if let Some(ty) = self.resolved.get(decl.name()) {
            return Ok(ty.clone());
        }

        let name = decl.name().to_string();
        let target = match decl {
            Decl::Named { target, .. } => target,
            Decl::Message { target, .. } => target,
        };

        if let TypeExpr::Struct(fields) = target {
            let placeholder = StructType::placeholder(name.clone(), false);
            self.resolved.insert(name.clone(), Type::Struct(placeholder.clone()));
            let resolved_fields = self.resolve_fields(fields, &name)?;
            placeholder
                .finish(resolved_fields)
                .map_err(|_| ParseError::DuplicateName(name.clone()))?;
            return Ok(Type::Struct(placeholder));
        }

        self.in_progress.insert(name.clone());
        let ty = self.resolve_type_expr(target, &name)?;
        self.in_progress.remove(&name);
        self.resolved.insert(name, ty.clone());
        Ok(ty)
    }

    fn resolve_fields(&mut self, fields: &[FieldDecl], struct_name: &str) -> Result<Vec<Field>, ParseError> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(fields.len());
        for f in fields {
            if !seen.insert(f.name.clone()) {
                return Err(ParseError::DuplicateName(format!("{struct_name}.{}", f.name)));
            }
            let hint = format!("{struct_name}{}", f.name);
            let ty = self.resolve_type_expr(&f.ty, &hint)?;
            out.push(Field::new(f.name.clone(), ty, f.tag.clone()));
        }
        Ok(out)
    }

    fn resolve_type_expr(&mut self, expr: &TypeExpr, name_hint: &str) -> Result<Type, ParseError> {
        match expr {
            TypeExpr::Named { name, line } => self.resolve_reference(name, *line),
            TypeExpr::Array(inner) => {
                let element = self.resolve_type_expr(inner, name_hint)?;
                Ok(Type::Array(ArrayType {
                    element: Box::new(element),
                    optional: false,
                }))
            }
            TypeExpr::Optional(inner) => {
                let resolved = self.resolve_type_expr(inner, name_hint)?;
                Ok(resolved.with_optional(true))
            }
            TypeExpr::Struct(fields) => {
                let resolved_fields = self.resolve_fields(fields, name_hint)?;
                Ok(Type::Struct(StructType::new(name_hint, resolved_fields, false)))
            }
        }
    }

    fn resolve_reference(&mut self, name: &str, line: usize) -> Result<Type, ParseError> {
        if let Some(kind) = PrimitiveKind::from_keyword(name) {
            return Ok(Type::Primitive(PrimitiveType { kind, optional: false }));
        }
        if let Some(ty) = self.resolved.get(name) {
            return Ok(ty.clone());
        }
        let decl = *self
            .decls
            .get(name)
            .ok_or_else(|| ParseError::UnresolvedType(format!("{name} (line {line})")))?;
        if self.in_progress.contains(name) {
            return Err(ParseError::UnresolvedType(format!(
                "{name} (line {line}): cyclic reference not guarded by a struct field"
            )));
        }
        self.resolve_decl(decl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::Parser;

    fn resolve_source(src: &str) -> Schema {
        let tokens = tokenize(src).unwrap();
        let file = Parser::new(&tokens).parse_file().unwrap();
        resolve(file).unwrap()
    }

    #[test]
    fn resolves_simple_alias() {
        let schema = resolve_source("package demo\ntype Message = string\n");
        let msg = schema.message("Message").unwrap();
        assert!(matches!(msg.target, Type::Primitive(_)));
    }

    #[test]
    fn resolves_struct_alias_with_fields() {
        let schema = resolve_source(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let msg = schema.message("Message").unwrap();
        let Type::Struct(s) = &msg.target else {
            panic!("expected struct")
        };
        assert_eq!(s.fields().len(), 2);
    }

    #[test]
    fn ties_the_knot_on_optional_self_reference() {
        let schema = resolve_source(
            "package demo\ntype Message = Node\ntype Node struct {\n  Next *Node\n}\n",
        );
        let msg = schema.message("Message").unwrap();
        let Type::Struct(s) = &msg.target else {
            panic!("expected struct")
        };
        let fields = s.fields();
        assert_eq!(fields.len(), 1);
        let Type::Struct(next) = &fields[0].ty else {
            panic!("expected struct field")
        };
        assert!(next.optional);
        assert_eq!(next.name, "Node");
    }

    #[test]
    fn optional_array_parses_as_optional_array_of_t() {
        let schema = resolve_source("package demo\ntype Message = *[]int32\n");
        let msg = schema.message("Message").unwrap();
        assert!(msg.target.is_optional());
        assert_eq!(msg.target.kind(), "array");
    }

    #[test]
    fn duplicate_declaration_names_fail() {
        let tokens = tokenize("package demo\ntype X string\ntype X int32\n").unwrap();
        let file = Parser::new(&tokens).parse_file().unwrap();
        assert!(matches!(resolve(file), Err(ParseError::DuplicateName(_))));
    }

    #[test]
    fn unknown_identifier_fails_unresolved() {
        let tokens = tokenize("package demo\ntype Message = Bogus\n").unwrap();
        let file = Parser::new(&tokens).parse_file().unwrap();
        assert!(matches!(resolve(file), Err(ParseError::UnresolvedType(_))));
    }
}
