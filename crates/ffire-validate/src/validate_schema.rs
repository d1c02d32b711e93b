use std::collections::HashSet;

use ffire_schema::{Schema, Type, MAX_NESTING_DEPTH};

use crate::schema_error::SchemaError;

/// `ValidateSchema(model) -> Ok | Error`, per §4.2 and §6.
///
/// Enforces §3's invariants 1–6 (invariant 7, the `uint16` length bound, is
/// a property of encoded *instances* and is checked by `validate_json`,
/// not here). Every declared type — named-type declarations as well as
/// message targets — is walked, per §4.2: "a named type that no message
/// ever references must still obey every invariant."
pub fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    if schema.package().trim().is_empty() {
        return Err(SchemaError::EmptyPackage);
    }
    if schema.messages().is_empty() {
        return Err(SchemaError::NoMessages);
    }

    let mut seen_names = HashSet::new();
    for message in schema.messages() {
        if !message.is_exported() {
            return Err(SchemaError::NonExportedMessage(message.name.clone()));
        }
        if !seen_names.insert(message.name.clone()) {
            return Err(SchemaError::DuplicateMessageName(message.name.clone()));
        }
    }

    for (name, ty) in schema.named_types() {
        walk(ty, 0, &mut HashSet::new(), name)?;
    }
    for message in schema.messages() {
        walk(&message.target, 0, &mut HashSet::new(), &message.name)?;
    }

    tracing::debug!(package = schema.package(), "schema validated");
    Ok(())
}

fn walk(ty: &Type, depth: u32, visiting: &mut HashSet<String>, path: &str) -> Result<(), SchemaError> {
    let depth = depth + 1 + u32::from(ty.is_optional());
    if depth > MAX_NESTING_DEPTH {
        return Err(SchemaError::MaxNestingExceeded {
            path: path.to_string(),
            max: MAX_NESTING_DEPTH,
        });
    }

    match ty {
        Type::Primitive(_) => Ok(()),
        Type::Array(a) => walk(&a.element, depth, visiting, &format!("{path}[]")),
        Type::Struct(s) => {
            if visiting.contains(&s.name) {
                return if s.optional {
                    Ok(())
                } else {
                    Err(SchemaError::CyclicType {
                        path: path.to_string(),
                        name: s.name.clone(),
                    })
                };
            }

            let fields = s.fields();
            if fields.is_empty() {
                return Err(SchemaError::EmptyStruct {
                    path: path.to_string(),
                    name: s.name.clone(),
                });
            }
            let mut field_names = HashSet::new();
            for field in fields {
                if !field_names.insert(field.name.clone()) {
                    return Err(SchemaError::DuplicateField {
                        path: path.to_string(),
                        name: s.name.clone(),
                    });
                }
            }

            visiting.insert(s.name.clone());
            for field in fields {
                walk(&field.ty, depth, visiting, &format!("{path}.{}", field.name))?;
            }
            visiting.remove(&s.name);
            Ok(())
        }
        Type::NamedRef(name) => Err(SchemaError::UnresolvedType {
            path: path.to_string(),
            name: name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(src: &str) -> Schema {
        ffire_parser::parse(src).unwrap()
    }

    #[test]
    fn accepts_small_struct() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        assert!(validate_schema(&s).is_ok());
    }

    #[test]
    fn rejects_cyclic_non_optional_struct() {
        let s = schema("package demo\ntype Message = Node\ntype Node struct {\n  Next Node\n}\n");
        assert!(matches!(
            validate_schema(&s),
            Err(SchemaError::CyclicType { .. })
        ));
    }

    #[test]
    fn accepts_cyclic_optional_struct() {
        let s = schema("package demo\ntype Message = Node\ntype Node struct {\n  Next *Node\n}\n");
        assert!(validate_schema(&s).is_ok());
    }

    #[test]
    fn rejects_non_exported_message_name() {
        let s = schema("package demo\ntype message = string\n");
        assert!(matches!(
            validate_schema(&s),
            Err(SchemaError::NonExportedMessage(_))
        ));
    }

    #[test]
    fn rejects_empty_struct() {
        let s = schema("package demo\ntype Message = Empty\ntype Empty struct {\n}\n");
        assert!(matches!(
            validate_schema(&s),
            Err(SchemaError::EmptyStruct { .. })
        ));
    }

    #[test]
    fn rejects_max_nesting_exceeded() {
        // Each `Sn` embeds `S(n+1)` as a required (non-optional) field, so
        // `walk` genuinely descends one level per struct — unlike a chain
        // of pure alias-to-optional declarations, which the resolver
        // collapses onto a single flag and never actually nests.
        let mut src = String::from("package demo\ntype Message = S0\n");
        for i in 0..32 {
            src.push_str(&format!("type S{i} struct {{\n  Next S{}\n}}\n", i + 1));
        }
        src.push_str("type S32 string\n");
        let s = schema(&src);
        assert!(matches!(
            validate_schema(&s),
            Err(SchemaError::MaxNestingExceeded { .. })
        ));
    }
}
