use std::collections::{HashMap, HashSet};

use ffire_schema::{PrimitiveKind, Schema, StructType, Type};

/// A target-language-agnostic type reference, with struct recursion
/// flattened to a name lookup into [`Plan::structs`] instead of the
/// resolver's `Rc<OnceCell<_>>` handle — every backend walks this tree
/// the same way regardless of how the model represents self-reference.
#[derive(Debug, Clone)]
pub enum TypeIr {
    Primitive { kind: PrimitiveKind, optional: bool },
    Array { element: Box<TypeIr>, optional: bool },
    StructRef { name: String, optional: bool },
}

impl TypeIr {
    pub fn is_optional(&self) -> bool {
        match self {
            TypeIr::Primitive { optional, .. } => *optional,
            TypeIr::Array { optional, .. } => *optional,
            TypeIr::StructRef { optional, .. } => *optional,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldIr {
    pub name: String,
    pub json_name: String,
    pub ty: TypeIr,
}

#[derive(Debug, Clone)]
pub struct StructIr {
    pub name: String,
    pub fields: Vec<FieldIr>,
}

#[derive(Debug, Clone)]
pub struct MessageIr {
    pub name: String,
    pub ty: TypeIr,
}

/// The generator's shared input: every struct a message transitively
/// depends on, in dependency order (a struct nested by value always
/// appears before the struct that embeds it), plus the message list.
#[derive(Debug, Clone)]
pub struct Plan {
    pub package: String,
    pub structs: Vec<StructIr>,
    pub messages: Vec<MessageIr>,
}

/// Walks every message's target type and flattens the struct graph into a
/// dependency-ordered [`Plan`], per §4.6's shared-walker design.
pub fn build_plan(schema: &Schema) -> Plan {
    let mut order = Vec::new();
    let mut by_name = HashMap::new();
    let mut in_progress = HashSet::new();
    let mut added = HashSet::new();

    let messages = schema
        .messages()
        .iter()
        .map(|m| MessageIr {
            name: m.name.clone(),
            ty: convert_type(&m.target, &mut order, &mut by_name, &mut in_progress, &mut added),
        })
        .collect();

    let structs = order
        .into_iter()
        .map(|name| by_name.remove(&name).expect("every ordered name was inserted"))
        .collect();

    Plan { package: schema.package().to_string(), structs, messages }
}

fn convert_type(
    ty: &Type,
    order: &mut Vec<String>,
    by_name: &mut HashMap<String, StructIr>,
    in_progress: &mut HashSet<String>,
    added: &mut HashSet<String>,
) -> TypeIr {
    match ty {
        Type::Primitive(p) => TypeIr::Primitive { kind: p.kind, optional: p.optional },
        Type::Array(a) => TypeIr::Array {
            element: Box::new(convert_type(&a.element, order, by_name, in_progress, added)),
            optional: a.optional,
        },
        Type::Struct(s) => convert_struct(s, order, by_name, in_progress, added),
        Type::NamedRef(name) => {
            unreachable!("validated schema never contains an unresolved reference '{name}'")
        }
    }
}

fn convert_struct(
    s: &StructType,
    order: &mut Vec<String>,
    by_name: &mut HashMap<String, StructIr>,
    in_progress: &mut HashSet<String>,
    added: &mut HashSet<String>,
) -> TypeIr {
    if added.contains(&s.name) || in_progress.contains(&s.name) {
        return TypeIr::StructRef { name: s.name.clone(), optional: s.optional };
    }

    in_progress.insert(s.name.clone());
    let fields = s
        .fields()
        .iter()
        .map(|f| FieldIr {
            name: f.name.clone(),
            json_name: f.json_name.clone(),
            ty: convert_type(&f.ty, order, by_name, in_progress, added),
        })
        .collect();
    in_progress.remove(&s.name);

    added.insert(s.name.clone());
    order.push(s.name.clone());
    by_name.insert(s.name.clone(), StructIr { name: s.name.clone(), fields });

    TypeIr::StructRef { name: s.name.clone(), optional: s.optional }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(src: &str) -> Schema {
        ffire_parser::parse(src).unwrap()
    }

    #[test]
    fn orders_nested_structs_before_their_parent() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Id Identity\n}\ntype Identity struct {\n  Name string\n}\n",
        );
        let plan = build_plan(&s);
        let names: Vec<&str> = plan.structs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Identity", "Device"]);
    }

    #[test]
    fn self_referential_struct_emits_once() {
        let s = schema("package demo\ntype Message = Node\ntype Node struct {\n  Next *Node\n}\n");
        let plan = build_plan(&s);
        assert_eq!(plan.structs.len(), 1);
        assert_eq!(plan.structs[0].name, "Node");
    }

    #[test]
    fn messages_reference_their_target_type() {
        let s = schema("package demo\ntype Message = int32\n");
        let plan = build_plan(&s);
        assert_eq!(plan.messages.len(), 1);
        assert_eq!(plan.messages[0].name, "Message");
        assert!(plan.structs.is_empty());
    }
}
