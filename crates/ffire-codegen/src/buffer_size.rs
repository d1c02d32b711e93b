use std::collections::HashSet;

use ffire_schema::PrimitiveKind;

use crate::ir::{Plan, TypeIr};

/// Computes the exact encoded size of `ty` when every reachable atom has a
/// fixed width — strings, arrays, and structs whose own fields reach a
/// string or array all make the size unknowable ahead of encode, per
/// §4.6's buffer-sizing strategy. `None` tells a backend to append instead
/// of pre-sizing.
pub fn static_size(plan: &Plan, ty: &TypeIr) -> Option<usize> {
    static_size_inner(plan, ty, &mut HashSet::new())
}

fn static_size_inner(plan: &Plan, ty: &TypeIr, visiting: &mut HashSet<String>) -> Option<usize> {
    let tag = usize::from(ty.is_optional());
    let body = match ty {
        TypeIr::Primitive { kind: PrimitiveKind::String, .. } => return None,
        TypeIr::Primitive { kind, .. } => kind.fixed_width().expect("non-string primitive has a fixed width"),
        TypeIr::Array { .. } => return None,
        TypeIr::StructRef { name, .. } => {
            if visiting.contains(name) {
                return None;
            }
            visiting.insert(name.clone());
            let s = plan.structs.iter().find(|s| &s.name == name)?;
            let mut sum = 0;
            for field in &s.fields {
                sum += static_size_inner(plan, &field.ty, visiting)?;
            }
            visiting.remove(name);
            sum
        }
    };
    Some(tag + body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build_plan;

    fn schema(src: &str) -> ffire_schema::Schema {
        ffire_parser::parse(src).unwrap()
    }

    #[test]
    fn fixed_width_struct_has_static_size() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Channels int32\n  Active bool\n}\n",
        );
        let plan = build_plan(&s);
        assert_eq!(static_size(&plan, &plan.messages[0].ty), Some(5));
    }

    #[test]
    fn string_field_has_no_static_size() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n}\n",
        );
        let plan = build_plan(&s);
        assert_eq!(static_size(&plan, &plan.messages[0].ty), None);
    }

    #[test]
    fn self_referential_struct_has_no_static_size() {
        let s = schema("package demo\ntype Message = Node\ntype Node struct {\n  Next *Node\n}\n");
        let plan = build_plan(&s);
        assert_eq!(static_size(&plan, &plan.messages[0].ty), None);
    }
}
