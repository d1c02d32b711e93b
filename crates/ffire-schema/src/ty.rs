use std::cell::OnceCell;
use std::rc::Rc;

use crate::field::Field;
use crate::primitive::PrimitiveKind;

/// A primitive leaf type, per §3.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveType {
    pub kind: PrimitiveKind,
    pub optional: bool,
}

/// An array of some element type, per §3. The element may itself be any
/// `Type`, including another array or struct.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element: Box<Type>,
    pub optional: bool,
}

/// A struct type: a named, ordered list of fields, per §3.
///
/// `fields` is held behind `Rc<OnceCell<Vec<Field>>>` rather than a plain
/// `Vec<Field>` so the resolver can tie the knot on self-referential and
/// mutually-recursive struct declarations (§9 "Named references and
/// cycles"): the resolver registers one shared, still-empty cell per
/// struct *before* resolving its field list, so a field that refers back
/// to the struct being resolved (directly, or through another struct)
/// gets a clone of the same `Rc` rather than recursing forever. The cell
/// is filled exactly once, by the declaration that owns it, and is never
/// mutated again — per §3 "Lifecycle", the model is frozen before
/// `ValidateSchema` returns success.
#[derive(Debug, Clone)]
pub struct StructType {
    pub name: String,
    fields: Rc<OnceCell<Vec<Field>>>,
    pub optional: bool,
}

impl StructType {
    /// Creates a struct type whose field list is already known.
    pub fn new(name: impl Into<String>, fields: Vec<Field>, optional: bool) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(fields);
        Self {
            name: name.into(),
            fields: Rc::new(cell),
            optional,
        }
    }

    /// Creates an as-yet-unresolved struct handle: a shared, empty cell the
    /// resolver can clone into a self- or mutually-referential field before
    /// calling `finish` with the real field list.
    pub fn placeholder(name: impl Into<String>, optional: bool) -> Self {
        Self {
            name: name.into(),
            fields: Rc::new(OnceCell::new()),
            optional,
        }
    }

    /// Fills in a placeholder's field list. Returns `Err(fields)` if this
    /// handle's cell was already filled (a resolver bug, not a user-facing
    /// error — each declaration must call this exactly once).
    pub fn finish(&self, fields: Vec<Field>) -> Result<(), Vec<Field>> {
        self.fields.set(fields)
    }

    /// Returns a copy of this handle with the optional flag overridden,
    /// sharing the same underlying field cell (so filling it through either
    /// handle resolves both).
    pub fn with_optional(&self, optional: bool) -> Self {
        Self {
            name: self.name.clone(),
            fields: Rc::clone(&self.fields),
            optional,
        }
    }

    /// The struct's fields. Panics if called before the model is frozen —
    /// a genuine internal invariant violation, not a data error: every
    /// declaration fills its cell during resolution, before
    /// `ValidateSchema` or any other consumer ever sees the `Schema`.
    pub fn fields(&self) -> &[Field] {
        self.fields
            .get()
            .expect("StructType::fields read before resolver finished")
            .as_slice()
    }

    /// Whether this handle's field cell has been filled yet. Used only by
    /// the resolver to detect whether a reference is to a
    /// still-in-progress (i.e. cyclic) declaration.
    pub fn is_resolved(&self) -> bool {
        self.fields.get().is_some()
    }
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.fields, &other.fields) {
            return self.name == other.name && self.optional == other.optional;
        }
        self.name == other.name && self.optional == other.optional && self.fields.get() == other.fields.get()
    }
}

/// The schema type sum, per §3's variant table.
///
/// `NamedRef` is a resolver-only placeholder: the parser's first pass
/// registers declarations, the second pass walks every `TypeExpr` and
/// replaces each `NamedRef` with the concrete type it names (§4.1). A
/// validated `Schema` never contains one — see `ffire_validate`'s
/// `ValidateSchema`, which would otherwise have nothing left to resolve it.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(PrimitiveType),
    Array(ArrayType),
    Struct(StructType),
    NamedRef(String),
}

impl Type {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
            Self::NamedRef(_) => "named_ref",
        }
    }

    /// Whether this type carries the optional prefix on the wire.
    /// `NamedRef` has no wire representation of its own; resolution
    /// propagates the pointer prefix onto whatever it resolves to.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Primitive(t) => t.optional,
            Self::Array(t) => t.optional,
            Self::Struct(t) => t.optional,
            Self::NamedRef(_) => false,
        }
    }

    /// Returns a copy of this type with the optional flag set, used by the
    /// resolver when propagating a pointer prefix onto a freshly-resolved
    /// named type (§3 "Lifecycle"): each reference gets its own copy (for
    /// structs, a shallow handle sharing the same field cell) so two
    /// references to the same named type with different optionality never
    /// alias their optional flag.
    pub fn with_optional(&self, optional: bool) -> Type {
        match self {
            Self::Primitive(t) => Type::Primitive(PrimitiveType {
                kind: t.kind,
                optional,
            }),
            Self::Array(t) => Type::Array(ArrayType {
                element: t.element.clone(),
                optional,
            }),
            Self::Struct(t) => Type::Struct(t.with_optional(optional)),
            Self::NamedRef(name) => Type::NamedRef(name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_optional_does_not_alias_flag() {
        let base = Type::Struct(StructType::new("Device", vec![], false));
        let opt = base.with_optional(true);
        assert!(!base.is_optional());
        assert!(opt.is_optional());
    }

    #[test]
    fn with_optional_shares_field_cell() {
        let handle = StructType::placeholder("Node", false);
        let opt_handle = handle.with_optional(true);
        handle.finish(vec![]).unwrap();
        assert!(opt_handle.is_resolved());
        assert_eq!(opt_handle.fields().len(), 0);
    }

    #[test]
    fn self_referential_struct_ties_the_knot() {
        // type Node struct { Next *Node }
        let placeholder = StructType::placeholder("Node", false);
        let next_field_ty = Type::Struct(placeholder.with_optional(true));
        let field = Field::new("Next", next_field_ty, None);
        placeholder.finish(vec![field]).unwrap();

        let node = Type::Struct(placeholder);
        if let Type::Struct(s) = &node {
            let fields = s.fields();
            assert_eq!(fields.len(), 1);
            if let Type::Struct(next) = &fields[0].ty {
                assert!(next.optional);
                assert_eq!(next.fields().len(), 1);
            } else {
                panic!("expected struct field");
            }
        }
    }
}
