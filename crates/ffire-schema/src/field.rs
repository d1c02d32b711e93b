use crate::ty::Type;

/// One field of a struct type.
///
/// `json_name` is derived once, at construction time, from the `json:"…"`
/// key of `raw_tag` (the portion before the first comma) and otherwise
/// defaults to `name`. Other `key="value"` pairs in the tag are kept
/// verbatim in `raw_tag` but carry no semantic weight downstream — §3
/// requires they be preserved, not interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub raw_tag: Option<String>,
    pub json_name: String,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type, raw_tag: Option<String>) -> Self {
        let name = name.into();
        let json_name = raw_tag
            .as_deref()
            .and_then(parse_json_tag_name)
            .unwrap_or_else(|| name.clone());
        Self {
            name,
            ty,
            raw_tag,
            json_name,
        }
    }
}

/// Extracts the `json:"…"` value from a raw Go-style struct tag and returns
/// the portion before the first comma, e.g. `json:"unit,omitempty"` -> `unit`.
/// Returns `None` if there is no `json` key, or its value is empty.
fn parse_json_tag_name(raw_tag: &str) -> Option<String> {
    let mut rest = raw_tag;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let colon = rest.find(':')?;
        let key = &rest[..colon];
        let after_colon = &rest[colon + 1..];
        let quoted = after_colon.strip_prefix('"')?;
        let end = quoted.find('"')?;
        let value = &quoted[..end];
        rest = &quoted[end + 1..];

        if key == "json" {
            let name = value.split(',').next().unwrap_or("");
            return if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::PrimitiveKind;
    use crate::ty::PrimitiveType;

    fn string_type() -> Type {
        Type::Primitive(PrimitiveType {
            kind: PrimitiveKind::String,
            optional: false,
        })
    }

    #[test]
    fn defaults_json_name_to_field_name() {
        let f = Field::new("Unit", string_type(), None);
        assert_eq!(f.json_name, "Unit");
    }

    #[test]
    fn derives_json_name_from_tag() {
        let f = Field::new("Unit", string_type(), Some(r#"json:"unit,omitempty""#.into()));
        assert_eq!(f.json_name, "unit");
    }

    #[test]
    fn preserves_other_tag_pairs_verbatim() {
        let tag = r#"json:"unit" validate:"required""#;
        let f = Field::new("Unit", string_type(), Some(tag.into()));
        assert_eq!(f.json_name, "unit");
        assert_eq!(f.raw_tag.as_deref(), Some(tag));
    }

    #[test]
    fn falls_back_when_json_key_absent() {
        let f = Field::new("Unit", string_type(), Some(r#"validate:"required""#.into()));
        assert_eq!(f.json_name, "Unit");
    }
}
