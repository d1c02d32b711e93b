/// The closed set of primitive kinds a schema may reference, per §3.
///
/// Closed by design: `ValidateSchema` rejects anything else with
/// `UnknownPrimitive`, and every downstream consumer can match
/// exhaustively without a catch-all arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
}

impl PrimitiveKind {
    /// Parses the primitive keyword as it appears in schema source.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "bool" => Self::Bool,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "string" => Self::String,
            _ => return None,
        })
    }

    pub fn as_keyword(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Inclusive signed range for integer kinds, used by `IntOutOfRange`
    /// checks in the validator. `None` for non-integer kinds.
    pub fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            Self::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// On-wire width in bytes, excluding the `string` variant's variable tail.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Bool => Some(1),
            Self::Int8 => Some(1),
            Self::Int16 => Some(2),
            Self::Int32 => Some(4),
            Self::Int64 => Some(8),
            Self::Float32 => Some(4),
            Self::Float64 => Some(8),
            Self::String => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_all_keywords() {
        for kind in [
            PrimitiveKind::Bool,
            PrimitiveKind::Int8,
            PrimitiveKind::Int16,
            PrimitiveKind::Int32,
            PrimitiveKind::Int64,
            PrimitiveKind::Float32,
            PrimitiveKind::Float64,
            PrimitiveKind::String,
        ] {
            assert_eq!(PrimitiveKind::from_keyword(kind.as_keyword()), Some(kind));
        }
    }

    #[test]
    fn rejects_unknown_keyword() {
        assert_eq!(PrimitiveKind::from_keyword("uint32"), None);
    }

    #[test]
    fn int32_range_matches_wire_width() {
        assert_eq!(
            PrimitiveKind::Int32.integer_range(),
            Some((i32::MIN as i64, i32::MAX as i64))
        );
    }
}
