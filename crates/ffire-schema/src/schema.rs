use crate::message::Message;
use crate::ty::Type;

/// A fully parsed and resolved schema: a package identifier, the declared
/// named types (declarations without `=`), and the ordered message
/// declarations that are the toolchain's unit of encode/decode (§3).
///
/// Produced by `ffire_parser::parse`, consumed read-only by every other
/// crate once `ffire_validate::validate_schema` returns `Ok`
/// (§3 "Lifecycle").
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    package: String,
    named_types: Vec<(String, Type)>,
    messages: Vec<Message>,
}

impl Schema {
    pub fn new(package: impl Into<String>, named_types: Vec<(String, Type)>, messages: Vec<Message>) -> Self {
        Self {
            package: package.into(),
            named_types,
            messages,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// All named-type declarations (`type Name TypeExpr`), in declaration
    /// order. `ValidateSchema` walks these in addition to message targets
    /// because a named type that no message ever references must still
    /// obey every §3 invariant.
    pub fn named_types(&self) -> &[(String, Type)] {
        &self.named_types
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Looks up a message declaration by its exported name.
    /// Fails with `None` when absent; callers map this to `MessageNotFound`.
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "package {} ({} named types, {} messages)",
            self.package,
            self.named_types.len(),
            self.messages.len()
        )
    }
}
