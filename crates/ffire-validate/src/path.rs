/// One segment of a schema path, used to render error locations the way
/// §7's worked example does: `Plugins[3].Parameters[0].Unit`.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Renders a path the way §7 shows: dotted field access, bracketed index,
/// no leading separator before the first segment.
pub fn render_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for seg in path {
        match seg {
            PathSegment::Field(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            PathSegment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_mixed_path() {
        let path = vec![
            PathSegment::Field("Plugins".to_string()),
            PathSegment::Index(3),
            PathSegment::Field("Parameters".to_string()),
            PathSegment::Index(0),
            PathSegment::Field("Unit".to_string()),
        ];
        assert_eq!(render_path(&path), "Plugins[3].Parameters[0].Unit");
    }
}
