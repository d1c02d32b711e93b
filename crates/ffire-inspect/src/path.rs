/// Builds a schema path string the way §4.5 shows (`Plugins[3].Parameters[0].Unit`).
/// Segments are pre-rendered: a field pushes its name, an array element
/// pushes `[index]` already bracketed, so joining only needs to know
/// whether to insert a dot before a field segment.
pub fn render_path(segments: &[String]) -> String {
    let mut out = String::new();
    for seg in segments {
        if seg.starts_with('[') {
            out.push_str(seg);
        } else {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(seg);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_mixed_path() {
        let segments = vec![
            "Plugins".to_string(),
            "[3]".to_string(),
            "Parameters".to_string(),
            "[0]".to_string(),
            "Unit".to_string(),
        ];
        assert_eq!(render_path(&segments), "Plugins[3].Parameters[0].Unit");
    }

    #[test]
    fn empty_path_renders_empty_string() {
        assert_eq!(render_path(&[]), "");
    }
}
