use std::fmt::Write as _;

/// Renders a 16-bytes-per-row hex dump with an ASCII column, e.g.:
/// `00000000  07 00 53 70 65 61 6b 65 72 02 00 00 00           |..Speaker....|`
pub fn render(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row_index, row) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", row_index * 16);
        for i in 0..16 {
            match row.get(i) {
                Some(b) => {
                    let _ = write!(out, "{b:02x} ");
                }
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }
        out.push_str(" |");
        for &b in row {
            let ch = if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' };
            out.push(ch);
        }
        out.push_str("|\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_short_row() {
        let dump = render(b"hi");
        assert!(dump.starts_with("00000000  68 69"));
        assert!(dump.ends_with("|hi|\n"));
    }

    #[test]
    fn wraps_after_sixteen_bytes() {
        let dump = render(&[0u8; 20]);
        assert_eq!(dump.lines().count(), 2);
    }
}
