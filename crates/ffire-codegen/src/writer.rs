/// Indentation-tracking string builder shared by every backend, so each
/// target's emitter reads as a flat sequence of `line`/`open`/`close` calls
/// instead of manual indentation bookkeeping.
pub struct CodeWriter {
    buf: String,
    indent: usize,
    indent_str: &'static str,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::with_indent("    ")
    }

    pub fn with_indent(indent_str: &'static str) -> Self {
        Self { buf: String::new(), indent: 0, indent_str }
    }

    pub fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.buf.push_str(self.indent_str);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Writes `header` followed by `open_token` (e.g. `"{"`), then indents.
    pub fn open(&mut self, header: &str, open_token: &str) {
        if open_token.is_empty() {
            self.line(header);
        } else {
            self.line(&format!("{header} {open_token}"));
        }
        self.indent += 1;
    }

    /// Dedents, then writes `close_token` (e.g. `"}"`).
    pub fn close(&mut self, close_token: &str) {
        self.indent = self.indent.saturating_sub(1);
        if !close_token.is_empty() {
            self.line(close_token);
        }
    }

    /// Dedents, writes `close_token` + `header` + `open_token` on one line
    /// (e.g. `"} else {"`), then re-indents. Brace languages require the
    /// continuation keyword on the closing brace's line; this is the
    /// difference between compiling and an automatic-semicolon-insertion
    /// syntax error in languages like Go.
    pub fn close_open(&mut self, close_token: &str, header: &str, open_token: &str) {
        self.indent = self.indent.saturating_sub(1);
        let mut parts = Vec::new();
        if !close_token.is_empty() {
            parts.push(close_token);
        }
        if !header.is_empty() {
            parts.push(header);
        }
        if !open_token.is_empty() {
            parts.push(open_token);
        }
        self.line(&parts.join(" "));
        self.indent += 1;
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_nested_blocks() {
        let mut w = CodeWriter::new();
        w.open("fn foo()", "{");
        w.line("let x = 1;");
        w.open("if x == 1", "{");
        w.line("return;");
        w.close("}");
        w.close("}");
        let code = w.finish();
        assert_eq!(
            code,
            "fn foo() {\n    let x = 1;\n    if x == 1 {\n        return;\n    }\n}\n"
        );
    }

    #[test]
    fn close_open_merges_brace_and_else() {
        let mut w = CodeWriter::new();
        w.open("if x == 1", "{");
        w.line("a();");
        w.close_open("}", "else", "{");
        w.line("b();");
        w.close("}");
        assert_eq!(
            w.finish(),
            "if x == 1 {\n    a();\n} else {\n    b();\n}\n"
        );
    }
}
