use crate::error::ParseError;

/// A lexical token, tagged with the 1-based line it started on for error
/// messages (§7 "Propagation": errors should be locatable).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    /// An integer literal. Only meaningful as a diagnostic for the
    /// unsupported fixed-size-array construct (`[3]T`) — the grammar has
    /// no other use for number literals.
    Number(String),
    /// Raw content of a backtick-quoted struct tag, e.g. `json:"unit"`.
    Tag(String),
    Equals,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Star,
    Eof,
}

/// Tokenizes schema source. `//` line comments and `/* ... */` block
/// comments are recognized and discarded, per §6 "Comments are permitted
/// and ignored by the Parser."
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    let mut line = 1usize;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                let mut closed = false;
                while i + 1 < chars.len() {
                    if chars[i] == '*' && chars[i + 1] == '/' {
                        i += 2;
                        closed = true;
                        break;
                    }
                    if chars[i] == '\n' {
                        line += 1;
                    }
                    i += 1;
                }
                if !closed {
                    return Err(ParseError::Syntax {
                        line,
                        message: "unterminated block comment".to_string(),
                    });
                }
            }
            '=' => {
                tokens.push(Token {
                    kind: TokenKind::Equals,
                    line,
                });
                i += 1;
            }
            '{' => {
                tokens.push(Token {
                    kind: TokenKind::LBrace,
                    line,
                });
                i += 1;
            }
            '}' => {
                tokens.push(Token {
                    kind: TokenKind::RBrace,
                    line,
                });
                i += 1;
            }
            '[' => {
                tokens.push(Token {
                    kind: TokenKind::LBracket,
                    line,
                });
                i += 1;
            }
            ']' => {
                tokens.push(Token {
                    kind: TokenKind::RBracket,
                    line,
                });
                i += 1;
            }
            '*' => {
                tokens.push(Token {
                    kind: TokenKind::Star,
                    line,
                });
                i += 1;
            }
            '`' => {
                let start_line = line;
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != '`' {
                    if chars[i] == '\n' {
                        line += 1;
                    }
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(ParseError::Syntax {
                        line: start_line,
                        message: "unterminated tag literal".to_string(),
                    });
                }
                let content: String = chars[start..i].iter().collect();
                tokens.push(Token {
                    kind: TokenKind::Tag(content),
                    line: start_line,
                });
                i += 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let digits: String = chars[start..i].iter().collect();
                tokens.push(Token {
                    kind: TokenKind::Number(digits),
                    line,
                });
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                tokens.push(Token {
                    kind: TokenKind::Ident(ident),
                    line,
                });
            }
            other => {
                return Err(ParseError::Syntax {
                    line,
                    message: format!("unexpected character '{other}'"),
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_struct_field_with_tag() {
        let src = "type Device struct {\n  Name string `json:\"name\"`\n}\n";
        let tokens = tokenize(src).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();
        assert!(kinds.contains(&TokenKind::Tag("json:\"name\"".to_string())));
        assert_eq!(*kinds.last().unwrap(), TokenKind::Eof);
    }

    #[test]
    fn skips_line_and_block_comments() {
        let src = "// leading\npackage demo /* trailing */\n";
        let tokens = tokenize(src).unwrap();
        let idents: Vec<_> = tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Ident(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(idents, vec!["package", "demo"]);
    }

    #[test]
    fn rejects_unterminated_tag() {
        let src = "type X string `json:\"x\"";
        assert!(tokenize(src).is_err());
    }
}
