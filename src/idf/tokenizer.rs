//! Line tokenizer for IDF text.
//!
//! IDF files are whitespace-separated. Double-quoted text forms a single
//! token, so `"---- GND"` is one field, not several.

/// A token together with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text with quotes removed.
    pub text: String,
    /// 1-based source line.
    pub line: usize,
}

impl Token {
    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Splits one line into tokens.
///
/// Whitespace outside quotes separates tokens and never produces empty ones.
/// A quoted empty string (`""`) is kept because it still occupies a field.
/// An unterminated quote runs to the end of the line.
#[must_use]
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut quoted = false;

    for c in line.chars() {
        if in_quote {
            if c == '"' {
                in_quote = false;
            } else {
                current.push(c);
            }
        } else if c == '"' {
            in_quote = true;
            quoted = true;
        } else if c.is_whitespace() {
            if !current.is_empty() || quoted {
                tokens.push(std::mem::take(&mut current));
            }
            quoted = false;
        } else {
            current.push(c);
        }
    }

    if !current.is_empty() || quoted {
        tokens.push(current);
    }

    tokens
}

/// Tokenizes a whole file, flattening lines into one stream.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    text.lines()
        .enumerate()
        .flat_map(|(index, line)| {
            tokenize_line(line).into_iter().map(move |text| Token {
                text,
                line: index + 1,
            })
        })
        .collect()
}
