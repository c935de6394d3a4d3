use crate::error::ResolveError;

/// Splits `text` into words following POSIX shell quoting rules.
///
/// Single quotes are literal, double quotes honor backslash before `"` and
/// `\`, and a backslash outside quotes escapes the next character. Adjacent
/// quoted and unquoted parts join into one word. Nothing is expanded.
pub fn split_words(text: &str) -> Result<Vec<String>, ResolveError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Normal,
        SingleQuoted,
        DoubleQuoted,
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut mode = Mode::Normal;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match mode {
            Mode::Normal => match ch {
                '\'' => {
                    mode = Mode::SingleQuoted;
                    in_word = true;
                }
                '"' => {
                    mode = Mode::DoubleQuoted;
                    in_word = true;
                }
                '\\' => {
                    let next = chars.next().ok_or_else(|| {
                        ResolveError::MalformedShellText(format!(
                            "no escaped character at end of {text:?}"
                        ))
                    })?;
                    current.push(next);
                    in_word = true;
                }
                ' ' | '\t' | '\n' | '\r' => {
                    if in_word {
                        out.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(ch);
                    in_word = true;
                }
            },
            Mode::SingleQuoted => {
                if ch == '\'' {
                    mode = Mode::Normal;
                } else {
                    current.push(ch);
                }
            }
            Mode::DoubleQuoted => match ch {
                '"' => mode = Mode::Normal,
                '\\' => match chars.peek() {
                    Some(&next) if next == '"' || next == '\\' => {
                        current.push(next);
                        chars.next();
                    }
                    Some(_) => current.push(ch),
                    None => {
                        return Err(ResolveError::MalformedShellText(format!(
                            "no closing quotation in {text:?}"
                        )));
                    }
                },
                _ => current.push(ch),
            },
        }
    }

    if mode != Mode::Normal {
        return Err(ResolveError::MalformedShellText(format!(
            "no closing quotation in {text:?}"
        )));
    }
    if in_word {
        out.push(current);
    }
    Ok(out)
}

fn is_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "@%+=:,./_-".contains(ch)
}

/// Quotes a single word so a POSIX shell reads it back unchanged.
pub fn quote(word: &str) -> String {
    if word.is_empty() {
        return "''".to_string();
    }
    if word.chars().all(is_safe) {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r#"'"'"'"#))
}

/// Re-splits shell-word text and quotes each word again.
pub fn quote_words(text: &str) -> Result<String, ResolveError> {
    let words = split_words(text)?;
    Ok(words
        .iter()
        .map(|word| quote(word))
        .collect::<Vec<_>>()
        .join(" "))
}
