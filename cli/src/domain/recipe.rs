//! Build-recipe (Dockerfile) directive parser.
//!
//! Only the surface the template compiler needs: logical lines, the
//! instruction keyword, and quote-aware word splitting. Instruction
//! semantics are left to the caller.

use crate::domain::error::CompileError;

/// One build instruction with its raw argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Upper-cased instruction keyword, e.g. `LABEL`.
    pub instruction: String,
    /// Everything after the keyword, continuation lines joined.
    pub rest: String,
    /// 1-based line the directive starts on.
    pub line: usize,
}

/// Parse a recipe into its ordered directive list.
///
/// Blank lines and `#` comments are skipped, including comments inside a
/// continuation. A trailing `\` joins the next line.
///
/// # Errors
///
/// Returns `CompileError::Syntax` for a dangling continuation or an
/// instruction with no arguments.
pub fn parse(source: &str) -> Result<Vec<Directive>, CompileError> {
    let mut directives = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw.trim();
        if trimmed.starts_with('#') || (trimmed.is_empty() && pending.is_none()) {
            continue;
        }

        let (body, continues) = match trimmed.strip_suffix('\\') {
            Some(body) => (body.trim_end(), true),
            None => (trimmed, false),
        };

        let (start, mut text) = pending.take().unwrap_or((line_no, String::new()));
        if !text.is_empty() && !body.is_empty() {
            text.push(' ');
        }
        text.push_str(body);

        if continues {
            pending = Some((start, text));
        } else if !text.is_empty() {
            directives.push(directive(start, &text)?);
        }
    }

    if let Some((line, _)) = pending {
        return Err(CompileError::Syntax {
            line,
            message: "unterminated line continuation".to_string(),
        });
    }
    Ok(directives)
}

fn directive(line: usize, text: &str) -> Result<Directive, CompileError> {
    let (keyword, rest) = text
        .split_once(char::is_whitespace)
        .map_or((text, ""), |(k, r)| (k, r.trim()));
    if rest.is_empty() {
        return Err(CompileError::Syntax {
            line,
            message: format!("{} requires at least one argument", keyword.to_uppercase()),
        });
    }
    Ok(Directive {
        instruction: keyword.to_uppercase(),
        rest: rest.to_string(),
        line,
    })
}

impl Directive {
    /// Split the argument text on unquoted whitespace, keeping quotes.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Syntax` on an unterminated quote.
    pub fn words(&self) -> Result<Vec<String>, CompileError> {
        split_words(&self.rest).map_err(|message| CompileError::Syntax {
            line: self.line,
            message,
        })
    }

    /// Values of a `VOLUME`-style directive: a JSON array or plain words.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Syntax` if the JSON form is malformed.
    pub fn list(&self) -> Result<Vec<String>, CompileError> {
        if self.rest.starts_with('[') {
            return serde_json::from_str(&self.rest).map_err(|e| CompileError::Syntax {
                line: self.line,
                message: format!("invalid JSON array: {e}"),
            });
        }
        self.words()
    }

    /// Key/value pairs of a `LABEL` directive, values still quoted.
    ///
    /// Supports both `key=value` pairs and the legacy `key value` form.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::MissingLabelValue` for a bare key.
    pub fn pairs(&self) -> Result<Vec<(String, String)>, CompileError> {
        let words = self.words()?;
        let Some(first) = words.first() else {
            return Ok(Vec::new());
        };

        if split_assignment(first).is_none() {
            let value = self.rest[first.len()..].trim();
            if value.is_empty() {
                return Err(CompileError::MissingLabelValue {
                    line: self.line,
                    key: unquote(first),
                });
            }
            return Ok(vec![(unquote(first), value.to_string())]);
        }

        words
            .iter()
            .map(|word| {
                split_assignment(word)
                    .map(|(k, v)| (unquote(k), v.to_string()))
                    .ok_or_else(|| CompileError::MissingLabelValue {
                        line: self.line,
                        key: unquote(word),
                    })
            })
            .collect()
    }
}

/// Split `word` on its first `=` that is not inside quotes.
#[must_use]
pub fn split_assignment(word: &str) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in word.char_indices() {
        match (quote, c) {
            _ if escaped => escaped = false,
            (Some('"'), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '=') => return Some((&word[..i], &word[i + 1..])),
            _ => {}
        }
    }
    None
}

fn split_words(text: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some('"') | None, '\\') => {
                current.push(c);
                escaped = true;
            }
            (Some(q), c) if c == q => {
                current.push(c);
                quote = None;
            }
            (None, '"' | '\'') => {
                current.push(c);
                quote = Some(c);
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    if !current.is_empty() {
        words.push(current);
    }
    Ok(words)
}

/// Remove one level of quoting from a literal.
///
/// Double-quoted text has its backslash escapes resolved; single-quoted text
/// is taken verbatim. Anything else is returned unchanged, as is text whose
/// quotes do not wrap the whole value.
#[must_use]
pub fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        let inner = &raw[1..raw.len() - 1];
        if !inner.contains('\'') {
            return inner.to_string();
        }
    }
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        if let Some(value) = unescape_double(&raw[1..raw.len() - 1]) {
            return value;
        }
    }
    raw.to_string()
}

fn unescape_double(inner: &str) -> Option<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return None,
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                other => out.push(other),
            },
            c => out.push(c),
        }
    }
    Some(out)
}
