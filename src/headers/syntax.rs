//! Grammar predicates shared by header handlers (RFC 9110 §5.6).

/// tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." /
///         "^" / "_" / "`" / "|" / "~" / DIGIT / ALPHA
pub fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tchar)
}

/// Visible ASCII plus space and horizontal tab.
pub fn is_printable(s: &str) -> bool {
    s.chars().all(|c| c == '\t' || (' '..='~').contains(&c))
}

pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Strip optional whitespace (SP / HTAB) from both ends.
pub fn trim_ows(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\t')
}

/// quoted-string with backslash escapes; the whole input must be consumed.
pub fn is_quoted_string(s: &str) -> bool {
    match quoted_string_len(s) {
        Some(len) => len == s.len(),
        None => false,
    }
}

/// Length in bytes of the quoted-string at the start of `s`.
pub fn quoted_string_len(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, '"')) => {}
        _ => return None,
    }
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some(i + 1),
            '\\' => {
                let (_, escaped) = chars.next()?;
                if !(escaped == '\t' || (' '..='~').contains(&escaped)) {
                    return None;
                }
            }
            '\t' | ' '..='~' => {}
            _ => return None,
        }
    }
    None
}

/// Remove surrounding quotes and escapes from a quoted-string.
pub fn unquote(s: &str) -> String {
    if !is_quoted_string(s) {
        return s.to_string();
    }
    let inner = &s[1..s.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Split a comma-separated list, ignoring commas inside quoted strings.
/// Elements are trimmed and empty elements dropped (RFC 9110 §5.6.1).
pub fn split_list(s: &str) -> Vec<&str> {
    split_outside_quotes(s, ',')
}

/// Split on `delim` wherever it isn't inside a quoted string. Elements are
/// trimmed and empty elements dropped.
pub fn split_outside_quotes(s: &str, delim: char) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        if c == '"' {
            in_quotes = true;
        } else if c == delim {
            let item = trim_ows(&s[start..i]);
            if !item.is_empty() {
                items.push(item);
            }
            start = i + c.len_utf8();
        }
    }

    let item = trim_ows(&s[start..]);
    if !item.is_empty() {
        items.push(item);
    }
    items
}

/// `#token`: a non-empty comma list of tokens.
pub fn is_token_list(s: &str) -> bool {
    let items = split_list(s);
    !items.is_empty() && items.iter().all(|item| is_token(item))
}

/// entity-tag = [ "W/" ] DQUOTE *etagc DQUOTE
pub fn is_entity_tag(s: &str) -> bool {
    let opaque = s.strip_prefix("W/").unwrap_or(s);
    opaque.len() >= 2
        && opaque.starts_with('"')
        && opaque.ends_with('"')
        && opaque[1..opaque.len() - 1]
            .chars()
            .all(|c| c == '!' || ('#'..='~').contains(&c) || !c.is_ascii())
}
