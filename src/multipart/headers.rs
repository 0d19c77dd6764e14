//! Part header parsing.
//!
//! Header blocks are small and mostly ASCII, so unlike payloads they are
//! decoded as (lossy) UTF-8. Browsers send non-ASCII file names as raw UTF-8.

use percent_encoding::percent_decode_str;

use crate::error::ShareError;

/// Headers of one multipart part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartHeaders {
    fields: Vec<(String, String)>,
    name: Option<String>,
    filename: Option<String>,
}

impl PartHeaders {
    /// Parse a header block (the bytes between the delimiter line and the blank line).
    pub fn parse(block: &[u8]) -> Result<Self, ShareError> {
        let text = String::from_utf8_lossy(block);
        let mut fields: Vec<(String, String)> = Vec::new();

        for line in text.split("\r\n") {
            if line.is_empty() {
                continue;
            }

            // Obsolete line folding
            if line.starts_with(|c| c == ' ' || c == '\t') {
                match fields.last_mut() {
                    Some((_, value)) => {
                        value.push(' ');
                        value.push_str(line.trim());
                        continue;
                    }
                    None => {
                        return Err(ShareError::malformed(
                            "part headers start with a continuation line",
                        ))
                    }
                }
            }

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ShareError::malformed(format!("invalid part header line {line:?}")))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ShareError::malformed("part header with empty name"));
            }
            fields.push((name.to_string(), value.trim().to_string()));
        }

        let mut headers = Self {
            fields,
            name: None,
            filename: None,
        };

        let disposition = headers
            .get("content-disposition")
            .map(ContentDisposition::parse);
        if let Some(disposition) = disposition {
            headers.name = disposition.param("name").map(str::to_string);
            headers.filename = disposition.filename();
        }

        Ok(headers)
    }

    /// Case-insensitive header lookup. Returns the first match.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Form field name from `Content-Disposition`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Client file name from `Content-Disposition` (`filename*` preferred).
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get("content-type")
    }

    /// A part is a file when it declares a non-empty file name.
    ///
    /// Browsers send `filename=""` for a file input left empty.
    pub fn is_file(&self) -> bool {
        self.filename.as_deref().is_some_and(|f| !f.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Parameters of a `Content-Disposition` value. The disposition type itself is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ContentDisposition {
    params: Vec<(String, String)>,
}

impl ContentDisposition {
    fn parse(value: &str) -> Self {
        let params = split_params(value)
            .into_iter()
            .skip(1)
            .filter_map(|token| {
                let (name, value) = token.split_once('=')?;
                Some((name.trim().to_ascii_lowercase(), unquote(value.trim())))
            })
            .collect();

        Self { params }
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn filename(&self) -> Option<String> {
        self.param("filename*")
            .and_then(decode_ext_value)
            .or_else(|| self.param("filename").map(str::to_string))
    }
}

/// Split on `;` outside of quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

/// Strip quotes; inside them `\"` and `\\` are escapes, other backslashes are literal.
fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Decode an RFC 5987 `charset'lang'value`. Only UTF-8 is accepted.
fn decode_ext_value(value: &str) -> Option<String> {
    let mut pieces = value.splitn(3, '\'');
    let charset = pieces.next()?;
    let _language = pieces.next()?;
    let encoded = pieces.next()?;

    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}
