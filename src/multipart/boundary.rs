//! Boundary extraction from a `Content-Type` header value.

use crate::error::ShareError;

/// Longest boundary permitted by RFC 2046.
const MAX_BOUNDARY_LEN: usize = 70;

/// Extract the boundary parameter of a `multipart/form-data` content type.
///
/// The boundary may be quoted. Parameter names are case-insensitive.
pub fn boundary_from_content_type(content_type: &str) -> Result<String, ShareError> {
    let mut params = content_type.split(';');

    let essence = params.next().unwrap_or_default().trim();
    if !essence.eq_ignore_ascii_case("multipart/form-data") {
        return Err(ShareError::malformed(format!(
            "expected multipart/form-data, got {essence:?}"
        )));
    }

    let boundary = params
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| unquote(value.trim()))
        .ok_or_else(|| ShareError::malformed("missing boundary parameter"))?;

    if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
        return Err(ShareError::malformed(format!(
            "boundary must be 1 to {MAX_BOUNDARY_LEN} characters"
        )));
    }
    if !boundary.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
        return Err(ShareError::malformed("boundary contains invalid characters"));
    }

    Ok(boundary.to_string())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
