//! HTML entity decoding.
//!
//! Exported posts arrive with their markup partially escaped (`&lt;div&gt;`),
//! so entities are decoded before the body is handed to the HTML parser.

use std::borrow::Cow;

/// Longest entity body we try to decode (`#x10FFFF` / `thetasym`).
const MAX_ENTITY_LEN: usize = 10;

/// Unescape HTML entities back to characters.
///
/// Handles the common named entities and numeric character references.
/// Unknown or unterminated entities are kept verbatim.
///
/// Uses `Cow` to avoid allocation when there is nothing to decode.
///
/// # Example
/// ```ignore
/// assert_eq!(unescape("&lt;b&gt;"), "<b>");
/// assert_eq!(unescape("AT&T"), "AT&T");
/// ```
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        match decode_entity(after) {
            Some((c, consumed)) => {
                result.push(c);
                rest = &after[consumed..];
            }
            None => {
                result.push('&');
                rest = after;
            }
        }
    }
    result.push_str(rest);

    Cow::Owned(result)
}

/// Decode the entity at the start of `s` (text right after `&`).
///
/// Returns the character and the number of bytes consumed, `;` included.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let end = s
        .char_indices()
        .take(MAX_ENTITY_LEN + 1)
        .find(|&(_, c)| c == ';')
        .map(|(i, _)| i)?;
    let entity = &s[..end];

    let c = match entity {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)?
        }
    };

    Some((c, end + 1))
}

// =============================================================================
// Tests
// =============================================================================
