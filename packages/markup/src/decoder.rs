use crate::entities::ENTITIES;
use crate::error::{MarkupError, MarkupResult};
use crate::node::MarkupNode;

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Resolve one character reference: a named entry of the entity table,
/// `&#<decimal>;` or `&#x<hex>;`
pub fn decode_char_ref(reference: &str) -> Option<char> {
    let body = reference.strip_prefix('&')?.strip_suffix(';')?;

    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    ENTITIES
        .iter()
        .find(|(_, entry)| *entry == reference)
        .map(|(ch, _)| *ch)
}

/// Concatenate the text of encoded nodes, resolving references
pub fn decode_nodes(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.push_decoded(&mut out);
    }
    out
}

/// Decode serialized markup text content back into the payload
pub fn decode_markup(markup: &str) -> MarkupResult<String> {
    let mut out = String::with_capacity(markup.len());
    let mut offset = 0;

    while let Some(relative) = markup[offset..].find(['&', '<']) {
        let start = offset + relative;
        out.push_str(&markup[offset..start]);
        let rest = &markup[start..];

        if let Some(section) = rest.strip_prefix(CDATA_OPEN) {
            let end = section
                .find(CDATA_CLOSE)
                .ok_or(MarkupError::UnterminatedCData { offset: start })?;
            out.push_str(&section[..end]);
            offset = start + CDATA_OPEN.len() + end + CDATA_CLOSE.len();
        } else if rest.starts_with('&') {
            let end = rest
                .find(';')
                .ok_or_else(|| MarkupError::unknown_reference(rest, start))?;
            let reference = &rest[..=end];
            let ch = decode_char_ref(reference)
                .ok_or_else(|| MarkupError::unknown_reference(reference, start))?;
            out.push(ch);
            offset = start + end + 1;
        } else {
            return Err(MarkupError::UnescapedChar {
                ch: '<',
                offset: start,
            });
        }
    }

    out.push_str(&markup[offset..]);
    Ok(out)
}
