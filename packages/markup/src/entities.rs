use std::borrow::Cow;

/// Characters with a named reference, and the reference text
///
/// Adding a named entity is one more row here; the encoder and decoder both
/// read this table.
pub static ENTITIES: &[(char, &str)] = &[
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('&', "&amp;"),
    ('\u{A0}', "&nbsp;"),
];

/// Named reference for `ch`, if the table has one
pub fn named_reference(ch: char) -> Option<&'static str> {
    ENTITIES
        .iter()
        .find(|(entry, _)| *entry == ch)
        .map(|(_, reference)| *reference)
}

/// Reference text for any character: the named form when there is one,
/// `&#<codepoint>;` otherwise
pub fn char_reference(ch: char) -> Cow<'static, str> {
    match named_reference(ch) {
        Some(reference) => Cow::Borrowed(reference),
        None => Cow::Owned(format!("&#{};", ch as u32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_references() {
        assert_eq!(char_reference('<'), "&lt;");
        assert_eq!(char_reference('>'), "&gt;");
        assert_eq!(char_reference('&'), "&amp;");
        assert_eq!(char_reference('\u{A0}'), "&nbsp;");
    }

    #[test]
    fn test_numeric_fallback_uses_scalar_value() {
        assert_eq!(char_reference('"'), "&#34;");
        assert_eq!(char_reference('é'), "&#233;");
        assert_eq!(char_reference('😀'), "&#128512;");
    }
}
