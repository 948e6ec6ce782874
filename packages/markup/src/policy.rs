use crate::encoder::{encode_cdata, encode_entities};
use crate::entities::ENTITIES;
use crate::fragment::MarkupFragment;
use crate::options::EncodeOptions;
use std::collections::BTreeSet;

/// Decides which characters of a text payload must be escaped
pub trait EscapePolicy {
    fn needs_escaping(&self, ch: char) -> bool;
}

impl<F> EscapePolicy for F
where
    F: Fn(char) -> bool,
{
    fn needs_escaping(&self, ch: char) -> bool {
        self(ch)
    }
}

/// Escapes `<`, `>`, `&` and the non-breaking space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultEscapes;

impl EscapePolicy for DefaultEscapes {
    fn needs_escaping(&self, ch: char) -> bool {
        ENTITIES.iter().any(|(entry, _)| *entry == ch)
    }
}

/// The default escapes plus a configurable set of extra characters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscapeSet {
    extra: BTreeSet<char>,
    escape_non_ascii: bool,
}

impl EscapeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_char(mut self, ch: char) -> Self {
        self.extra.insert(ch);
        self
    }

    pub fn with_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.extra.extend(chars);
        self
    }

    /// Also escape every character outside ASCII
    pub fn escape_non_ascii(mut self, enabled: bool) -> Self {
        self.escape_non_ascii = enabled;
        self
    }

    pub fn from_options(options: &EncodeOptions) -> Self {
        Self::new()
            .with_chars(options.extra_escapes.iter().copied())
            .escape_non_ascii(options.escape_non_ascii)
    }
}

impl EscapePolicy for EscapeSet {
    fn needs_escaping(&self, ch: char) -> bool {
        DefaultEscapes.needs_escaping(ch)
            || (self.escape_non_ascii && !ch.is_ascii())
            || self.extra.contains(&ch)
    }
}

/// Strategy for turning a text payload into markup nodes
pub trait TextEncodingPolicy {
    /// Append the nodes for `text` to `fragment`
    fn encode_into(&self, text: &str, fragment: &mut MarkupFragment);

    fn encode(&self, text: &str) -> MarkupFragment {
        let mut fragment = MarkupFragment::new();
        self.encode_into(text, &mut fragment);
        fragment
    }
}

/// Escapes each flagged character as its own character reference
#[derive(Debug, Clone, Default)]
pub struct EncodeEachSymbol<P = DefaultEscapes> {
    policy: P,
}

impl<P: EscapePolicy> EncodeEachSymbol<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<P: EscapePolicy> TextEncodingPolicy for EncodeEachSymbol<P> {
    fn encode_into(&self, text: &str, fragment: &mut MarkupFragment) {
        encode_entities(text, &self.policy, fragment);
    }
}

/// Wraps any payload that needs escaping in CDATA sections
#[derive(Debug, Clone, Default)]
pub struct CDataPolicy<P = DefaultEscapes> {
    policy: P,
}

impl<P: EscapePolicy> CDataPolicy<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }
}

impl<P: EscapePolicy> TextEncodingPolicy for CDataPolicy<P> {
    fn encode_into(&self, text: &str, fragment: &mut MarkupFragment) {
        encode_cdata(text, &self.policy, fragment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_escapes() {
        for ch in ['<', '>', '&', '\u{A0}'] {
            assert!(DefaultEscapes.needs_escaping(ch), "{:?}", ch);
        }
        for ch in ['a', ' ', '"', '\'', 'é'] {
            assert!(!DefaultEscapes.needs_escaping(ch), "{:?}", ch);
        }
    }

    #[test]
    fn test_escape_set() {
        let set = EscapeSet::new().with_char('"');
        assert!(set.needs_escaping('"'));
        assert!(set.needs_escaping('<'));
        assert!(!set.needs_escaping('é'));

        let set = set.escape_non_ascii(true);
        assert!(set.needs_escaping('é'));
        assert!(!set.needs_escaping('e'));
    }

    #[test]
    fn test_closures_are_policies() {
        let digits = |ch: char| ch.is_ascii_digit();
        assert!(digits.needs_escaping('7'));
        assert!(!digits.needs_escaping('<'));
    }
}
