use crate::fragment::MarkupFragment;
use crate::policy::EscapePolicy;

/// Split `text` into plain runs and one character reference per flagged
/// character.
///
/// Runs are flushed only when non-empty, so adjacent escapes produce no
/// empty text nodes, and a payload with nothing to escape becomes exactly
/// one text node.
pub fn encode_entities<P>(text: &str, policy: &P, fragment: &mut MarkupFragment)
where
    P: EscapePolicy + ?Sized,
{
    let mut run_start = 0;

    for (offset, ch) in text.char_indices() {
        if !policy.needs_escaping(ch) {
            continue;
        }
        if run_start < offset {
            fragment.push_text(&text[run_start..offset]);
        }
        fragment.push_char_ref(ch);
        run_start = offset + ch.len_utf8();
    }

    if run_start < text.len() {
        fragment.push_text(&text[run_start..]);
    }
}

/// Wrap `text` in CDATA when any character needs escaping, otherwise emit it
/// as one plain run.
///
/// A `]]>` in the payload ends one section after `]]` and opens the next
/// with `>`.
pub fn encode_cdata<P>(text: &str, policy: &P, fragment: &mut MarkupFragment)
where
    P: EscapePolicy + ?Sized,
{
    if !text.chars().any(|ch| policy.needs_escaping(ch)) {
        fragment.push_text(text);
        return;
    }

    let mut rest = text;
    while let Some(index) = rest.find("]]>") {
        let (section, tail) = rest.split_at(index + 2);
        fragment.push_cdata(section);
        rest = tail;
    }
    fragment.push_cdata(rest);
}

/// Encode with the default escapes into a fresh fragment
pub fn encode(text: &str) -> MarkupFragment {
    let mut fragment = MarkupFragment::new();
    encode_entities(text, &crate::policy::DefaultEscapes, &mut fragment);
    fragment
}
