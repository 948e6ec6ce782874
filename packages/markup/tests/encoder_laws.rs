//! Laws every encoding must satisfy, checked over a spread of payloads
//! and policies.

use psikit_markup::{
    decode_markup, decode_nodes, encode_entities, CDataPolicy, DefaultEscapes, EncodeEachSymbol,
    EncodeOptions, EscapePolicy, EscapeSet, MarkupFragment, MarkupNode, TextEncodingPolicy,
};

const SAMPLES: &[&str] = &[
    "",
    "a",
    "<",
    "<<<",
    "plain",
    "a<b",
    "<a>",
    "x & y > z",
    "&amp; already escaped",
    "tab\tand\nnewline",
    "non\u{A0}breaking",
    "ünïcödé and 日本語",
    "emoji 😀 and 🎉<",
    "]]>",
    "<![CDATA[ nested ]]>",
    "trailing &",
];

/// Policies whose output is well-formed markup text
fn markup_policies() -> Vec<Box<dyn TextEncodingPolicy>> {
    vec![
        Box::new(EncodeEachSymbol::<DefaultEscapes>::default()),
        Box::new(EncodeEachSymbol::new(EscapeSet::new().escape_non_ascii(true))),
        Box::new(EncodeEachSymbol::new(|_: char| true)),
        Box::new(CDataPolicy::<DefaultEscapes>::default()),
        Box::new(CDataPolicy::new(EscapeSet::new().with_char('\n'))),
    ]
}

fn policies() -> Vec<Box<dyn TextEncodingPolicy>> {
    let mut policies = markup_policies();
    // Leaves `<` unescaped, so the nodes round-trip but the markup does not
    policies.push(Box::new(EncodeEachSymbol::new(|ch: char| ch.is_alphabetic())));
    policies
}

#[test]
fn test_round_trip() {
    for policy in policies() {
        for sample in SAMPLES {
            let fragment = policy.encode(sample);
            assert_eq!(fragment.decode(), *sample);
            assert_eq!(decode_nodes(fragment.children()), *sample);
        }
    }
}

#[test]
fn test_serialized_markup_round_trips() {
    for policy in markup_policies() {
        for sample in SAMPLES {
            let markup = policy.encode(sample).to_string();
            assert_eq!(decode_markup(&markup).unwrap(), *sample, "markup: {}", markup);
        }
    }
}

#[test]
fn test_no_empty_or_adjacent_text_runs() {
    for policy in policies() {
        for sample in SAMPLES {
            let fragment = policy.encode(sample);
            let nodes = fragment.children();
            for node in nodes {
                if let MarkupNode::Text { value } = node {
                    assert!(!value.is_empty());
                }
            }
            for pair in nodes.windows(2) {
                assert!(!(pair[0].is_text() && pair[1].is_text()));
            }
        }
    }
}

#[test]
fn test_fast_path_when_nothing_is_flagged() {
    let never = |_: char| false;
    for sample in SAMPLES {
        let mut fragment = MarkupFragment::new();
        encode_entities(sample, &never, &mut fragment);
        if sample.is_empty() {
            assert!(fragment.is_empty());
        } else {
            assert_eq!(fragment.len(), 1);
            assert_eq!(fragment.to_string(), *sample);
        }
    }
}

#[test]
fn test_one_reference_per_flagged_character() {
    let policy = EscapeSet::new().escape_non_ascii(true);
    for sample in SAMPLES {
        let mut fragment = MarkupFragment::new();
        encode_entities(sample, &policy, &mut fragment);

        let flagged = sample.chars().filter(|ch| policy.needs_escaping(*ch)).count();
        let references = fragment.children().iter().filter(|n| n.is_char_ref()).count();
        assert_eq!(flagged, references);
    }
}

#[test]
fn test_policies_encode_concurrently() {
    let options = EncodeOptions::ascii_only();
    let policy = options.policy();

    std::thread::scope(|scope| {
        for sample in SAMPLES {
            let policy = &policy;
            scope.spawn(move || {
                assert_eq!(policy.encode(sample).decode(), *sample);
            });
        }
    });
}
