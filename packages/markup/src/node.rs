use crate::decoder::decode_char_ref;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// One sibling node of an encoded text payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MarkupNode {
    /// Plain run of characters that need no escaping; never empty
    Text { value: Arc<str> },

    /// A single escaped character and its reference text (`&lt;`, `&#34;`)
    CharRef {
        ch: char,
        reference: Cow<'static, str>,
    },

    /// `<![CDATA[...]]>` section; the content never contains `]]>`
    CData { value: Arc<str> },
}

impl MarkupNode {
    pub fn is_text(&self) -> bool {
        matches!(self, MarkupNode::Text { .. })
    }

    pub fn is_char_ref(&self) -> bool {
        matches!(self, MarkupNode::CharRef { .. })
    }

    /// Reference text of a character reference node
    pub fn reference(&self) -> Option<&str> {
        match self {
            MarkupNode::CharRef { reference, .. } => Some(reference),
            _ => None,
        }
    }

    /// Text this node stands for once references are resolved
    pub fn push_decoded(&self, out: &mut String) {
        match self {
            MarkupNode::Text { value } | MarkupNode::CData { value } => out.push_str(value),
            MarkupNode::CharRef { ch, reference } => {
                out.push(decode_char_ref(reference).unwrap_or(*ch));
            }
        }
    }
}

impl fmt::Display for MarkupNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkupNode::Text { value } => f.write_str(value),
            MarkupNode::CharRef { reference, .. } => f.write_str(reference),
            MarkupNode::CData { value } => write!(f, "<![CDATA[{}]]>", value),
        }
    }
}
