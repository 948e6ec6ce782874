use crate::char_table::CharTable;
use crate::entities::char_reference;
use crate::node::MarkupNode;
use serde::Serialize;
use std::fmt;

/// Ordered sibling nodes produced by encoding one payload
///
/// Each fragment owns the [`CharTable`] its text runs are interned in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarkupFragment {
    children: Vec<MarkupNode>,
    #[serde(skip)]
    table: CharTable,
}

impl MarkupFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain run; empty runs are dropped
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let value = self.table.intern(text);
        self.children.push(MarkupNode::Text { value });
    }

    pub fn push_char_ref(&mut self, ch: char) {
        self.children.push(MarkupNode::CharRef {
            ch,
            reference: char_reference(ch),
        });
    }

    pub fn push_cdata(&mut self, text: &str) {
        let value = self.table.intern(text);
        self.children.push(MarkupNode::CData { value });
    }

    pub fn children(&self) -> &[MarkupNode] {
        &self.children
    }

    pub fn first_child(&self) -> Option<&MarkupNode> {
        self.children.first()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn char_table(&self) -> &CharTable {
        &self.table
    }

    /// Text the fragment encodes
    pub fn decode(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.push_decoded(&mut out);
        }
        out
    }

    pub fn into_nodes(self) -> Vec<MarkupNode> {
        self.children
    }
}

impl fmt::Display for MarkupFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        Ok(())
    }
}
