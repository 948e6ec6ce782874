use std::collections::HashSet;
use std::sync::Arc;

/// Interns text payloads so equal runs share one allocation
#[derive(Debug, Default, Clone)]
pub struct CharTable {
    entries: HashSet<Arc<str>>,
}

impl CharTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> Arc<str> {
        if let Some(existing) = self.entries.get(text) {
            return Arc::clone(existing);
        }
        let entry: Arc<str> = Arc::from(text);
        self.entries.insert(Arc::clone(&entry));
        entry
    }

    /// Number of distinct payloads interned so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_shares_equal_payloads() {
        let mut table = CharTable::new();
        let a = table.intern("hello");
        let b = table.intern("hello");
        let c = table.intern("world");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(table.len(), 2);
    }
}
