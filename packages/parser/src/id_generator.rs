use crc32fast::Hasher;

/// Stable module ID derived from the module path (CRC32 of a `py://` URI)
pub fn module_id(path: &str) -> String {
    let uri = if path.starts_with("py://") {
        path.to_string()
    } else {
        format!("py://{}", path)
    };

    let mut hasher = Hasher::new();
    hasher.update(uri.as_bytes());
    format!("{:08x}", hasher.finalize())
}

/// Hands out `<module-id>-<n>` IDs for spans, in parse order
#[derive(Debug, Clone)]
pub struct IDGenerator {
    module: String,
    next: u32,
}

impl IDGenerator {
    pub fn new(path: &str) -> Self {
        Self {
            module: module_id(path),
            next: 0,
        }
    }

    pub fn new_id(&mut self) -> String {
        self.next += 1;
        format!("{}-{}", self.module, self.next)
    }

    pub fn module(&self) -> &str {
        &self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_is_stable_per_path() {
        assert_eq!(module_id("pkg/shapes.py"), module_id("pkg/shapes.py"));
        assert_eq!(module_id("pkg/shapes.py"), module_id("py://pkg/shapes.py"));
        assert_ne!(module_id("pkg/shapes.py"), module_id("pkg/colors.py"));
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut ids = IDGenerator::new("a.py");
        let first = ids.new_id();
        let second = ids.new_id();
        assert!(first.starts_with(ids.module()));
        assert!(first.ends_with("-1"));
        assert!(second.ends_with("-2"));
    }
}
