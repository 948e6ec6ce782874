use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File system abstraction for loading sources and testing
pub trait FileSystem {
    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> Result<String, io::Error>;

    /// Python sources anywhere under a directory, sorted by path
    fn list_sources(&self, dir: &Path) -> Result<Vec<PathBuf>, io::Error>;
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String, io::Error> {
        std::fs::read_to_string(path)
    }

    fn list_sources(&self, dir: &Path) -> Result<Vec<PathBuf>, io::Error> {
        let mut sources = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file() && is_python_source(path) {
                sources.push(path.to_path_buf());
            }
        }
        sources.sort();
        Ok(sources)
    }
}

/// In-memory file system for testing
#[derive(Debug, Default)]
pub struct MockFileSystem {
    pub files: HashMap<PathBuf, String>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.files.keys().any(|file| file.starts_with(path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String, io::Error> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn list_sources(&self, dir: &Path) -> Result<Vec<PathBuf>, io::Error> {
        let mut sources: Vec<_> = self
            .files
            .keys()
            .filter(|path| path.starts_with(dir) && is_python_source(path))
            .cloned()
            .collect();
        sources.sort();
        Ok(sources)
    }
}

pub fn is_python_source(path: &Path) -> bool {
    matches!(path.extension().and_then(|ext| ext.to_str()), Some("py" | "pyi"))
}

/// Dotted module name of a source file found under `root`
///
/// `root/shapes.py` is `shapes`, `root/sub/b.py` is `sub.b` and
/// `root/sub/__init__.py` is `sub`. A package `__init__` directly under
/// `root` takes the name of `root` itself.
pub fn module_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    let mut parts: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .filter_map(|component| component.as_os_str().to_str())
        .map(str::to_string)
        .collect();

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();

    if stem != "__init__" {
        parts.push(stem.to_string());
    } else if parts.is_empty() {
        if let Some(name) = root.file_name().and_then(|name| name.to_str()) {
            parts.push(name.to_string());
        }
    }
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_lists_sources_recursively() {
        let mut fs = MockFileSystem::new();
        fs.add_file("pkg/b.py", "");
        fs.add_file("pkg/a.pyi", "");
        fs.add_file("pkg/notes.txt", "");
        fs.add_file("pkg/sub/c.py", "");
        fs.add_file("other/d.py", "");

        let sources = fs.list_sources(Path::new("pkg")).unwrap();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("pkg/a.pyi"),
                PathBuf::from("pkg/b.py"),
                PathBuf::from("pkg/sub/c.py"),
            ]
        );
        assert!(fs.exists(Path::new("pkg")));
        assert!(fs.read_to_string(Path::new("pkg/missing.py")).is_err());
    }

    #[test]
    fn test_real_file_system_walks_subpackages() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("sub/deeper")).unwrap();
        std::fs::write(root.join("a.py"), "class A: pass\n").unwrap();
        std::fs::write(root.join("sub/b.py"), "class B: pass\n").unwrap();
        std::fs::write(root.join("sub/deeper/c.pyi"), "").unwrap();
        std::fs::write(root.join("sub/readme.md"), "").unwrap();

        let sources = RealFileSystem.list_sources(root).unwrap();
        let names: Vec<_> = sources.iter().map(|path| module_name(root, path)).collect();
        assert_eq!(names, vec!["a", "sub.b", "sub.deeper.c"]);
    }

    #[test]
    fn test_module_name() {
        let root = Path::new("pkg");
        assert_eq!(module_name(root, Path::new("pkg/shapes.py")), "shapes");
        assert_eq!(module_name(root, Path::new("pkg/sub/b.py")), "sub.b");
        assert_eq!(module_name(root, Path::new("pkg/sub/__init__.py")), "sub");
        assert_eq!(module_name(root, Path::new("pkg/__init__.py")), "pkg");
        assert_eq!(module_name(Path::new(""), Path::new("stubs.pyi")), "stubs");
    }
}
