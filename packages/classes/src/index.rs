use crate::context::TypeEvalContext;
use crate::decl::{ClassDecl, ClassId, NestedClass};
use crate::resolver::SuperClassResolver;
use crate::view::ClassView;
use psikit_common::{
    is_python_source, module_name, walk_class, CommonError, CommonResult, FileSystem, Visitor,
};
use psikit_parser::ast::{ClassDef, FunctionDef, Module};
use psikit_parser::parse_with_path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

pub const BUILTINS_MODULE: &str = "builtins";

/// Arena of class declarations from any number of modules
///
/// Declarations are immutable once added; re-index a module by building a
/// new index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassIndex {
    classes: Vec<ClassDecl>,
    by_qualified_name: HashMap<String, ClassId>,
    by_name: HashMap<String, Vec<ClassId>>,
    modules: Vec<String>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index with the builtin `object` registered
    pub fn with_builtins() -> Self {
        let mut index = Self::new();
        let id = index.next_id();
        index.insert(ClassDecl::synthetic(id, BUILTINS_MODULE, "object"));
        index
    }

    /// Add every class of a parsed module, nested classes included
    pub fn add_module(&mut self, module_name: &str, module: &Module) -> Vec<ClassId> {
        let mut builder = IndexBuilder {
            index: self,
            module: module_name,
            scope: Vec::new(),
            added: Vec::new(),
        };
        builder.visit_module(module);
        let added = builder.added;

        debug!(module = module_name, classes = added.len(), "indexed module");
        if !self.modules.iter().any(|m| m == module_name) {
            self.modules.push(module_name.to_string());
        }
        added
    }

    /// Parse `source` and add its classes
    pub fn add_source(&mut self, module_name: &str, source: &str) -> CommonResult<Vec<ClassId>> {
        let module = parse_with_path(source, module_name)
            .map_err(|err| CommonError::parse(module_name, err))?;
        Ok(self.add_module(module_name, &module))
    }

    /// Index a Python file, or every Python file under a directory with
    /// module names relative to it (`sub/b.py` is module `sub.b`)
    pub fn load_path(&mut self, fs: &dyn FileSystem, path: &Path) -> CommonResult<Vec<ClassId>> {
        let (root, files) = if is_python_source(path) {
            let root = path.parent().unwrap_or_else(|| Path::new(""));
            (root, vec![path.to_path_buf()])
        } else {
            (path, fs.list_sources(path)?)
        };

        let mut added = Vec::new();
        for file in files {
            let source = fs.read_to_string(&file)?;
            let name = module_name(root, &file);
            let module = parse_with_path(&source, &file.to_string_lossy())
                .map_err(|err| CommonError::parse(file.display().to_string(), err))?;
            added.extend(self.add_module(&name, &module));
        }

        info!(path = %path.display(), classes = added.len(), "loaded classes");
        Ok(added)
    }

    pub fn get(&self, id: ClassId) -> Option<&ClassDecl> {
        self.classes.get(id.index())
    }

    /// Class by qualified name (`module.Outer.Inner`)
    pub fn lookup(&self, qualified_name: &str) -> Option<ClassId> {
        self.by_qualified_name.get(qualified_name).copied()
    }

    /// Every class with the given simple name, in indexing order
    pub fn find_by_name(&self, name: &str) -> &[ClassId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Top-level class of a module
    pub fn module_class(&self, module: &str, name: &str) -> Option<ClassId> {
        self.lookup(&format!("{}.{}", module, name))
            .filter(|id| self[*id].containing_class().is_none())
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.iter()
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn builtin(&self, name: &str) -> Option<ClassId> {
        self.lookup(&format!("{}.{}", BUILTINS_MODULE, name))
    }

    pub fn is_builtin(&self, id: ClassId) -> bool {
        self.get(id).is_some_and(|decl| decl.module() == BUILTINS_MODULE)
    }

    /// Query view of one class; `None` for an id from another index
    pub fn view<'a>(
        &'a self,
        id: ClassId,
        resolver: &'a dyn SuperClassResolver,
        context: TypeEvalContext,
    ) -> Option<ClassView<'a>> {
        ClassView::new(self, id, resolver, context)
    }

    fn next_id(&self) -> ClassId {
        ClassId(self.classes.len() as u32)
    }

    fn insert(&mut self, decl: ClassDecl) -> ClassId {
        let id = decl.id;
        // A rebinding of the same name keeps the first declaration
        self.by_qualified_name
            .entry(decl.qualified_name.clone())
            .or_insert(id);
        self.by_name.entry(decl.name.clone()).or_default().push(id);
        self.classes.push(decl);
        id
    }
}

impl std::ops::Index<ClassId> for ClassIndex {
    type Output = ClassDecl;

    fn index(&self, id: ClassId) -> &ClassDecl {
        &self.classes[id.index()]
    }
}

/// Flattens the classes of one module into the index
struct IndexBuilder<'i> {
    index: &'i mut ClassIndex,
    module: &'i str,
    /// Enclosing classes of the class being visited
    scope: Vec<ClassId>,
    added: Vec<ClassId>,
}

impl Visitor for IndexBuilder<'_> {
    fn visit_class(&mut self, class: &ClassDef) {
        let containing = self.scope.last().copied();
        let qualified_name = match containing {
            Some(parent) => format!("{}.{}", self.index[parent].qualified_name, class.name),
            None => format!("{}.{}", self.module, class.name),
        };

        let id = self.index.next_id();
        let decl = ClassDecl::from_ast(id, class, self.module, qualified_name, containing);
        self.index.insert(decl);
        self.added.push(id);

        if let Some(parent) = containing {
            self.index.classes[parent.index()]
                .nested_classes
                .push(NestedClass {
                    name: class.name.clone(),
                    id,
                });
        }

        self.scope.push(id);
        walk_class(self, class);
        self.scope.pop();
    }

    fn visit_function(&mut self, _function: &FunctionDef) {
        // Classes inside function bodies are not part of the outline
    }
}
