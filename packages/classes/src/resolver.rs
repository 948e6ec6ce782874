use crate::decl::{ClassDecl, ClassId};
use crate::index::{ClassIndex, BUILTINS_MODULE};
use psikit_parser::ast::Expression;
use tracing::debug;

/// Turns a superclass expression into a class of the index
///
/// Resolution may fail (computed bases, names the index never saw); callers
/// see fewer resolved superclasses than expressions in that case.
pub trait SuperClassResolver: Send + Sync {
    fn resolve(&self, index: &ClassIndex, from: &ClassDecl, expression: &Expression)
        -> Option<ClassId>;
}

/// Resolves bases by name
///
/// A simple name is looked up in the body of the containing class, then at
/// module level, then among builtins. Dotted names are tried as qualified
/// names, absolute and relative to the module. `Generic[T]`-style
/// subscripts resolve to their origin; calls and other computed bases never
/// resolve.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameResolver {
    global_fallback: bool,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also resolve a simple name to the only class of that name anywhere in
    /// the index, standing in for imports
    pub fn with_global_fallback() -> Self {
        Self {
            global_fallback: true,
        }
    }

    fn resolve_name(&self, index: &ClassIndex, from: &ClassDecl, name: &str) -> Option<ClassId> {
        if !name.contains('.') {
            let in_enclosing_body = from
                .containing_class()
                .and_then(|parent| index.get(parent))
                .and_then(|parent| parent.find_nested_class(name));

            return in_enclosing_body
                .or_else(|| index.module_class(from.module(), name))
                .or_else(|| index.builtin(name))
                .or_else(|| self.unique_global(index, name));
        }

        index
            .lookup(name)
            .or_else(|| index.lookup(&format!("{}.{}", from.module(), name)))
            .or_else(|| {
                let (module, member) = name.rsplit_once('.')?;
                matches!(module, "builtins" | "__builtin__")
                    .then(|| index.lookup(&format!("{}.{}", BUILTINS_MODULE, member)))
                    .flatten()
            })
    }

    fn unique_global(&self, index: &ClassIndex, name: &str) -> Option<ClassId> {
        if !self.global_fallback {
            return None;
        }
        match index.find_by_name(name) {
            [only] => Some(*only),
            _ => None,
        }
    }
}

impl SuperClassResolver for NameResolver {
    fn resolve(
        &self,
        index: &ClassIndex,
        from: &ClassDecl,
        expression: &Expression,
    ) -> Option<ClassId> {
        let target = match expression {
            Expression::Subscript { value, .. } => value.as_ref(),
            other => other,
        };

        let resolved = target
            .dotted_name()
            .and_then(|name| self.resolve_name(index, from, &name))
            .filter(|id| *id != from.id());

        if resolved.is_none() {
            debug!(
                class = from.qualified_name(),
                base = %expression,
                "superclass does not resolve"
            );
        }
        resolved
    }
}
