//! # Capability Traits
//!
//! Small traits shared by classes, methods and class views, so that
//! callers can handle "something with a name and a docstring" without
//! caring which kind of declaration it is.

use crate::decl::{ClassDecl, Function};
use crate::view::ClassView;
use psikit_parser::ast::{Decorator, Span};

// ============================================================================
// Naming
// ============================================================================

pub trait NamedElement {
    fn name(&self) -> &str;
}

impl NamedElement for ClassDecl {
    fn name(&self) -> &str {
        ClassDecl::name(self)
    }
}

impl NamedElement for Function {
    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedElement for ClassView<'_> {
    fn name(&self) -> &str {
        ClassView::name(self)
    }
}

// ============================================================================
// Documentation
// ============================================================================

pub trait HasDocString {
    fn doc_string(&self) -> Option<&str>;
}

impl HasDocString for ClassDecl {
    fn doc_string(&self) -> Option<&str> {
        self.docstring()
    }
}

impl HasDocString for Function {
    fn doc_string(&self) -> Option<&str> {
        self.docstring.as_deref()
    }
}

impl HasDocString for ClassView<'_> {
    fn doc_string(&self) -> Option<&str> {
        self.docstring()
    }
}

// ============================================================================
// Decorators
// ============================================================================

pub trait HasDecorators {
    fn decorator_list(&self) -> &[Decorator];

    /// True when a decorator's dotted name equals `name`
    fn has_decorator(&self, name: &str) -> bool {
        self.decorator_list()
            .iter()
            .any(|decorator| decorator.name().as_deref() == Some(name))
    }
}

impl HasDecorators for ClassDecl {
    fn decorator_list(&self) -> &[Decorator] {
        self.decorators()
    }
}

impl HasDecorators for Function {
    fn decorator_list(&self) -> &[Decorator] {
        &self.decorators
    }
}

impl HasDecorators for ClassView<'_> {
    fn decorator_list(&self) -> &[Decorator] {
        self.decorators()
    }
}

// ============================================================================
// Scopes
// ============================================================================

/// A declaration that opens its own name scope
pub trait ScopeOwner: NamedElement {
    fn scope_span(&self) -> &Span;
}

impl ScopeOwner for ClassDecl {
    fn scope_span(&self) -> &Span {
        self.span()
    }
}

impl ScopeOwner for Function {
    fn scope_span(&self) -> &Span {
        &self.span
    }
}

impl ScopeOwner for ClassView<'_> {
    fn scope_span(&self) -> &Span {
        self.decl().span()
    }
}
