use crate::context::TypeEvalContext;
use crate::decl::{Attribute, ClassDecl, ClassId, Function, Property};
use crate::error::HierarchyError;
use crate::hierarchy::{linearize, super_classes, Linearization};
use crate::index::ClassIndex;
use crate::resolver::SuperClassResolver;
use psikit_parser::ast::{Decorator, Expression};
use std::collections::HashSet;
use std::iter;
use std::sync::OnceLock;
use tracing::warn;

/// An item found on a class or one of its ancestors
#[derive(Debug)]
pub struct Member<'a, T> {
    /// Class that declares the item
    pub owner: ClassId,
    pub item: &'a T,
}

impl<T> Clone for Member<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Member<'_, T> {}

impl<T: PartialEq> PartialEq for Member<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.item == other.item
    }
}

/// A superclass as seen by type queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuperClassType<'a> {
    Class(ClassId),
    /// A base expression that does not resolve to an indexed class
    Unresolved(&'a Expression),
}

/// A name declared in a class body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Declaration<'a> {
    Attribute(&'a Attribute),
    Method(&'a Function),
    Class(ClassId),
}

impl Declaration<'_> {
    pub fn name<'s>(&'s self, index: &'s ClassIndex) -> &'s str {
        match self {
            Declaration::Attribute(attribute) => &attribute.name,
            Declaration::Method(function) => &function.name,
            Declaration::Class(id) => index[*id].name(),
        }
    }
}

/// Read-only queries about one class and its ancestry
///
/// Every lookup is total: absence is `None`, and a malformed hierarchy is
/// reported through [`ClassView::diagnostics`] rather than failing the
/// query. The linearization is computed once per view, on first use.
pub struct ClassView<'a> {
    index: &'a ClassIndex,
    id: ClassId,
    decl: &'a ClassDecl,
    resolver: &'a dyn SuperClassResolver,
    context: TypeEvalContext,
    linearization: OnceLock<Linearization>,
}

impl<'a> ClassView<'a> {
    pub fn new(
        index: &'a ClassIndex,
        id: ClassId,
        resolver: &'a dyn SuperClassResolver,
        context: TypeEvalContext,
    ) -> Option<Self> {
        let decl = index.get(id)?;
        Some(Self {
            index,
            id,
            decl,
            resolver,
            context,
            linearization: OnceLock::new(),
        })
    }

    /// View of another class under the same resolver and context
    pub fn view_of(&self, id: ClassId) -> Option<ClassView<'a>> {
        ClassView::new(self.index, id, self.resolver, self.context)
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn decl(&self) -> &'a ClassDecl {
        self.decl
    }

    pub fn index(&self) -> &'a ClassIndex {
        self.index
    }

    pub fn context(&self) -> TypeEvalContext {
        self.context
    }

    pub fn name(&self) -> &'a str {
        self.decl.name()
    }

    pub fn qualified_name(&self) -> &'a str {
        self.decl.qualified_name()
    }

    pub fn docstring(&self) -> Option<&'a str> {
        self.decl.docstring()
    }

    pub fn decorators(&self) -> &'a [Decorator] {
        self.decl.decorators()
    }

    // Superclasses and ancestry

    pub fn super_class_expressions(&self) -> &'a [Expression] {
        self.decl.super_class_expressions()
    }

    /// Resolved direct superclasses; unresolved bases are omitted
    pub fn super_classes(&self) -> Vec<ClassId> {
        super_classes(self.index, self.resolver, self.id)
    }

    pub fn super_class_types(&self) -> Vec<SuperClassType<'a>> {
        self.decl
            .super_class_expressions()
            .iter()
            .map(|expression| self.type_of(self.decl, expression))
            .collect()
    }

    /// Ancestors in method resolution order, the class itself excluded
    pub fn ancestor_classes(&self) -> &[ClassId] {
        &self.linearization().ancestors
    }

    /// Like [`ancestor_classes`](Self::ancestor_classes), but a malformed
    /// hierarchy is an error
    pub fn try_ancestor_classes(&self) -> Result<&[ClassId], HierarchyError> {
        let linearization = self.linearization();
        match linearization.diagnostics.first() {
            Some(diagnostic) => Err(diagnostic.clone()),
            None => Ok(&linearization.ancestors),
        }
    }

    /// Problems found while linearizing the hierarchy
    pub fn diagnostics(&self) -> &[HierarchyError] {
        &self.linearization().diagnostics
    }

    /// Ancestors in resolution order, each followed by the bases it
    /// declares that do not resolve
    pub fn ancestor_types(&self) -> Vec<SuperClassType<'a>> {
        let mut types = Vec::new();
        for class in self.chain(true) {
            if class != self.id {
                types.push(SuperClassType::Class(class));
            }
            let decl = &self.index[class];
            for expression in decl.super_class_expressions() {
                let resolved = self.type_of(decl, expression);
                if matches!(resolved, SuperClassType::Unresolved(_)) {
                    types.push(resolved);
                }
            }
        }
        types
    }

    /// True for the class itself and for every class reachable through its
    /// bases; a cycle ends the walk
    pub fn is_subclass(&self, other: ClassId) -> bool {
        self.reaches(|class| class == other)
    }

    pub fn is_subclass_named(&self, qualified_name: &str) -> bool {
        self.reaches(|class| self.index[class].qualified_name() == qualified_name)
    }

    /// New-style classes always in Python 3; in Python 2 when `object` is
    /// an ancestor or a metaclass is declared
    pub fn is_new_style_class(&self) -> bool {
        if !self.context.is_python2() {
            return true;
        }
        self.chain(true).any(|class| {
            let decl = &self.index[class];
            decl.metaclass().is_some()
                || (self.index.is_builtin(class) && decl.name() == "object")
                || decl.super_class_expressions().iter().any(|base| {
                    matches!(
                        base.dotted_name().as_deref(),
                        Some("object" | "builtins.object" | "__builtin__.object")
                    )
                })
        })
    }

    /// `metaclass=` keyword or `__metaclass__`, own or inherited
    pub fn metaclass(&self) -> Option<Member<'a, Expression>> {
        self.chain(true).find_map(|class| {
            let index = self.index;
            index[class].metaclass().map(|item| Member { owner: class, item })
        })
    }

    // Methods

    pub fn methods(&self) -> &'a [Function] {
        self.decl.methods()
    }

    /// Methods of the class, then of each ancestor in resolution order
    pub fn iter_methods(&self, inherited: bool) -> impl Iterator<Item = Member<'a, Function>> + '_ {
        let index = self.index;
        self.chain(inherited).flat_map(move |class| {
            index[class]
                .methods()
                .iter()
                .map(move |item| Member { owner: class, item })
        })
    }

    /// First method named `name`, own methods first
    pub fn find_method(&self, name: &str, inherited: bool) -> Option<Member<'a, Function>> {
        self.iter_methods(inherited)
            .find(|method| method.item.name == name)
    }

    /// `__init__`, else `__new__` (new-style classes only), checked class by
    /// class along the resolution order
    pub fn find_constructor_method(&self, inherited: bool) -> Option<Member<'a, Function>> {
        let new_style = self.is_new_style_class();
        let index = self.index;

        self.chain(inherited).find_map(|class| {
            let decl = &index[class];
            decl.find_method("__init__")
                .or_else(|| new_style.then(|| decl.find_method("__new__")).flatten())
                .map(|item| Member { owner: class, item })
        })
    }

    // Properties

    pub fn properties(&self) -> &'a [Property] {
        self.decl.properties()
    }

    pub fn find_property(&self, name: &str, inherited: bool) -> Option<Member<'a, Property>> {
        self.scan_properties(|property| property.name == name, inherited)
    }

    /// First property matching `predicate`, in declaration order, own
    /// properties before those of ancestors
    pub fn scan_properties<P>(&self, mut predicate: P, inherited: bool) -> Option<Member<'a, Property>>
    where
        P: FnMut(&Property) -> bool,
    {
        let index = self.index;
        self.chain(inherited).find_map(|class| {
            index[class]
                .properties()
                .iter()
                .find(|property| predicate(property))
                .map(|item| Member { owner: class, item })
        })
    }

    /// Property of this class using `function` as one of its accessors
    pub fn find_property_by_callable(&self, function: &Function) -> Option<&'a Property> {
        let methods = self.decl.methods();
        self.decl.properties().iter().find(|property| {
            property
                .method_indices()
                .any(|index| methods.get(index).is_some_and(|m| m.span.id == function.span.id))
        })
    }

    // Attributes

    pub fn class_attributes(&self) -> &'a [Attribute] {
        self.decl.class_attributes()
    }

    pub fn iter_class_attributes(
        &self,
        inherited: bool,
    ) -> impl Iterator<Item = Member<'a, Attribute>> + '_ {
        let index = self.index;
        self.chain(inherited).flat_map(move |class| {
            index[class]
                .class_attributes()
                .iter()
                .map(move |item| Member { owner: class, item })
        })
    }

    pub fn find_class_attribute(&self, name: &str, inherited: bool) -> Option<Member<'a, Attribute>> {
        self.iter_class_attributes(inherited)
            .find(|attribute| attribute.item.name == name)
    }

    pub fn instance_attributes(&self) -> &'a [Attribute] {
        self.decl.instance_attributes()
    }

    pub fn find_instance_attribute(
        &self,
        name: &str,
        inherited: bool,
    ) -> Option<Member<'a, Attribute>> {
        let index = self.index;
        self.chain(inherited).find_map(|class| {
            index[class]
                .find_instance_attribute(name)
                .map(|item| Member { owner: class, item })
        })
    }

    // Nested classes

    pub fn nested_classes(&self) -> Vec<ClassId> {
        self.decl.nested_classes().iter().map(|nested| nested.id).collect()
    }

    pub fn find_nested_class(&self, name: &str, inherited: bool) -> Option<ClassId> {
        let index = self.index;
        self.chain(inherited)
            .find_map(|class| index[class].find_nested_class(name))
    }

    // Slots

    /// Declared `__slots__`: `None` when undefined, `Some(&[])` when the
    /// class restricts instances to no attributes
    pub fn slots(&self) -> Option<&'a [String]> {
        self.decl.slots()
    }

    /// Slots an instance can hold, when the class and every ancestor
    /// restrict their attributes; `None` as soon as one of them does not
    pub fn effective_slots(&self) -> Option<Vec<String>> {
        let mut slots: Vec<String> = Vec::new();
        for class in self.chain(true) {
            let own = match self.index[class].slots() {
                Some(own) => own,
                None if self.index.is_builtin(class) => &[],
                None => return None,
            };
            for slot in own {
                if !slots.contains(slot) {
                    slots.push(slot.clone());
                }
            }
        }
        Some(slots)
    }

    // Declarations

    /// Class attributes, methods and nested classes, in source order
    pub fn class_level_declarations(&self) -> impl Iterator<Item = Declaration<'a>> {
        let index = self.index;
        let mut declarations: Vec<(usize, Declaration<'a>)> = self
            .decl
            .class_attributes()
            .iter()
            .map(|attribute| (attribute.span.start, Declaration::Attribute(attribute)))
            .chain(
                self.decl
                    .methods()
                    .iter()
                    .map(|method| (method.span.start, Declaration::Method(method))),
            )
            .chain(
                self.decl
                    .nested_classes()
                    .iter()
                    .map(|nested| (index[nested.id].span().start, Declaration::Class(nested.id))),
            )
            .collect();
        declarations.sort_by_key(|(start, _)| *start);
        declarations.into_iter().map(|(_, declaration)| declaration)
    }

    /// Names bound on instances by the class's own methods
    pub fn instance_level_declarations(&self) -> impl Iterator<Item = Declaration<'a>> {
        self.decl
            .instance_attributes()
            .iter()
            .map(Declaration::Attribute)
    }

    // Internals

    fn linearization(&self) -> &Linearization {
        self.linearization.get_or_init(|| {
            let linearization = linearize(self.index, self.resolver, self.context, self.id);
            for diagnostic in &linearization.diagnostics {
                warn!(class = self.qualified_name(), "{}", diagnostic);
            }
            linearization
        })
    }

    /// The class, then its ancestors when `inherited`
    fn chain(&self, inherited: bool) -> impl Iterator<Item = ClassId> + '_ {
        let ancestors: &[ClassId] = if inherited {
            self.ancestor_classes()
        } else {
            &[]
        };
        iter::once(self.id).chain(ancestors.iter().copied())
    }

    fn reaches(&self, mut found: impl FnMut(ClassId) -> bool) -> bool {
        let mut visited = HashSet::new();
        let mut pending = vec![self.id];

        while let Some(class) = pending.pop() {
            if !visited.insert(class) {
                continue;
            }
            if found(class) {
                return true;
            }
            let mut bases = super_classes(self.index, self.resolver, class);
            bases.reverse();
            pending.extend(bases);
        }
        false
    }

    fn type_of(&self, decl: &ClassDecl, expression: &'a Expression) -> SuperClassType<'a> {
        match self.resolver.resolve(self.index, decl, expression) {
            Some(class) => SuperClassType::Class(class),
            None => SuperClassType::Unresolved(expression),
        }
    }
}
