use crate::properties::discover_properties;
use psikit_parser::ast::{self, Decorator, Expression, Parameter, Span};
use serde::{Deserialize, Serialize};

/// Handle of a class in a [`ClassIndex`](crate::ClassIndex)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Instance,
    Static,
    Class,
}

impl MethodKind {
    fn of(function: &ast::FunctionDef) -> Self {
        let decorated = |names: &[&str]| {
            function
                .decorators
                .iter()
                .filter_map(|d| d.name())
                .any(|name| names.contains(&name.as_str()))
        };

        if decorated(&["staticmethod", "abc.abstractstaticmethod"]) {
            MethodKind::Static
        } else if decorated(&["classmethod", "abc.abstractclassmethod"]) {
            MethodKind::Class
        } else {
            // Implicitly static or class-level per the data model
            match function.name.as_str() {
                "__new__" => MethodKind::Static,
                "__init_subclass__" | "__class_getitem__" => MethodKind::Class,
                _ => MethodKind::Instance,
            }
        }
    }
}

/// A method declared in a class body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub kind: MethodKind,
    pub parameters: Vec<Parameter>,
    pub decorators: Vec<Decorator>,
    pub returns: Option<Expression>,
    pub docstring: Option<String>,
    pub is_async: bool,
    pub span: Span,
}

impl Function {
    fn from_ast(function: &ast::FunctionDef) -> Self {
        Self {
            name: function.name.clone(),
            kind: MethodKind::of(function),
            parameters: function.parameters.clone(),
            decorators: function.decorators.clone(),
            returns: function.returns.clone(),
            docstring: function.docstring.clone(),
            is_async: function.is_async,
            span: function.span.clone(),
        }
    }

    pub fn is_decorated_with(&self, name: &str) -> bool {
        self.decorators
            .iter()
            .any(|d| d.name().as_deref() == Some(name))
    }
}

/// A name bound at class level or on instances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Option<Expression>,
    pub annotation: Option<Expression>,
    pub span: Span,
}

impl From<&ast::Assignment> for Attribute {
    fn from(assignment: &ast::Assignment) -> Self {
        Self {
            name: assignment.target.clone(),
            value: assignment.value.clone(),
            annotation: assignment.annotation.clone(),
            span: assignment.span.clone(),
        }
    }
}

/// One role of a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Accessor {
    /// Index into the owning class's methods
    Method(usize),
    /// Any other callable, e.g. a lambda passed to `property(...)`
    Expression(Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDirection {
    Read,
    Write,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
    pub deleter: Option<Accessor>,
    pub doc: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            getter: None,
            setter: None,
            deleter: None,
            doc: None,
        }
    }

    pub fn accessor(&self, direction: AccessDirection) -> Option<&Accessor> {
        match direction {
            AccessDirection::Read => self.getter.as_ref(),
            AccessDirection::Write => self.setter.as_ref(),
            AccessDirection::Delete => self.deleter.as_ref(),
        }
    }

    pub(crate) fn accessor_mut(&mut self, direction: AccessDirection) -> &mut Option<Accessor> {
        match direction {
            AccessDirection::Read => &mut self.getter,
            AccessDirection::Write => &mut self.setter,
            AccessDirection::Delete => &mut self.deleter,
        }
    }

    /// Method index of each role the property delegates to
    pub fn method_indices(&self) -> impl Iterator<Item = usize> + '_ {
        [&self.getter, &self.setter, &self.deleter]
            .into_iter()
            .filter_map(|accessor| match accessor {
                Some(Accessor::Method(index)) => Some(*index),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedClass {
    pub name: String,
    pub id: ClassId,
}

/// Immutable record of one class declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub(crate) id: ClassId,
    pub(crate) name: String,
    pub(crate) qualified_name: String,
    pub(crate) module: String,
    pub(crate) super_class_expressions: Vec<Expression>,
    pub(crate) metaclass: Option<Expression>,
    pub(crate) decorators: Vec<Decorator>,
    pub(crate) docstring: Option<String>,
    pub(crate) methods: Vec<Function>,
    pub(crate) class_attributes: Vec<Attribute>,
    pub(crate) instance_attributes: Vec<Attribute>,
    pub(crate) nested_classes: Vec<NestedClass>,
    pub(crate) containing_class: Option<ClassId>,
    pub(crate) slots: Option<Vec<String>>,
    pub(crate) properties: Vec<Property>,
    pub(crate) span: Span,
}

impl ClassDecl {
    pub(crate) fn from_ast(
        id: ClassId,
        class: &ast::ClassDef,
        module: &str,
        qualified_name: String,
        containing_class: Option<ClassId>,
    ) -> Self {
        let methods: Vec<Function> = class.methods.iter().map(Function::from_ast).collect();
        let class_attributes: Vec<Attribute> = class.attributes.iter().map(Attribute::from).collect();
        let instance_attributes = collect_instance_attributes(class, &methods);
        let slots = class_attributes
            .iter()
            .find(|attribute| attribute.name == "__slots__")
            .and_then(|attribute| attribute.value.as_ref())
            .and_then(slot_names);
        let properties = discover_properties(&methods, &class_attributes);
        let metaclass = class.keyword("metaclass").cloned().or_else(|| {
            class_attributes
                .iter()
                .find(|attribute| attribute.name == "__metaclass__")
                .and_then(|attribute| attribute.value.clone())
        });

        Self {
            id,
            name: class.name.clone(),
            qualified_name,
            module: module.to_string(),
            super_class_expressions: class.bases.clone(),
            metaclass,
            decorators: class.decorators.clone(),
            docstring: class.docstring.clone(),
            methods,
            class_attributes,
            instance_attributes,
            nested_classes: Vec::new(),
            containing_class,
            slots,
            properties,
            span: class.span.clone(),
        }
    }

    /// A declaration with no source, e.g. the builtin `object`
    pub(crate) fn synthetic(id: ClassId, module: &str, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            qualified_name: format!("{}.{}", module, name),
            module: module.to_string(),
            super_class_expressions: Vec::new(),
            metaclass: None,
            decorators: Vec::new(),
            docstring: None,
            methods: Vec::new(),
            class_attributes: Vec::new(),
            instance_attributes: Vec::new(),
            nested_classes: Vec::new(),
            containing_class: None,
            slots: None,
            properties: Vec::new(),
            span: Span::new(0, 0, format!("{}.{}", module, name)),
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `module.Outer.Inner`
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn super_class_expressions(&self) -> &[Expression] {
        &self.super_class_expressions
    }

    /// `metaclass=` keyword, or a `__metaclass__` class attribute
    pub fn metaclass(&self) -> Option<&Expression> {
        self.metaclass.as_ref()
    }

    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    pub fn docstring(&self) -> Option<&str> {
        self.docstring.as_deref()
    }

    pub fn methods(&self) -> &[Function] {
        &self.methods
    }

    /// First method declared with `name`
    pub fn find_method(&self, name: &str) -> Option<&Function> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn class_attributes(&self) -> &[Attribute] {
        &self.class_attributes
    }

    pub fn find_class_attribute(&self, name: &str) -> Option<&Attribute> {
        self.class_attributes.iter().find(|attr| attr.name == name)
    }

    pub fn instance_attributes(&self) -> &[Attribute] {
        &self.instance_attributes
    }

    pub fn find_instance_attribute(&self, name: &str) -> Option<&Attribute> {
        self.instance_attributes.iter().find(|attr| attr.name == name)
    }

    pub fn nested_classes(&self) -> &[NestedClass] {
        &self.nested_classes
    }

    pub fn find_nested_class(&self, name: &str) -> Option<ClassId> {
        self.nested_classes
            .iter()
            .find(|nested| nested.name == name)
            .map(|nested| nested.id)
    }

    pub fn containing_class(&self) -> Option<ClassId> {
        self.containing_class
    }

    /// Declared `__slots__`; `None` when the class does not restrict its
    /// attributes, `Some(&[])` when it restricts them to nothing
    pub fn slots(&self) -> Option<&[String]> {
        self.slots.as_deref()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// Receiver assignments of instance methods, `__init__` first; the first
/// binding of each name wins
fn collect_instance_attributes(class: &ast::ClassDef, methods: &[Function]) -> Vec<Attribute> {
    let mut order: Vec<usize> = (0..class.methods.len()).collect();
    order.sort_by_key(|&i| class.methods[i].name != "__init__");

    let mut attributes: Vec<Attribute> = Vec::new();
    for i in order {
        if methods[i].kind != MethodKind::Instance {
            continue;
        }
        for assignment in &class.methods[i].receiver_assignments {
            if attributes.iter().all(|attr| attr.name != assignment.target) {
                attributes.push(Attribute::from(assignment));
            }
        }
    }
    attributes
}

/// `__slots__ = "a"`, `("a", "b")` or `["a", "b"]`; anything computed is
/// unknown and treated as unrestricted
fn slot_names(value: &Expression) -> Option<Vec<String>> {
    if let Some(name) = value.as_str() {
        return Some(vec![name.to_string()]);
    }
    value
        .elements()?
        .iter()
        .map(|element| element.as_str().map(str::to_string))
        .collect()
}
