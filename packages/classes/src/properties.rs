//! Property discovery from a class body.
//!
//! Properties come from three shapes:
//!
//! - a getter decorated with `@property` (or an abstract/cached variant),
//! - `@name.setter`, `@name.getter`, `@name.deleter` on later methods,
//! - `name = property(fget, fset, fdel, doc)` at class level.
//!
//! A role that is already filled keeps its first accessor.

use crate::decl::{AccessDirection, Accessor, Attribute, Function, Property};
use psikit_parser::ast::{Argument, Expression, Unpack};

const GETTER_DECORATORS: &[&str] = &[
    "property",
    "abc.abstractproperty",
    "abstractproperty",
    "functools.cached_property",
    "cached_property",
];

const PROPERTY_CALLS: &[&str] = &["property", "builtins.property", "__builtin__.property"];

const CALL_ROLES: [(&str, AccessDirection); 3] = [
    ("fget", AccessDirection::Read),
    ("fset", AccessDirection::Write),
    ("fdel", AccessDirection::Delete),
];

enum Source<'a> {
    Method(usize, &'a Function),
    Attribute(&'a Attribute),
}

/// Properties of one class, in the order of their first declaration
pub(crate) fn discover_properties(methods: &[Function], attributes: &[Attribute]) -> Vec<Property> {
    let mut sources: Vec<(usize, Source)> = methods
        .iter()
        .enumerate()
        .map(|(index, method)| (method.span.start, Source::Method(index, method)))
        .chain(
            attributes
                .iter()
                .map(|attribute| (attribute.span.start, Source::Attribute(attribute))),
        )
        .collect();
    sources.sort_by_key(|(start, _)| *start);

    let mut properties = Vec::new();
    for (_, source) in sources {
        match source {
            Source::Method(index, method) => {
                add_decorated_method(&mut properties, index, method);
            }
            Source::Attribute(attribute) => {
                if let Some(Expression::Call {
                    func, arguments, ..
                }) = &attribute.value
                {
                    let is_property = func
                        .dotted_name()
                        .is_some_and(|name| PROPERTY_CALLS.contains(&name.as_str()));
                    if is_property {
                        add_property_call(&mut properties, &attribute.name, arguments, methods);
                    }
                }
            }
        }
    }
    properties
}

fn add_decorated_method(properties: &mut Vec<Property>, index: usize, method: &Function) {
    for decorator in &method.decorators {
        let Some(name) = decorator.name() else {
            continue;
        };

        if GETTER_DECORATORS.contains(&name.as_str()) {
            let property = entry(properties, &method.name);
            fill(property, AccessDirection::Read, Accessor::Method(index));
            if property.doc.is_none() {
                property.doc = method.docstring.clone();
            }
            continue;
        }

        let Some((target, role)) = name.rsplit_once('.') else {
            continue;
        };
        let direction = match role {
            "getter" => AccessDirection::Read,
            "setter" => AccessDirection::Write,
            "deleter" => AccessDirection::Delete,
            _ => continue,
        };
        if target.contains('.') {
            continue;
        }
        let property = entry(properties, target);
        fill(property, direction, Accessor::Method(index));
    }
}

fn add_property_call(
    properties: &mut Vec<Property>,
    name: &str,
    arguments: &[Argument],
    methods: &[Function],
) {
    let property = entry(properties, name);
    let mut position = 0;

    for argument in arguments {
        if argument.unpack != Unpack::None {
            continue;
        }
        let slot = match argument.name.as_deref() {
            Some(keyword) => keyword,
            None => {
                position += 1;
                match position {
                    1 => "fget",
                    2 => "fset",
                    3 => "fdel",
                    4 => "doc",
                    _ => continue,
                }
            }
        };

        if slot == "doc" {
            if property.doc.is_none() {
                property.doc = argument.value.as_str().map(str::to_string);
            }
            continue;
        }
        let Some((_, direction)) = CALL_ROLES.iter().find(|(role, _)| *role == slot) else {
            continue;
        };
        if let Some(accessor) = accessor_for(&argument.value, methods) {
            fill(property, *direction, accessor);
        }
    }
}

/// A name of a method in the same class becomes a method accessor; `None` is
/// an absent role
fn accessor_for(expression: &Expression, methods: &[Function]) -> Option<Accessor> {
    if expression.is_name("None") {
        return None;
    }
    if let Expression::Name { id, .. } = expression {
        if let Some(index) = methods.iter().position(|method| &method.name == id) {
            return Some(Accessor::Method(index));
        }
    }
    Some(Accessor::Expression(expression.clone()))
}

fn entry<'p>(properties: &'p mut Vec<Property>, name: &str) -> &'p mut Property {
    let position = match properties.iter().position(|p| p.name == name) {
        Some(position) => position,
        None => {
            properties.push(Property::new(name));
            properties.len() - 1
        }
    };
    &mut properties[position]
}

fn fill(property: &mut Property, direction: AccessDirection, accessor: Accessor) {
    let slot = property.accessor_mut(direction);
    if slot.is_none() {
        *slot = Some(accessor);
    }
}
