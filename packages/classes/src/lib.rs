//! Class-declaration queries over indexed Python modules.
//!
//! A [`ClassIndex`] holds immutable [`ClassDecl`]s for every class of the
//! modules added to it. A [`ClassView`] answers questions about one class
//! and its ancestry (methods, constructors, properties, attributes, nested
//! classes, slots and subclass checks), each optionally inherited along the
//! method resolution order.
//!
//! ```rust,ignore
//! let mut index = ClassIndex::with_builtins();
//! index.add_source("shapes", source)?;
//!
//! let resolver = NameResolver::new();
//! let id = index.lookup("shapes.Square").unwrap();
//! let view = index.view(id, &resolver, TypeEvalContext::default()).unwrap();
//! let init = view.find_constructor_method(true);
//! ```

pub mod capabilities;
pub mod context;
pub mod decl;
pub mod error;
pub mod hierarchy;
pub mod index;
mod properties;
pub mod resolver;
pub mod view;


pub use capabilities::{HasDecorators, HasDocString, NamedElement, ScopeOwner};
pub use context::{LanguageLevel, TypeEvalContext, DEFAULT_MAX_DEPTH};
pub use decl::{
    AccessDirection, Accessor, Attribute, ClassDecl, ClassId, Function, MethodKind, NestedClass,
    Property,
};
pub use error::HierarchyError;
pub use hierarchy::{linearize, super_classes, Linearization};
pub use index::{ClassIndex, BUILTINS_MODULE};
pub use resolver::{NameResolver, SuperClassResolver};
pub use view::{ClassView, Declaration, Member, SuperClassType};
