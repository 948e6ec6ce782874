use serde::{Deserialize, Serialize};
use std::fmt;

/// Span information for source location tracking
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub id: String,
}

impl Span {
    pub fn new(start: usize, end: usize, id: String) -> Self {
        Self { start, end, id }
    }
}

/// Root node: the class outline of one module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub docstring: Option<String>,
    pub classes: Vec<ClassDef>,
    pub functions: Vec<FunctionDef>,
    pub span: Span,
}

/// `class Name(bases, keywords): ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    /// Positional arguments of the class header, in order
    pub bases: Vec<Expression>,
    /// Keyword arguments of the class header (`metaclass=...`, `**kwargs`)
    pub keywords: Vec<Argument>,
    pub decorators: Vec<Decorator>,
    pub docstring: Option<String>,
    pub methods: Vec<FunctionDef>,
    /// Class-level name bindings (`x = ...`, `x: int = ...`)
    pub attributes: Vec<Assignment>,
    pub classes: Vec<ClassDef>,
    pub span: Span,
}

impl ClassDef {
    /// Keyword argument of the class header by name
    pub fn keyword(&self, name: &str) -> Option<&Expression> {
        self.keywords
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
            .map(|arg| &arg.value)
    }
}

/// `def name(params) -> returns: ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub decorators: Vec<Decorator>,
    pub returns: Option<Expression>,
    pub docstring: Option<String>,
    pub is_async: bool,
    /// Assignments to attributes of the first parameter (`self.x = ...`)
    pub receiver_assignments: Vec<Assignment>,
    pub span: Span,
}

impl FunctionDef {
    /// Name of the first positional parameter, the implicit receiver for methods
    pub fn receiver(&self) -> Option<&str> {
        self.parameters
            .first()
            .filter(|p| p.kind == ParameterKind::Positional)
            .map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    Positional,
    /// `*args`
    VarPositional,
    /// parameters after `*` or `*args`
    KeywordOnly,
    /// `**kwargs`
    VarKeyword,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub annotation: Option<Expression>,
    pub default: Option<Expression>,
}

/// `@expression` line preceding a class or function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decorator {
    pub expression: Expression,
    pub span: Span,
}

impl Decorator {
    /// Dotted name of the decorator, ignoring a trailing call
    ///
    /// `@property` is `property`, `@functools.wraps(f)` is `functools.wraps`
    pub fn name(&self) -> Option<String> {
        match &self.expression {
            Expression::Call { func, .. } => func.dotted_name(),
            expr => expr.dotted_name(),
        }
    }

    pub fn arguments(&self) -> &[Argument] {
        match &self.expression {
            Expression::Call { arguments, .. } => arguments,
            _ => &[],
        }
    }
}

/// A binding of `target` at class level or on the receiver of a method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub target: String,
    pub value: Option<Expression>,
    pub annotation: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unpack {
    #[default]
    None,
    /// `*value`
    Iterable,
    /// `**value`
    Mapping,
}

/// Call argument, positional or keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expression,
    #[serde(default)]
    pub unpack: Unpack,
}

/// Expressions the outline cares about; everything else is kept as source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    Name {
        id: String,
        span: Span,
    },

    Attribute {
        value: Box<Expression>,
        attr: String,
        span: Span,
    },

    Call {
        func: Box<Expression>,
        arguments: Vec<Argument>,
        span: Span,
    },

    Subscript {
        value: Box<Expression>,
        slice: String,
        span: Span,
    },

    Str {
        value: String,
        span: Span,
    },

    Number {
        value: String,
        span: Span,
    },

    Tuple {
        elements: Vec<Expression>,
        span: Span,
    },

    List {
        elements: Vec<Expression>,
        span: Span,
    },

    /// Operators, comprehensions, lambdas, dict/set displays...
    Other {
        text: String,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::Name { span, .. }
            | Expression::Attribute { span, .. }
            | Expression::Call { span, .. }
            | Expression::Subscript { span, .. }
            | Expression::Str { span, .. }
            | Expression::Number { span, .. }
            | Expression::Tuple { span, .. }
            | Expression::List { span, .. }
            | Expression::Other { span, .. } => span,
        }
    }

    /// `a.b.c` for name/attribute chains, `None` for anything else
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Expression::Name { id, .. } => Some(id.clone()),
            Expression::Attribute { value, attr, .. } => value
                .dotted_name()
                .map(|prefix| format!("{}.{}", prefix, attr)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expression::Str { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_name(&self, name: &str) -> bool {
        matches!(self, Expression::Name { id, .. } if id == name)
    }

    /// Elements of a tuple or list display
    pub fn elements(&self) -> Option<&[Expression]> {
        match self {
            Expression::Tuple { elements, .. } | Expression::List { elements, .. } => {
                Some(elements)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Name { id, .. } => write!(f, "{}", id),
            Expression::Attribute { value, attr, .. } => write!(f, "{}.{}", value, attr),
            Expression::Call {
                func, arguments, ..
            } => {
                write!(f, "{}(", func)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match arg.unpack {
                        Unpack::None => {}
                        Unpack::Iterable => write!(f, "*")?,
                        Unpack::Mapping => write!(f, "**")?,
                    }
                    if let Some(name) = &arg.name {
                        write!(f, "{}=", name)?;
                    }
                    write!(f, "{}", arg.value)?;
                }
                write!(f, ")")
            }
            Expression::Subscript { value, slice, .. } => write!(f, "{}[{}]", value, slice),
            Expression::Str { value, .. } => write!(f, "{:?}", value),
            Expression::Number { value, .. } => write!(f, "{}", value),
            Expression::Tuple { elements, .. } => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                if elements.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Expression::List { elements, .. } => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Expression::Other { text, .. } => write!(f, "{}", text),
        }
    }
}

/// Decode the value of a Python string literal (prefix and quotes included)
pub fn unquote(literal: &str) -> String {
    let prefix_len = literal
        .find(|c: char| c == '"' || c == '\'')
        .unwrap_or(literal.len());
    let (prefix, quoted) = literal.split_at(prefix_len);
    let raw = prefix.contains(['r', 'R']);

    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < quote_len * 2 {
        return String::new();
    }
    let body = &quoted[quote_len..quoted.len() - quote_len];

    if raw {
        return body.to_string();
    }

    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('0') => value.push('\0'),
            Some('\\') => value.push('\\'),
            Some('\'') => value.push('\''),
            Some('"') => value.push('"'),
            Some('\n') => {}
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }
    value
}

impl Module {
    pub fn new(span: Span) -> Self {
        Self {
            docstring: None,
            classes: Vec::new(),
            functions: Vec::new(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_plain_and_prefixed() {
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote("\"a\\tb\""), "a\tb");
        assert_eq!(unquote("r'a\\tb'"), "a\\tb");
        assert_eq!(unquote("b\"x\""), "x");
        assert_eq!(unquote("\"\"\"doc\nmore\"\"\""), "doc\nmore");
        assert_eq!(unquote("''"), "");
    }

    #[test]
    fn test_dotted_name() {
        let span = Span::new(0, 0, "t".to_string());
        let expr = Expression::Attribute {
            value: Box::new(Expression::Name {
                id: "abc".to_string(),
                span: span.clone(),
            }),
            attr: "ABC".to_string(),
            span: span.clone(),
        };
        assert_eq!(expr.dotted_name().as_deref(), Some("abc.ABC"));
        assert_eq!(expr.to_string(), "abc.ABC");

        let call = Expression::Call {
            func: Box::new(expr),
            arguments: vec![],
            span,
        };
        assert_eq!(call.dotted_name(), None);
        assert_eq!(call.to_string(), "abc.ABC()");
    }
}
