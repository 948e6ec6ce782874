use crate::ast::*;
use crate::{parse, parse_with_path, ParseError};

fn targets(assignments: &[Assignment]) -> Vec<&str> {
    assignments.iter().map(|a| a.target.as_str()).collect()
}

#[test]
fn test_parse_class_header() {
    let source = r#"
        class Shape(Base, mixins.Printable, metaclass=ABCMeta, **options):
            pass
    "#;

    let result = parse(source);
    assert!(result.is_ok(), "Parse error: {:?}", result.err());

    let module = result.unwrap();
    assert_eq!(module.classes.len(), 1);

    let class = &module.classes[0];
    assert_eq!(class.name, "Shape");
    let bases: Vec<_> = class.bases.iter().filter_map(|b| b.dotted_name()).collect();
    assert_eq!(bases, vec!["Base", "mixins.Printable"]);
    assert_eq!(class.keywords.len(), 2);
    assert!(class.keyword("metaclass").unwrap().is_name("ABCMeta"));
    assert_eq!(class.keywords[1].unpack, Unpack::Mapping);
}

#[test]
fn test_parse_star_base_is_opaque() {
    let module = parse("class A(*bases): pass").unwrap();
    let class = &module.classes[0];
    assert_eq!(class.bases.len(), 1);
    assert!(matches!(&class.bases[0], Expression::Other { text, .. } if text == "*bases"));
}

#[test]
fn test_parse_docstrings() {
    let source = r#"
        """Module doc."""

        class A:
            """Class doc."""

            def f(self):
                'Method ' "doc."
                return 1
    "#;

    let module = parse(source).unwrap();
    assert_eq!(module.docstring.as_deref(), Some("Module doc."));

    let class = &module.classes[0];
    assert_eq!(class.docstring.as_deref(), Some("Class doc."));
    assert_eq!(class.methods[0].docstring.as_deref(), Some("Method doc."));
}

#[test]
fn test_string_expression_is_not_a_docstring() {
    let source = r#"
        class A:
            "a {}".format(1)
    "#;

    let module = parse(source).unwrap();
    assert_eq!(module.classes[0].docstring, None);
}

#[test]
fn test_parse_methods_and_decorators() {
    let source = r#"
        class Circle:
            @property
            def radius(self):
                return self._r

            @radius.setter
            def radius(self, value):
                self._r = value

            @staticmethod
            def unit():
                return Circle()

            async def load(self) -> "Circle":
                pass
    "#;

    let module = parse(source).unwrap();
    let class = &module.classes[0];
    let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["radius", "radius", "unit", "load"]);

    assert_eq!(class.methods[0].decorators[0].name().as_deref(), Some("property"));
    assert_eq!(
        class.methods[1].decorators[0].name().as_deref(),
        Some("radius.setter")
    );
    assert_eq!(class.methods[2].receiver(), None);
    assert!(class.methods[3].is_async);
    assert_eq!(
        class.methods[3].returns.as_ref().and_then(|r| r.as_str()),
        Some("Circle")
    );
}

#[test]
fn test_parse_parameter_kinds() {
    let source = r#"
        def f(a, b=1, /, c: int = 2, *args, d, e=3, **kw):
            pass

        def g(x, *, y):
            pass
    "#;

    let module = parse(source).unwrap();
    let kinds: Vec<_> = module.functions[0]
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("a", ParameterKind::Positional),
            ("b", ParameterKind::Positional),
            ("c", ParameterKind::Positional),
            ("args", ParameterKind::VarPositional),
            ("d", ParameterKind::KeywordOnly),
            ("e", ParameterKind::KeywordOnly),
            ("kw", ParameterKind::VarKeyword),
        ]
    );
    let c = &module.functions[0].parameters[2];
    assert!(c.annotation.as_ref().unwrap().is_name("int"));
    assert!(c.default.is_some());

    let y = &module.functions[1].parameters[1];
    assert_eq!(y.name, "y");
    assert_eq!(y.kind, ParameterKind::KeywordOnly);
}

#[test]
fn test_parse_class_attributes() {
    let source = r#"
        class Config:
            name = "config"
            size: int = 3
            label: str
            a, b = 1, 2
            x = y = None
            __slots__ = ("name", "size")
            handler = lambda self: self.name
            total = size * 2; count = 0
    "#;

    let module = parse(source).unwrap();
    let attributes = &module.classes[0].attributes;
    assert_eq!(
        targets(attributes),
        vec!["name", "size", "label", "a", "b", "x", "y", "__slots__", "handler", "total", "count"]
    );

    assert_eq!(attributes[0].value.as_ref().and_then(|v| v.as_str()), Some("config"));
    assert!(attributes[1].annotation.as_ref().unwrap().is_name("int"));
    assert!(attributes[2].value.is_none());
    assert!(matches!(&attributes[4].value, Some(Expression::Number { value, .. }) if value == "2"));
    assert!(attributes[5].value.as_ref().unwrap().is_name("None"));
    assert!(attributes[6].value.as_ref().unwrap().is_name("None"));

    let slots = attributes[7].value.as_ref().unwrap().elements().unwrap();
    let slot_names: Vec<_> = slots.iter().filter_map(|s| s.as_str()).collect();
    assert_eq!(slot_names, vec!["name", "size"]);

    assert!(matches!(&attributes[8].value, Some(Expression::Other { text, .. }) if text == "lambda self: self.name"));
    assert!(matches!(&attributes[9].value, Some(Expression::Other { text, .. }) if text == "size * 2"));
}

#[test]
fn test_parse_property_call() {
    let source = r#"
        class A:
            x = property(getx, setx, doc="The x.")
    "#;

    let module = parse(source).unwrap();
    let value = module.classes[0].attributes[0].value.as_ref().unwrap();
    match value {
        Expression::Call { func, arguments, .. } => {
            assert!(func.is_name("property"));
            assert_eq!(arguments.len(), 3);
            assert_eq!(arguments[2].name.as_deref(), Some("doc"));
            assert_eq!(arguments[2].value.as_str(), Some("The x."));
        }
        other => panic!("Expected call, got {:?}", other),
    }
}

#[test]
fn test_lambda_arguments_keep_their_parameters() {
    let source = r#"
        class C:
            x = property(lambda self: self._x, lambda self, v=None, *rest: None)
            y = 1
    "#;

    let module = parse(source).unwrap();
    let class = &module.classes[0];
    assert_eq!(targets(&class.attributes), vec!["x", "y"]);

    match class.attributes[0].value.as_ref().unwrap() {
        Expression::Call { arguments, .. } => {
            assert_eq!(arguments.len(), 2);
            assert!(matches!(&arguments[0].value, Expression::Other { text, .. } if text == "lambda self: self._x"));
            assert!(matches!(&arguments[1].value, Expression::Other { text, .. } if text == "lambda self, v=None, *rest: None"));
        }
        other => panic!("Expected call, got {:?}", other),
    }
}

#[test]
fn test_parse_unicode_class_names() {
    let module = parse("class Café:\n    größe = 1\n").unwrap();
    assert_eq!(module.classes[0].name, "Café");
    assert_eq!(module.classes[0].attributes[0].target, "größe");
}

#[test]
fn test_parse_receiver_assignments() {
    let source = r#"
        class Point:
            def __init__(self, x, y=0):
                """Make a point."""
                self.x = x
                self.y: int = y
                self.a, self.b = 1, 2
                if x:
                    self.flag = True
                def helper(self):
                    self.hidden = 1
                self.c = self.d = None
                other.z = 3
                self.items[0] = 1
                print(self.x); self.e = [1,
                    2]
    "#;

    let module = parse(source).unwrap();
    let init = &module.classes[0].methods[0];
    assert_eq!(init.docstring.as_deref(), Some("Make a point."));
    assert_eq!(
        targets(&init.receiver_assignments),
        vec!["x", "y", "a", "b", "flag", "c", "d", "e"]
    );

    let assigned = &init.receiver_assignments;
    assert!(assigned[1].annotation.as_ref().unwrap().is_name("int"));
    assert!(matches!(&assigned[3].value, Some(Expression::Number { value, .. }) if value == "2"));
    assert!(assigned[5].value.as_ref().unwrap().is_name("None"));
    assert!(assigned[6].value.as_ref().unwrap().is_name("None"));
}

#[test]
fn test_receiver_uses_first_parameter_name() {
    let source = r#"
        class A:
            def __init__(this):
                this.size = 1
                self.other = 2
    "#;

    let module = parse(source).unwrap();
    let init = &module.classes[0].methods[0];
    assert_eq!(targets(&init.receiver_assignments), vec!["size"]);
}

#[test]
fn test_parse_nested_classes() {
    let source = r#"
        class Outer:
            class Inner(object):
                class Deepest:
                    pass

                def method(self):
                    pass

            @decorate
            class Decorated:
                pass

            value = 1
    "#;

    let module = parse(source).unwrap();
    let outer = &module.classes[0];
    assert_eq!(outer.classes.len(), 2);
    assert_eq!(outer.classes[0].name, "Inner");
    assert_eq!(outer.classes[0].classes[0].name, "Deepest");
    assert_eq!(outer.classes[0].methods.len(), 1);
    assert_eq!(outer.classes[1].decorators.len(), 1);
    assert_eq!(targets(&outer.attributes), vec!["value"]);
}

#[test]
fn test_unrelated_statements_are_skipped() {
    let source = r#"
        import os
        from typing import List

        if os.name == "nt":
            class Hidden:
                pass

        class A:
            if True:
                flag = 1
            else:
                flag = 2
            try:
                import json
            except ImportError:
                json = None
            for i in range(3):
                pass
            x = 1

        for name in ["a"]:
            print(name)

        class B(A):
            pass
    "#;

    let module = parse(source).unwrap();
    let names: Vec<_> = module.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(targets(&module.classes[0].attributes), vec!["x"]);
}

#[test]
fn test_single_line_suites() {
    let source = r#"
        class A: x = 1; y = 2
        class B: pass
        def f(self): self.z = 3
    "#;

    let module = parse(source).unwrap();
    assert_eq!(module.classes.len(), 2);
    assert_eq!(targets(&module.classes[0].attributes), vec!["x", "y"]);
    assert_eq!(targets(&module.functions[0].receiver_assignments), vec!["z"]);
}

#[test]
fn test_parse_generic_and_subscript_bases() {
    let source = r#"
        class Stack(Generic[T], collections.abc.Sequence):
            items: List[Dict[str, int]] = []
    "#;

    let module = parse(source).unwrap();
    let class = &module.classes[0];
    match &class.bases[0] {
        Expression::Subscript { value, slice, .. } => {
            assert!(value.is_name("Generic"));
            assert_eq!(slice, "T");
        }
        other => panic!("Expected subscript, got {:?}", other),
    }
    assert_eq!(
        class.bases[1].dotted_name().as_deref(),
        Some("collections.abc.Sequence")
    );
    assert_eq!(
        class.attributes[0].annotation.as_ref().unwrap().to_string(),
        "List[Dict[str, int]]"
    );
}

#[test]
fn test_missing_colon_is_an_error() {
    let result = parse("class A(B)\n    pass\n");
    assert!(matches!(result, Err(ParseError::UnexpectedToken { .. })));
}

#[test]
fn test_decorator_without_definition_is_an_error() {
    let result = parse("@decorate\nx = 1\n");
    assert!(matches!(result, Err(ParseError::UnexpectedToken { .. })));
}

#[test]
fn test_unexpected_indent_is_an_error() {
    let result = parse("x = 1\n    y = 2\n");
    assert!(matches!(result, Err(ParseError::InvalidSyntax { .. })));
}

#[test]
fn test_error_report_mentions_file() {
    let source = "class A(B)\n    pass\n";
    let err = parse(source).unwrap_err();
    let report = err.report(source, "shapes.py");
    assert!(report.contains("shapes.py"));
}

#[test]
fn test_spans_and_ids() {
    let source = "class A:\n    def f(self):\n        pass\n";
    let module = parse_with_path(source, "pkg/a.py").unwrap();
    let class = &module.classes[0];

    assert_eq!(class.span.start, 0);
    assert_eq!(&source[class.span.start..class.span.end], source.trim_end());
    assert_ne!(class.span.id, class.methods[0].span.id);

    let other = parse_with_path(source, "pkg/b.py").unwrap();
    assert_ne!(module.span.id, other.span.id);
}

#[test]
fn test_module_serializes_to_json() {
    let module = parse("class A(B):\n    x = 1\n").unwrap();
    let json = serde_json::to_value(&module).unwrap();
    assert_eq!(json["classes"][0]["name"], "A");
    assert_eq!(json["classes"][0]["bases"][0]["type"], "Name");

    let back: Module = serde_json::from_value(json).unwrap();
    assert_eq!(back, module);
}
