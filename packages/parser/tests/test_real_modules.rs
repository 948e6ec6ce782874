//! Parsing whole modules the way they appear in real projects:
//! imports, module-level code, decorated classes and mixed bodies.

use psikit_parser::ast::Expression;
use psikit_parser::parse;

#[test]
fn test_dataclass_style_module() {
    let source = r#"
        """Geometry primitives."""
        from __future__ import annotations

        import math
        from dataclasses import dataclass, field

        __all__ = ["Point", "Polygon"]


        @dataclass(frozen=True)
        class Point:
            x: float = 0.0
            y: float = 0.0

            def __add__(self, other: Point) -> Point:
                return Point(self.x + other.x, self.y + other.y)

            @classmethod
            def origin(cls) -> Point:
                return cls()


        class Polygon(object):
            """A closed shape."""

            __slots__ = ("points", "_area")

            def __init__(self, *points):
                self.points = list(points)
                self._area = None

            @property
            def area(self):
                if self._area is None:
                    self._area = sum(
                        a.x * b.y - b.x * a.y
                        for a, b in zip(self.points, self.points[1:])
                    ) / 2
                return self._area


        if __name__ == "__main__":
            print(Polygon(Point(), Point(1, 0)).area)
    "#;

    let result = parse(source);
    assert!(result.is_ok(), "Parse error: {:?}", result.err());

    let module = result.unwrap();
    assert_eq!(module.docstring.as_deref(), Some("Geometry primitives."));
    assert_eq!(module.classes.len(), 2);

    let point = &module.classes[0];
    assert_eq!(point.decorators[0].name().as_deref(), Some("dataclass"));
    assert_eq!(point.decorators[0].arguments()[0].name.as_deref(), Some("frozen"));
    let fields: Vec<_> = point.attributes.iter().map(|a| a.target.as_str()).collect();
    assert_eq!(fields, vec!["x", "y"]);
    assert_eq!(point.methods.len(), 2);

    let polygon = &module.classes[1];
    assert_eq!(polygon.docstring.as_deref(), Some("A closed shape."));
    assert!(polygon.bases[0].is_name("object"));

    let init = &polygon.methods[0];
    let assigned: Vec<_> = init
        .receiver_assignments
        .iter()
        .map(|a| a.target.as_str())
        .collect();
    assert_eq!(assigned, vec!["points", "_area"]);

    let area = &polygon.methods[1];
    assert_eq!(area.receiver_assignments.len(), 1);
    assert!(matches!(
        &area.receiver_assignments[0].value,
        Some(Expression::Other { .. })
    ));
}

#[test]
fn test_tabs_and_continuations() {
    let source = "class A:\n\tdef f(self, a, \\\n\t\tb):\n\t\tself.a = a\n\n\tx = 1\n";

    let module = parse(source).unwrap();
    let class = &module.classes[0];
    assert_eq!(class.methods[0].parameters.len(), 3);
    assert_eq!(class.methods[0].receiver_assignments[0].target, "a");
    assert_eq!(class.attributes[0].target, "x");
}

#[test]
fn test_empty_module() {
    let module = parse("").unwrap();
    assert!(module.classes.is_empty());
    assert!(module.functions.is_empty());
    assert_eq!(module.docstring, None);

    let module = parse("# only a comment\n\n").unwrap();
    assert!(module.classes.is_empty());
}
