use psikit_parser::ast::*;

/// Visitor pattern for traversing the class outline immutably
///
/// Default implementations walk every class and function of a module.
/// Override specific visit_* methods to act on nodes, calling the
/// matching walk_* function to keep descending.
pub trait Visitor: Sized {
    fn visit_module(&mut self, module: &Module) {
        walk_module(self, module);
    }

    fn visit_class(&mut self, class: &ClassDef) {
        walk_class(self, class);
    }

    fn visit_function(&mut self, _function: &FunctionDef) {}
}

pub fn walk_module<V: Visitor>(visitor: &mut V, module: &Module) {
    for class in &module.classes {
        visitor.visit_class(class);
    }
    for function in &module.functions {
        visitor.visit_function(function);
    }
}

pub fn walk_class<V: Visitor>(visitor: &mut V, class: &ClassDef) {
    for method in &class.methods {
        visitor.visit_function(method);
    }
    for nested in &class.classes {
        visitor.visit_class(nested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psikit_parser::parse;

    #[derive(Default)]
    struct Collector {
        classes: Vec<String>,
        functions: Vec<String>,
        depth: usize,
        max_depth: usize,
    }

    impl Visitor for Collector {
        fn visit_class(&mut self, class: &ClassDef) {
            self.classes.push(class.name.clone());
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            walk_class(self, class);
            self.depth -= 1;
        }

        fn visit_function(&mut self, function: &FunctionDef) {
            self.functions.push(function.name.clone());
        }
    }

    #[test]
    fn test_visitor_walks_whole_outline() {
        let source = r#"
            class A(Base, metaclass=Meta):
                x = make(1, y)

                @deco
                def f(self, a: int = DEFAULT) -> Result:
                    self.v = value

                class B:
                    def g(self):
                        pass

            def top():
                pass
        "#;

        let module = parse(source).unwrap();
        let mut collector = Collector::default();
        collector.visit_module(&module);

        assert_eq!(collector.classes, vec!["A", "B"]);
        assert_eq!(collector.functions, vec!["f", "g", "top"]);
        assert_eq!(collector.max_depth, 2);
    }
}
