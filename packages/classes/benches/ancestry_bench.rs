use criterion::{black_box, criterion_group, criterion_main, Criterion};
use psikit_classes::{ClassIndex, NameResolver, TypeEvalContext};

fn deep_chain(depth: usize) -> String {
    let mut source = String::from("class C0(object):\n    def __init__(self):\n        self.x = 0\n");
    for i in 1..depth {
        source.push_str(&format!("class C{}(C{}):\n    attr{} = {}\n", i, i - 1, i, i));
    }
    source
}

fn wide_diamonds(width: usize) -> String {
    let mut source = String::from("class Root: pass\n");
    for i in 0..width {
        source.push_str(&format!("class M{}(Root): pass\n", i));
    }
    let bases: Vec<String> = (0..width).map(|i| format!("M{}", i)).collect();
    source.push_str(&format!("class Leaf({}): pass\n", bases.join(", ")));
    source
}

fn ancestry(c: &mut Criterion) {
    let resolver = NameResolver::new();

    let mut chain = ClassIndex::with_builtins();
    chain.add_source("chain", &deep_chain(100)).unwrap();
    let last = chain.lookup("chain.C99").unwrap();

    c.bench_function("linearize_deep_chain", |b| {
        b.iter(|| {
            let view = chain
                .view(black_box(last), &resolver, TypeEvalContext::default())
                .unwrap();
            view.ancestor_classes().len()
        })
    });

    c.bench_function("find_inherited_instance_attribute", |b| {
        let view = chain
            .view(last, &resolver, TypeEvalContext::default())
            .unwrap();
        b.iter(|| view.find_instance_attribute(black_box("x"), true).is_some())
    });

    let mut diamonds = ClassIndex::new();
    diamonds.add_source("wide", &wide_diamonds(50)).unwrap();
    let leaf = diamonds.lookup("wide.Leaf").unwrap();

    c.bench_function("linearize_wide_diamond", |b| {
        b.iter(|| {
            let view = diamonds
                .view(black_box(leaf), &resolver, TypeEvalContext::default())
                .unwrap();
            view.ancestor_classes().len()
        })
    });
}

criterion_group!(benches, ancestry);
criterion_main!(benches);
