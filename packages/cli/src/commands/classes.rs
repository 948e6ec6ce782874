use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use psikit_classes::{
    ClassId, ClassIndex, ClassView, LanguageLevel, NameResolver, SuperClassType, TypeEvalContext,
};
use psikit_common::{CommonError, RealFileSystem};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ClassesArgs {
    /// Python file or directory (searched recursively)
    pub path: PathBuf,

    /// Only show classes of this module
    #[arg(short, long)]
    pub module: Option<String>,

    /// Only show classes with this name or qualified name
    #[arg(short, long)]
    pub class: Option<String>,

    /// Treat sources as Python 2 (old-style classes)
    #[arg(long)]
    pub py2: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

/// What `psikit classes` reports for one class
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassSummary {
    qualified_name: String,
    bases: Vec<String>,
    ancestors: Vec<String>,
    new_style: bool,
    constructor: Option<String>,
    methods: Vec<String>,
    properties: Vec<PropertySummary>,
    class_attributes: Vec<String>,
    instance_attributes: Vec<String>,
    nested_classes: Vec<String>,
    slots: Option<Vec<String>>,
    diagnostics: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PropertySummary {
    name: String,
    readable: bool,
    writable: bool,
    deletable: bool,
}

pub fn classes(args: ClassesArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let context = if args.py2 || config.language_level == LanguageLevel::Python2 {
        TypeEvalContext::python2()
    } else {
        TypeEvalContext::python3()
    };

    if !args.path.exists() {
        return Err(anyhow!("Input path does not exist: {}", args.path.display()));
    }

    let mut index = ClassIndex::with_builtins();
    if let Err(err) = index.load_path(&RealFileSystem, &args.path) {
        return Err(report_load_error(err));
    }

    // A directory stands in for a package whose modules import each other
    let resolver = if args.path.is_dir() {
        NameResolver::with_global_fallback()
    } else {
        NameResolver::new()
    };

    let summaries: Vec<ClassSummary> = index
        .classes()
        .filter(|decl| !index.is_builtin(decl.id()))
        .filter(|decl| args.module.as_deref().map_or(true, |m| decl.module() == m))
        .filter(|decl| {
            args.class.as_deref().map_or(true, |name| {
                decl.name() == name || decl.qualified_name() == name
            })
        })
        .filter_map(|decl| index.view(decl.id(), &resolver, context))
        .map(|view| summarize(&view))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("{}", "No classes found".yellow());
        return Ok(());
    }

    for summary in &summaries {
        print_summary(summary);
    }
    println!(
        "{} {} classes in {} modules",
        "✓".green(),
        summaries.len(),
        index.modules().len()
    );

    Ok(())
}

fn summarize(view: &ClassView<'_>) -> ClassSummary {
    let index = view.index();
    let name_of = |id: ClassId| index[id].qualified_name().to_string();

    let bases = view
        .super_class_types()
        .into_iter()
        .map(|base| match base {
            SuperClassType::Class(id) => name_of(id),
            SuperClassType::Unresolved(expression) => format!("{} (unresolved)", expression),
        })
        .collect();

    let constructor = view.find_constructor_method(true).map(|member| {
        format!("{}.{}", index[member.owner].qualified_name(), member.item.name)
    });

    let properties = view
        .properties()
        .iter()
        .map(|property| PropertySummary {
            name: property.name.clone(),
            readable: property.getter.is_some(),
            writable: property.setter.is_some(),
            deletable: property.deleter.is_some(),
        })
        .collect();

    ClassSummary {
        qualified_name: view.qualified_name().to_string(),
        bases,
        ancestors: view.ancestor_classes().iter().map(|&id| name_of(id)).collect(),
        new_style: view.is_new_style_class(),
        constructor,
        methods: view.methods().iter().map(|m| m.name.clone()).collect(),
        properties,
        class_attributes: view.class_attributes().iter().map(|a| a.name.clone()).collect(),
        instance_attributes: view
            .instance_attributes()
            .iter()
            .map(|a| a.name.clone())
            .collect(),
        nested_classes: view.nested_classes().into_iter().map(name_of).collect(),
        slots: view.slots().map(<[String]>::to_vec),
        diagnostics: view.diagnostics().iter().map(ToString::to_string).collect(),
    }
}

fn print_summary(summary: &ClassSummary) {
    println!("{}", summary.qualified_name.bright_blue().bold());

    if !summary.bases.is_empty() {
        println!("  bases:      {}", summary.bases.join(", "));
    }
    if !summary.ancestors.is_empty() {
        println!("  mro:        {}", summary.ancestors.join(" -> "));
    }
    if !summary.new_style {
        println!("  {}", "old-style class".dimmed());
    }
    if let Some(constructor) = &summary.constructor {
        println!("  init:       {}", constructor);
    }
    if !summary.methods.is_empty() {
        println!("  methods:    {}", summary.methods.join(", "));
    }
    for property in &summary.properties {
        let access: String = [
            (property.readable, 'r'),
            (property.writable, 'w'),
            (property.deletable, 'd'),
        ]
        .iter()
        .map(|&(on, flag)| if on { flag } else { '-' })
        .collect();
        println!("  property:   {} [{}]", property.name, access);
    }
    if !summary.class_attributes.is_empty() {
        println!("  class attr: {}", summary.class_attributes.join(", "));
    }
    if !summary.instance_attributes.is_empty() {
        println!("  self attr:  {}", summary.instance_attributes.join(", "));
    }
    if !summary.nested_classes.is_empty() {
        println!("  nested:     {}", summary.nested_classes.join(", "));
    }
    match &summary.slots {
        Some(slots) if slots.is_empty() => println!("  slots:      (none)"),
        Some(slots) => println!("  slots:      {}", slots.join(", ")),
        None => {}
    }
    for diagnostic in &summary.diagnostics {
        println!("  {} {}", "warning:".yellow().bold(), diagnostic);
    }
    println!();
}

/// Parse errors are rendered against their source
fn report_load_error(err: CommonError) -> anyhow::Error {
    match err {
        CommonError::Parse { path, source } => {
            if let Ok(text) = fs::read_to_string(&path) {
                eprintln!("{}", source.report(&text, &path));
            }
            anyhow!("Failed to parse {}", path)
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_small_hierarchy() {
        let mut index = ClassIndex::with_builtins();
        index
            .add_source(
                "zoo",
                r#"
class Animal(object):
    __slots__ = ("name",)

    def __init__(self, name):
        self.name = name

class Cat(Animal, Missing):
    @property
    def lives(self):
        return 9
"#,
            )
            .unwrap();

        let resolver = NameResolver::new();
        let id = index.lookup("zoo.Cat").unwrap();
        let view = index.view(id, &resolver, TypeEvalContext::python2()).unwrap();
        let summary = summarize(&view);

        assert_eq!(summary.bases, vec!["zoo.Animal", "Missing (unresolved)"]);
        assert_eq!(summary.ancestors, vec!["zoo.Animal", "builtins.object"]);
        assert!(summary.new_style);
        assert_eq!(summary.constructor.as_deref(), Some("zoo.Animal.__init__"));
        assert_eq!(summary.properties[0].name, "lives");
        assert!(summary.properties[0].readable && !summary.properties[0].writable);
        assert_eq!(summary.slots, None);
        assert!(summary.diagnostics.is_empty());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["qualifiedName"], "zoo.Cat");
        assert_eq!(json["newStyle"], true);
    }
}
