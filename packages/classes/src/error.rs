use thiserror::Error;

/// Malformed-hierarchy diagnostics found while linearizing ancestors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Cyclic inheritance: {}", .cycle.join(" -> "))]
    CyclicInheritance {
        /// Qualified names along the cycle, starting and ending at the same class
        cycle: Vec<String>,
    },

    #[error("Cannot create a consistent method resolution order for {class} (bases {})", .bases.join(", "))]
    InconsistentMro { class: String, bases: Vec<String> },

    #[error("Inheritance chain of {class} exceeds {limit} levels")]
    DepthExceeded { class: String, limit: usize },
}

impl HierarchyError {
    /// Qualified name of the class the diagnostic is reported on
    pub fn class(&self) -> &str {
        match self {
            HierarchyError::CyclicInheritance { cycle } => {
                cycle.first().map(String::as_str).unwrap_or_default()
            }
            HierarchyError::InconsistentMro { class, .. }
            | HierarchyError::DepthExceeded { class, .. } => class,
        }
    }
}
