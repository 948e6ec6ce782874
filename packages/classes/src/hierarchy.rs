//! Method resolution order.
//!
//! Ancestors are linearized with the C3 merge. When the merge has no
//! consistent solution, the order falls back to a depth-first walk that
//! keeps the last occurrence of every class; both orders put each class
//! before its own superclasses and list no class twice.
//!
//! A base that is already on the traversal stack closes a cycle. It is
//! dropped from the walk and reported, so linearization always terminates.

use crate::context::TypeEvalContext;
use crate::decl::ClassId;
use crate::error::HierarchyError;
use crate::index::ClassIndex;
use crate::resolver::SuperClassResolver;
use std::collections::{HashMap, HashSet};
use std::iter;

/// Ancestors of a class in resolution order (the class itself excluded),
/// with the diagnostics found computing them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Linearization {
    pub ancestors: Vec<ClassId>,
    pub diagnostics: Vec<HierarchyError>,
}

impl Linearization {
    pub fn is_well_formed(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Resolved direct superclasses in declaration order, duplicates removed
pub fn super_classes(
    index: &ClassIndex,
    resolver: &dyn SuperClassResolver,
    id: ClassId,
) -> Vec<ClassId> {
    let Some(decl) = index.get(id) else {
        return Vec::new();
    };

    let mut bases = Vec::new();
    for expression in decl.super_class_expressions() {
        if let Some(base) = resolver.resolve(index, decl, expression) {
            if index.get(base).is_some() && !bases.contains(&base) {
                bases.push(base);
            }
        }
    }
    bases
}

pub fn linearize(
    index: &ClassIndex,
    resolver: &dyn SuperClassResolver,
    context: TypeEvalContext,
    id: ClassId,
) -> Linearization {
    let mut linearizer = Linearizer {
        index,
        resolver,
        context,
        stack: Vec::new(),
        memo: HashMap::new(),
        diagnostics: Vec::new(),
        unstable: 0,
    };

    let mut mro = linearizer.mro(id);
    mro.remove(0);
    Linearization {
        ancestors: mro,
        diagnostics: linearizer.diagnostics,
    }
}

struct Linearizer<'a> {
    index: &'a ClassIndex,
    resolver: &'a dyn SuperClassResolver,
    context: TypeEvalContext,
    /// Classes whose linearization is in progress
    stack: Vec<ClassId>,
    memo: HashMap<ClassId, Vec<ClassId>>,
    diagnostics: Vec<HierarchyError>,
    /// Count of cycle and depth reports; results computed while it grows
    /// depend on the stack and are not memoized
    unstable: usize,
}

impl Linearizer<'_> {
    /// Linearization of `id`, starting with `id` itself
    fn mro(&mut self, id: ClassId) -> Vec<ClassId> {
        if let Some(mro) = self.memo.get(&id) {
            return mro.clone();
        }

        if self.stack.len() >= self.context.max_depth {
            self.unstable += 1;
            self.report(HierarchyError::DepthExceeded {
                class: self.name(id),
                limit: self.context.max_depth,
            });
            return vec![id];
        }

        let unstable_before = self.unstable;
        self.stack.push(id);

        let mut bases = Vec::new();
        for base in super_classes(self.index, self.resolver, id) {
            if let Some(position) = self.stack.iter().position(|&open| open == base) {
                let cycle = self.stack[position..]
                    .iter()
                    .chain(iter::once(&base))
                    .map(|&class| self.name(class))
                    .collect();
                self.unstable += 1;
                self.report(HierarchyError::CyclicInheritance { cycle });
                continue;
            }
            bases.push(base);
        }

        let base_mros: Vec<Vec<ClassId>> = bases.iter().map(|&base| self.mro(base)).collect();
        let mut sequences = base_mros.clone();
        sequences.push(bases.clone());

        let merged = match c3_merge(sequences) {
            Some(merged) => merged,
            None => {
                self.report(HierarchyError::InconsistentMro {
                    class: self.name(id),
                    bases: bases.iter().map(|&base| self.name(base)).collect(),
                });
                keep_last_occurrence(&base_mros)
            }
        };

        self.stack.pop();

        let mut mro = Vec::with_capacity(merged.len() + 1);
        mro.push(id);
        mro.extend(merged);

        if self.unstable == unstable_before {
            self.memo.insert(id, mro.clone());
        }
        mro
    }

    fn report(&mut self, diagnostic: HierarchyError) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    fn name(&self, id: ClassId) -> String {
        self.index
            .get(id)
            .map(|decl| decl.qualified_name().to_string())
            .unwrap_or_default()
    }
}

/// C3 merge; `None` when no consistent order exists
fn c3_merge(mut sequences: Vec<Vec<ClassId>>) -> Option<Vec<ClassId>> {
    let mut merged = Vec::new();

    loop {
        sequences.retain(|sequence| !sequence.is_empty());
        if sequences.is_empty() {
            return Some(merged);
        }

        // First head that does not appear in the tail of any sequence
        let candidate = sequences
            .iter()
            .map(|sequence| sequence[0])
            .find(|head| {
                sequences
                    .iter()
                    .all(|sequence| !sequence[1..].contains(head))
            })?;

        merged.push(candidate);
        for sequence in &mut sequences {
            if sequence.first() == Some(&candidate) {
                sequence.remove(0);
            }
        }
    }
}

/// Depth-first order over the base linearizations, keeping the last
/// occurrence of every class
fn keep_last_occurrence(base_mros: &[Vec<ClassId>]) -> Vec<ClassId> {
    let mut seen = HashSet::new();
    let mut order: Vec<ClassId> = base_mros
        .iter()
        .flatten()
        .rev()
        .filter(|&&class| seen.insert(class))
        .copied()
        .collect();
    order.reverse();
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<ClassId> {
        raw.iter().map(|&n| ClassId(n)).collect()
    }

    #[test]
    fn test_c3_merge_diamond() {
        // D(B, C), B(A), C(A)
        let merged = c3_merge(vec![ids(&[1, 0]), ids(&[2, 0]), ids(&[1, 2])]);
        assert_eq!(merged, Some(ids(&[1, 2, 0])));
    }

    #[test]
    fn test_c3_merge_conflict() {
        // X(A, B), Y(B, A), Z(X, Y)
        let merged = c3_merge(vec![ids(&[3, 0, 1]), ids(&[4, 1, 0]), ids(&[3, 4])]);
        assert_eq!(merged, None);
    }

    #[test]
    fn test_keep_last_occurrence() {
        let order = keep_last_occurrence(&[ids(&[3, 0, 1]), ids(&[4, 1, 0])]);
        assert_eq!(order, ids(&[3, 4, 1, 0]));
    }
}
