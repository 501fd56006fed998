//! Depth-first enumeration of compatible version assignments.

use crate::types::{CompatibilitySet, SolveError};
use ahash::{AHashMap, AHashSet};
use std::sync::Arc;
use tracing::debug;
use wheelwright_graph::{PackageGraph, RefId};

/// A slot the solver must bind to a single version: a package name plus its
/// candidate refs, ascending by version.
#[derive(Debug, Clone)]
struct ChoicePoint {
    name: Arc<str>,
    candidates: Vec<RefId>,
}

/// Sort handles by `(name, version)`, deduplicate, and group runs of equal
/// names into choice points. Candidates inside a group ascend by version.
fn group_by_name(graph: &PackageGraph, ids: &[RefId]) -> Vec<ChoicePoint> {
    let mut sorted: Vec<RefId> = ids.to_vec();
    sorted.sort_by(|a, b| {
        let (left, right) = (graph.get(*a), graph.get(*b));
        left.name()
            .cmp(right.name())
            .then_with(|| left.version().cmp(right.version()))
    });
    sorted.dedup();

    let mut groups: Vec<ChoicePoint> = Vec::new();
    for id in sorted {
        let name = graph.get(id).name();
        match groups.last_mut() {
            Some(group) if group.name.as_ref() == name => group.candidates.push(id),
            _ => groups.push(ChoicePoint {
                name: Arc::from(name),
                candidates: vec![id],
            }),
        }
    }
    groups
}

/// Enumerates every compatible version assignment reachable from a set of
/// required refs.
///
/// The required refs fix which names must appear in every emitted set and,
/// per name, which versions are allowed (the union across the given refs).
/// Packages discovered during expansion whose name is not required are, by
/// default, only explored at their highest compatible version per branch;
/// disable [`use_latest_when_not_required`](Self::use_latest_when_not_required)
/// to try every compatible version instead.
#[derive(Debug)]
pub struct CombinationSolver<'g> {
    graph: &'g PackageGraph,
    required_names: AHashSet<String>,
    root_choices: Vec<ChoicePoint>,
    roots: AHashSet<String>,
    use_latest_when_not_required: bool,
}

impl<'g> CombinationSolver<'g> {
    /// Create a solver for the given required refs.
    ///
    /// `roots` names the packages known to be independent; it is carried
    /// for diagnostics and does not influence the search.
    ///
    /// # Errors
    /// `NoRequirements` on an empty slice, `UnknownRef` when a handle does
    /// not belong to `graph`.
    pub fn new(
        graph: &'g PackageGraph,
        required: &[RefId],
        roots: &[String],
    ) -> Result<Self, SolveError> {
        if required.is_empty() {
            return Err(SolveError::NoRequirements);
        }
        if let Some(&foreign) = required.iter().find(|&&id| !graph.contains_id(id)) {
            return Err(SolveError::UnknownRef { handle: foreign });
        }

        let root_choices = group_by_name(graph, required);
        let required_names = root_choices
            .iter()
            .map(|choice| choice.name.to_string())
            .collect();

        Ok(Self {
            graph,
            required_names,
            root_choices,
            roots: roots.iter().cloned().collect(),
            use_latest_when_not_required: true,
        })
    }

    /// Toggle whether non-required packages are pinned to their highest
    /// compatible version per branch. Defaults to `true`.
    #[must_use]
    pub const fn use_latest_when_not_required(mut self, value: bool) -> Self {
        self.use_latest_when_not_required = value;
        self
    }

    /// The informational root names.
    #[must_use]
    pub const fn roots(&self) -> &AHashSet<String> {
        &self.roots
    }

    /// Collect every compatibility set.
    #[must_use]
    pub fn compatibility_sets(&self) -> Vec<CompatibilitySet> {
        let mut sets = Vec::new();
        self.solve_with(|set| sets.push(set));
        debug!(sets = sets.len(), "enumeration complete");
        sets
    }

    /// Stream each compatibility set to a callback, in DFS emission order.
    pub fn solve_with<F: FnMut(CompatibilitySet)>(&self, mut sink: F) {
        let mut chosen: AHashMap<Arc<str>, RefId> = AHashMap::new();
        self.explore(&self.root_choices, &mut chosen, &mut sink);
    }

    /// Recursive predicate: binds the first choice point and descends.
    ///
    /// Returns whether at least one completion exists below this frame.
    /// Candidate versions are tried ascending, and every candidate is tried
    /// even after a completion is found, so all assignments are enumerated.
    fn explore<F: FnMut(CompatibilitySet)>(
        &self,
        choices: &[ChoicePoint],
        chosen: &mut AHashMap<Arc<str>, RefId>,
        sink: &mut F,
    ) -> bool {
        let Some((choice, rest)) = choices.split_first() else {
            sink(self.seal(chosen));
            return true;
        };

        // Choice points are single-name by construction; regrouping here
        // keeps the frame correct for any candidate list.
        for group in group_by_name(self.graph, &choice.candidates) {
            let mut satisfiable = false;

            if let Some(&existing) = chosen.get(&group.name) {
                // The name is already bound. If the bound version is among
                // the candidates the slot collapses and exploration carries
                // on with the remaining choices; otherwise this path dies.
                if group.candidates.contains(&existing) {
                    satisfiable = self.explore(rest, chosen, sink);
                }
            } else {
                let candidates = if self.use_latest_when_not_required
                    && !self.required_names.contains(group.name.as_ref())
                {
                    &group.candidates[group.candidates.len() - 1..]
                } else {
                    &group.candidates[..]
                };

                for &candidate in candidates {
                    let mut next =
                        group_by_name(self.graph, self.graph.get(candidate).dependencies());
                    next.extend_from_slice(rest);

                    chosen.insert(Arc::clone(&group.name), candidate);
                    let complete = self.explore(&next, chosen, sink);
                    chosen.remove(&group.name);

                    if complete {
                        satisfiable = true;
                    }
                }
            }

            if !satisfiable {
                return false;
            }
        }
        true
    }

    fn seal(&self, chosen: &AHashMap<Arc<str>, RefId>) -> CompatibilitySet {
        let mut members: Vec<RefId> = chosen.values().copied().collect();
        members.sort_by(|a, b| self.graph.get(*a).key().cmp(self.graph.get(*b).key()));
        CompatibilitySet::new(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wheelwright_core::Version;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    /// Graph with three independent alpha versions.
    fn independent_alpha() -> PackageGraph {
        let mut graph = PackageGraph::new(vec!["alpha".into()]);
        for version in ["1.0.0", "1.0.1", "2.0.0"] {
            graph.insert("alpha", v(version), vec![]).unwrap();
        }
        graph
    }

    fn solve_all(graph: &PackageGraph, required: &[RefId]) -> Vec<CompatibilitySet> {
        CombinationSolver::new(graph, required, &[])
            .unwrap()
            .use_latest_when_not_required(false)
            .compatibility_sets()
    }

    #[test]
    fn independent_versions_yield_singletons() {
        let graph = independent_alpha();
        let required = graph.ids_of_name("alpha");

        let sets = solve_all(&graph, &required);

        assert_eq!(sets.len(), 3);
        for set in &sets {
            assert_eq!(set.len(), 1);
        }
        assert_eq!(sets[0].keys(&graph), ["alpha::1.0.0"]);
        assert_eq!(sets[2].keys(&graph), ["alpha::2.0.0"]);
    }

    #[test]
    fn range_filtered_dependencies() {
        // alpha-1 depends on beta(>=1.0,<2.0); beta 2.0.0 exists but is out
        // of range, so it never appears in a set.
        let mut graph = PackageGraph::new(vec!["alpha".into()]);
        let beta_10 = graph.insert("beta", v("1.0.0"), vec![]).unwrap();
        let beta_15 = graph.insert("beta", v("1.5.0"), vec![]).unwrap();
        graph.insert("beta", v("2.0.0"), vec![]).unwrap();
        let alpha = graph
            .insert("alpha", v("1.0.0"), vec![beta_10, beta_15])
            .unwrap();

        let sets = solve_all(&graph, &[alpha]);

        let keys: Vec<Vec<String>> = sets.iter().map(|s| s.keys(&graph)).collect();
        assert_eq!(
            keys,
            [
                ["alpha::1.0.0", "beta::1.0.0"],
                ["alpha::1.0.0", "beta::1.5.0"],
            ]
        );
    }

    #[test]
    fn cycle_survivors_form_a_set() {
        // A cycle a-1 -> b -> a is cut by the builder: b-1 sealed first with
        // no back-edge, a-1 pointing at b-1.
        let mut graph = PackageGraph::new(vec!["a".into()]);
        let b = graph.insert("b", v("1.0.0"), vec![]).unwrap();
        let a = graph.insert("a", v("1.0.0"), vec![b]).unwrap();

        let sets = solve_all(&graph, &[a]);

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].keys(&graph), ["a::1.0.0", "b::1.0.0"]);
    }

    #[test]
    fn shared_dependency_collapses_once_bound() {
        // Diamond: alpha needs beta and gamma, beta needs gamma. The second
        // gamma slot is already bound when it is reached.
        let mut graph = PackageGraph::new(vec!["alpha".into()]);
        let gamma = graph.insert("gamma", v("1.0.0"), vec![]).unwrap();
        let beta = graph.insert("beta", v("1.0.0"), vec![gamma]).unwrap();
        let alpha = graph
            .insert("alpha", v("1.0.0"), vec![beta, gamma])
            .unwrap();

        let sets = solve_all(&graph, &[alpha]);

        assert_eq!(sets.len(), 1);
        assert_eq!(
            sets[0].keys(&graph),
            ["alpha::1.0.0", "beta::1.0.0", "gamma::1.0.0"]
        );
    }

    #[test]
    fn conflicting_bindings_produce_nothing() {
        // alpha-1 needs beta-1 exactly, delta-1 needs beta-2 exactly; no
        // assignment satisfies both.
        let mut graph = PackageGraph::new(vec!["alpha".into(), "delta".into()]);
        let beta_1 = graph.insert("beta", v("1.0.0"), vec![]).unwrap();
        let beta_2 = graph.insert("beta", v("2.0.0"), vec![]).unwrap();
        let alpha = graph.insert("alpha", v("1.0.0"), vec![beta_1]).unwrap();
        let delta = graph.insert("delta", v("1.0.0"), vec![beta_2]).unwrap();

        let sets = solve_all(&graph, &[alpha, delta]);
        assert!(sets.is_empty());
    }

    #[test]
    fn latest_only_for_non_required_names() {
        // With the default pinning, each alpha version pairs with the
        // highest beta only.
        let mut graph = PackageGraph::new(vec!["alpha".into()]);
        let betas: Vec<RefId> = ["1.0.0", "1.5.0", "2.0.0"]
            .iter()
            .map(|s| graph.insert("beta", v(s), vec![]).unwrap())
            .collect();
        graph.insert("alpha", v("1.0.0"), betas.clone()).unwrap();
        graph.insert("alpha", v("1.1.0"), betas).unwrap();

        let required = graph.ids_of_name("alpha");
        let sets = CombinationSolver::new(&graph, &required, &[])
            .unwrap()
            .compatibility_sets();

        assert_eq!(sets.len(), 2);
        for set in &sets {
            assert_eq!(set.len(), 2);
            assert_eq!(set.get(&graph, "beta").unwrap().version().as_str(), "2.0.0");
        }
    }

    #[test]
    fn names_are_unique_and_dependencies_satisfied() {
        let mut graph = PackageGraph::new(vec!["alpha".into()]);
        let gamma_1 = graph.insert("gamma", v("1.0.0"), vec![]).unwrap();
        let gamma_2 = graph.insert("gamma", v("2.0.0"), vec![]).unwrap();
        let beta = graph
            .insert("beta", v("1.0.0"), vec![gamma_1, gamma_2])
            .unwrap();
        let alpha = graph
            .insert("alpha", v("1.0.0"), vec![beta, gamma_1, gamma_2])
            .unwrap();

        let sets = solve_all(&graph, &[alpha]);
        assert!(!sets.is_empty());

        for set in &sets {
            // Name uniqueness.
            let names: AHashSet<&str> = set.resolve(&graph).map(|r| r.name()).collect();
            assert_eq!(names.len(), set.len());

            // Every dependency name group of every member is satisfied by
            // the member bound to that name.
            for member in set.resolve(&graph) {
                for group in group_by_name(&graph, member.dependencies()) {
                    let bound = set.get(&graph, &group.name).expect("name bound in set");
                    let bound_id = graph.by_key(bound.key()).unwrap();
                    assert!(group.candidates.contains(&bound_id));
                }
            }
        }
    }

    #[test]
    fn emission_order_is_depth_first_ascending() {
        let mut graph = PackageGraph::new(vec!["alpha".into()]);
        let beta_1 = graph.insert("beta", v("1.0.0"), vec![]).unwrap();
        let beta_2 = graph.insert("beta", v("2.0.0"), vec![]).unwrap();
        let alpha_1 = graph
            .insert("alpha", v("1.0.0"), vec![beta_1, beta_2])
            .unwrap();
        let alpha_2 = graph
            .insert("alpha", v("2.0.0"), vec![beta_1, beta_2])
            .unwrap();

        let sets = solve_all(&graph, &[alpha_1, alpha_2]);

        let keys: Vec<Vec<String>> = sets.iter().map(|s| s.keys(&graph)).collect();
        assert_eq!(
            keys,
            [
                ["alpha::1.0.0", "beta::1.0.0"],
                ["alpha::1.0.0", "beta::2.0.0"],
                ["alpha::2.0.0", "beta::1.0.0"],
                ["alpha::2.0.0", "beta::2.0.0"],
            ]
        );
    }

    #[test]
    fn empty_required_is_an_error() {
        let graph = independent_alpha();
        let err = CombinationSolver::new(&graph, &[], &[]).unwrap_err();
        assert!(matches!(err, SolveError::NoRequirements));
    }

    #[test]
    fn foreign_handle_is_an_error() {
        let graph = independent_alpha();
        let other = {
            let mut g = PackageGraph::new(vec![]);
            for version in ["1.0.0", "1.1.0", "1.2.0", "1.3.0"] {
                g.insert("x", v(version), vec![]).unwrap();
            }
            g.ids_of_name("x")[3]
        };
        let err = CombinationSolver::new(&graph, &[other], &[]).unwrap_err();
        assert!(matches!(err, SolveError::UnknownRef { .. }));
    }
}
