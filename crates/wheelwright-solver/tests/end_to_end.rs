//! Discovery plus enumeration over a mock index, end to end.

use std::sync::Arc;
use wheelwright_graph::{BuilderConfig, GraphBuilder};
use wheelwright_solver::CombinationSolver;
use wheelwright_test_utils::{MockIndex, init_tracing};

#[tokio::test]
async fn discovered_graphs_enumerate_expected_sets() {
    init_tracing();

    let index = Arc::new(MockIndex::new());
    index.add_release("alpha", "1.0.0", &["beta (>=1.0,<2.0)"]);
    index.add_release("alpha", "2.0.0", &["beta (>=1.5)"]);
    index.add_project("beta", &["1.0.0", "1.5.0", "2.0.0"]);

    let dir = tempfile::tempdir().unwrap();
    let builder = GraphBuilder::with_config(
        index,
        BuilderConfig {
            use_cache: false,
            snapshot_dir: dir.path().to_path_buf(),
            ..Default::default()
        },
    );
    let graph = builder.build(&["alpha".into()]).await.unwrap();

    let required = graph.ids_of_name("alpha");
    let solver = CombinationSolver::new(&graph, &required, &["alpha".into()])
        .unwrap()
        .use_latest_when_not_required(false);

    let keys: Vec<Vec<String>> = solver
        .compatibility_sets()
        .iter()
        .map(|set| set.keys(&graph))
        .collect();

    assert_eq!(
        keys,
        [
            vec!["alpha::1.0.0".to_string(), "beta::1.0.0".to_string()],
            vec!["alpha::1.0.0".to_string(), "beta::1.5.0".to_string()],
            vec!["alpha::2.0.0".to_string(), "beta::1.5.0".to_string()],
            vec!["alpha::2.0.0".to_string(), "beta::2.0.0".to_string()],
        ]
    );
}

#[tokio::test]
async fn cyclic_discovery_still_yields_a_set() {
    let index = Arc::new(MockIndex::new());
    index.add_release("a", "1.0.0", &["b (>=1)"]);
    index.add_release("b", "1.0.0", &["a (>=1)"]);

    let dir = tempfile::tempdir().unwrap();
    let builder = GraphBuilder::with_config(
        index,
        BuilderConfig {
            use_cache: false,
            snapshot_dir: dir.path().to_path_buf(),
            ..Default::default()
        },
    );
    let graph = builder.build(&["a".into()]).await.unwrap();

    let required = graph.ids_of_name("a");
    let sets = CombinationSolver::new(&graph, &required, &["a".into()])
        .unwrap()
        .compatibility_sets();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].keys(&graph), ["a::1.0.0", "b::1.0.0"]);
}
