//! Dense adjacency projection of a package graph.

use ahash::AHashMap;
use nalgebra::DMatrix;
use tracing::debug;
use wheelwright_graph::PackageGraph;

/// A package graph projected onto an integer-indexed adjacency matrix.
///
/// Vertices are the graph's keys sorted lexicographically, which makes the
/// layout deterministic across repeated projections of the same graph.
/// `A[i][j] = 1` iff the ref at index `i` directly depends on the ref at
/// index `j`. The projection copies vertex names and holds no handles into
/// the source graph.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyView {
    vertices: Vec<String>,
    index: AHashMap<String, usize>,
    edges: Vec<(usize, usize)>,
    adj: DMatrix<f64>,
}

impl AdjacencyView {
    /// Project a graph onto its adjacency matrix.
    #[must_use]
    pub fn from_graph(graph: &PackageGraph) -> Self {
        let mut vertices: Vec<String> = graph.refs().map(|(_, r)| r.key().to_string()).collect();
        vertices.sort();

        let index: AHashMap<String, usize> = vertices
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), i))
            .collect();

        let mut edges: Vec<(usize, usize)> = Vec::new();
        for row_key in &vertices {
            let id = graph.by_key(row_key).expect("vertex came from the graph");
            for &dep in graph.get(id).dependencies() {
                let dep_key = graph.get(dep).key();
                if let (Some(&from), Some(&to)) = (index.get(row_key.as_str()), index.get(dep_key))
                {
                    edges.push((from, to));
                }
            }
        }

        let n = vertices.len();
        let mut adj = DMatrix::zeros(n, n);
        for &(from, to) in &edges {
            adj[(from, to)] = 1.0;
        }

        debug!(vertices = n, edges = edges.len(), "adjacency projected");
        Self {
            vertices,
            index,
            edges,
            adj,
        }
    }

    /// Vertex keys in index order.
    #[must_use]
    pub fn vertices(&self) -> &[String] {
        &self.vertices
    }

    /// Index of a vertex key, if present.
    #[must_use]
    pub fn vertex_index(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Edges as `(dependent, depended-upon)` index pairs.
    #[must_use]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Edges as key pairs, resolved lazily.
    pub fn named_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .map(|&(from, to)| (self.vertices[from].as_str(), self.vertices[to].as_str()))
    }

    /// The adjacency matrix.
    #[must_use]
    pub const fn matrix(&self) -> &DMatrix<f64> {
        &self.adj
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the projection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Drop every vertex that nothing depends on (an all-zero column),
    /// unless its key starts with one of the preserved prefixes.
    ///
    /// Rows, columns, and the vertex list are all deleted from the same
    /// updated matrix, keeping the projection self-consistent.
    pub fn shrink(&mut self, preserve_prefixes: &[&str]) {
        let n = self.adj.nrows();
        let removable: Vec<usize> = (0..n)
            .filter(|&j| self.adj.column(j).iter().all(|&x| x.abs() < f64::EPSILON))
            .filter(|&j| {
                !preserve_prefixes
                    .iter()
                    .any(|prefix| self.vertices[j].starts_with(prefix))
            })
            .collect();

        if removable.is_empty() {
            return;
        }

        let matrix = std::mem::replace(&mut self.adj, DMatrix::zeros(0, 0));
        self.adj = matrix
            .remove_rows_at(&removable)
            .remove_columns_at(&removable);

        let mut keep = vec![true; n];
        for &j in &removable {
            keep[j] = false;
        }
        let old_vertices = std::mem::take(&mut self.vertices);
        self.vertices = old_vertices
            .into_iter()
            .zip(keep)
            .filter_map(|(key, kept)| kept.then_some(key))
            .collect();
        self.index = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), i))
            .collect();

        self.edges = self
            .adj
            .row_iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|&(_, &x)| x.abs() >= f64::EPSILON)
                    .map(move |(j, _)| (i, j))
                    .collect::<Vec<_>>()
            })
            .collect();

        debug!(
            removed = removable.len(),
            vertices = self.vertices.len(),
            "adjacency shrunk"
        );
    }
}
