//! Shape descriptions made of grid nodes, edges and triangular faces.
//!
//! Shapes are exchanged as JSON documents of the form
//!
//! ```json
//! {
//!   "shape": {
//!     "nodes": [{"x": 0, "y": 0}, {"x": 1, "y": 0}, {"x": 0, "y": 1}],
//!     "edges": [{"u": 0, "v": 1}, {"u": 0, "v": 2}, {"u": 1, "v": 2}],
//!     "faces": [{"u": 0, "v": 1, "w": 2}]
//!   },
//!   "constituents": [],
//!   "dependencyTree": []
//! }
//! ```
//!
//! A bare `{"nodes": ..., "edges": ..., "faces": ...}` object is accepted
//! as well. Node coordinates are relative to the shape's origin.

use crate::coord::GridCoord;
use crate::error::SpaceError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// An edge between two nodes, by node index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeEdge {
    /// First node index.
    pub u: usize,
    /// Second node index.
    pub v: usize,
}

/// A triangular face, by node index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeFace {
    /// First node index.
    pub u: usize,
    /// Second node index.
    pub v: usize,
    /// Third node index.
    pub w: usize,
}

/// A set of grid nodes with optional edges and faces between them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    /// Node positions relative to the shape origin.
    pub nodes: Vec<GridCoord>,
    /// Edges between adjacent nodes.
    #[serde(default)]
    pub edges: Vec<ShapeEdge>,
    /// Triangular faces between mutually adjacent nodes.
    #[serde(default)]
    pub faces: Vec<ShapeFace>,
}

#[derive(Serialize, Deserialize)]
struct ShapeDocument {
    shape: Shape,
    #[serde(default)]
    constituents: Vec<serde_json::Value>,
    #[serde(default, rename = "dependencyTree")]
    dependency_tree: Vec<serde_json::Value>,
}

impl Shape {
    /// Parse and validate a shape document or a bare shape object.
    pub fn from_json(json: &str) -> Result<Self, SpaceError> {
        let shape = match serde_json::from_str::<ShapeDocument>(json) {
            Ok(doc) => doc.shape,
            Err(_) => serde_json::from_str::<Shape>(json).map_err(|e| SpaceError::ShapeFormat {
                reason: e.to_string(),
            })?,
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Serialize as a shape document with no constituents.
    pub fn to_json(&self) -> Result<String, SpaceError> {
        let doc = ShapeDocument {
            shape: self.clone(),
            constituents: Vec::new(),
            dependency_tree: Vec::new(),
        };
        serde_json::to_string(&doc).map_err(|e| SpaceError::ShapeFormat {
            reason: e.to_string(),
        })
    }

    /// Check that nodes are distinct, indices are in range, and every edge
    /// and face connects adjacent nodes.
    pub fn validate(&self) -> Result<(), SpaceError> {
        let invalid = |reason: String| Err(SpaceError::InvalidShape { reason });
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(*node) {
                return invalid(format!("duplicate node {node}"));
            }
        }
        let node = |i: usize| self.nodes.get(i).copied();
        for edge in &self.edges {
            match (node(edge.u), node(edge.v)) {
                (Some(a), Some(b)) if a.is_adjacent(b) => {}
                (Some(a), Some(b)) => {
                    return invalid(format!("edge {}-{} joins non-adjacent nodes {a} and {b}", edge.u, edge.v))
                }
                _ => return invalid(format!("edge {}-{} references a missing node", edge.u, edge.v)),
            }
        }
        for face in &self.faces {
            match (node(face.u), node(face.v), node(face.w)) {
                (Some(a), Some(b), Some(c))
                    if a.is_adjacent(b) && b.is_adjacent(c) && a.is_adjacent(c) => {}
                (Some(_), Some(_), Some(_)) => {
                    return invalid(format!(
                        "face {}-{}-{} is not a grid triangle",
                        face.u, face.v, face.w
                    ))
                }
                _ => {
                    return invalid(format!(
                        "face {}-{}-{} references a missing node",
                        face.u, face.v, face.w
                    ))
                }
            }
        }
        Ok(())
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether every node is reachable from the first through grid
    /// adjacency. The empty shape counts as connected.
    pub fn is_connected(&self) -> bool {
        let Some(&start) = self.nodes.first() else {
            return true;
        };
        let index: HashMap<GridCoord, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (*n, i))
            .collect();
        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([start]);
        visited[0] = true;
        let mut count = 1;
        while let Some(current) = queue.pop_front() {
            for dir in crate::Direction::CARDINAL {
                if let Some(&i) = index.get(&current.neighbor(dir)) {
                    if !visited[i] {
                        visited[i] = true;
                        count += 1;
                        queue.push_back(self.nodes[i]);
                    }
                }
            }
        }
        count == self.nodes.len()
    }

    /// The shape rotated around its origin by `steps` × 60°.
    pub fn rotated(&self, steps: i32) -> Self {
        Self {
            nodes: self.nodes.iter().map(|n| n.rotate(steps)).collect(),
            edges: self.edges.clone(),
            faces: self.faces.clone(),
        }
    }

    /// The shape moved by `offset`.
    pub fn translated(&self, offset: GridCoord) -> Self {
        Self {
            nodes: self.nodes.iter().map(|n| *n + offset).collect(),
            edges: self.edges.clone(),
            faces: self.faces.clone(),
        }
    }
}
