//! Dependency graph for umbrella applications
//!
//! Vertices are the sub-projects discovered under an umbrella's apps
//! directory; an edge `dep -> app` means `app` depends on `dep`.
//! Ordering uses Kahn's algorithm with ties broken by discovery order, so
//! the same graph always yields the same order. Uses petgraph for storage
//! and cycle reporting.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::path::PathBuf;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use thiserror::Error;

use super::app_id::AppId;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Could not sort umbrella projects: cyclic dependency among {}", join(.apps))]
    Cycle { apps: Vec<AppId> },

    #[error("Duplicate application '{app}' in umbrella: {} and {}", .first.display(), .second.display())]
    DuplicateApp {
        app: AppId,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Application not found in umbrella: {0}")]
    AppNotFound(AppId),
}

fn join(apps: &[AppId]) -> String {
    apps.iter()
        .map(AppId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A sub-project of an umbrella
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UmbrellaApp {
    pub app: AppId,
    pub path: PathBuf,
}

impl UmbrellaApp {
    pub fn new(app: AppId, path: impl Into<PathBuf>) -> Self {
        Self {
            app,
            path: path.into(),
        }
    }
}

/// Directed graph of umbrella applications
#[derive(Debug, Default)]
pub struct UmbrellaGraph {
    graph: DiGraph<UmbrellaApp, ()>,

    /// Map from application to node index
    node_map: HashMap<AppId, NodeIndex>,
}

impl UmbrellaGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Adds a vertex. Insertion order is the discovery order used to
    /// break ties when sorting.
    pub fn add_app(&mut self, app: UmbrellaApp) -> Result<(), GraphError> {
        if let Some(existing) = self.node_map.get(&app.app) {
            return Err(GraphError::DuplicateApp {
                app: app.app.clone(),
                first: self.graph[*existing].path.clone(),
                second: app.path,
            });
        }

        let id = app.app.clone();
        let idx = self.graph.add_node(app);
        self.node_map.insert(id, idx);
        Ok(())
    }

    /// Adds an edge: `app` depends on `depends_on`
    ///
    /// Returns false if the edge was already present. Cycles are not
    /// rejected here; they surface from [`topological_order`](Self::topological_order).
    pub fn add_dependency(&mut self, app: &AppId, depends_on: &AppId) -> Result<bool, GraphError> {
        let app_idx = self.index(app)?;
        let dep_idx = self.index(depends_on)?;

        if self.graph.find_edge(dep_idx, app_idx).is_some() {
            return Ok(false);
        }

        self.graph.add_edge(dep_idx, app_idx, ());
        Ok(true)
    }

    fn index(&self, app: &AppId) -> Result<NodeIndex, GraphError> {
        self.node_map
            .get(app)
            .copied()
            .ok_or_else(|| GraphError::AppNotFound(app.clone()))
    }

    /// Returns every application, dependencies before dependents
    pub fn topological_order(&self) -> Result<Vec<UmbrellaApp>, GraphError> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(i)) = ready.pop() {
            let idx = NodeIndex::new(i);
            order.push(self.graph[idx].clone());

            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                let degree = &mut in_degree[next.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(next.index()));
                }
            }
        }

        if order.len() < self.graph.node_count() {
            return Err(GraphError::Cycle {
                apps: self.cycle_members(),
            });
        }

        Ok(order)
    }

    /// Applications that sit on a cycle, in discovery order
    pub fn cycle_members(&self) -> Vec<AppId> {
        let mut members: Vec<NodeIndex> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .flatten()
            .collect();

        members.sort();
        members
            .into_iter()
            .map(|i| self.graph[i].app.clone())
            .collect()
    }

    pub fn contains(&self, app: &AppId) -> bool {
        self.node_map.contains_key(app)
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}
