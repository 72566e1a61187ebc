//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Kata.
//! The Kata project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Kata Mapping Graph
//!
//! Schema-level dependency graph induced by field mappings. Every
//! schema-sourced mapping contributes an edge `source schema -> target
//! schema`; JSON-sourced mappings read the raw document and add no edge.
//! Field-level detail is ignored.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::errors::{KaError, Result};
use crate::mapping::KaFieldMapping;
use crate::schema::KaSchemaId;

/// Adjacency map over schema identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KaMappingGraph {
    edges: BTreeMap<KaSchemaId, BTreeSet<KaSchemaId>>,
}

impl KaMappingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph induced by `mappings`.
    pub fn from_mappings<'a, I>(mappings: I) -> Self
    where
        I: IntoIterator<Item = &'a KaFieldMapping>,
    {
        let mut graph = Self::new();
        for mapping in mappings {
            graph.add_mapping(mapping);
        }
        graph
    }

    /// Adds the edge induced by `mapping`, if it has one.
    pub fn add_mapping(&mut self, mapping: &KaFieldMapping) {
        if let Some(source) = mapping.source_schema_id() {
            self.add_edge(source.clone(), mapping.target_schema_id.clone());
        }
    }

    pub fn add_edge(&mut self, from: KaSchemaId, to: KaSchemaId) {
        self.edges.entry(to.clone()).or_default();
        self.edges.entry(from).or_default().insert(to);
    }

    pub fn successors(&self, node: &KaSchemaId) -> impl Iterator<Item = &KaSchemaId> {
        self.edges.get(node).into_iter().flatten()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &KaSchemaId> {
        self.edges.keys()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Depth-first search from `start`, tracking the recursion stack. A
    /// node met again while still on the stack closes a cycle.
    pub fn has_cycle_from(&self, start: &KaSchemaId) -> bool {
        let mut visited: BTreeSet<&KaSchemaId> = BTreeSet::new();
        let mut on_stack: BTreeSet<&KaSchemaId> = BTreeSet::new();
        // (node, successors still to explore)
        let mut stack: Vec<(&KaSchemaId, Vec<&KaSchemaId>)> = Vec::new();

        visited.insert(start);
        on_stack.insert(start);
        stack.push((start, self.successors(start).collect()));

        while let Some((node, pending)) = stack.last_mut() {
            match pending.pop() {
                Some(next) => {
                    if on_stack.contains(next) {
                        return true;
                    }
                    if visited.insert(next) {
                        on_stack.insert(next);
                        let successors = self.successors(next).collect();
                        stack.push((next, successors));
                    }
                }
                None => {
                    on_stack.remove(*node);
                    stack.pop();
                }
            }
        }
        false
    }

    /// Whether any cycle exists anywhere in the graph.
    pub fn has_cycle(&self) -> bool {
        self.topological_order().is_err()
    }

    /// Kahn's algorithm; fails naming the schemas caught in a cycle.
    pub fn topological_order(&self) -> Result<Vec<KaSchemaId>> {
        let mut in_degree: HashMap<&KaSchemaId, usize> =
            self.edges.keys().map(|id| (id, 0)).collect();
        for targets in self.edges.values() {
            for target in targets {
                *in_degree.entry(target).or_insert(0) += 1;
            }
        }

        let mut queue: VecDeque<&KaSchemaId> = self
            .edges
            .keys()
            .filter(|id| in_degree.get(id).copied() == Some(0))
            .collect();
        let mut sorted = Vec::with_capacity(self.edges.len());

        while let Some(node) = queue.pop_front() {
            sorted.push(node.clone());
            for target in self.successors(node) {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(target);
                    }
                }
            }
        }

        if sorted.len() != self.edges.len() {
            let cycle_nodes: Vec<String> = self
                .edges
                .keys()
                .filter(|id| !sorted.contains(id))
                .map(|id| id.to_string())
                .collect();
            return Err(KaError::mapping(format!(
                "cycle detected involving schemas: {}",
                cycle_nodes.join(", ")
            )));
        }
        Ok(sorted)
    }

    /// Whether every edge points forward in `order`. Edges touching a
    /// schema outside `order` are ignored.
    pub fn is_consistent_with(&self, order: &[KaSchemaId]) -> bool {
        let position: HashMap<&KaSchemaId, usize> =
            order.iter().enumerate().map(|(i, id)| (id, i)).collect();
        self.edges.iter().all(|(from, targets)| {
            targets.iter().all(|to| match (position.get(from), position.get(to)) {
                (Some(f), Some(t)) => f < t,
                _ => true,
            })
        })
    }
}

/// Whether adding `candidate` to `existing` would close a cycle in the
/// schema graph.
///
/// A JSON-sourced candidate adds no edge and never creates a cycle.
pub fn would_create_cycle(existing: &[KaFieldMapping], candidate: &KaFieldMapping) -> bool {
    let Some(source) = candidate.source_schema_id() else {
        return false;
    };
    let mut graph = KaMappingGraph::from_mappings(existing);
    graph.add_mapping(candidate);
    let cyclic = graph.has_cycle_from(source);
    if cyclic {
        log::debug!(
            "mapping {} -> {} would create a cycle",
            source,
            candidate.target_schema_id
        );
    }
    cyclic
}
