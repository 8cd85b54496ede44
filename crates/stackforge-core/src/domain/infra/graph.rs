//! Resource dependency graph and deterministic topological ordering.

use std::collections::{BTreeSet, HashMap};

use super::resource::ResourceNode;
use crate::domain::error::DomainError;

/// `from` consumes output `via` of `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEdge {
    pub from: String,
    pub to: String,
    pub via: String,
}

/// Nodes plus the edges derived from their output references.
#[derive(Debug, Clone)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    edges: Vec<ResourceEdge>,
    /// Per node index, the indices it depends on.
    depends_on: Vec<BTreeSet<usize>>,
}

impl ResourceGraph {
    /// Build a graph, checking every reference names a declared node and an
    /// output that node's kind declares.
    pub fn build(nodes: Vec<ResourceNode>) -> Result<Self, DomainError> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.name.as_str(), i).is_some() {
                return Err(DomainError::DuplicateResource {
                    name: node.name.clone(),
                });
            }
        }

        let mut edges = Vec::new();
        let mut depends_on = vec![BTreeSet::new(); nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            for (key, target, output) in node.references() {
                let &j = index
                    .get(target)
                    .ok_or_else(|| DomainError::UnknownReference {
                        node: node.name.clone(),
                        target: target.to_string(),
                    })?;
                if !nodes[j].kind.declares_output(output) {
                    return Err(DomainError::UnknownOutput {
                        node: node.name.clone(),
                        target: target.to_string(),
                        output: output.to_string(),
                    });
                }
                depends_on[i].insert(j);
                edges.push(ResourceEdge {
                    from: node.name.clone(),
                    to: target.to_string(),
                    via: key.to_string(),
                });
            }
        }

        Ok(Self {
            nodes,
            edges,
            depends_on,
        })
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[ResourceEdge] {
        &self.edges
    }

    pub fn node(&self, name: &str) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node(name).is_some()
    }

    /// Names of the nodes `name` depends on, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| {
                self.depends_on[i]
                    .iter()
                    .map(|&j| self.nodes[j].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Kahn's algorithm. Among ready nodes the lowest declaration index goes
    /// first, so the order is a pure function of the input.
    pub fn topological_order(&self) -> Result<Vec<&ResourceNode>, DomainError> {
        let n = self.nodes.len();
        let mut pending: Vec<usize> = self.depends_on.iter().map(BTreeSet::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, deps) in self.depends_on.iter().enumerate() {
            for &j in deps {
                dependents[j].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &d in &dependents[i] {
                pending[d] -= 1;
                if pending[d] == 0 {
                    ready.insert(d);
                }
            }
        }

        if order.len() < n {
            return Err(DomainError::DependencyCycle {
                nodes: self.find_cycle(&pending),
            });
        }
        Ok(order.into_iter().map(|i| &self.nodes[i]).collect())
    }

    /// Walk unresolved dependencies from the first stuck node until a node
    /// repeats; the repeated stretch is a cycle.
    fn find_cycle(&self, pending: &[usize]) -> Vec<String> {
        let stuck = |i: usize| pending[i] > 0;
        let Some(start) = (0..self.nodes.len()).find(|&i| stuck(i)) else {
            return Vec::new();
        };

        let mut path = vec![start];
        let mut current = start;
        loop {
            let Some(&next) = self.depends_on[current].iter().find(|&&j| stuck(j)) else {
                break;
            };
            if let Some(pos) = path.iter().position(|&p| p == next) {
                let mut cycle: Vec<String> =
                    path[pos..].iter().map(|&i| self.nodes[i].name.clone()).collect();
                cycle.push(self.nodes[next].name.clone());
                return cycle;
            }
            path.push(next);
            current = next;
        }
        path.into_iter().map(|i| self.nodes[i].name.clone()).collect()
    }
}
