//! Directed reachability over the leaves of a topology.
//!
//! A [`Traversal`] runs one breadth-first search per leaf when it is built
//! and keeps the result, so route sampling afterwards is cheap. Only edges
//! are followed; the containment tree plays no part in reachability.

use std::collections::{HashMap, VecDeque};

use log::{debug, warn};
use rand::Rng;

use crate::error::ExhaustedRouteError;
use crate::model::Identified;
use crate::topology::types::{Leaf, Node};

/// A sampled source and destination pair
#[derive(Debug, Clone, Copy)]
pub struct Route<'a> {
    source: &'a Leaf,
    destination: &'a Leaf,
}

impl<'a> Route<'a> {
    pub fn source(&self) -> &'a Leaf {
        self.source
    }

    pub fn destination(&self) -> &'a Leaf {
        self.destination
    }
}

/// Precomputed reachable sets for every leaf below a node
#[derive(Debug)]
pub struct Traversal<'a> {
    name: String,
    leaves: Vec<&'a Leaf>,
    index: HashMap<&'a str, usize>,
    /// Indices into `leaves`, in BFS discovery order
    reachable: Vec<Vec<usize>>,
    has_route: bool,
}

impl<'a> Traversal<'a> {
    pub fn new(node: &'a Node) -> Self {
        let leaves = node.flatten();

        let mut index = HashMap::with_capacity(leaves.len());
        for (i, &leaf) in leaves.iter().enumerate() {
            if index.insert(leaf.id(), i).is_some() {
                warn!("Leaf id '{}' appears more than once in '{}'", leaf.id(), node.id());
            }
        }

        let reachable: Vec<Vec<usize>> = (0..leaves.len())
            .map(|start| reachable_from(&leaves, &index, start))
            .collect();
        let has_route = reachable.iter().any(|set| !set.is_empty());

        debug!(
            "Traversal over '{}': {} leaves, {} valid sources",
            node.id(),
            leaves.len(),
            reachable.iter().filter(|set| !set.is_empty()).count()
        );

        Self {
            name: node.id().to_string(),
            leaves,
            index,
            reachable,
            has_route,
        }
    }

    /// Leaves in flatten order
    pub fn leaves(&self) -> &[&'a Leaf] {
        &self.leaves
    }

    /// True if at least one leaf can reach another leaf
    pub fn has_route(&self) -> bool {
        self.has_route
    }

    /// Leaves reachable from `leaf_id`, excluding the leaf itself.
    ///
    /// Returns `None` if no leaf has that id.
    pub fn reachable(&self, leaf_id: &str) -> Option<Vec<&'a Leaf>> {
        let start = *self.index.get(leaf_id)?;
        Some(self.reachable[start].iter().map(|&i| self.leaves[i]).collect())
    }

    pub fn is_valid_source(&self, leaf_id: &str) -> bool {
        self.index
            .get(leaf_id)
            .is_some_and(|&i| !self.reachable[i].is_empty())
    }

    pub fn valid_source_count(&self) -> usize {
        self.reachable.iter().filter(|set| !set.is_empty()).count()
    }

    /// Sample a random route.
    ///
    /// The source is drawn uniformly among leaves with a non-empty reachable
    /// set (by rejection over all leaves), then the destination uniformly
    /// from that set. Pairs are therefore not equally likely when reachable
    /// set sizes differ.
    pub fn get_random_route<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Route<'a>, ExhaustedRouteError> {
        if !self.has_route {
            return Err(ExhaustedRouteError {
                topology: self.name.clone(),
            });
        }

        loop {
            let source = rng.gen_range(0..self.leaves.len());
            let candidates = &self.reachable[source];
            if candidates.is_empty() {
                continue;
            }

            let destination = candidates[rng.gen_range(0..candidates.len())];
            return Ok(Route {
                source: self.leaves[source],
                destination: self.leaves[destination],
            });
        }
    }
}

/// Breadth-first search from `start` following outgoing edges only
fn reachable_from(leaves: &[&Leaf], index: &HashMap<&str, usize>, start: usize) -> Vec<usize> {
    let mut visited = vec![false; leaves.len()];
    visited[start] = true;

    let mut queue = VecDeque::from([start]);
    let mut found = Vec::new();

    while let Some(current) = queue.pop_front() {
        for edge in leaves[current].edges() {
            match index.get(edge.destination()) {
                Some(&next) if !visited[next] => {
                    visited[next] = true;
                    found.push(next);
                    queue.push_back(next);
                }
                Some(_) => {}
                None => debug!(
                    "Skipping edge '{}': destination outside the traversed node",
                    edge.id()
                ),
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::Topology;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// a -> b -> c, c -> b, d isolated
    fn chain() -> Node {
        let mut a = Leaf::host("a");
        let mut b = Leaf::host("b");
        let mut c = Leaf::host("c");
        let d = Leaf::host("d");
        a.add_edge("b", 1_000_000_000);
        b.add_edge("c", 1_000_000_000);
        c.add_edge("b", 1_000_000_000);

        let mut inner = Topology::new("inner");
        inner.add_node(c);
        inner.add_node(d);

        let mut topology = Topology::new("chain");
        topology.add_node(a);
        topology.add_node(b);
        topology.add_node(inner);
        Node::from(topology)
    }

    fn ids(leaves: Option<Vec<&Leaf>>) -> Vec<String> {
        leaves
            .unwrap()
            .iter()
            .map(|leaf| leaf.id().to_string())
            .collect()
    }

    #[test]
    fn test_reachability_is_directed() {
        let node = chain();
        let traversal = Traversal::new(&node);

        assert_eq!(ids(traversal.reachable("a")), vec!["b", "c"]);
        assert_eq!(ids(traversal.reachable("b")), vec!["c"]);
        assert_eq!(ids(traversal.reachable("c")), vec!["b"]);
        assert!(ids(traversal.reachable("d")).is_empty());
        assert!(traversal.reachable("zzz").is_none());

        assert!(traversal.is_valid_source("a"));
        assert!(!traversal.is_valid_source("d"));
        assert_eq!(traversal.valid_source_count(), 3);
        assert!(traversal.has_route());
    }

    #[test]
    fn test_leaf_never_reaches_itself() {
        let node = chain();
        let traversal = Traversal::new(&node);
        for leaf in traversal.leaves() {
            let reachable = ids(traversal.reachable(leaf.id()));
            assert!(!reachable.contains(&leaf.id().to_string()));
        }
    }

    #[test]
    fn test_random_route_is_reachable() {
        let node = chain();
        let traversal = Traversal::new(&node);
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..500 {
            let route = traversal.get_random_route(&mut rng).unwrap();
            let reachable = ids(traversal.reachable(route.source().id()));
            assert!(reachable.contains(&route.destination().id().to_string()));
            assert_ne!(route.source().id(), "d");
        }
    }

    #[test]
    fn test_no_edges_exhausts_routes() {
        let mut topology = Topology::new("islands");
        topology.add_node(Leaf::host("a"));
        topology.add_node(Leaf::host("b"));
        let node = Node::from(topology);

        let traversal = Traversal::new(&node);
        let mut rng = StdRng::seed_from_u64(22);

        assert!(!traversal.has_route());
        let error = traversal.get_random_route(&mut rng).unwrap_err();
        assert_eq!(error.topology, "islands");
    }

    #[test]
    fn test_empty_topology_exhausts_routes() {
        let node = Node::from(Topology::new("empty"));
        let traversal = Traversal::new(&node);
        let mut rng = StdRng::seed_from_u64(23);
        assert!(traversal.get_random_route(&mut rng).is_err());
    }
}
