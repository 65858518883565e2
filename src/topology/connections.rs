//! Link creation between nodes.
//!
//! Links are created per ordered pair of leaves and gated by a connectivity
//! probability. Every created link is a pair of directed edges.

use log::debug;
use rand::Rng;

use crate::model::Identified;
use crate::topology::types::{random_bandwidth, Bandwidth, Node};

/// Connect the leaves of `node_a` to the leaves of `node_b`.
///
/// For every pair `(a, b)` with distinct ids one uniform sample is drawn; if
/// it falls below `connectivity` the edges `a -> b` and `b -> a` are both
/// added. Without an explicit `bandwidth` each direction draws its own rate,
/// so the two edges of a link may disagree.
///
/// # Returns
/// The number of links created
pub fn connect<R: Rng + ?Sized>(
    node_a: &mut Node,
    node_b: &mut Node,
    connectivity: f64,
    bandwidth: Option<Bandwidth>,
    rng: &mut R,
) -> usize {
    let leaves_a = node_a.leaves_mut();
    let mut leaves_b = node_b.leaves_mut();
    let mut links = 0;

    for a in leaves_a {
        for b in leaves_b.iter_mut() {
            if a.id() == b.id() {
                continue;
            }
            if rng.gen::<f64>() >= connectivity {
                continue;
            }

            let forward = pick_bandwidth(bandwidth, rng);
            let backward = pick_bandwidth(bandwidth, rng);
            a.add_edge(b.id(), forward);
            b.add_edge(a.id(), backward);
            links += 1;
        }
    }

    debug!(
        "Connected '{}' and '{}' with {} links (connectivity {})",
        node_a.id(),
        node_b.id(),
        links,
        connectivity
    );
    links
}

fn pick_bandwidth<R: Rng + ?Sized>(bandwidth: Option<Bandwidth>, rng: &mut R) -> Bandwidth {
    match bandwidth {
        Some(bandwidth) => bandwidth,
        None => random_bandwidth(rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::{Leaf, Topology, BANDWIDTHS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn group(id: &str, leaves: &[&str]) -> Node {
        let mut topology = Topology::new(id);
        for leaf in leaves {
            topology.add_node(Leaf::host(*leaf));
        }
        Node::from(topology)
    }

    #[test]
    fn test_full_connectivity_links_both_directions() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = Node::from(Leaf::host("a"));
        let mut b = Node::from(Leaf::host("b"));

        let links = connect(&mut a, &mut b, 1.0, None, &mut rng);
        assert_eq!(links, 1);

        let a_edges = a.as_leaf().unwrap().edges();
        let b_edges = b.as_leaf().unwrap().edges();
        assert_eq!(a_edges.len(), 1);
        assert_eq!(b_edges.len(), 1);
        assert_eq!(a_edges[0].destination(), "b");
        assert_eq!(b_edges[0].destination(), "a");
        assert!(BANDWIDTHS.contains(&a_edges[0].bandwidth()));
        assert!(BANDWIDTHS.contains(&b_edges[0].bandwidth()));
    }

    #[test]
    fn test_zero_connectivity_creates_nothing() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut a = group("left", &["a", "b", "c"]);
        let mut b = group("right", &["d", "e"]);

        assert_eq!(connect(&mut a, &mut b, 0.0, None, &mut rng), 0);
        assert_eq!(a.edge_count(), 0);
        assert_eq!(b.edge_count(), 0);
    }

    #[test]
    fn test_every_pair_between_groups() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut a = group("left", &["a", "b"]);
        let mut b = group("right", &["c", "d", "e"]);

        let links = connect(&mut a, &mut b, 1.0, Some(1_000_000_000), &mut rng);
        assert_eq!(links, 6);
        for leaf in a.flatten() {
            assert_eq!(leaf.edges().len(), 3);
            assert!(leaf.edges().iter().all(|e| e.bandwidth() == 1_000_000_000));
        }
        for leaf in b.flatten() {
            assert_eq!(leaf.edges().len(), 2);
        }
    }

    #[test]
    fn test_same_id_is_never_linked() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut a = group("left", &["x", "y"]);
        let mut b = group("right", &["x"]);

        let links = connect(&mut a, &mut b, 1.0, None, &mut rng);
        assert_eq!(links, 1);
        for leaf in a.flatten().into_iter().chain(b.flatten()) {
            assert!(leaf.edges().iter().all(|e| e.destination() != leaf.id()));
        }
    }
}
