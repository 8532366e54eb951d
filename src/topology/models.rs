//! Canonical deterministic topology models.
//!
//! Every generator numbers its nodes from 0, records its name and model
//! `type` as global properties and rejects arguments outside the model's
//! domain with [`TopologyError::InvalidArgument`].

use crate::topology::types::{Topology, TopologyError};

fn invalid(message: impl Into<String>) -> TopologyError {
    TopologyError::InvalidArgument(message.into())
}

fn path(topology: &mut Topology, n: usize) {
    topology.add_node(0usize);
    for v in 1..n {
        topology.add_edge(v - 1, v);
    }
}

/// Return a ring topology of `n` nodes
pub fn ring_topology(n: usize) -> Result<Topology, TopologyError> {
    if n < 1 {
        return Err(invalid("n argument must be a positive integer"));
    }
    let mut topology = Topology::new();
    path(&mut topology, n);
    topology.add_edge(n - 1, 0usize);
    topology.set_name(format!("ring_topology({})", n));
    topology.set_property("type", "ring");
    Ok(topology)
}

/// Return a line topology of `n` nodes
pub fn line_topology(n: usize) -> Result<Topology, TopologyError> {
    if n < 1 {
        return Err(invalid("n argument must be a positive integer"));
    }
    let mut topology = Topology::new();
    path(&mut topology, n);
    topology.set_name(format!("line_topology({})", n));
    topology.set_property("type", "line");
    Ok(topology)
}

/// Return a star (hub-and-spoke) topology of `n + 1` nodes
///
/// The hub is node 0 with `type = root`; nodes `1..=n` have `type = leaf`.
pub fn star_topology(n: usize) -> Result<Topology, TopologyError> {
    if n < 1 {
        return Err(invalid("n argument must be a positive integer"));
    }
    let mut topology = Topology::new();
    topology.add_node(0usize).set("type", "root");
    for v in 1..=n {
        topology.add_edge(0usize, v);
        topology.add_node(v).set("type", "leaf");
    }
    topology.set_name(format!("star_topology({})", n));
    topology.set_property("type", "star");
    Ok(topology)
}

/// Return a fully connected mesh topology of `n` nodes
pub fn full_mesh_topology(n: usize) -> Result<Topology, TopologyError> {
    if n < 1 {
        return Err(invalid("n argument must be a positive integer"));
    }
    let mut topology = Topology::new();
    topology.add_node(0usize);
    for u in 0..n {
        for v in (u + 1)..n {
            topology.add_edge(u, v);
        }
    }
    topology.set_name(format!("full_mesh_topology({})", n));
    topology.set_property("type", "full_mesh");
    Ok(topology)
}

/// Return a balanced k-ary tree of height `h`
///
/// Nodes are numbered breadth first, so the children of `v` are
/// `k*v + 1 ..= k*v + k`. Each node carries `type` (`root`, `intermediate`
/// or `leaf`) and `depth` (0 at the root, `h` at the leaves).
pub fn k_ary_tree_topology(k: usize, h: usize) -> Result<Topology, TopologyError> {
    if k <= 1 {
        return Err(invalid("Invalid k parameter. It should be > 1"));
    }
    if h < 1 {
        return Err(invalid("Invalid h parameter. It should be >= 1"));
    }

    let mut topology = Topology::new();
    topology.add_node(0usize).set("type", "root").set("depth", 0usize);

    let mut v = 1usize;
    let mut level_size = 1usize;
    for depth in 1..=h {
        level_size = level_size
            .checked_mul(k)
            .ok_or_else(|| invalid("k-ary tree is too large"))?;
        let node_type = if depth == h { "leaf" } else { "intermediate" };
        for _ in 0..level_size {
            topology.add_edge((v - 1) / k, v);
            topology.add_node(v).set("type", node_type).set("depth", depth);
            v += 1;
        }
    }

    topology.set_name(format!("k_ary_tree_topology({},{})", k, h));
    topology.set_property("type", "tree");
    topology.set_property("k", k);
    topology.set_property("h", h);
    Ok(topology)
}

/// Return a dumbbell topology: two stars whose roots are joined by a path
///
/// Nodes `0..m1` form the left bell and hang off core node `m1`, nodes
/// `m1..m1+m2` form the core path and nodes `m1+m2..2*m1+m2` form the right
/// bell hanging off core node `m1+m2-1`. Nodes and links are tagged with
/// `type` `left_bell`, `core` or `right_bell`.
pub fn dumbbell_topology(m1: usize, m2: usize) -> Result<Topology, TopologyError> {
    if m1 < 2 {
        return Err(invalid("Invalid graph description, m1 should be >= 2"));
    }
    if m2 < 1 {
        return Err(invalid("Invalid graph description, m2 should be >= 1"));
    }

    let mut topology = Topology::new();
    topology.set_name(format!("dumbbell_topology({},{})", m1, m2));
    topology.set_property("type", "dumbbell");

    topology.add_node(m1);
    for v in 0..m1 {
        topology.add_node(v).set("type", "left_bell");
        topology.add_edge(v, m1).set("type", "left_bell");
    }

    for v in 0..m1 {
        topology.add_node(v + m1 + m2).set("type", "right_bell");
        topology.add_edge(v + m1 + m2, m1 + m2 - 1).set("type", "right_bell");
    }

    for v in m1..(m1 + m2 - 1) {
        topology.add_node(v).set("type", "core");
        topology.add_edge(v, v + 1).set("type", "core");
    }
    topology.add_node(m1 + m2 - 1).set("type", "core");

    Ok(topology)
}

/// Return a directed Chord topology of `2^m` nodes
///
/// Each node links to its `m` fingers `(v + 2^u) mod 2^m`. When `r > 2` it
/// also links to its nearest successors `(v + j) mod 2^m` for `j in 3..=r`
/// (successors 1 and 2 are already fingers).
pub fn chord_topology(m: u32, r: usize) -> Result<Topology, TopologyError> {
    if m < 2 {
        return Err(invalid("m must be an integer >= 2"));
    }
    let n = 1usize
        .checked_shl(m)
        .filter(|n| *n > 0 && m < usize::BITS - 1)
        .ok_or_else(|| invalid(format!("m = {} is too large", m)))?;
    if r < 1 || r > n - 1 {
        return Err(invalid("r must be an integer and 1 <= r <= 2^m - 1"));
    }

    let mut topology = Topology::new_directed();
    for v in 0..n {
        for u in 0..m {
            topology.add_edge(v, (v + (1usize << u)) % n);
        }
    }
    if r > 2 {
        for v in 0..n {
            for u in (v + 3)..=(v + r) {
                topology.add_edge(v, u % n);
            }
        }
    }

    topology.set_name(format!("chord_topology({},{})", m, r));
    topology.set_property("type", "chord");
    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::{NodeId, PropertyValue};

    fn id(v: usize) -> NodeId {
        NodeId::from(v)
    }

    fn text(value: Option<&PropertyValue>) -> Option<&str> {
        value.and_then(PropertyValue::as_str)
    }

    #[test]
    fn test_ring_topology() {
        let topology = ring_topology(10).unwrap();
        assert_eq!(topology.node_count(), 10);
        assert_eq!(topology.edge_count(), 10);
        assert!(topology.has_edge(&id(9), &id(0)));
        assert!(topology.node_ids().all(|v| topology.degree(v) == 2));
        assert_eq!(topology.name(), Some("ring_topology(10)"));
        assert_eq!(text(topology.properties.get("type")), Some("ring"));
    }

    #[test]
    fn test_single_node_models() {
        let line = line_topology(1).unwrap();
        assert_eq!(line.node_count(), 1);
        assert_eq!(line.edge_count(), 0);

        let mesh = full_mesh_topology(1).unwrap();
        assert_eq!(mesh.node_count(), 1);
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn test_line_topology() {
        let topology = line_topology(5).unwrap();
        assert_eq!(topology.edge_count(), 4);
        assert!(!topology.has_edge(&id(4), &id(0)));
        assert_eq!(topology.degree(&id(0)), 1);
        assert_eq!(topology.degree(&id(2)), 2);
    }

    #[test]
    fn test_invalid_sizes_are_rejected() {
        assert!(matches!(ring_topology(0), Err(TopologyError::InvalidArgument(_))));
        assert!(line_topology(0).is_err());
        assert!(star_topology(0).is_err());
        assert!(full_mesh_topology(0).is_err());
        assert!(k_ary_tree_topology(1, 3).is_err());
        assert!(k_ary_tree_topology(2, 0).is_err());
        assert!(dumbbell_topology(1, 3).is_err());
        assert!(dumbbell_topology(3, 0).is_err());
        assert!(chord_topology(1, 1).is_err());
        assert!(chord_topology(3, 0).is_err());
        assert!(chord_topology(3, 8).is_err());
    }

    #[test]
    fn test_star_topology() {
        let topology = star_topology(6).unwrap();
        assert_eq!(topology.node_count(), 7);
        assert_eq!(topology.edge_count(), 6);
        assert_eq!(topology.degree(&id(0)), 6);
        assert_eq!(text(topology.node(&id(0)).unwrap().get("type")), Some("root"));
        for v in 1..=6 {
            assert_eq!(text(topology.node(&id(v)).unwrap().get("type")), Some("leaf"));
        }
    }

    #[test]
    fn test_full_mesh_topology() {
        let topology = full_mesh_topology(6).unwrap();
        assert_eq!(topology.edge_count(), 15);
        assert!(topology.node_ids().all(|v| topology.degree(v) == 5));
    }

    #[test]
    fn test_k_ary_tree_topology() {
        let topology = k_ary_tree_topology(3, 2).unwrap();
        assert_eq!(topology.node_count(), 1 + 3 + 9);
        assert_eq!(topology.edge_count(), 12);
        assert_eq!(topology.properties.get("k"), Some(&PropertyValue::Int(3)));
        assert_eq!(topology.properties.get("h"), Some(&PropertyValue::Int(2)));

        let root = topology.node(&id(0)).unwrap();
        assert_eq!(text(root.get("type")), Some("root"));
        assert_eq!(root.get("depth"), Some(&PropertyValue::Int(0)));

        for v in 1..=3 {
            let node = topology.node(&id(v)).unwrap();
            assert_eq!(text(node.get("type")), Some("intermediate"));
            assert_eq!(node.get("depth"), Some(&PropertyValue::Int(1)));
            assert!(topology.has_edge(&id(0), &id(v)));
        }
        for v in 4..=12 {
            let node = topology.node(&id(v)).unwrap();
            assert_eq!(text(node.get("type")), Some("leaf"));
            assert_eq!(node.get("depth"), Some(&PropertyValue::Int(2)));
        }
        assert!(topology.has_edge(&id(1), &id(4)));
        assert!(topology.has_edge(&id(3), &id(12)));
    }

    #[test]
    fn test_dumbbell_topology() {
        let (m1, m2) = (3, 2);
        let topology = dumbbell_topology(m1, m2).unwrap();
        assert_eq!(topology.node_count(), 2 * m1 + m2);
        assert_eq!(topology.edge_count(), 2 * m1 + m2 - 1);
        assert!(topology.is_connected());

        for v in 0..m1 {
            assert_eq!(text(topology.node(&id(v)).unwrap().get("type")), Some("left_bell"));
            assert_eq!(text(topology.edge(&id(v), &id(m1)).unwrap().get("type")), Some("left_bell"));
        }
        for v in m1..(m1 + m2) {
            assert_eq!(text(topology.node(&id(v)).unwrap().get("type")), Some("core"));
        }
        for v in (m1 + m2)..(2 * m1 + m2) {
            assert_eq!(text(topology.node(&id(v)).unwrap().get("type")), Some("right_bell"));
            assert!(topology.has_edge(&id(v), &id(m1 + m2 - 1)));
        }
        assert_eq!(text(topology.edge(&id(3), &id(4)).unwrap().get("type")), Some("core"));
    }

    #[test]
    fn test_dumbbell_with_single_core_node() {
        let topology = dumbbell_topology(2, 1).unwrap();
        assert_eq!(topology.node_count(), 5);
        assert_eq!(topology.degree(&id(2)), 4);
    }

    #[test]
    fn test_chord_topology() {
        let topology = chord_topology(3, 1).unwrap();
        assert!(topology.is_directed());
        assert_eq!(topology.node_count(), 8);
        assert_eq!(topology.edge_count(), 8 * 3);
        assert!(topology.has_edge(&id(7), &id(0)));
        assert!(topology.has_edge(&id(7), &id(3)));
        assert!(!topology.has_edge(&id(0), &id(3)));
    }

    #[test]
    fn test_chord_topology_with_successors() {
        let topology = chord_topology(3, 5).unwrap();
        // fingers +1 +2 +4, successors +3 +5 (+4 already a finger)
        assert_eq!(topology.edge_count(), 8 * 5);
        assert!(topology.has_edge(&id(0), &id(3)));
        assert!(topology.has_edge(&id(6), &id(3)));
        assert!(!topology.has_edge(&id(0), &id(6)));
    }
}
