//! Random topology models.
//!
//! All generators accept an optional seed; with a seed the output is
//! reproducible, without one the generator is seeded from system entropy.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::topology::types::{Topology, TopologyError};

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn invalid(message: impl Into<String>) -> TopologyError {
    TopologyError::InvalidArgument(message.into())
}

/// Return an Erdős-Rényi G(n, p) random topology
///
/// Every unordered pair of the `n` nodes is linked independently with
/// probability `p`.
pub fn erdos_renyi_topology(n: usize, p: f64, seed: Option<u64>) -> Result<Topology, TopologyError> {
    if n < 1 {
        return Err(invalid("n must be a positive integer"));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(invalid("p must be a value in [0, 1]"));
    }

    let mut rng = rng_from(seed);
    let mut topology = Topology::new();
    for v in 0..n {
        topology.add_node(v);
    }
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.gen::<f64>() < p {
                topology.add_edge(u, v);
            }
        }
    }

    debug!("erdos_renyi_topology({}, {}) produced {} links", n, p, topology.edge_count());
    topology.set_name(format!("erdos_renyi_topology({}, {})", n, p));
    topology.set_property("type", "er");
    topology.set_property("n", n);
    topology.set_property("p", p);
    Ok(topology)
}

/// Return a Barabási-Albert preferential attachment topology
///
/// Starts from a line of `m0` nodes; each of the remaining `n - m0` nodes
/// links to `m` distinct existing nodes picked with probability proportional
/// to their degree.
pub fn barabasi_albert_topology(
    n: usize,
    m: usize,
    m0: usize,
    seed: Option<u64>,
) -> Result<Topology, TopologyError> {
    if m < 1 || m > m0 {
        return Err(invalid("m must be a positive integer and <= m0"));
    }
    if m0 >= n {
        return Err(invalid("m0 must be lower than n"));
    }

    let mut rng = rng_from(seed);
    let mut topology = Topology::new();
    topology.add_node(0usize);
    for v in 1..m0 {
        topology.add_edge(v - 1, v);
    }

    // one entry per link end, so a uniform pick is a degree-weighted pick
    let mut ends: Vec<usize> = (1..m0).flat_map(|v| [v - 1, v]).collect();

    for v in m0..n {
        let mut targets: Vec<usize> = Vec::with_capacity(m);
        while targets.len() < m {
            let candidate = if ends.is_empty() {
                rng.gen_range(0..v)
            } else {
                ends[rng.gen_range(0..ends.len())]
            };
            if !targets.contains(&candidate) {
                targets.push(candidate);
            }
        }
        for target in targets {
            topology.add_edge(v, target);
            ends.push(v);
            ends.push(target);
        }
    }

    topology.set_name(format!("barabasi_albert_topology({}, {}, {})", n, m, m0));
    topology.set_property("type", "ba");
    topology.set_property("m", m);
    topology.set_property("m0", m0);
    Ok(topology)
}

/// Return a Waxman random topology (model 1)
///
/// Each unordered pair is given a distance drawn uniformly from `[0, l]` and
/// linked with probability `alpha * exp(-d / (beta * l))`.
pub fn waxman_1_topology(
    n: usize,
    alpha: f64,
    beta: f64,
    l: f64,
    seed: Option<u64>,
) -> Result<Topology, TopologyError> {
    if n < 1 {
        return Err(invalid("n must be a positive integer"));
    }
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(invalid("alpha must be a value in (0, 1]"));
    }
    if !beta.is_finite() || beta <= 0.0 {
        return Err(invalid("beta must be a positive finite value"));
    }
    if !l.is_finite() || l <= 0.0 {
        return Err(invalid("l must be a positive finite value"));
    }

    let mut rng = rng_from(seed);
    let mut topology = Topology::new();
    for v in 0..n {
        topology.add_node(v);
    }
    for u in 0..n {
        for v in (u + 1)..n {
            let distance = rng.gen_range(0.0..=l);
            if rng.gen::<f64>() < alpha * (-distance / (beta * l)).exp() {
                topology.add_edge(u, v).set("length", distance);
            }
        }
    }

    topology.set_name(format!("waxman_1_topology({}, {}, {}, {})", n, alpha, beta, l));
    topology.set_property("type", "waxman_1");
    topology.set_property("alpha", alpha);
    topology.set_property("beta", beta);
    topology.set_property("L", l);
    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erdos_renyi_extremes() {
        let empty = erdos_renyi_topology(20, 0.0, Some(1)).unwrap();
        assert_eq!(empty.node_count(), 20);
        assert_eq!(empty.edge_count(), 0);

        let complete = erdos_renyi_topology(20, 1.0, Some(1)).unwrap();
        assert_eq!(complete.edge_count(), 20 * 19 / 2);
    }

    #[test]
    fn test_erdos_renyi_is_reproducible() {
        let a = erdos_renyi_topology(50, 0.1, Some(42)).unwrap();
        let b = erdos_renyi_topology(50, 0.1, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_erdos_renyi_rejects_bad_probability() {
        assert!(erdos_renyi_topology(10, 1.5, None).is_err());
        assert!(erdos_renyi_topology(10, -0.1, None).is_err());
        assert!(erdos_renyi_topology(0, 0.5, None).is_err());
    }

    #[test]
    fn test_barabasi_albert_link_count() {
        let (n, m, m0) = (100, 2, 5);
        let topology = barabasi_albert_topology(n, m, m0, Some(7)).unwrap();
        assert_eq!(topology.node_count(), n);
        assert_eq!(topology.edge_count(), (m0 - 1) + (n - m0) * m);
        assert!(topology.is_connected());
    }

    #[test]
    fn test_barabasi_albert_single_seed_node() {
        let topology = barabasi_albert_topology(10, 1, 1, Some(3)).unwrap();
        assert_eq!(topology.edge_count(), 9);
        assert!(topology.is_connected());
    }

    #[test]
    fn test_barabasi_albert_rejects_bad_arguments() {
        assert!(barabasi_albert_topology(10, 0, 3, None).is_err());
        assert!(barabasi_albert_topology(10, 4, 3, None).is_err());
        assert!(barabasi_albert_topology(3, 1, 3, None).is_err());
    }

    #[test]
    fn test_waxman_links_carry_length() {
        let topology = waxman_1_topology(30, 1.0, 10.0, 1.0, Some(5)).unwrap();
        assert!(topology.edge_count() > 0);
        for link in topology.links() {
            let length = link.get("length").and_then(|v| v.as_f64()).unwrap();
            assert!((0.0..=1.0).contains(&length));
        }
        assert!(waxman_1_topology(30, 0.0, 1.0, 1.0, None).is_err());
        assert!(waxman_1_topology(30, 0.5, 0.0, 1.0, None).is_err());
        assert!(waxman_1_topology(30, 0.5, 1.0, 0.0, None).is_err());
    }

    #[test]
    fn test_waxman_rejects_non_finite_parameters() {
        for l in [f64::INFINITY, f64::NAN] {
            assert!(matches!(
                waxman_1_topology(5, 0.5, 0.5, l, Some(1)),
                Err(TopologyError::InvalidArgument(_))
            ));
        }
        assert!(waxman_1_topology(5, f64::NAN, 0.5, 1.0, Some(1)).is_err());
        assert!(waxman_1_topology(5, 0.5, f64::NAN, 1.0, Some(1)).is_err());
        assert!(waxman_1_topology(5, 0.5, f64::INFINITY, 1.0, Some(1)).is_err());
    }
}
