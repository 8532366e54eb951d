//! Network topology module.
//!
//! This module contains the topology data model, the canonical and random
//! topology generators, and helpers for configuring link and node
//! attributes.

pub mod types;
pub mod models;
pub mod random;
pub mod netconfig;
pub mod nodeconfig;
pub mod summary;

// Re-export key types and functions for easier access
pub use types::{Application, Link, Node, NodeId, Properties, PropertyValue, Stack, Topology, TopologyError};
pub use models::{
    chord_topology, dumbbell_topology, full_mesh_topology, k_ary_tree_topology, line_topology, ring_topology,
    star_topology,
};
pub use random::{barabasi_albert_topology, erdos_renyi_topology, waxman_1_topology};
pub use summary::{summarize, TopologySummary};
