//! Topology validation utilities.
//!
//! This module provides consistency checks run on topologies before they
//! are written out or reported.

use log::{info, warn};

use crate::topology::netconfig::{BUFFER_SIZE, BUFFER_UNIT, CAPACITY, CAPACITY_UNIT, DELAY, DELAY_UNIT};
use crate::topology::{PropertyValue, Topology};
use crate::utils::units::{BufferUnit, CapacityUnit, DelayUnit, Unit};

/// Validate the structure of a topology
///
/// Checks for:
/// - Links referencing nodes that are not part of the topology
/// - Self-loops in topologies with more than one node
///
/// Disconnected topologies are valid but logged as a warning.
///
/// # Examples
/// ```
/// use topogen::topology::ring_topology;
/// use topogen::utils::validation::validate_topology;
///
/// let topology = ring_topology(5).unwrap();
/// assert!(validate_topology(&topology).is_ok());
/// ```
pub fn validate_topology(topology: &Topology) -> Result<(), String> {
    for link in topology.links() {
        for endpoint in [&link.from, &link.to] {
            if !topology.has_node(endpoint) {
                return Err(format!("Link references non-existent node: {}", endpoint));
            }
        }
        if link.from == link.to && topology.node_count() > 1 {
            return Err(format!("Self-loop on node {}", link.from));
        }
    }

    if topology.node_count() > 1 && !topology.is_connected() {
        warn!(
            "Topology '{}' is not connected: some nodes cannot reach each other",
            topology.name().unwrap_or("(unnamed)")
        );
    }
    Ok(())
}

fn check_unit<U: Unit>(topology: &Topology, value_key: &str, unit_key: &str) -> Result<(), String> {
    let links_with_value = topology.links().filter(|l| l.get(value_key).is_some()).count();

    match topology.properties.get(unit_key) {
        Some(PropertyValue::Str(unit)) => {
            unit.parse::<U>().map_err(|e| format!("{}: {}", unit_key, e))?;
        }
        Some(other) => return Err(format!("{} must be a string, found '{}'", unit_key, other)),
        None if links_with_value > 0 => {
            return Err(format!(
                "{} links carry '{}' but the topology has no {}",
                links_with_value, value_key, unit_key
            ));
        }
        None => {}
    }

    for link in topology.links() {
        if let Some(value) = link.get(value_key) {
            if value.as_f64().is_none() {
                return Err(format!(
                    "Link ({}, {}) has non-numeric {} '{}'",
                    link.from, link.to, value_key, value
                ));
            }
        }
    }

    if links_with_value > 0 && links_with_value < topology.edge_count() {
        info!(
            "{} of {} links have no '{}' assigned",
            topology.edge_count() - links_with_value,
            topology.edge_count(),
            value_key
        );
    }
    Ok(())
}

/// Validate that link delays, capacities and buffer sizes have usable units
///
/// # Examples
/// ```
/// use topogen::topology::line_topology;
/// use topogen::utils::validation::validate_link_units;
///
/// let mut topology = line_topology(3).unwrap();
/// assert!(validate_link_units(&topology).is_ok());
///
/// topology.links_mut().for_each(|l| { l.set("delay", 2); });
/// assert!(validate_link_units(&topology).is_err()); // no delay_unit
/// ```
pub fn validate_link_units(topology: &Topology) -> Result<(), String> {
    check_unit::<DelayUnit>(topology, DELAY, DELAY_UNIT)?;
    check_unit::<CapacityUnit>(topology, CAPACITY, CAPACITY_UNIT)?;
    check_unit::<BufferUnit>(topology, BUFFER_SIZE, BUFFER_UNIT)?;
    Ok(())
}
