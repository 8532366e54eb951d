//! Link attribute configuration.
//!
//! Delays, capacities and buffer sizes are stored on links as plain numbers
//! expressed in a single topology-wide unit, recorded in the global
//! `delay_unit`, `capacity_unit` and `buffer_unit` properties. The first
//! assignment fixes the unit; later assignments are converted into it.

use log::debug;
use std::collections::BTreeMap;

use crate::topology::types::{NodeId, PropertyValue, Topology, TopologyError};
use crate::utils::units::{convert, BufferUnit, CapacityUnit, DelayUnit, Unit};

pub const DELAY: &str = "delay";
pub const CAPACITY: &str = "capacity";
pub const BUFFER_SIZE: &str = "buffer_size";
pub const WEIGHT: &str = "weight";

pub const DELAY_UNIT: &str = "delay_unit";
pub const CAPACITY_UNIT: &str = "capacity_unit";
pub const BUFFER_UNIT: &str = "buffer_unit";

/// Resolve the link selection, failing on the first link that does not exist
fn selected_links(
    topology: &Topology,
    links: Option<&[(NodeId, NodeId)]>,
) -> Result<Vec<(NodeId, NodeId)>, TopologyError> {
    match links {
        None => Ok(topology.links().map(|l| l.endpoints()).collect()),
        Some(links) => {
            for (u, v) in links {
                if !topology.has_edge(u, v) {
                    return Err(TopologyError::LinkNotFound(u.clone(), v.clone()));
                }
            }
            Ok(links.to_vec())
        }
    }
}

/// Unit the topology stores `unit_key` values in, adopting `fallback` if unset
fn topology_unit<U: Unit>(topology: &mut Topology, unit_key: &str, fallback: U) -> Result<U, TopologyError> {
    match topology.properties.get(unit_key) {
        Some(PropertyValue::Str(unit)) => Ok(unit.parse::<U>()?),
        Some(other) => Err(TopologyError::InvalidProperty(format!(
            "{} must be a string, found {}",
            unit_key, other
        ))),
        None => {
            topology.set_property(unit_key, fallback.name());
            Ok(fallback)
        }
    }
}

fn set_constant<U: Unit>(
    topology: &mut Topology,
    key: &str,
    unit_key: &str,
    value: f64,
    unit: U,
    links: Option<&[(NodeId, NodeId)]>,
) -> Result<(), TopologyError> {
    let selection = selected_links(topology, links)?;
    let target = topology_unit(topology, unit_key, unit)?;
    let converted = PropertyValue::from_number(convert(value, unit, target)?);

    debug!("Setting {} = {} {} on {} links", key, converted, target, selection.len());
    for (u, v) in &selection {
        if let Some(link) = topology.edge_mut(u, v) {
            link.properties.insert(key.to_string(), converted.clone());
        }
    }
    Ok(())
}

fn clear(topology: &mut Topology, key: &str, unit_key: Option<&str>) {
    for link in topology.links_mut() {
        link.properties.remove(key);
    }
    if let Some(unit_key) = unit_key {
        topology.properties.remove(unit_key);
    }
}

fn collect(topology: &Topology, key: &str) -> BTreeMap<(NodeId, NodeId), f64> {
    topology
        .links()
        .filter_map(|link| link.get(key).and_then(PropertyValue::as_f64).map(|v| (link.endpoints(), v)))
        .collect()
}

/// Assign the same delay to all links, or to `links` only
pub fn set_delays_constant(
    topology: &mut Topology,
    delay: f64,
    unit: DelayUnit,
    links: Option<&[(NodeId, NodeId)]>,
) -> Result<(), TopologyError> {
    if !delay.is_finite() || delay < 0.0 {
        return Err(TopologyError::InvalidArgument("delay must be a non-negative finite value".to_string()));
    }
    set_constant(topology, DELAY, DELAY_UNIT, delay, unit, links)
}

/// Assign the same capacity to all links, or to `links` only
pub fn set_capacities_constant(
    topology: &mut Topology,
    capacity: f64,
    unit: CapacityUnit,
    links: Option<&[(NodeId, NodeId)]>,
) -> Result<(), TopologyError> {
    if !capacity.is_finite() || capacity <= 0.0 {
        return Err(TopologyError::InvalidArgument("capacity must be a positive finite value".to_string()));
    }
    set_constant(topology, CAPACITY, CAPACITY_UNIT, capacity, unit, links)
}

/// Assign the same buffer size to all links, or to `links` only
///
/// Sizes in `packets` cannot be mixed with byte-based sizes on one topology.
pub fn set_buffer_sizes_constant(
    topology: &mut Topology,
    size: f64,
    unit: BufferUnit,
    links: Option<&[(NodeId, NodeId)]>,
) -> Result<(), TopologyError> {
    if !size.is_finite() || size <= 0.0 {
        return Err(TopologyError::InvalidArgument("buffer size must be a positive finite value".to_string()));
    }
    set_constant(topology, BUFFER_SIZE, BUFFER_UNIT, size, unit, links)
}

/// Assign the same weight to all links, or to `links` only
pub fn set_weights_constant(
    topology: &mut Topology,
    weight: f64,
    links: Option<&[(NodeId, NodeId)]>,
) -> Result<(), TopologyError> {
    if !weight.is_finite() {
        return Err(TopologyError::InvalidArgument("weight must be a finite value".to_string()));
    }
    let selection = selected_links(topology, links)?;
    let weight = PropertyValue::from_number(weight);
    for (u, v) in &selection {
        if let Some(link) = topology.edge_mut(u, v) {
            link.properties.insert(WEIGHT.to_string(), weight.clone());
        }
    }
    Ok(())
}

pub fn clear_delays(topology: &mut Topology) {
    clear(topology, DELAY, Some(DELAY_UNIT));
}

pub fn clear_capacities(topology: &mut Topology) {
    clear(topology, CAPACITY, Some(CAPACITY_UNIT));
}

pub fn clear_buffer_sizes(topology: &mut Topology) {
    clear(topology, BUFFER_SIZE, Some(BUFFER_UNIT));
}

pub fn clear_weights(topology: &mut Topology) {
    clear(topology, WEIGHT, None);
}

/// Link delays in the topology's delay unit
pub fn get_delays(topology: &Topology) -> BTreeMap<(NodeId, NodeId), f64> {
    collect(topology, DELAY)
}

/// Link capacities in the topology's capacity unit
pub fn get_capacities(topology: &Topology) -> BTreeMap<(NodeId, NodeId), f64> {
    collect(topology, CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::models::{line_topology, star_topology};

    fn id(v: i64) -> NodeId {
        NodeId::Int(v)
    }

    #[test]
    fn test_first_assignment_fixes_unit() {
        let mut topology = line_topology(3).unwrap();
        set_delays_constant(&mut topology, 2.0, DelayUnit::Ms, None).unwrap();

        assert_eq!(topology.properties.get(DELAY_UNIT), Some(&PropertyValue::from("ms")));
        for link in topology.links() {
            assert_eq!(link.get(DELAY), Some(&PropertyValue::Int(2)));
        }
    }

    #[test]
    fn test_later_assignments_are_converted() {
        let mut topology = line_topology(3).unwrap();
        set_delays_constant(&mut topology, 2.0, DelayUnit::Ms, None).unwrap();
        set_delays_constant(&mut topology, 1.0, DelayUnit::S, Some(&[(id(1), id(2))])).unwrap();
        set_delays_constant(&mut topology, 500.0, DelayUnit::Us, Some(&[(id(1), id(0))])).unwrap();

        let delays = get_delays(&topology);
        assert_eq!(delays[&(id(0), id(1))], 0.5);
        assert_eq!(delays[&(id(1), id(2))], 1000.0);
        assert_eq!(topology.properties.get(DELAY_UNIT), Some(&PropertyValue::from("ms")));
    }

    #[test]
    fn test_capacities_in_existing_unit() {
        let mut topology = star_topology(3).unwrap();
        topology.set_property(CAPACITY_UNIT, "Mbps");
        set_capacities_constant(&mut topology, 1.0, CapacityUnit::Gbps, None).unwrap();

        let capacities = get_capacities(&topology);
        assert_eq!(capacities.len(), 3);
        assert!(capacities.values().all(|c| *c == 1000.0));
    }

    #[test]
    fn test_unknown_link_is_rejected_before_any_change() {
        let mut topology = line_topology(3).unwrap();
        let result = set_capacities_constant(
            &mut topology,
            10.0,
            CapacityUnit::Mbps,
            Some(&[(id(0), id(1)), (id(0), id(2))]),
        );

        assert!(matches!(result, Err(TopologyError::LinkNotFound(_, _))));
        assert!(get_capacities(&topology).is_empty());
        assert!(!topology.properties.contains_key(CAPACITY_UNIT));
    }

    #[test]
    fn test_buffer_units_cannot_mix_packets_and_bytes() {
        let mut topology = line_topology(2).unwrap();
        set_buffer_sizes_constant(&mut topology, 100.0, BufferUnit::Packets, None).unwrap();
        let result = set_buffer_sizes_constant(&mut topology, 1500.0, BufferUnit::Bytes, None);
        assert!(matches!(result, Err(TopologyError::Unit(_))));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut topology = line_topology(2).unwrap();
        assert!(set_delays_constant(&mut topology, -1.0, DelayUnit::Ms, None).is_err());
        assert!(set_capacities_constant(&mut topology, 0.0, CapacityUnit::Mbps, None).is_err());
        assert!(set_buffer_sizes_constant(&mut topology, 0.0, BufferUnit::Packets, None).is_err());
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let mut topology = line_topology(2).unwrap();
        for value in [f64::NAN, f64::INFINITY] {
            assert!(set_delays_constant(&mut topology, value, DelayUnit::Ms, None).is_err());
            assert!(set_capacities_constant(&mut topology, value, CapacityUnit::Mbps, None).is_err());
            assert!(set_buffer_sizes_constant(&mut topology, value, BufferUnit::Packets, None).is_err());
            assert!(set_weights_constant(&mut topology, value, None).is_err());
        }
        assert!(topology.links().all(|l| l.properties.is_empty()));
        assert!(topology.properties.get(DELAY_UNIT).is_none());
    }

    #[test]
    fn test_converted_values_stay_integral() {
        let mut topology = line_topology(2).unwrap();
        set_delays_constant(&mut topology, 1.0, DelayUnit::Us, None).unwrap();

        set_delays_constant(&mut topology, 7.0, DelayUnit::Ms, None).unwrap();
        assert!(topology.links().all(|l| l.get(DELAY) == Some(&PropertyValue::Int(7000))));

        set_delays_constant(&mut topology, 1.1, DelayUnit::Ms, None).unwrap();
        assert!(topology.links().all(|l| l.get(DELAY) == Some(&PropertyValue::Int(1100))));
    }

    #[test]
    fn test_weights_and_clear() {
        let mut topology = line_topology(4).unwrap();
        set_weights_constant(&mut topology, 1.5, None).unwrap();
        set_delays_constant(&mut topology, 3.0, DelayUnit::Ms, None).unwrap();
        assert!(topology.links().all(|l| l.get(WEIGHT) == Some(&PropertyValue::Float(1.5))));

        clear_weights(&mut topology);
        clear_delays(&mut topology);
        assert!(topology.links().all(|l| l.properties.is_empty()));
        assert!(!topology.properties.contains_key(DELAY_UNIT));

        clear_capacities(&mut topology);
        clear_buffer_sizes(&mut topology);
    }
}
