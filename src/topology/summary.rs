//! Human and machine readable topology summaries.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::topology::netconfig::{BUFFER_UNIT, CAPACITY_UNIT, DELAY_UNIT};
use crate::topology::types::{PropertyValue, Topology};

/// Overview of a topology, printed by `topogen inspect`
#[derive(Debug, Serialize)]
pub struct TopologySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub directed: bool,
    pub nodes: usize,
    pub links: usize,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_unit: Option<String>,
    pub max_degree: usize,
    pub applications: BTreeSet<String>,
    pub stacks: BTreeSet<String>,
}

fn text(topology: &Topology, key: &str) -> Option<String> {
    topology.properties.get(key).map(PropertyValue::to_string)
}

/// Build the summary of a topology
pub fn summarize(topology: &Topology) -> TopologySummary {
    let mut applications = BTreeSet::new();
    let mut stacks = BTreeSet::new();
    for node in topology.nodes() {
        applications.extend(node.applications.iter().map(|a| a.name.clone()));
        stacks.extend(node.stack.iter().map(|s| s.name.clone()));
    }

    TopologySummary {
        name: topology.name().map(str::to_string),
        directed: topology.is_directed(),
        nodes: topology.node_count(),
        links: topology.edge_count(),
        connected: topology.is_connected(),
        delay_unit: text(topology, DELAY_UNIT),
        capacity_unit: text(topology, CAPACITY_UNIT),
        buffer_unit: text(topology, BUFFER_UNIT),
        max_degree: topology.node_ids().map(|id| topology.degree(id)).max().unwrap_or(0),
        applications,
        stacks,
    }
}

impl fmt::Display for TopologySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Topology: {}", self.name.as_deref().unwrap_or("(unnamed)"))?;
        writeln!(f, "  links are {}", if self.directed { "directed" } else { "undirected" })?;
        writeln!(f, "  nodes: {}", self.nodes)?;
        writeln!(f, "  links: {}", self.links)?;
        writeln!(f, "  connected: {}", self.connected)?;
        writeln!(f, "  max degree: {}", self.max_degree)?;
        for (label, unit) in [
            ("delay unit", &self.delay_unit),
            ("capacity unit", &self.capacity_unit),
            ("buffer unit", &self.buffer_unit),
        ] {
            if let Some(unit) = unit {
                writeln!(f, "  {}: {}", label, unit)?;
            }
        }
        if !self.stacks.is_empty() {
            let stacks: Vec<&str> = self.stacks.iter().map(String::as_str).collect();
            writeln!(f, "  stacks: {}", stacks.join(", "))?;
        }
        if !self.applications.is_empty() {
            let applications: Vec<&str> = self.applications.iter().map(String::as_str).collect();
            writeln!(f, "  applications: {}", applications.join(", "))?;
        }
        Ok(())
    }
}
