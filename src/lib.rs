//! # Topogen - Network topology generation for simulation scenarios
//!
//! This library builds network topologies, annotates them with link and node
//! attributes, and reads and writes them as topology XML files ready to be
//! loaded by a network simulator.
//!
//! ## Overview
//!
//! A topology is a set of nodes and links carrying typed properties. Link
//! delays, capacities and buffer sizes are stored in a single global unit per
//! topology (`delay_unit`, `capacity_unit`, `buffer_unit`). Nodes can carry a
//! protocol stack and any number of applications.
//!
//! Besides topologies, the crate evaluates `MANIFEST.in` files: lists of
//! include/exclude directives selecting the files of a source distribution.
//!
//! ## Architecture
//!
//! - `topology`: Data model, topology generators and attribute helpers
//! - `xml`: Topology file reader and writer
//! - `gml_parser`: GML graph import
//! - `config`: YAML scenario structures
//! - `config_loader`: Scenario loading and topology building
//! - `manifest`: `MANIFEST.in` parsing and evaluation
//! - `utils`: Units and validation
//!
//! ## Example Usage
//!
//! ```rust
//! use topogen::topology::{ring_topology, netconfig};
//! use topogen::utils::units::{CapacityUnit, DelayUnit};
//! use topogen::xml::{parse_topology, to_xml_string};
//!
//! let mut topology = ring_topology(4)?;
//! netconfig::set_delays_constant(&mut topology, 2.0, DelayUnit::Ms, None)?;
//! netconfig::set_capacities_constant(&mut topology, 10.0, CapacityUnit::Mbps, None)?;
//!
//! let xml = to_xml_string(&topology);
//! assert_eq!(parse_topology(&xml)?, topology);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Scenario Format
//!
//! ```yaml
//! general:
//!   log_level: info
//!
//! topology:
//!   model: k_ary_tree
//!   k: 2
//!   h: 3
//!
//! links:
//!   delay: "2ms"
//!   capacity: "10Mbps"
//!
//! applications:
//!   - node: 0
//!     name: client
//!     properties: { RemotePort: 9 }
//!
//! output: tree.xml
//! ```
//!
//! ## Error Handling
//!
//! Library modules return `thiserror` error enums. The loaders and the
//! command-line tool use `color_eyre` for error reporting with context.

pub mod config;
pub mod config_loader;
pub mod gml_parser;
pub mod manifest;
pub mod topology;
pub mod utils;
pub mod xml;
