//! Topology type definitions.
//!
//! This file contains the in-memory model of a network topology: typed
//! properties, nodes with their protocol stack and applications, and links.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;

use crate::utils::units::UnitError;

/// Errors raised while building or configuring a topology
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Link not found: ({0}, {1})")]
    LinkNotFound(NodeId, NodeId),
    #[error("Invalid property: {0}")]
    InvalidProperty(String),
    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// Identifier of a node, either numeric or symbolic
///
/// Integer identifiers sort before string identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Str(String),
}

impl NodeId {
    /// Type name used in the `id.type` attribute of topology files
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Str(_) => "string",
        }
    }

    /// Parse an identifier of an explicit type
    pub fn parse(type_name: &str, text: &str) -> Result<Self, TopologyError> {
        match type_name {
            "int" => text
                .trim()
                .parse::<i64>()
                .map(Self::Int)
                .map_err(|_| TopologyError::InvalidProperty(format!("'{}' is not an int node id", text))),
            "string" | "str" => Ok(Self::Str(text.to_string())),
            other => Err(TopologyError::InvalidProperty(format!("Unsupported node id type '{}'", other))),
        }
    }

    /// Interpret untyped text: integers become `Int`, anything else `Str`
    pub fn infer(text: &str) -> Self {
        match text.trim().parse::<i64>() {
            Ok(id) => Self::Int(id),
            Err(_) => Self::Str(text.to_string()),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{}", id),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<i32> for NodeId {
    fn from(id: i32) -> Self {
        Self::Int(id as i64)
    }
}

impl From<usize> for NodeId {
    fn from(id: usize) -> Self {
        Self::Int(id as i64)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

/// A typed property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl PropertyValue {
    /// Type name used in the `type` attribute of topology files
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
        }
    }

    /// Parse text according to a type name (`int`, `float`, `bool`, `string`)
    pub fn parse(type_name: &str, text: &str) -> Result<Self, TopologyError> {
        let invalid = || TopologyError::InvalidProperty(format!("'{}' is not a valid {}", text, type_name));
        match type_name {
            "int" => text.trim().parse::<i64>().map(Self::Int).map_err(|_| invalid()),
            "float" => text.trim().parse::<f64>().map(Self::Float).map_err(|_| invalid()),
            "bool" => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Self::Bool(true)),
                "false" | "0" => Ok(Self::Bool(false)),
                _ => Err(invalid()),
            },
            "string" | "str" => Ok(Self::Str(text.to_string())),
            other => Err(TopologyError::InvalidProperty(format!("Unsupported property type '{}'", other))),
        }
    }

    /// Store a number as `Int` when it is integral, as `Float` otherwise
    pub fn from_number(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Self::Int(value as i64)
        } else {
            Self::Float(value)
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Float` values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Str(v) => f.write_str(v),
        }
    }
}

macro_rules! property_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(impl From<$ty> for PropertyValue {
            fn from(value: $ty) -> Self {
                Self::$variant(value as $target)
            }
        })*
    };
}

property_from!(i64 => Int as i64, i32 => Int as i64, u32 => Int as i64, usize => Int as i64, f64 => Float as f64);

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Named, typed properties of a topology element
pub type Properties = BTreeMap<String, PropertyValue>;

/// Protocol stack installed on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
}

/// Application annotation of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
}

/// A node of the topology
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub properties: Properties,
    pub stack: Option<Stack>,
    pub applications: Vec<Application>,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            properties: Properties::new(),
            stack: None,
            applications: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<PropertyValue>) -> &mut Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

/// A link between two nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    pub properties: Properties,
}

impl Link {
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<PropertyValue>) -> &mut Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Endpoints as a tuple
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.from.clone(), self.to.clone())
    }
}

/// A network topology
///
/// Nodes are kept in identifier order and links in insertion order. In an
/// undirected topology `(u, v)` and `(v, u)` address the same link.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    directed: bool,
    pub properties: Properties,
    nodes: BTreeMap<NodeId, Node>,
    links: Vec<Link>,
    index: HashMap<(NodeId, NodeId), usize>,
}

impl PartialEq for Topology {
    fn eq(&self, other: &Self) -> bool {
        self.directed == other.directed
            && self.properties == other.properties
            && self.nodes == other.nodes
            && self.links == other.links
    }
}

impl Topology {
    /// Create an empty undirected topology
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty directed topology
    pub fn new_directed() -> Self {
        Self {
            directed: true,
            ..Self::default()
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(PropertyValue::as_str)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.properties.insert("name".to_string(), PropertyValue::Str(name.into()));
    }

    /// Set a global property
    pub fn set_property(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.properties.insert(key.to_string(), value.into());
    }

    /// Add a node, returning the existing one if already present
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> &mut Node {
        let id = id.into();
        self.nodes.entry(id.clone()).or_insert_with(|| Node::new(id))
    }

    /// Add a link, creating missing endpoints
    ///
    /// If the link already exists it is returned unchanged so callers can
    /// merge properties into it.
    pub fn add_edge(&mut self, u: impl Into<NodeId>, v: impl Into<NodeId>) -> &mut Link {
        let (u, v) = (u.into(), v.into());
        self.add_node(u.clone());
        self.add_node(v.clone());

        let key = self.key(&u, &v);
        let existing = self.index.get(&key).copied();
        let position = match existing {
            Some(position) => position,
            None => {
                self.links.push(Link { from: u, to: v, properties: Properties::new() });
                self.index.insert(key, self.links.len() - 1);
                self.links.len() - 1
            }
        };
        &mut self.links[position]
    }

    /// Remove a link, returning it if it existed
    pub fn remove_edge(&mut self, u: &NodeId, v: &NodeId) -> Option<Link> {
        let position = self.index.remove(&self.key(u, v))?;
        let link = self.links.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(link)
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn has_edge(&self, u: &NodeId, v: &NodeId) -> bool {
        self.index.contains_key(&self.key(u, v))
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn edge(&self, u: &NodeId, v: &NodeId) -> Option<&Link> {
        self.index.get(&self.key(u, v)).map(|&i| &self.links[i])
    }

    pub fn edge_mut(&mut self, u: &NodeId, v: &NodeId) -> Option<&mut Link> {
        let position = *self.index.get(&self.key(u, v))?;
        self.links.get_mut(position)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.links.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> {
        self.links.iter_mut()
    }

    /// Nodes reachable over one link (successors in a directed topology)
    pub fn neighbors(&self, id: &NodeId) -> Vec<&NodeId> {
        let mut neighbors = Vec::new();
        for link in &self.links {
            if &link.from == id {
                neighbors.push(&link.to);
            } else if !self.directed && &link.to == id {
                neighbors.push(&link.from);
            }
        }
        neighbors
    }

    /// Number of link ends attached to a node (in plus out when directed)
    pub fn degree(&self, id: &NodeId) -> usize {
        self.links
            .iter()
            .map(|l| (l.from == *id) as usize + (l.to == *id) as usize)
            .sum()
    }

    /// Whether all nodes are connected, ignoring link direction
    ///
    /// An empty topology is not connected.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.nodes.keys().next() else {
            return false;
        };

        let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
        for link in &self.links {
            adjacency.entry(&link.from).or_default().push(&link.to);
            adjacency.entry(&link.to).or_default().push(&link.from);
        }

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for next in adjacency.get(node).into_iter().flatten() {
                if visited.insert(*next) {
                    queue.push_back(*next);
                }
            }
        }
        visited.len() == self.nodes.len()
    }

    fn key(&self, u: &NodeId, v: &NodeId) -> (NodeId, NodeId) {
        if !self.directed && v < u {
            (v.clone(), u.clone())
        } else {
            (u.clone(), v.clone())
        }
    }
}
