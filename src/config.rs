//! Scenario configuration.
//!
//! A scenario describes which topology to build (a generator model with its
//! parameters, or an existing GML/XML file), the link attributes to apply,
//! and the stacks and applications to install on nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::topology::{NodeId, Properties};

/// Topology source: a generator model or a file to import
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelConfig {
    Ring { n: usize },
    Line { n: usize },
    Star { n: usize },
    FullMesh { n: usize },
    KAryTree { k: usize, h: usize },
    Dumbbell { m1: usize, m2: usize },
    Chord {
        m: u32,
        #[serde(default = "default_chord_r")]
        r: usize,
    },
    ErdosRenyi {
        n: usize,
        p: f64,
        #[serde(default)]
        seed: Option<u64>,
    },
    BarabasiAlbert {
        n: usize,
        m: usize,
        m0: usize,
        #[serde(default)]
        seed: Option<u64>,
    },
    #[serde(rename = "waxman_1")]
    Waxman1 {
        n: usize,
        alpha: f64,
        beta: f64,
        #[serde(default = "default_waxman_l")]
        l: f64,
        #[serde(default)]
        seed: Option<u64>,
    },
    Gml { path: String },
    Xml { path: String },
}

fn default_chord_r() -> usize {
    1
}

fn default_waxman_l() -> f64 {
    1.0
}

impl ModelConfig {
    /// Model name as written in scenario files
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ring { .. } => "ring",
            Self::Line { .. } => "line",
            Self::Star { .. } => "star",
            Self::FullMesh { .. } => "full_mesh",
            Self::KAryTree { .. } => "k_ary_tree",
            Self::Dumbbell { .. } => "dumbbell",
            Self::Chord { .. } => "chord",
            Self::ErdosRenyi { .. } => "erdos_renyi",
            Self::BarabasiAlbert { .. } => "barabasi_albert",
            Self::Waxman1 { .. } => "waxman_1",
            Self::Gml { .. } => "gml",
            Self::Xml { .. } => "xml",
        }
    }
}

/// A link attribute given either as a bare number or with a unit suffix
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Attributes applied to every link
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LinkDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Application to install on a node
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApplicationConfig {
    pub node: NodeId,
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
}

/// Protocol stack to install on a node
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StackConfig {
    pub node: NodeId,
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
}

/// Shared general configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
        }
    }
}

/// Complete scenario configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    pub topology: ModelConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<LinkDefaults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacks: Option<Vec<StackConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications: Option<Vec<ApplicationConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(String),
    #[error("Invalid link configuration: {0}")]
    InvalidLinks(String),
    #[error("Invalid node configuration: {0}")]
    InvalidNodes(String),
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(level) = &self.general.log_level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ValidationError::InvalidGeneral(format!(
                    "log_level '{}' must be one of {}",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }

        match &self.topology {
            ModelConfig::Gml { path } | ModelConfig::Xml { path } if path.is_empty() => {
                return Err(ValidationError::InvalidTopology(format!(
                    "{} path cannot be empty",
                    self.topology.name()
                )));
            }
            _ => {}
        }

        if let Some(links) = &self.links {
            Self::validate_links(links)?;
        }

        for (kind, name) in self
            .stacks
            .iter()
            .flatten()
            .map(|s| ("stack", &s.name))
            .chain(self.applications.iter().flatten().map(|a| ("application", &a.name)))
        {
            if name.trim().is_empty() {
                return Err(ValidationError::InvalidNodes(format!("{} name cannot be empty", kind)));
            }
        }

        if let Some(output) = &self.output {
            if output.is_empty() {
                return Err(ValidationError::InvalidGeneral("output cannot be empty".to_string()));
            }
        }

        Ok(())
    }

    fn validate_links(links: &LinkDefaults) -> Result<(), ValidationError> {
        for (name, unit) in [
            ("delay_unit", &links.delay_unit),
            ("capacity_unit", &links.capacity_unit),
            ("buffer_unit", &links.buffer_unit),
        ] {
            if matches!(unit, Some(u) if u.trim().is_empty()) {
                return Err(ValidationError::InvalidLinks(format!("{} cannot be empty", name)));
            }
        }

        for (name, quantity) in [
            ("delay", &links.delay),
            ("capacity", &links.capacity),
            ("buffer_size", &links.buffer_size),
        ] {
            if let Some(Quantity::Text(text)) = quantity {
                if text.trim().is_empty() {
                    return Err(ValidationError::InvalidLinks(format!("{} cannot be empty", name)));
                }
            }
        }
        Ok(())
    }
}
