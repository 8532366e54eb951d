use crate::config::{Config, GeneralConfig, LinkDefaults, ModelConfig, Quantity};
use crate::gml_parser::read_gml_topology;
use crate::topology::netconfig::{
    set_buffer_sizes_constant, set_capacities_constant, set_delays_constant, set_weights_constant,
};
use crate::topology::nodeconfig::{add_application, add_stack};
use crate::topology::{self as models, Topology};
use crate::utils::units::{parse_quantity, BufferUnit, CapacityUnit, DelayUnit, Unit};
use crate::utils::validation::{validate_link_units, validate_topology};
use crate::xml::read_topology;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Load and parse a scenario from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;
    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    info!("Topology model: {}", config.topology.name());
    config.validate()?;

    Ok(config)
}

#[derive(Deserialize)]
struct GeneralOnly {
    #[serde(default)]
    general: GeneralConfig,
}

/// Read only `general.log_level` from a scenario file
///
/// Used to set up logging before the full load. Unreadable files yield `None`.
pub fn read_log_level(config_path: &Path) -> Option<String> {
    let file = File::open(config_path).ok()?;
    let scenario: GeneralOnly = serde_yaml::from_reader(file).ok()?;
    scenario.general.log_level
}

/// Build the topology a model configuration describes
pub fn build_model(model: &ModelConfig) -> Result<Topology> {
    let topology = match model {
        ModelConfig::Ring { n } => models::ring_topology(*n)?,
        ModelConfig::Line { n } => models::line_topology(*n)?,
        ModelConfig::Star { n } => models::star_topology(*n)?,
        ModelConfig::FullMesh { n } => models::full_mesh_topology(*n)?,
        ModelConfig::KAryTree { k, h } => models::k_ary_tree_topology(*k, *h)?,
        ModelConfig::Dumbbell { m1, m2 } => models::dumbbell_topology(*m1, *m2)?,
        ModelConfig::Chord { m, r } => models::chord_topology(*m, *r)?,
        ModelConfig::ErdosRenyi { n, p, seed } => models::erdos_renyi_topology(*n, *p, *seed)?,
        ModelConfig::BarabasiAlbert { n, m, m0, seed } => models::barabasi_albert_topology(*n, *m, *m0, *seed)?,
        ModelConfig::Waxman1 { n, alpha, beta, l, seed } => {
            models::waxman_1_topology(*n, *alpha, *beta, *l, *seed)?
        }
        ModelConfig::Gml { path } => read_gml_topology(Path::new(path))?,
        ModelConfig::Xml { path } => read_topology(Path::new(path))?,
    };
    debug!(
        "Model {} produced {} nodes and {} links",
        model.name(),
        topology.node_count(),
        topology.edge_count()
    );
    Ok(topology)
}

/// Resolve a quantity into a value and unit
///
/// A unit suffix wins over `unit_field`, which wins over `default_unit`.
fn resolve_quantity<U: Unit>(
    what: &str,
    quantity: &Quantity,
    unit_field: Option<&str>,
    default_unit: U,
) -> Result<(f64, U)> {
    let fallback = match unit_field {
        Some(unit) => unit
            .parse::<U>()
            .wrap_err_with(|| format!("Invalid {} unit", what))?,
        None => default_unit,
    };
    match quantity {
        Quantity::Number(value) => Ok((*value, fallback)),
        Quantity::Text(text) => {
            let (value, unit) = parse_quantity::<U>(text).wrap_err_with(|| format!("Invalid {} '{}'", what, text))?;
            Ok((value, unit.unwrap_or(fallback)))
        }
    }
}

/// Apply link defaults to every link of a topology
pub fn apply_link_defaults(topology: &mut Topology, links: &LinkDefaults) -> Result<()> {
    if let Some(delay) = &links.delay {
        let (value, unit) = resolve_quantity("delay", delay, links.delay_unit.as_deref(), DelayUnit::Ms)?;
        info!("Setting link delays to {} {}", value, unit);
        set_delays_constant(topology, value, unit, None)?;
    }
    if let Some(capacity) = &links.capacity {
        let (value, unit) = resolve_quantity("capacity", capacity, links.capacity_unit.as_deref(), CapacityUnit::Bps)?;
        info!("Setting link capacities to {} {}", value, unit);
        set_capacities_constant(topology, value, unit, None)?;
    }
    if let Some(buffer_size) = &links.buffer_size {
        let (value, unit) =
            resolve_quantity("buffer size", buffer_size, links.buffer_unit.as_deref(), BufferUnit::Packets)?;
        info!("Setting link buffer sizes to {} {}", value, unit);
        set_buffer_sizes_constant(topology, value, unit, None)?;
    }
    if let Some(weight) = links.weight {
        set_weights_constant(topology, weight, None)?;
    }
    Ok(())
}

/// Build the complete topology described by a scenario
pub fn build_topology(config: &Config) -> Result<Topology> {
    let mut topology = build_model(&config.topology)?;

    if let Some(links) = &config.links {
        apply_link_defaults(&mut topology, links)?;
    }

    for stack in config.stacks.iter().flatten() {
        add_stack(&mut topology, &stack.node, &stack.name, stack.properties.clone())
            .wrap_err_with(|| format!("Cannot install stack '{}'", stack.name))?;
    }
    for application in config.applications.iter().flatten() {
        add_application(&mut topology, &application.node, &application.name, application.properties.clone())
            .wrap_err_with(|| format!("Cannot install application '{}'", application.name))?;
    }

    validate_topology(&topology).map_err(|e| eyre!("Invalid topology: {}", e))?;
    validate_link_units(&topology).map_err(|e| eyre!("Invalid link units: {}", e))?;

    info!(
        "Built topology with {} nodes and {} links",
        topology.node_count(),
        topology.edge_count()
    );
    Ok(topology)
}
