use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::{Path, PathBuf};

use topogen::config::{LinkDefaults, ModelConfig, Quantity};
use topogen::config_loader::{apply_link_defaults, build_model, build_topology, load_config, read_log_level};
use topogen::gml_parser::read_gml_topology;
use topogen::manifest::select_files;
use topogen::topology::{summarize, Topology};
use topogen::utils::validation::{validate_link_units, validate_topology};
use topogen::xml::{read_topology, write_topology};

/// Network topology generator for simulation scenarios
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a topology from a YAML scenario file
    Build {
        /// Path to the scenario YAML file
        #[arg(short, long)]
        config: PathBuf,

        /// Output topology file, overrides `output` in the scenario
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate a topology from a model
    Generate(GenerateArgs),
    /// Convert a GML or XML graph into a topology file
    Convert {
        /// Input graph (.gml or .xml)
        #[arg(short, long)]
        input: PathBuf,

        /// Output topology file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print a summary of a topology file
    Inspect {
        /// Topology file to inspect
        path: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the files a MANIFEST.in selects from a source tree
    Manifest {
        /// Path to the manifest
        #[arg(short, long, default_value = "MANIFEST.in")]
        manifest: PathBuf,

        /// Root of the source tree
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "snake_case")]
enum Model {
    Ring,
    Line,
    Star,
    FullMesh,
    KAryTree,
    Dumbbell,
    Chord,
    ErdosRenyi,
    BarabasiAlbert,
    #[value(name = "waxman_1")]
    Waxman1,
}

#[derive(ClapArgs, Debug)]
struct GenerateArgs {
    /// Topology model
    #[arg(value_enum)]
    model: Model,

    /// Number of nodes
    #[arg(long)]
    n: Option<usize>,
    /// Tree branching factor
    #[arg(long)]
    k: Option<usize>,
    /// Tree height
    #[arg(long)]
    h: Option<usize>,
    /// Nodes on each side of a dumbbell
    #[arg(long)]
    m1: Option<usize>,
    /// Nodes on the dumbbell path
    #[arg(long)]
    m2: Option<usize>,
    /// Chord identifier bits, or links added per Barabasi-Albert node
    #[arg(long)]
    m: Option<usize>,
    /// Initial Barabasi-Albert nodes
    #[arg(long)]
    m0: Option<usize>,
    /// Chord successors per node
    #[arg(long, default_value_t = 1)]
    r: usize,
    /// Erdos-Renyi link probability
    #[arg(long)]
    p: Option<f64>,
    /// Waxman alpha
    #[arg(long)]
    alpha: Option<f64>,
    /// Waxman beta
    #[arg(long)]
    beta: Option<f64>,
    /// Waxman side of the placement square
    #[arg(long, default_value_t = 1.0)]
    l: f64,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Delay for every link, e.g. 2ms
    #[arg(long)]
    delay: Option<String>,
    /// Capacity for every link, e.g. 10Mbps
    #[arg(long)]
    capacity: Option<String>,

    /// Output topology file
    #[arg(short, long)]
    output: PathBuf,
}

fn require<T>(value: Option<T>, flag: &str, model: Model) -> Result<T> {
    value.ok_or_else(|| eyre!("--{} is required for the {:?} model", flag, model))
}

impl GenerateArgs {
    fn model_config(&self) -> Result<ModelConfig> {
        let model = self.model;
        Ok(match model {
            Model::Ring => ModelConfig::Ring { n: require(self.n, "n", model)? },
            Model::Line => ModelConfig::Line { n: require(self.n, "n", model)? },
            Model::Star => ModelConfig::Star { n: require(self.n, "n", model)? },
            Model::FullMesh => ModelConfig::FullMesh { n: require(self.n, "n", model)? },
            Model::KAryTree => ModelConfig::KAryTree {
                k: require(self.k, "k", model)?,
                h: require(self.h, "h", model)?,
            },
            Model::Dumbbell => ModelConfig::Dumbbell {
                m1: require(self.m1, "m1", model)?,
                m2: require(self.m2, "m2", model)?,
            },
            Model::Chord => {
                let m = require(self.m, "m", model)?;
                ModelConfig::Chord {
                    m: u32::try_from(m).wrap_err("--m is too large")?,
                    r: self.r,
                }
            }
            Model::ErdosRenyi => ModelConfig::ErdosRenyi {
                n: require(self.n, "n", model)?,
                p: require(self.p, "p", model)?,
                seed: self.seed,
            },
            Model::BarabasiAlbert => ModelConfig::BarabasiAlbert {
                n: require(self.n, "n", model)?,
                m: require(self.m, "m", model)?,
                m0: require(self.m0, "m0", model)?,
                seed: self.seed,
            },
            Model::Waxman1 => ModelConfig::Waxman1 {
                n: require(self.n, "n", model)?,
                alpha: require(self.alpha, "alpha", model)?,
                beta: require(self.beta, "beta", model)?,
                l: self.l,
                seed: self.seed,
            },
        })
    }

    fn link_defaults(&self) -> LinkDefaults {
        LinkDefaults {
            delay: self.delay.clone().map(Quantity::Text),
            capacity: self.capacity.clone().map(Quantity::Text),
            ..LinkDefaults::default()
        }
    }
}

fn init_logging(level: Option<&str>) {
    env_logger::Builder::from_env(Env::default().default_filter_or(level.unwrap_or("info"))).init();
}

fn write_checked(topology: &Topology, output: &Path) -> Result<()> {
    validate_topology(topology).map_err(|e| eyre!("Invalid topology: {}", e))?;
    validate_link_units(topology).map_err(|e| eyre!("Invalid link units: {}", e))?;
    write_topology(topology, output)
        .wrap_err_with(|| format!("Failed to write topology '{}'", output.display()))?;
    Ok(())
}

fn read_any(input: &Path) -> Result<Topology> {
    let is_gml = input
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gml"));
    if is_gml {
        read_gml_topology(input)
    } else {
        Ok(read_topology(input)?)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let Args { log_level, command } = Args::parse();

    match command {
        Command::Build { config, output } => {
            let scenario_level = read_log_level(&config);
            init_logging(log_level.as_deref().or(scenario_level.as_deref()));
            let config = load_config(&config)?;

            let output = output
                .or_else(|| config.output.as_ref().map(PathBuf::from))
                .ok_or_else(|| eyre!("No output file: pass --output or set `output` in the scenario"))?;
            let topology = build_topology(&config)?;
            write_checked(&topology, &output)?;
        }
        Command::Generate(args) => {
            init_logging(log_level.as_deref());
            info!("Generating {:?} topology", args.model);

            let mut topology = build_model(&args.model_config()?)?;
            apply_link_defaults(&mut topology, &args.link_defaults())?;
            write_checked(&topology, &args.output)?;
        }
        Command::Convert { input, output } => {
            init_logging(log_level.as_deref());
            info!("Converting {:?} to {:?}", input, output);

            let topology = read_any(&input)?;
            write_checked(&topology, &output)?;
        }
        Command::Inspect { path, json } => {
            init_logging(log_level.as_deref().or(Some("warn")));

            let topology = read_any(&path)?;
            if let Err(e) = validate_topology(&topology).and_then(|_| validate_link_units(&topology)) {
                warn!("{}", e);
            }
            let summary = summarize(&topology);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", summary);
            }
        }
        Command::Manifest { manifest, root } => {
            init_logging(log_level.as_deref().or(Some("warn")));

            for file in select_files(&manifest, &root)? {
                println!("{}", file);
            }
        }
    }
    Ok(())
}
