use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{debug, info};
use rand::Rng;

use nsim::config::{Config, LogLevel};
use nsim::config_loader::load_options;
use nsim::format::{self, OutputType};
use nsim::model::Identified;
use nsim::parameters::{GeneratorOptions, Parameter, ParameterSource, PromptSource};
use nsim::topology::TopologyGenerator;
use nsim::traffic::TrafficGenerator;
use nsim::utils::{merge_options, parse_inline_options};

/// Path of the topology that traffic is generated over
const TOPOLOGY: Parameter<PathBuf> = Parameter::new(
    "topology",
    "the path of the topology file to traverse",
    "a path to a .json or .xml file",
    |path| !path.as_os_str().is_empty(),
);

/// Generate and convert network topologies and traffic for network simulators
#[derive(Parser, Debug)]
#[command(name = "nsim", author, version, about, long_about = None)]
struct Args {
    /// Log level, overridden by RUST_LOG when set
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    /// Seed for the random number generator, for repeatable output
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate or convert network topologies
    #[command(subcommand)]
    Topology(TopologyCommand),

    /// Generate or convert network traffic
    #[command(subcommand)]
    Traffic(TrafficCommand),
}

/// Options passed to a generator
#[derive(clap::Args, Debug, Default)]
struct OptionArgs {
    /// Generator options as a JSON object, e.g. '{"node_count": 10}'
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// YAML or JSON file with generator options; --config keys take precedence
    #[arg(long)]
    config_file: Option<PathBuf>,
}

impl OptionArgs {
    fn load(&self) -> Result<GeneratorOptions> {
        let from_file = self.config_file.as_deref().map(load_options).transpose()?;
        let inline = self
            .config
            .as_deref()
            .map(parse_inline_options)
            .transpose()
            .map_err(|e| eyre!(e))?;
        Ok(merge_options(from_file, inline))
    }
}

#[derive(Subcommand, Debug)]
enum TopologyCommand {
    /// List the available topology generators
    Generators,

    /// Generate a random topology
    Generate {
        /// Generator to use; picked at random when omitted
        #[arg(short, long, value_enum)]
        generator: Option<TopologyGenerator>,

        #[arg(short, long, value_enum, default_value_t = OutputType::Console)]
        output: OutputType,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Convert a topology document to another format
    Convert {
        /// Topology document (.json or .xml)
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputType::Console)]
        output: OutputType,
    },
}

/// Output formats that can hold traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum TrafficOutput {
    Console,
    Json,
    Xml,
}

impl From<TrafficOutput> for OutputType {
    fn from(output: TrafficOutput) -> Self {
        match output {
            TrafficOutput::Console => OutputType::Console,
            TrafficOutput::Json => OutputType::Json,
            TrafficOutput::Xml => OutputType::Xml,
        }
    }
}

#[derive(Subcommand, Debug)]
enum TrafficCommand {
    /// List the available traffic generators
    Generators,

    /// Generate random traffic over a topology
    Generate {
        /// Generator to use; picked at random when omitted
        #[arg(short, long, value_enum)]
        generator: Option<TrafficGenerator>,

        /// Topology document to generate traffic over
        #[arg(short, long)]
        topology: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = TrafficOutput::Console)]
        output: TrafficOutput,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Convert a traffic document to another format
    Convert {
        /// Traffic document (.json or .xml)
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = TrafficOutput::Console)]
        output: TrafficOutput,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();
    let config = Config::new(args.log_level, args.seed);

    env_logger::Builder::from_env(Env::default().default_filter_or(config.logging.level.as_filter()))
        .init();
    debug!("Configuration: {}", config.to_json()?);

    let mut rng = config.rng();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Topology(command) => run_topology(command, &mut rng, &mut out),
        Command::Traffic(command) => run_traffic(command, &mut rng, &mut out),
    }
}

fn run_topology<R: Rng, W: Write>(command: TopologyCommand, rng: &mut R, out: &mut W) -> Result<()> {
    match command {
        TopologyCommand::Generators => {
            for generator in TopologyGenerator::ALL {
                writeln!(out, "{}: {}", generator.name(), generator.description())?;
            }
        }
        TopologyCommand::Generate {
            generator,
            output,
            options,
        } => {
            let generator = generator.unwrap_or_else(|| TopologyGenerator::random(rng));
            info!("Using the {} topology generator", generator.name());

            let mut params = PromptSource::terminal(options.load()?);
            let node = generator
                .generate(&mut params, rng)
                .wrap_err_with(|| format!("Failed to generate a {} topology", generator.name()))?;
            format::write_topology(&node, output, out).wrap_err("Failed to write topology")?;
        }
        TopologyCommand::Convert { input, output } => {
            let node = format::read_topology(&input)
                .wrap_err_with(|| format!("Failed to load topology '{}'", input.display()))?;
            info!("Loaded topology '{}' with {} leaves", node.id(), node.leaf_count());
            format::write_topology(&node, output, out).wrap_err("Failed to write topology")?;
        }
    }
    Ok(())
}

fn run_traffic<R: Rng, W: Write>(command: TrafficCommand, rng: &mut R, out: &mut W) -> Result<()> {
    match command {
        TrafficCommand::Generators => {
            for generator in TrafficGenerator::ALL {
                writeln!(out, "{}: {}", generator.name(), generator.description())?;
            }
        }
        TrafficCommand::Generate {
            generator,
            topology,
            output,
            options,
        } => {
            let generator = generator.unwrap_or_else(|| TrafficGenerator::random(rng));
            info!("Using the {} traffic generator", generator.name());

            let mut params = PromptSource::terminal(options.load()?);
            let topology = match topology {
                Some(path) => path,
                None => params.resolve(&TOPOLOGY)?,
            };
            let node = format::read_topology(&topology)
                .wrap_err_with(|| format!("Failed to load topology '{}'", topology.display()))?;

            let traffic = generator
                .generate(&node, &mut params, rng)
                .wrap_err_with(|| format!("Failed to generate {} traffic over '{}'", generator.name(), node.id()))?;
            format::write_traffic(&traffic, output.into(), out).wrap_err("Failed to write traffic")?;
        }
        TrafficCommand::Convert { input, output } => {
            let traffic = format::read_traffic(&input)
                .wrap_err_with(|| format!("Failed to load traffic '{}'", input.display()))?;
            info!("Loaded traffic '{}' with {} arrivals", traffic.id(), traffic.len());
            format::write_traffic(&traffic, output.into(), out).wrap_err("Failed to write traffic")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_topology_generate_parsing() {
        let args = Args::parse_from([
            "nsim",
            "--seed", "9",
            "topology", "generate",
            "-g", "star",
            "-o", "xml",
            "-c", r#"{"name": "lab"}"#,
        ]);

        assert_eq!(args.seed, Some(9));
        assert_eq!(args.log_level, LogLevel::Info);
        match args.command {
            Command::Topology(TopologyCommand::Generate { generator, output, options }) => {
                assert_eq!(generator, Some(TopologyGenerator::Star));
                assert_eq!(output, OutputType::Xml);
                assert_eq!(options.config.as_deref(), Some(r#"{"name": "lab"}"#));
                assert!(options.config_file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_traffic_generate_parsing() {
        let args = Args::parse_from([
            "nsim",
            "traffic", "generate",
            "--log-level", "debug",
            "-t", "lab.json",
            "--config-file", "traffic.yaml",
        ]);

        assert_eq!(args.log_level, LogLevel::Debug);
        match args.command {
            Command::Traffic(TrafficCommand::Generate { generator, topology, output, options }) => {
                assert!(generator.is_none());
                assert_eq!(topology, Some(PathBuf::from("lab.json")));
                assert_eq!(output, TrafficOutput::Console);
                assert_eq!(options.config_file, Some(PathBuf::from("traffic.yaml")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_traffic_rejects_omnest_output() {
        let result = Args::try_parse_from(["nsim", "traffic", "convert", "t.json", "-o", "omnest"]);
        assert!(result.is_err());

        let args = Args::try_parse_from(["nsim", "topology", "convert", "t.json", "-o", "omnest"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Topology(TopologyCommand::Convert { output: OutputType::Omnest, .. })
        ));
    }

    #[test]
    fn test_generators_parsing() {
        let args = Args::parse_from(["nsim", "traffic", "generators"]);
        assert!(matches!(args.command, Command::Traffic(TrafficCommand::Generators)));
        assert!(Args::try_parse_from(["nsim", "topology", "generate", "-g", "ring"]).is_err());
    }

    #[test]
    fn test_generator_listing() {
        let mut rng = Config::new(LogLevel::Info, Some(1)).rng();
        let mut out = Vec::new();
        run_traffic(TrafficCommand::Generators, &mut rng, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("constant: "));
    }

    #[test]
    fn test_option_args_merge() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "name: from-file").unwrap();
        writeln!(file, "node_count: 3").unwrap();

        let options = OptionArgs {
            config: Some(r#"{"name": "inline"}"#.to_string()),
            config_file: Some(file.path().to_path_buf()),
        }
        .load()
        .unwrap();
        assert_eq!(options.get("name").and_then(|v| v.as_str()), Some("inline"));
        assert_eq!(options.get("node_count").and_then(|v| v.as_u64()), Some(3));

        let broken = OptionArgs {
            config: Some("[1]".to_string()),
            config_file: None,
        };
        assert!(broken.load().is_err());
    }

    #[test]
    fn test_convert_topology() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"type": "Topology", "id": "lab", "nodes": [{{"type": "Host", "id": "a", "edges": []}}]}}"#
        )
        .unwrap();

        let mut rng = Config::default().rng();
        let mut out = Vec::new();
        run_topology(
            TopologyCommand::Convert {
                input: file.path().to_path_buf(),
                output: OutputType::Console,
            },
            &mut rng,
            &mut out,
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "- [Topology] lab has nodes:\n  - [Host] a has no edges.\n"
        );
    }
}
