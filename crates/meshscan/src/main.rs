use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use meshscan_core::config::{Config, CONFIG_FILE_NAME};
use meshscan_core::cycles::CycleDetector;
use meshscan_core::input::MeshInput;
use meshscan_core::report::MeshReport;
use meshscan_core::types::HealthStatus;

use meshscan_report::{dot, json, text};

#[derive(Parser)]
#[command(name = "meshscan")]
#[command(about = "Detect circular dependencies and coupling hot spots in a service mesh")]
#[command(version)]
struct Cli {
    /// Log analysis progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a mesh description and print a full report
    Analyze {
        /// JSON file with `dependencies` and optional `traces`
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
        /// Config file path (defaults to .meshscan.toml next to the input)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Analyze and exit with code 0 (pass) or 1 (fail)
    Check {
        path: PathBuf,
        /// Lowest health status that fails the check
        #[arg(long, default_value = "critical")]
        fail_on: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(long)]
        compact: bool,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the dependency graph in GraphViz DOT format
    Graph { path: PathBuf },
    /// Create a default .meshscan.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            path,
            format,
            compact,
            config,
        } => cmd_analyze(&path, format, compact, config.as_deref()),
        Commands::Check {
            path,
            fail_on,
            format,
            compact,
            config,
        } => cmd_check(&path, &fail_on, format, compact, config.as_deref()),
        Commands::Graph { path } => cmd_graph(&path),
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

/// Warnings always reach stderr; `--verbose` or `RUST_LOG` raise the level.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn cmd_analyze(
    path: &Path,
    format: OutputFormat,
    compact: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(path, config_path)?;
    let report = run_analysis(path, &config)?;
    match format {
        OutputFormat::Text => print!("{}", text::format_report(&report)),
        OutputFormat::Json => println!("{}", json::format_report(&report, compact)),
    }
    Ok(())
}

fn cmd_check(
    path: &Path,
    fail_on_str: &str,
    format: OutputFormat,
    compact: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let fail_on: HealthStatus = fail_on_str.parse()?;
    let config = load_config(path, config_path)?;
    let report = run_analysis(path, &config)?;
    let passed = match format {
        OutputFormat::Text => {
            let (out, passed) = text::format_check(&report, fail_on);
            print!("{out}");
            passed
        }
        OutputFormat::Json => {
            let (out, passed) = json::format_check(&report, fail_on, compact);
            println!("{out}");
            passed
        }
    };
    if !passed {
        process::exit(1);
    }
    Ok(())
}

fn cmd_graph(path: &Path) -> Result<()> {
    let input = read_input(path)?;
    let graph = input.graph().context("invalid dependency graph")?;
    let cycles = CycleDetector::new(&graph).detect();
    print!("{}", dot::generate_service_diagram(&graph, &cycles));
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE_NAME);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())?;
    println!("Created {CONFIG_FILE_NAME} with default configuration.");
    Ok(())
}

fn load_config(input_path: &Path, config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(p) => Config::load(p),
        None => {
            let dir = input_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            Ok(Config::load_or_default(dir))
        }
    }
}

fn read_input(path: &Path) -> Result<MeshInput> {
    if !path.exists() {
        anyhow::bail!("input file '{}' does not exist", path.display());
    }
    MeshInput::load(path)
}

fn run_analysis(path: &Path, config: &Config) -> Result<MeshReport> {
    let input = read_input(path)?;
    let graph = input.graph().context("invalid dependency graph")?;
    Ok(MeshReport::build(&graph, &input.traces, config))
}
