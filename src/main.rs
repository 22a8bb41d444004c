use anyhow::Result;
use clap::{Parser, Subcommand};
use depscan::{
    config::Config,
    output::StdoutReporter,
    registry::NpmRegistry,
    scanner::{manifest_path, Scanner},
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "depscan")]
#[command(
    author,
    version,
    about = "Check package.json dependencies for new major versions and deprecations"
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project's dependencies
    Scan {
        /// Project directory containing package.json
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Skip dependencies whose name contains this substring (repeatable)
        #[arg(short, long = "ignore", value_name = "SUBSTRING")]
        ignore: Vec<String>,

        /// Registry base URL
        #[arg(long)]
        registry: Option<String>,

        /// Also scan devDependencies
        #[arg(long)]
        include_dev: bool,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Log level is controlled by:
/// 1. `--verbose` sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("depscan=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("depscan=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let config_path = cli.config.unwrap_or_else(Config::config_path);

    match cli.command {
        Commands::Scan {
            path,
            ignore,
            registry,
            include_dev,
        } => {
            let config = Config::load_from(&config_path)?;
            run_scan(config, path, ignore, registry, include_dev).await
        }
        Commands::Config { init, path } => {
            handle_config(&config_path, init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(
    mut config: Config,
    project: PathBuf,
    ignore: Vec<String>,
    registry_url: Option<String>,
    include_dev: bool,
) -> Result<u8> {
    config.ignore.extend(ignore);
    if let Some(url) = registry_url {
        config.registry_url = url;
    }

    tracing::debug!(
        "Scanning {} against {}",
        manifest_path(&project).display(),
        config.registry_url
    );

    let registry = NpmRegistry::with_base_url(&config.registry_url);
    let scanner = Scanner::new(registry, StdoutReporter)
        .with_dev_dependencies(include_dev || config.include_dev_dependencies);

    let findings = scanner.run(&project, &config.ignore).await?;
    tracing::info!("{} findings", findings.len());

    Ok(exit_codes::SUCCESS)
}

/// `--path` prints the location, `--init` writes defaults, and no flag prints
/// the effective configuration.
fn handle_config(config_path: &Path, init: bool, show_path: bool) -> Result<()> {
    if show_path {
        println!("{}", config_path.display());
    } else if init {
        let verb = if Config::init(config_path)? {
            "Created"
        } else {
            "Kept existing"
        };
        println!("{} config file at {}", verb, config_path.display());
    } else {
        let config = Config::load_from(config_path)?;
        println!("# {}", config_path.display());
        print!("{}", config.to_toml()?);
    }

    Ok(())
}
