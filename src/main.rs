use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use profiled::cli::profile::ProfileArgs;
use profiled::cli::serve::ServeArgs;
use profiled::{Result, ServerConfig};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "profiled")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Profile registry service with status history", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: ./profiled.toml when present)
    #[arg(long, global = true, env = "PROFILED_CONFIG")]
    config: Option<PathBuf>,

    /// Database URL or path; overrides config file and environment
    #[arg(long, global = true)]
    database: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Profile operations against the configured database
    Profile(ProfileArgs),

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "profiled", &mut io::stdout());
        return Ok(());
    }

    let config = ServerConfig::load(cli.config.as_deref(), cli.database.as_deref())?;
    profiled::logging::init(&config.log_level, cli.verbose);

    match cli.command {
        Commands::Serve(args) => profiled::cli::serve::run(args, config).await?,
        Commands::Profile(args) => profiled::cli::profile::run(args, &config)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
