//! go-scrutinize CLI - runs the Scrutinizer build steps for a Go project
//!
//! Architecture: Application Layer - CLI coordinates the user with the pipeline
//! - Translates arguments into settings, a working directory and an output format
//! - Owns process exit codes and logging setup
//! - Every failure inside the library arrives here as an error value

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use go_scrutinize::{
    Environment, OutputFormat, ReportFormatter, ReportOptions, ScrutinizeConfig, Scrutinizer,
    SystemRunner,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// go-scrutinize - lint and coverage reports for Scrutinizer builds of Go projects
#[derive(Parser)]
#[command(name = "go-scrutinize")]
#[command(version)]
#[command(about = "Runs gometalinter and gocov for a Go project and writes Scrutinizer-ready reports")]
#[command(long_about = "Installs the project's dependencies, runs gometalinter into checkstyle_report.xml, runs the tests under gocov and writes coverage.xml with paths rewritten to the Scrutinizer build directory. Requires the SCRUTINIZER_PROJECT environment variable.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Settings file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project checkout to scrutinize (defaults to the current directory)
    #[arg(short, long, global = true)]
    workdir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log line format
    #[arg(long, value_enum, global = true, default_value = "text")]
    log_format: LogFormatArg,
}

#[derive(Subcommand)]
enum Commands {
    /// Install dependencies, lint, test with coverage and write both reports (default)
    Run {
        /// Summary output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// Resolve the project and tool directory from the environment and print them
    Resolve {
        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// Validate a settings file
    ValidateConfig {
        /// Settings file to validate
        config_file: Option<PathBuf>,
    },

    /// Print the effective settings as YAML
    ShowConfig,
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum LogFormatArg {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet, cli.log_format);

    match run_command(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            tracing::error!("{:#}", e);
            process::exit(1);
        }
    }
}

fn run_command(cli: Cli) -> anyhow::Result<i32> {
    let workdir = match cli.workdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Unable to determine the working directory")?,
    };

    match cli.command.unwrap_or(Commands::Run { format: OutputFormatArg::Human }) {
        Commands::Run { format } => {
            let config = ScrutinizeConfig::discover(cli.config.as_deref(), &workdir)?;
            let environment = Environment::from_process()?;
            run_pipeline(environment, config, &workdir, format, !cli.no_color)
        }
        Commands::Resolve { format } => {
            let environment = Environment::from_process()?;
            run_resolve(&environment, format)
        }
        Commands::ValidateConfig { config_file } => {
            Ok(run_validate_config(config_file.or(cli.config), &workdir))
        }
        Commands::ShowConfig => {
            let config = ScrutinizeConfig::discover(cli.config.as_deref(), &workdir)?;
            print!("{}", config.to_yaml()?);
            Ok(0)
        }
    }
}

fn run_pipeline(
    environment: Environment,
    config: ScrutinizeConfig,
    workdir: &Path,
    format: OutputFormatArg,
    use_colors: bool,
) -> anyhow::Result<i32> {
    let scrutinizer = Scrutinizer::new(SystemRunner, environment, config, workdir);
    let summary = scrutinizer.run()?;

    let formatter = ReportFormatter::new(ReportOptions { use_colors });
    formatter.write_summary(&summary, format.into(), io::stdout().lock())?;

    // Linter findings are reported through the lint report, never through our exit code
    Ok(0)
}

fn run_resolve(environment: &Environment, format: OutputFormatArg) -> anyhow::Result<i32> {
    match format {
        OutputFormatArg::Human => {
            println!("Domain:    {}", environment.project.domain);
            println!("Owner:     {}", environment.project.owner);
            println!("Project:   {}", environment.project.project);
            println!("Tool path: {}", environment.tool_path.display());
            println!("Source:    {}", environment.project_source_path());
        }
        OutputFormatArg::Json => {
            println!("{}", serde_json::to_string_pretty(environment)?);
        }
    }
    Ok(0)
}

fn run_validate_config(config_path: Option<PathBuf>, workdir: &Path) -> i32 {
    let Some(config_path) = config_path.or_else(|| ScrutinizeConfig::find_default_file(workdir))
    else {
        println!("No settings file found; built-in defaults apply");
        return 0;
    };

    println!("Validating configuration: {}", config_path.display());

    match ScrutinizeConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  Linter:   {} (deadline {})", config.lint.binary, config.lint.deadline);
            println!("  Reports:  {}, {}", config.lint.report_file, config.coverage.report_file);
            println!("  Rewrite:  -> {}", config.coverage.build_path);
            0
        }
        Err(e) => {
            eprintln!("Configuration validation failed: {}", e);
            1
        }
    }
}

fn init_logging(verbose: bool, quiet: bool, format: LogFormatArg) {
    // Explicit flags win over RUST_LOG
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}
