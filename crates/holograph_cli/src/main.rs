use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use holograph_cli::config_loader::load_config_for_build;
use holograph_cli::init::{InitOptions, init_project};
use holograph_cli::serve::{Rebuild, ServeOpts, run_serve};
use holograph_core::builder::{BuildStatus, Builder};
use holograph_core::config::Config;
use holograph_core::log::{Logger, TerminalLogger};
use holograph_core::model::DEFAULT_PAGE;

#[derive(Debug, Parser)]
#[command(
    name = "holograph",
    about = "A markdown based documentation system for OOCSS",
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Cli {
    /// Use an alternate configuration file.
    #[arg(long = "conf", short = 'c', global = true, value_name = "FILE")]
    conf: Option<PathBuf>,
    /// Don't output anything but warnings and errors.
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
    /// Show every step of the build.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    /// Use header.html and footer.html instead of layout.html.
    #[arg(long, global = true)]
    compat: bool,
    /// Display program version and exit.
    #[arg(long)]
    version: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    #[command(about = "Create holograph.yml, templates and a sample component.")]
    Init,
    #[command(about = "Print the effective configuration.")]
    Config,
    #[command(about = "Build the style guide HTML/CSS.")]
    Build,
    #[command(about = "Build once and serve the destination dir.")]
    Serve(ServeArgs),
    #[command(about = "Serve the destination dir, rebuilding on every request.")]
    Live(ServeArgs),
    #[command(about = "Display program help and exit.")]
    Help,
    #[command(about = "Display program version and exit.")]
    Version,
}

#[derive(Debug, Clone, Args)]
struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Defaults to the `port` config option.
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = TerminalLogger::new(cli.quiet, cli.verbose);
    match run(&cli, &logger) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            logger.error(&format!("{err:#}"));
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli, logger: &TerminalLogger) -> Result<u8> {
    if cli.version {
        println!("{}", version_string());
        return Ok(0);
    }

    let command = cli.command.clone().unwrap_or(Command::Build);
    match command {
        Command::Help => {
            println!("{}", version_string());
            Cli::command().print_help()?;
            Ok(0)
        }
        Command::Version => {
            println!("{}", version_string());
            Ok(0)
        }
        Command::Init => run_init(cli, logger),
        Command::Config => run_config(cli, logger),
        Command::Build => run_build(cli, logger),
        Command::Serve(args) => run_serve_command(cli, &args, logger, false),
        Command::Live(args) => run_serve_command(cli, &args, logger, true),
    }
}

fn version_string() -> String {
    format!("Holograph {}", env!("CARGO_PKG_VERSION"))
}

fn root_dir() -> Result<PathBuf> {
    std::env::current_dir().context("failed to read current directory")
}

fn run_init(cli: &Cli, logger: &TerminalLogger) -> Result<u8> {
    let created = init_project(InitOptions {
        target_dir: root_dir()?,
        config_path: cli.conf.clone(),
    })?;
    for path in created {
        logger.notice(&format!("Created {}", path.display()));
    }
    Ok(0)
}

fn run_config(cli: &Cli, logger: &TerminalLogger) -> Result<u8> {
    let root = root_dir()?;
    let config = load_config_for_build(&root, cli.conf.as_deref(), cli.compat, logger)?;
    print!("{}", config.to_yaml()?);
    Ok(0)
}

fn run_build(cli: &Cli, logger: &TerminalLogger) -> Result<u8> {
    let root = root_dir()?;
    let config = load_config_for_build(&root, cli.conf.as_deref(), cli.compat, logger)?;
    build(config, &root, logger)
}

fn build(config: Config, root: &Path, logger: &dyn Logger) -> Result<u8> {
    let report = Builder::new(config, logger).with_root(root).execute()?;
    if report.status == BuildStatus::Success {
        logger.notice(&format!(
            "Built {} pages from {} doc blocks",
            report.pages.len(),
            report.blocks
        ));
    }
    Ok(report.status.exit_code())
}

fn run_serve_command(
    cli: &Cli,
    args: &ServeArgs,
    logger: &TerminalLogger,
    live: bool,
) -> Result<u8> {
    let root = root_dir()?;
    let config = load_config_for_build(&root, cli.conf.as_deref(), cli.compat, logger)?;
    let port = match args.port {
        Some(port) => port,
        None => config.port.number()?,
    };
    let destination = if config.destination.is_absolute() {
        config.destination.clone()
    } else {
        root.join(&config.destination)
    };

    let status = build(config, &root, logger)?;
    if status != BuildStatus::Success.exit_code() {
        return Ok(status);
    }

    let rebuild = if live {
        Some(live_rebuild(cli, root, *logger))
    } else {
        None
    };
    run_serve(ServeOpts {
        root_dir: destination,
        host: args.host.clone(),
        port,
        index: DEFAULT_PAGE.to_string(),
        rebuild,
    })?;
    Ok(0)
}

/// Reloads the config and rebuilds the whole site.
fn live_rebuild(cli: &Cli, root: PathBuf, logger: TerminalLogger) -> Rebuild {
    let conf = cli.conf.clone();
    let compat = cli.compat;
    Box::new(move || -> Result<()> {
        let config = load_config_for_build(&root, conf.as_deref(), compat, &logger)?;
        Builder::new(config, &logger).with_root(&root).execute()?;
        Ok(())
    })
}
