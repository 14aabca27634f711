use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use todoq::config::{AppPaths, CliOverrides, Config, write_sample_config};
use todoq::{export, logging, persistence, tui};

#[derive(Parser)]
#[command(name = "todoq")]
#[command(about = "todoq - single-queue TODO manager for the terminal")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the data file (default: ~/.config/todoq/data.json)
    #[arg(long = "data")]
    data_path: Option<PathBuf>,

    /// Directory for Markdown/CSV exports
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Write ~/.config/todoq/config.yaml if it does not exist
    #[arg(long)]
    write_sample_config: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the queue without starting the TUI
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
    },

    /// Print the resolved data, export, config and log paths
    Paths,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Md,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = AppPaths::discover()?;
    logging::init(&paths.log_file(), cli.verbose)?;

    if cli.write_sample_config {
        match write_sample_config(&paths)? {
            Some(path) => println!("{} {}", "Wrote sample config:".green(), path.display()),
            None => println!("Config already exists: {}", paths.config_file().display()),
        }
    }

    let overrides = CliOverrides {
        data_path: cli.data_path,
        export_dir: cli.export_dir,
    };
    let config = Config::load(&paths, &overrides)?;

    match cli.command {
        None => tui::run(config)?,
        Some(Commands::Export { format }) => {
            // Read-only: a corrupt file is reported, not moved aside
            let tasks = match persistence::try_load_all(&config.data_path)? {
                Some(tasks) => tasks,
                None => {
                    eprintln!(
                        "{} no data file at {}",
                        "warning:".yellow(),
                        config.data_path.display()
                    );
                    Vec::new()
                }
            };
            let path = match format {
                ExportFormat::Md => export::export_markdown(&config.export_dir, &tasks)?,
                ExportFormat::Csv => export::export_csv(&config.export_dir, &tasks)?,
            };
            println!("{} {} ({} tasks)", "Exported:".green(), path.display(), tasks.len());
        }
        Some(Commands::Paths) => {
            println!("{:8} {}", "data".bold(), config.data_path.display());
            println!("{:8} {}", "export".bold(), config.export_dir.display());
            println!("{:8} {}", "config".bold(), paths.config_file().display());
            println!("{:8} {}", "log".bold(), paths.log_file().display());
        }
    }

    Ok(())
}
