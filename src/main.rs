use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{error, info, LevelFilter};
use std::path::PathBuf;
use std::process;

use container_feeder::{Feeder, FeederConfig};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            // there is no fatal level, both map to error
            LogLevel::Error | LogLevel::Fatal => LevelFilter::Error,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(
        long,
        default_value = "/usr/share/suse-docker-images/native",
        help = "Directory containing the images to import"
    )]
    dir: PathBuf,

    #[arg(long, value_enum, default_value = "info", help = "Log verbosity")]
    log_level: LogLevel,

    #[arg(
        long,
        default_value = FeederConfig::DEFAULT_PATH,
        help = "Feeder configuration file"
    )]
    config: PathBuf,
}

fn run(cli: &Cli) -> Result<()> {
    let config =
        FeederConfig::load(&cli.config).context("could not load the feeder configuration")?;
    let feeder = Feeder::new(config).context("could not initialize the feeder")?;
    let response = feeder
        .import(&cli.dir)
        .context("could not import the images")?;

    if !response.successful_imports.is_empty() {
        info!("Successfully imported the following images:");
        for image in &response.successful_imports {
            info!("  - {image}");
        }
    }

    if !response.failed_imports.is_empty() {
        error!("The following images failed to be imported:");
        for failed in &response.failed_imports {
            error!("  - {} with error: {}", failed.image, failed.error);
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default())
        .filter_level(cli.log_level.filter())
        .init();

    if cli.dir.as_os_str().is_empty() {
        error!("missing mandatory --dir value");
        process::exit(1);
    }

    if let Err(error) = run(&cli) {
        error!("{error:#}");
        process::exit(1);
    }
}
