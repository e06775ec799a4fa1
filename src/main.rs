//! Oil spill simulation driver.
//!
//! Runs one configuration file, or every `*.toml` in a folder.
//!
//! Usage:
//! ```text
//! oilspill [-c|--config <file>] [-f|--folder <dir>] [--find-all]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing_subscriber::{EnvFilter, Registry, prelude::*};

use oilspill::config::load_configs;
use oilspill::simulation::{Simulation, format_duration};

/// Config used when none is given.
const DEFAULT_CONFIG: &str = "Defaults/input.toml";

const USAGE: &str = "\
usage: oilspill [options]

options:
  -c, --config <file>   configuration file (default: Defaults/input.toml)
  -f, --folder <dir>    folder holding the configuration
      --find-all        run every *.toml in the folder
  -h, --help            print this message";

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    folder: Option<PathBuf>,
    find_all: bool,
    help: bool,
}

impl Args {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut parsed = Args::default();
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-c" | "--config" => {
                    let value = iter.next().context("--config needs a file name")?;
                    parsed.config = Some(PathBuf::from(value));
                }
                "-f" | "--folder" => {
                    let value = iter.next().context("--folder needs a directory")?;
                    parsed.folder = Some(PathBuf::from(value));
                }
                "--find-all" => parsed.find_all = true,
                "-h" | "--help" => parsed.help = true,
                other => bail!("unknown argument `{other}`\n\n{USAGE}"),
            }
        }
        Ok(parsed)
    }

    /// File or folder handed to the config loader.
    fn target(&self) -> PathBuf {
        let config = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
        match (&self.folder, self.find_all) {
            (Some(folder), true) => folder.clone(),
            (Some(folder), false) => folder.join(config),
            (None, true) => config.parent().map(PathBuf::from).unwrap_or_default(),
            (None, false) => config,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::Layer::default()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    Registry::default().with(fmt_layer).init();
}

fn main() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    init_logging();

    let target = args.target();
    let configs = load_configs(&target)
        .with_context(|| format!("loading configuration from {}", target.display()))?;
    tracing::info!(count = configs.len(), "loaded configurations");

    for config in configs {
        let name = config.name.clone();
        let mut simulation = Simulation::from_config(config)
            .with_context(|| format!("setting up run `{name}`"))?;
        let result = simulation
            .run()
            .with_context(|| format!("running `{name}`"))?;

        let (total, fishing) = result
            .last()
            .map(|r| (r.diagnostics.total_oil, r.diagnostics.fishing_oil))
            .unwrap_or_default();
        match &result.output_folder {
            Some(folder) => tracing::info!(
                run = result.run,
                folder = %folder.display(),
                frames = result.frames.len(),
                "results written"
            ),
            None => tracing::info!("no output written (writeFrequency = 0)"),
        }
        tracing::info!(
            total_oil = %format!("{total:.5}"),
            fishing_oil = %format!("{fishing:.5}"),
            "`{name}` finished in {}",
            format_duration(result.wall_time)
        );
    }
    Ok(())
}
