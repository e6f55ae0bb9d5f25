// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use archup::{
    config::Manifest,
    console::TerminalConsole,
    install::SystemInstaller,
    menu::MainMenu,
    path::default_manifest_path,
    process::{Invocation, Runner, SystemRunner, Verbosity},
    provision::Provisioner,
    search::PackageSearch,
};

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::read_to_string, path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(about, version, override_usage = "archup [options]")]
struct Cli {
    /// Show command output (1) or a progress spinner instead (0).
    #[arg(
        long,
        value_name = "0|1",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(0..=1)
    )]
    pub verbose: u8,

    /// Path to recipe manifest to use instead of the default one.
    #[arg(short, long, value_name = "path")]
    pub config: Option<PathBuf>,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.verbose == 0 {
            Verbosity::Quiet
        } else {
            Verbosity::Verbose
        }
    }

    fn run(self) -> Result<()> {
        let manifest = load_manifest(self.config.clone())?;
        let runner = SystemRunner;
        let installer = SystemInstaller::new(&runner, self.verbosity());
        let search = PackageSearch::new(&runner);
        let provisioner = Provisioner::new(&runner, &installer, self.verbosity());
        let mut console = TerminalConsole::new();

        MainMenu::new(&manifest, provisioner, &installer, &search, &mut console).run()?;

        Ok(())
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    let cli = Cli::parse();

    // INVARIANT: Sudo credentials must be valid before anything else runs.
    if !matches!(
        SystemRunner.run(&Invocation::new("sudo").arg("-v"), Verbosity::Verbose),
        Ok(true)
    ) {
        error!("failed to obtain sudo privileges");
        exit(1);
    }

    if let Err(error) = cli.run() {
        error!("{error:?}");
    }

    exit(0)
}

fn load_manifest(path: Option<PathBuf>) -> Result<Manifest> {
    let path = match path {
        Some(path) => path,
        None => {
            let path = default_manifest_path()?;
            if !path.exists() {
                info!("no recipe manifest at {}, using built-in recipes", path.display());
                return Ok(Manifest::builtin()?);
            }
            path
        }
    };

    let data = read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let manifest = data
        .parse::<Manifest>()
        .with_context(|| format!("invalid recipe manifest {}", path.display()))?;

    Ok(manifest)
}
