// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Workstation provisioning flows.
//!
//! A [`Recipe`] is carried out step by step: AUR helper and flatpak are set up
//! when needed, packages and flatpaks are installed, stale files are removed,
//! repositories are cloned, commands are run, lines are appended, and
//! configuration files are applied. A failing step is logged and never stops
//! the steps after it. The recipe as a whole is only reported as incomplete at
//! the end.

use crate::{
    apply::{append_line, ApplyError, ConfigApplier},
    config::Recipe,
    install::{InstallError, Installer},
    process::{Invocation, Runner, Verbosity},
    repo::{clone_repo, Depth, RepoError},
};

use std::{
    fs::{read_dir, remove_file},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

/// Remote repository of the yay build recipe.
pub const YAY_REPO: &str = "https://aur.archlinux.org/yay.git";

/// Flathub repository definition.
pub const FLATHUB_REPO: &str = "https://flathub.org/repo/flathub.flatpakrepo";

/// Whether a recipe should bring up its AUR helper.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    /// Install yay first if the recipe asks for it.
    #[default]
    Ensure,

    /// Go on without yay, so AUR packages may fail.
    Skip,
}

/// Carry out recipes and setup flows.
#[derive(Debug)]
pub struct Provisioner<'a, R, I>
where
    R: Runner,
    I: Installer,
{
    runner: &'a R,
    installer: &'a I,
    verbosity: Verbosity,
}

impl<'a, R, I> Provisioner<'a, R, I>
where
    R: Runner,
    I: Installer,
{
    /// Construct new provisioner.
    pub fn new(runner: &'a R, installer: &'a I, verbosity: Verbosity) -> Self {
        Self {
            runner,
            installer,
            verbosity,
        }
    }

    /// Check if recipe wants yay but yay is not installed yet.
    pub fn needs_yay(&self, recipe: &Recipe) -> bool {
        recipe.aur_helper && !self.installer.is_installed("yay")
    }

    /// Carry out every step of a recipe.
    ///
    /// # Errors
    ///
    /// - Return [`ProvisionError::Incomplete`] if any step failed. Every
    ///   failure has already been logged by then.
    #[instrument(skip(self, recipe), fields(recipe = %recipe.name), level = "debug")]
    pub fn run_recipe(&self, recipe: &Recipe, helper: Helper) -> Result<()> {
        info!("{}", recipe.description);
        let mut failed = 0;
        let mut step = |result: Result<()>| {
            if let Err(error) = result {
                warn!("{error}");
                failed += 1;
            }
        };

        match (recipe.aur_helper, helper) {
            (true, Helper::Ensure) => step(self.setup_yay()),
            (true, Helper::Skip) => warn!("proceeding without yay, AUR packages may fail"),
            (false, _) => {}
        }
        if !recipe.flatpaks.is_empty() {
            step(self.setup_flatpak());
        }

        for package in &recipe.packages {
            step(self.install(package, &recipe.extra_args));
        }

        for flatpak in &recipe.flatpaks {
            step(
                self.installer
                    .install_flatpak(flatpak)
                    .map(|_| ())
                    .map_err(ProvisionError::from),
            );
        }

        for path in &recipe.remove {
            step(remove_stale(path));
        }

        for repo in &recipe.repos {
            if is_occupied(&repo.path) {
                info!("{} already exists, skipping clone", repo.path.display());
                continue;
            }

            let depth = if repo.shallow { Depth::Shallow } else { Depth::Full };
            step(
                clone_repo(repo.url.as_str(), &repo.path, depth)
                    .map(|_| ())
                    .map_err(ProvisionError::from),
            );
        }

        for command in &recipe.commands {
            let Some((program, args)) = command.split_first() else {
                warn!("skipping empty command");
                continue;
            };
            step(self.execute(&Invocation::new(program).args(args)));
        }

        for append in &recipe.appends {
            step(
                append_line(&append.path, append.line.as_str())
                    .map(|_| ())
                    .map_err(ProvisionError::from),
            );
        }

        let applier = ConfigApplier::new(self.runner);
        for config in &recipe.configs {
            step(
                applier
                    .apply(config.url.as_str(), &config.path)
                    .map(|_| ())
                    .map_err(ProvisionError::from),
            );
        }

        if failed > 0 {
            return Err(ProvisionError::Incomplete {
                recipe: recipe.name.clone(),
                failed,
            });
        }

        info!("{} done", recipe.name);
        Ok(())
    }

    /// Build and install yay from the AUR unless it is already installed.
    ///
    /// # Errors
    ///
    /// - Return [`ProvisionError::Install`] if build dependencies cannot be
    ///   installed.
    /// - Return [`ProvisionError::TempDir`] if no build directory can be made.
    /// - Return [`ProvisionError::Clone`] if the build recipe cannot be cloned.
    /// - Return [`ProvisionError::Command`] if the build fails.
    /// - Return [`ProvisionError::Missing`] if yay is still not installed.
    #[instrument(skip(self), level = "debug")]
    pub fn setup_yay(&self) -> Result<()> {
        if self.installer.is_installed("yay") {
            info!("yay is already installed");
            return Ok(());
        }

        info!("install yay (AUR helper)");
        self.install("base-devel", &[])?;
        self.install("git", &[])?;

        let build = tempfile::tempdir().map_err(|err| ProvisionError::TempDir { source: err })?;
        let path = build.path().join("yay");
        clone_repo(YAY_REPO, &path, Depth::Shallow)?;
        self.execute(
            &Invocation::new("makepkg")
                .args(["-si", "--noconfirm"])
                .current_dir(path),
        )?;

        if !self.installer.is_installed("yay") {
            return Err(ProvisionError::Missing { name: "yay".into() });
        }

        info!("yay installed successfully");
        Ok(())
    }

    /// Install flatpak and register Flathub remote.
    ///
    /// # Errors
    ///
    /// - Return [`ProvisionError::Install`] if flatpak cannot be installed.
    /// - Return [`ProvisionError::Command`] if Flathub cannot be added.
    #[instrument(skip(self), level = "debug")]
    pub fn setup_flatpak(&self) -> Result<()> {
        self.install("flatpak", &[])?;

        if self.has_flathub() {
            info!("flathub remote already configured");
            return Ok(());
        }

        info!("add flathub remote to flatpak");
        self.execute(&Invocation::new("sudo").args([
            "flatpak",
            "remote-add",
            "--if-not-exists",
            "flathub",
            FLATHUB_REPO,
        ]))
    }

    fn has_flathub(&self) -> bool {
        self.runner
            .capture(&Invocation::new("flatpak").arg("remote-list"))
            .map(|output| {
                output
                    .stdout
                    .lines()
                    .filter_map(|line| line.split_whitespace().next())
                    .any(|name| name == "flathub")
            })
            .unwrap_or(false)
    }

    fn install(&self, name: &str, extra_args: &[String]) -> Result<()> {
        self.installer.install(name, extra_args)?;

        Ok(())
    }

    fn execute(&self, invocation: &Invocation) -> Result<()> {
        info!("run {invocation}");
        match self.runner.run(invocation, self.verbosity) {
            Ok(true) => Ok(()),
            Ok(false) => Err(ProvisionError::Command {
                command: invocation.to_string(),
            }),
            Err(error) => {
                warn!("{error}");
                Err(ProvisionError::Command {
                    command: invocation.to_string(),
                })
            }
        }
    }
}

/// Check if path is a file or a non-empty directory.
fn is_occupied(path: &Path) -> bool {
    match read_dir(path) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => path.exists(),
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    match remove_file(path) {
        Ok(()) => {
            info!("removed {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ProvisionError::Remove {
            source: err,
            path: path.to_path_buf(),
        }),
    }
}

/// All possible error types for provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Clone(#[from] RepoError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("command failed: {command}")]
    Command { command: String },

    #[error("failed to create temporary build directory")]
    TempDir {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {path:?}")]
    Remove {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("{name} is still not installed")]
    Missing { name: String },

    #[error("recipe {recipe} finished with {failed} failed step(s)")]
    Incomplete { recipe: String, failed: usize },
}

/// Friendly result alias :3
pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;
