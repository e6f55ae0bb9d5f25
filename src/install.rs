// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Package installation.
//!
//! Packages are installed through pacman first. If pacman cannot install a
//! package, e.g., because it only lives in the AUR, yay gets exactly one try
//! afterwards. Flatpak applications have their own install path.
//!
//! In quiet mode command output is discarded and a progress spinner is shown
//! on a background tick thread while the install command blocks. The spinner
//! is always finished before the outcome of the install is reported.

use crate::process::{Invocation, Runner, Verbosity};

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Flathub remote name used for flatpak installs.
pub const FLATHUB: &str = "flathub";

/// Successful install outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installed {
    /// Package was already present, nothing was done.
    AlreadyPresent,

    /// Installed through pacman.
    Native,

    /// Installed through yay after pacman failed.
    Aur,

    /// Installed through flatpak.
    Flatpak,
}

/// Layer of indirection for package installation.
pub trait Installer {
    /// Check if package is installed through pacman or yay.
    fn is_installed(&self, name: &str) -> bool;

    /// Check if flatpak application is installed.
    fn is_flatpak_installed(&self, name: &str) -> bool;

    /// Install package through pacman, falling back to yay.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Failed`] if neither pacman nor yay could
    ///   install the package.
    /// - Return [`InstallError::NotFound`] if yay claims success but the
    ///   package is still not installed.
    fn install(&self, name: &str, extra_args: &[String]) -> Result<Installed>;

    /// Install flatpak application from Flathub.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Failed`] if flatpak fails.
    fn install_flatpak(&self, name: &str) -> Result<Installed>;
}

/// Package installation through pacman, yay, and flatpak processes.
#[derive(Debug)]
pub struct SystemInstaller<'r, R>
where
    R: Runner,
{
    runner: &'r R,
    verbosity: Verbosity,
}

impl<'r, R> SystemInstaller<'r, R>
where
    R: Runner,
{
    /// Construct new installer.
    pub fn new(runner: &'r R, verbosity: Verbosity) -> Self {
        Self { runner, verbosity }
    }

    fn pacman_install(&self, name: &str, extra_args: &[String]) -> Invocation {
        let mut invocation = Invocation::new("sudo").args(["pacman", "-S", "--noconfirm", "--needed"]);
        if self.verbosity.is_quiet() {
            invocation = invocation.arg("--quiet");
        }
        invocation.args(extra_args).arg(name)
    }

    fn yay_install(&self, name: &str, extra_args: &[String]) -> Invocation {
        let mut invocation = Invocation::new("yay").args(["-S", "--noconfirm", "--needed"]);
        if self.verbosity.is_quiet() {
            invocation = invocation.args(["--quiet", "--sudoloop"]);
        }
        invocation.args(extra_args).arg(name)
    }

    /// Run install command, with a spinner in quiet mode.
    fn run_with_progress(&self, label: &str, invocation: &Invocation) -> bool {
        if !self.verbosity.is_quiet() {
            return self
                .runner
                .run(invocation, self.verbosity)
                .unwrap_or_else(|error| {
                    warn!("{error}");
                    false
                });
        }

        // INVARIANT: Refresh sudo credentials before the spinner owns the terminal.
        match self.runner.run(&Invocation::new("sudo").arg("-v"), Verbosity::Verbose) {
            Ok(true) => {}
            Ok(false) => warn!("failed to refresh sudo credentials, install may prompt for a password"),
            Err(error) => warn!("failed to refresh sudo credentials: {error}"),
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{elapsed_precise:.green}  {spinner:.yellow}  {msg}") {
            bar.set_style(style.tick_chars("-\\|/ "));
        }
        bar.set_message(format!("installing {label}"));
        bar.enable_steady_tick(Duration::from_millis(200));

        let success = self.runner.run(invocation, self.verbosity).unwrap_or_else(|error| {
            bar.suspend(|| warn!("{error}"));
            false
        });
        bar.finish_and_clear();

        success
    }
}

impl<R> Installer for SystemInstaller<'_, R>
where
    R: Runner,
{
    fn is_installed(&self, name: &str) -> bool {
        self.runner.succeeds(&Invocation::new("pacman").args(["-Q", name]))
            || self.runner.succeeds(&Invocation::new("yay").args(["-Q", name]))
    }

    fn is_flatpak_installed(&self, name: &str) -> bool {
        self.runner.succeeds(&Invocation::new("flatpak").args(["info", name]))
    }

    #[instrument(skip(self, extra_args), level = "debug")]
    fn install(&self, name: &str, extra_args: &[String]) -> Result<Installed> {
        if self.is_installed(name) {
            info!("{name} is already installed");
            return Ok(Installed::AlreadyPresent);
        }

        if self.run_with_progress(name, &self.pacman_install(name, extra_args)) {
            info!("{name} installed successfully via pacman");
            return Ok(Installed::Native);
        }

        if !self.run_with_progress(name, &self.yay_install(name, extra_args)) {
            return Err(InstallError::Failed { name: name.into() });
        }

        // INVARIANT: Yay exits zero for unknown targets, so verify the result.
        if !self.is_installed(name) {
            return Err(InstallError::NotFound { name: name.into() });
        }

        info!("{name} installed successfully via yay");
        Ok(Installed::Aur)
    }

    #[instrument(skip(self), level = "debug")]
    fn install_flatpak(&self, name: &str) -> Result<Installed> {
        if self.is_flatpak_installed(name) {
            info!("{name} is already installed");
            return Ok(Installed::AlreadyPresent);
        }

        let invocation = Invocation::new("flatpak").args(["install", "-y", FLATHUB, name]);
        if !self.run_with_progress(name, &invocation) {
            return Err(InstallError::Failed { name: name.into() });
        }

        info!("{name} installed successfully via flatpak");
        Ok(Installed::Flatpak)
    }
}

/// All possible error types for package installation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstallError {
    /// Every install path failed.
    #[error("failed to install {name}")]
    Failed { name: String },

    /// Install command succeeded, but package never showed up.
    #[error("failed to install {name}, package not found")]
    NotFound { name: String },
}

/// Friendly result alias :3
pub type Result<T, E = InstallError> = std::result::Result<T, E>;
