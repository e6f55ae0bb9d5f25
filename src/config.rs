// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the recipe manifest that drives provisioning. File
//! I/O is left to the caller to figure out.
//!
//! # Recipes
//!
//! A __recipe__ is one entry of the main menu, e.g., "Setup Gaming". It lists
//! everything needed to bring one part of a workstation up:
//!
//! - pacman/AUR packages to install, with extra arguments for the installer,
//! - flatpak applications to install,
//! - stale files to remove,
//! - Git repositories to clone,
//! - commands to run, each as an argument vector,
//! - lines to append to files such as `~/.profile`,
//! - configuration files to fetch and swap in last.
//!
//! Steps run in exactly that order. Paths and command arguments go through
//! shell expansion, so `~/.zshrc` and `$HOME/.zshrc` both work. Appended lines
//! are written verbatim, so `$PATH` stays `$PATH`.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Built-in recipe manifest used when the user has none.
pub const DEFAULT_MANIFEST: &str = include_str!("../assets/recipes.toml");

/// Recipe manifest layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Manifest {
    /// Listing of all recipes in menu order.
    #[serde(rename = "recipe", default)]
    pub recipes: Vec<Recipe>,
}

impl Manifest {
    /// Load built-in manifest.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ShellExpansion`] if built-in paths reference
    ///   undefined environment variables.
    pub fn builtin() -> Result<Self> {
        DEFAULT_MANIFEST.parse()
    }

    /// Find recipe by name.
    pub fn recipe(&self, name: impl AsRef<str>) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.name == name.as_ref())
    }
}

impl FromStr for Manifest {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut manifest: Manifest = toml::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path and command argument.
        for recipe in &mut manifest.recipes {
            for path in &mut recipe.remove {
                *path = expand_path(path)?;
            }
            for repo in &mut recipe.repos {
                repo.path = expand_path(&repo.path)?;
            }
            for append in &mut recipe.appends {
                append.path = expand_path(&append.path)?;
            }
            for config in &mut recipe.configs {
                config.path = expand_path(&config.path)?;
            }
            for command in &mut recipe.commands {
                for arg in command.iter_mut() {
                    *arg = shellexpand::full(arg.as_str())
                        .map_err(ConfigError::ShellExpansion)?
                        .into_owned();
                }
            }
        }

        Ok(manifest)
    }
}

impl Display for Manifest {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Provisioning recipe.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Recipe {
    /// Short unique name of recipe.
    pub name: String,

    /// Menu entry text.
    pub description: String,

    /// Make sure yay is available before installing packages.
    #[serde(default)]
    pub aur_helper: bool,

    /// Extra arguments handed to the installer for every package.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,

    /// Packages to install through pacman or yay.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,

    /// Flatpak applications to install from Flathub.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flatpaks: Vec<String>,

    /// Files to delete before repositories are cloned.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<PathBuf>,

    /// Repositories to clone.
    #[serde(rename = "repo", default, skip_serializing_if = "Vec::is_empty")]
    pub repos: Vec<RepoSpec>,

    /// Configuration files to apply.
    #[serde(rename = "config", default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<ConfigSpec>,

    /// Commands to run after cloning, each as an argument vector.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Vec<String>>,

    /// Lines to append to files after commands ran.
    #[serde(rename = "append", default, skip_serializing_if = "Vec::is_empty")]
    pub appends: Vec<AppendSpec>,
}

/// Repository to clone.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct RepoSpec {
    /// Remote URL to clone from.
    pub url: String,

    /// Path to clone into.
    pub path: PathBuf,

    /// Only fetch latest commit.
    #[serde(default)]
    pub shallow: bool,
}

/// Configuration file to fetch and swap in.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ConfigSpec {
    /// Remote URL of configuration content.
    pub url: String,

    /// Destination path of configuration file.
    pub path: PathBuf,
}

/// Line to add to a file unless already present.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct AppendSpec {
    /// File to append to.
    pub path: PathBuf,

    /// Line to append, taken verbatim.
    pub line: String,
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    Ok(PathBuf::from(
        shellexpand::full(path.to_string_lossy().as_ref())
            .map_err(ConfigError::ShellExpansion)?
            .into_owned(),
    ))
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
