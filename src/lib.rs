// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Interactive provisioning for Arch Linux workstations.
//!
//! Archup drives pacman, yay, and flatpak to bring a fresh Arch Linux install
//! up to a usable workstation. Provisioning is organized into __recipes__
//! listed on a numbered main menu, e.g., shell setup or gaming setup. Each
//! recipe installs packages, clones repositories, runs commands, and swaps in
//! configuration files fetched from remote URLs.
//!
//! Beyond recipes, archup can search all three package sources at once. The
//! output of each package manager is parsed into one uniform
//! [`PackageRecord`](package::PackageRecord) list, which the user pages
//! through and picks packages from to install.
//!
//! Every external tool is invoked through the [`Runner`](process::Runner)
//! trait with argument vectors, never through a shell.

pub mod apply;
pub mod config;
pub mod console;
pub mod install;
pub mod menu;
pub mod package;
pub mod parse;
pub mod path;
pub mod process;
pub mod provision;
pub mod repo;
pub mod search;
pub mod select;
