// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Package search across pacman, the AUR, and flatpak.
//!
//! A search term is sent to every source, each source's output goes through
//! its matching parser, and the results are concatenated in the fixed order
//! pacman, AUR, flatpak. Within a source, records keep the order the tool
//! printed them in. Nothing is sorted, ranked, or deduplicated.
//!
//! A source that cannot be run at all, e.g., yay is not installed, simply
//! contributes no records. It never stops the other sources.

use crate::{
    package::{Origin, PackageRecord},
    parse::{aur_blocks, parse_blocks, parse_columns, parse_tabular, Columns},
    process::{Captured, Invocation, Runner},
};

use tracing::{debug, instrument, warn};

/// Layer of indirection for package search.
pub trait Search {
    /// Search every source for term.
    fn search(&self, term: &str) -> Vec<PackageRecord>;
}

/// Package search through package manager processes.
#[derive(Debug)]
pub struct PackageSearch<'r, R>
where
    R: Runner,
{
    runner: &'r R,
}

impl<'r, R> PackageSearch<'r, R>
where
    R: Runner,
{
    /// Construct new package search on top of a runner.
    pub fn new(runner: &'r R) -> Self {
        Self { runner }
    }

    /// Search official repositories through `pacman -Ss`.
    pub fn native(&self, term: &str) -> Vec<PackageRecord> {
        self.fetch(Invocation::new("pacman").arg("-Ss").arg(term))
            .map(|output| parse_tabular(output.stdout.as_str(), Origin::Pacman))
            .unwrap_or_default()
    }

    /// Search the AUR through `yay -Ss`.
    pub fn aur(&self, term: &str) -> Vec<PackageRecord> {
        self.fetch(Invocation::new("yay").arg("-Ss").arg(term))
            .map(|output| parse_blocks(aur_blocks(output.stdout.as_str()).as_str(), Origin::Aur))
            .unwrap_or_default()
    }

    /// Search flatpak remotes, one invocation per column.
    pub fn flatpak(&self, term: &str) -> Vec<PackageRecord> {
        let column = |name: &str| {
            self.fetch(
                Invocation::new("flatpak")
                    .arg("search")
                    .arg(term)
                    .arg(format!("--columns={name}")),
            )
        };

        let Some(names) = column("name") else {
            return Vec::new();
        };
        let Some(descriptions) = column("description") else {
            return Vec::new();
        };
        let Some(versions) = column("version") else {
            return Vec::new();
        };
        let applications = column("application");
        if applications.is_none() {
            debug!("no flatpak application IDs for {term:?}, installing by display name");
        }

        parse_columns(
            Columns {
                names: names.stdout.as_str(),
                descriptions: descriptions.stdout.as_str(),
                versions: versions.stdout.as_str(),
                applications: applications.as_ref().map(|output| output.stdout.as_str()),
            },
            Origin::Flatpak,
        )
    }

    fn fetch(&self, invocation: Invocation) -> Option<Captured> {
        match self.runner.capture(&invocation) {
            Ok(output) => {
                // INVARIANT: Non-zero exit still gets parsed, pacman exits 1 on zero hits.
                if !output.success {
                    debug!("{invocation} exited unsuccessfully");
                }
                Some(output)
            }
            Err(error) => {
                warn!("skipping search source: {error}");
                None
            }
        }
    }
}

impl<R> Search for PackageSearch<'_, R>
where
    R: Runner,
{
    #[instrument(skip(self), level = "debug")]
    fn search(&self, term: &str) -> Vec<PackageRecord> {
        let mut records = self.native(term);
        records.extend(self.aur(term));
        records.extend(self.flatpak(term));
        debug!("found {} packages", records.len());

        records
    }
}
