// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Per-column flatpak search output.
//!
//! `flatpak search --columns=<column>` prints one value per line. Names,
//! descriptions, versions, and application IDs are fetched with separate
//! invocations, then zipped back together by line index.

use crate::package::{Origin, PackageRecord};

/// Marker flatpak prints instead of results.
pub const NO_MATCHES: &str = "No matches found";

/// Raw output of each fetched column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Columns<'a> {
    pub names: &'a str,
    pub descriptions: &'a str,
    pub versions: &'a str,

    /// Application IDs, if they could be fetched.
    pub applications: Option<&'a str>,
}

/// Zip column output into package records.
///
/// Returns nothing at all if the name column reports [`NO_MATCHES`], no
/// matter what the other columns hold. Otherwise lines are paired up until the
/// shortest column runs out, and ragged trailing lines are dropped. A short
/// application column only leaves the remaining records without an ID.
pub fn parse_columns(columns: Columns<'_>, origin: Origin) -> Vec<PackageRecord> {
    if columns.names.contains(NO_MATCHES) {
        return Vec::new();
    }

    let mut ids = columns.applications.map(str::lines);
    columns
        .names
        .lines()
        .zip(columns.descriptions.lines())
        .zip(columns.versions.lines())
        .filter_map(|((name, description), version)| {
            let id = ids.as_mut().and_then(Iterator::next);
            PackageRecord::new(name, version, description, origin).map(|record| record.with_id(id))
        })
        .collect()
}
