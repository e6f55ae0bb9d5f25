// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Unified package search records.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Source a package record was discovered through.
///
/// The origin decides which installer path is used for the record. The same
/// logical package may show up once per origin, and each copy is a distinct
/// actionable choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Official repositories through pacman.
    Pacman,

    /// Arch User Repository through yay.
    Aur,

    /// Flatpak remotes.
    Flatpak,
}

impl Origin {
    /// Check if search output of this origin reliably reports install state.
    ///
    /// Only pacman search output carries an `[installed]` marker that makes
    /// it into the parsed record. Everything else must be re-checked.
    pub fn reports_installed(&self) -> bool {
        matches!(self, Self::Pacman)
    }
}

impl Display for Origin {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(match self {
            Self::Pacman => "pacman",
            Self::Aur => "AUR",
            Self::Flatpak => "Flatpak",
        })
    }
}

/// One package search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    /// Package identifier as reported by the source. Never empty.
    pub name: String,

    /// Free-form version string, may be empty.
    pub version: String,

    /// Free-form description, may be empty.
    pub description: String,

    /// Where the record came from.
    pub origin: Origin,

    /// Package is known to be installed.
    pub installed: bool,

    /// Identifier to install by when it differs from the display name, e.g.,
    /// the flatpak application ID `org.mozilla.firefox` for "Firefox".
    pub id: Option<String>,
}

impl PackageRecord {
    /// Construct new record if it has a usable name.
    ///
    /// Returns [`None`] for records whose name is empty after trimming.
    pub fn new(
        name: impl AsRef<str>,
        version: impl AsRef<str>,
        description: impl AsRef<str>,
        origin: Origin,
    ) -> Option<Self> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            version: version.as_ref().trim().to_string(),
            description: description.as_ref().trim().to_string(),
            origin,
            installed: false,
            id: None,
        })
    }

    /// Attach install identifier, ignoring blank ones.
    pub fn with_id(mut self, id: Option<&str>) -> Self {
        self.id = id.map(str::trim).filter(|id| !id.is_empty()).map(String::from);
        self
    }

    /// Name to hand over to installers and install checks.
    pub fn install_key(&self) -> &str {
        self.id.as_deref().unwrap_or(self.name.as_str())
    }

    /// Mark record as installed.
    pub fn with_installed(mut self, installed: bool) -> Self {
        self.installed = installed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_without_name_is_discarded() {
        assert_eq!(PackageRecord::new("   ", "1.0-1", "blah", Origin::Aur), None);
    }

    #[test]
    fn record_fields_are_trimmed() {
        let record = PackageRecord::new(" vim ", " 9.1-1 ", "  editor ", Origin::Pacman);
        let expect = PackageRecord {
            name: "vim".into(),
            version: "9.1-1".into(),
            description: "editor".into(),
            origin: Origin::Pacman,
            installed: false,
            id: None,
        };
        assert_eq!(record, Some(expect));
    }

    #[test]
    fn install_key_prefers_id() {
        let record = PackageRecord::new("Firefox", "131.0.3", "", Origin::Flatpak).unwrap();
        assert_eq!(record.install_key(), "Firefox");

        let record = record.with_id(Some(" org.mozilla.firefox "));
        assert_eq!(record.install_key(), "org.mozilla.firefox");
        assert_eq!(record.name, "Firefox");

        assert_eq!(record.with_id(Some("  ")).id, None);
    }

    #[test]
    fn only_pacman_reports_install_state() {
        assert!(Origin::Pacman.reports_installed());
        assert!(!Origin::Aur.reports_installed());
        assert!(!Origin::Flatpak.reports_installed());
    }
}
