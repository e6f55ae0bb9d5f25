// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Tabular search output of pacman and yay.
//!
//! Search results arrive as two-line blocks:
//!
//! ```text
//! extra/neovim 0.10.2-1 [installed]
//!     Fork of Vim aiming to improve user experience, plugins, and GUIs
//! ```
//!
//! The header holds `<repo>/<name>`, a version of the shape
//! `\d+(\.\d+)*-\d+`, and optional annotations. Pacman prints group lists in
//! parentheses and an `[installed]` marker in brackets; yay adds vote counts
//! and flags like `(Orphaned)` in parentheses. Anything else after the version
//! makes the header malformed. The line after a header is always its
//! description, whatever it looks like.

use crate::{
    package::{Origin, PackageRecord},
    parse::split_token,
};

/// Parse tabular search output into package records.
///
/// Scans from top to bottom. Each valid header consumes the line after it as
/// its description, so a consumed block is never revisited. Malformed headers
/// are skipped line by line until the next valid one. A header with no line
/// after it is a partial block and is dropped.
pub fn parse_tabular(text: &str, origin: Origin) -> Vec<PackageRecord> {
    let mut records = Vec::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let Some(header) = Header::scan(line) else {
            continue;
        };

        let Some(description) = lines.next() else {
            break;
        };

        if let Some(record) = PackageRecord::new(header.name, header.version, description, origin) {
            records.push(record.with_installed(header.installed));
        }
    }

    records
}

#[derive(Debug, PartialEq, Eq)]
struct Header<'a> {
    name: &'a str,
    version: &'a str,
    installed: bool,
}

impl<'a> Header<'a> {
    fn scan(line: &'a str) -> Option<Self> {
        let (qualified, rest) = split_token(line)?;
        let (repo, name) = qualified.split_once('/')?;
        if repo.is_empty() || name.is_empty() {
            return None;
        }

        let (version, rest) = split_token(rest)?;
        if !is_version(version) {
            return None;
        }

        let installed = scan_annotations(rest)?;

        Some(Self {
            name,
            version,
            installed,
        })
    }
}

/// Match `\d+(\.\d+)*-\d+` exactly.
fn is_version(token: &str) -> bool {
    let Some((upstream, release)) = token.split_once('-') else {
        return false;
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit());

    upstream.split('.').all(all_digits) && all_digits(release)
}

/// Walk parenthesised and bracketed annotations after the version.
///
/// Returns whether an installed marker was seen, or [`None`] if anything other
/// than an annotation follows the version.
fn scan_annotations(mut rest: &str) -> Option<bool> {
    let mut installed = false;

    loop {
        rest = rest.trim_start();
        let close = match rest.chars().next() {
            None => return Some(installed),
            Some('(') => ')',
            Some('[') => ']',
            Some(_) => return None,
        };

        let end = rest.find(close)?;
        let inner = rest[1..end].trim_start();
        if inner.to_ascii_lowercase().starts_with("installed") {
            installed = true;
        }
        rest = &rest[end + 1..];
    }
}
