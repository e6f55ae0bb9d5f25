// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Key-value field blocks.
//!
//! Verbose AUR results are described one field per line:
//!
//! ```text
//! Package: yay
//! Version: 12.4.2-1
//! Description: Yet another yogurt. Pacman wrapper and AUR helper written in go.
//! ```
//!
//! Fields may show up in any order. A blank line ends the current block, and
//! so does a `Package:` line once the current block already has a name.

use crate::{
    package::{Origin, PackageRecord},
    parse::split_token,
};

/// Parse key-value field blocks into package records.
///
/// Blocks without a `Package:` value are dropped. A trailing block that is
/// never terminated is still emitted if it has a name. Lines that are not one
/// of the three known fields are ignored.
pub fn parse_blocks(text: &str, origin: Origin) -> Vec<PackageRecord> {
    let mut records = Vec::new();
    let mut block = Block::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            block.flush_into(&mut records, origin);
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "Package" => {
                if !block.name.is_empty() {
                    block.flush_into(&mut records, origin);
                }
                block.name = value.to_string();
            }
            "Version" => block.version = value.to_string(),
            "Description" => block.description = value.to_string(),
            _ => {}
        }
    }
    block.flush_into(&mut records, origin);

    records
}

/// Reshape AUR entries of a yay search listing into field blocks.
///
/// Yay reports AUR hits in the same two-line layout as pacman. Every header
/// whose qualified name starts with `aur/` is turned into a field block with
/// the line after it as its description. Repository hits are left out, since
/// pacman already reports them.
pub fn aur_blocks(listing: &str) -> String {
    let mut blocks = String::new();
    let mut lines = listing.lines();

    while let Some(line) = lines.next() {
        let Some((qualified, rest)) = split_token(line) else {
            continue;
        };
        let Some(name) = qualified.strip_prefix("aur/") else {
            continue;
        };

        let version = split_token(rest).map(|(version, _)| version).unwrap_or_default();
        let description = lines.next().unwrap_or_default().trim();
        blocks.push_str(format!("Package: {name}\nVersion: {version}\nDescription: {description}\n\n").as_str());
    }

    blocks
}

#[derive(Debug, Default)]
struct Block {
    name: String,
    version: String,
    description: String,
}

impl Block {
    fn flush_into(&mut self, records: &mut Vec<PackageRecord>, origin: Origin) {
        let block = std::mem::take(self);
        if let Some(record) = PackageRecord::new(block.name, block.version, block.description, origin) {
            records.push(record);
        }
    }
}
