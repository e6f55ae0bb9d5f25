// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Package manager output parsing.
//!
//! Package managers print search results for humans, not for programs. Each
//! of the three sources archup searches uses a different layout, so each gets
//! its own small line scanner that turns raw command output into
//! [`PackageRecord`]s:
//!
//! - [`tabular`] handles `pacman -Ss` style two-line blocks.
//! - [`block`] handles `Package:`, `Version:`, `Description:` field blocks.
//! - [`columnar`] zips per-column flatpak search output.
//!
//! # Tolerance
//!
//! None of the scanners report errors. Anything that does not match the
//! expected shape is skipped, and scanning resumes at the next line that does.
//! A record is only ever produced with a non-empty name.
//!
//! [`PackageRecord`]: crate::package::PackageRecord

pub mod block;
pub mod columnar;
pub mod tabular;

pub use block::{aur_blocks, parse_blocks};
pub use columnar::{parse_columns, Columns};
pub use tabular::parse_tabular;

/// Split leading whitespace delimited token off of text.
///
/// Returns the token and everything after it, or [`None`] if text holds no
/// token at all.
pub(crate) fn split_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }

    match text.find(char::is_whitespace) {
        Some(end) => Some((&text[..end], &text[end..])),
        None => Some((text, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case("extra/vim 9.1-1", Some(("extra/vim", " 9.1-1")); "leading token")]
    #[test_case("   9.1-1  [installed]", Some(("9.1-1", "  [installed]")); "leading whitespace")]
    #[test_case("vim", Some(("vim", "")); "single token")]
    #[test_case("  \t ", None; "blank")]
    #[test]
    fn split_token_cases(input: &str, expect: Option<(&str, &str)>) {
        assert_eq!(split_token(input), expect);
    }
}
