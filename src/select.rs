// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Interactive package selection.
//!
//! The selector is a two state loop. In the __query__ state it reads a search
//! term and hands it to a [`Search`]. In the __results-page__ state it shows
//! one page of results at a time and accepts page navigation or a comma
//! separated list of indices to install.
//!
//! Indices are global and 1-based, exactly as printed next to each record, so
//! `12` on the second page means the second record of that page. Tokens that
//! are not numbers or point outside the result list are reported one by one
//! and skipped. Everything else in the selection is installed in order. One
//! failed install never stops the rest of the batch.

use crate::{
    console::{Console, Result, Tone},
    install::{Installed, Installer},
    package::{Origin, PackageRecord},
    search::Search,
};

use std::{
    collections::{HashMap, HashSet},
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Range,
};
use tracing::{debug, info, instrument};

/// Number of records per results page.
pub const PAGE_SIZE: usize = 10;

/// Page cursor over a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    total: usize,
    page: usize,
}

impl Pager {
    /// Construct new pager starting at the first page.
    pub fn new(total: usize) -> Self {
        Self { total, page: 0 }
    }

    /// Number of pages, never less than one.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(PAGE_SIZE).max(1)
    }

    /// Current page, 0-based.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Move to next page, wrapping past the last one.
    pub fn next(&mut self) {
        self.page = (self.page + 1) % self.page_count();
    }

    /// Move to previous page, wrapping before the first one.
    pub fn prev(&mut self) {
        self.page = (self.page + self.page_count() - 1) % self.page_count();
    }

    /// Indices of records shown on current page.
    pub fn range(&self) -> Range<usize> {
        let start = self.page * PAGE_SIZE;
        start.min(self.total)..(start + PAGE_SIZE).min(self.total)
    }
}

/// Command entered on a results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommand {
    Next,
    Prev,
    Back,
    Select(String),
}

impl PageCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.to_ascii_lowercase().as_str() {
            "n" | "next" => Self::Next,
            "p" | "prev" => Self::Prev,
            "q" | "quit" => Self::Back,
            _ => Self::Select(input.to_string()),
        }
    }
}

/// Why a selection token was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    NotANumber,
    OutOfRange,
}

/// Selection token that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub token: String,
    pub reason: Reason,
}

impl Display for Rejected {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self.reason {
            Reason::NotANumber => write!(fmt, "invalid selection {:?}: not a number", self.token),
            Reason::OutOfRange => write!(fmt, "invalid selection {:?}: out of range", self.token),
        }
    }
}

/// Parsed comma separated selection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    /// 0-based indices of picked records in input order, without duplicates.
    pub picks: Vec<usize>,

    /// Tokens that were skipped.
    pub rejected: Vec<Rejected>,
}

/// Parse comma separated list of 1-based indices over `total` records.
pub fn parse_selection(input: &str, total: usize) -> Selection {
    let mut selection = Selection::default();
    let mut seen = HashSet::new();

    for token in input.split(',').map(str::trim) {
        match token.parse::<usize>() {
            Ok(index) if (1..=total).contains(&index) => {
                if seen.insert(index) {
                    selection.picks.push(index - 1);
                }
            }
            Ok(_) => selection.rejected.push(Rejected {
                token: token.into(),
                reason: Reason::OutOfRange,
            }),
            Err(_) => selection.rejected.push(Rejected {
                token: token.into(),
                reason: Reason::NotANumber,
            }),
        }
    }

    selection
}

/// Check if input asks to leave.
pub fn is_quit(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit")
}

/// Render one record as it appears on a results page.
pub fn render_record(index: usize, record: &PackageRecord) -> String {
    let mut line = format!("{:>3}. {}", index + 1, record.name);
    if !record.version.is_empty() {
        line.push(' ');
        line.push_str(record.version.as_str());
    }
    line.push_str(format!(" ({})", record.origin).as_str());
    if record.installed {
        line.push_str(" [installed]");
    }

    line
}

enum Flow {
    Query,
    Leave,
}

/// Search, paginate, multi-select, install.
pub struct Selector<'a, S, I, C>
where
    S: Search,
    I: Installer,
    C: Console,
{
    search: &'a S,
    installer: &'a I,
    console: &'a mut C,
    checked: HashMap<(Origin, String), bool>,
}

impl<'a, S, I, C> Selector<'a, S, I, C>
where
    S: Search,
    I: Installer,
    C: Console,
{
    /// Construct new selector.
    pub fn new(search: &'a S, installer: &'a I, console: &'a mut C) -> Self {
        Self {
            search,
            installer,
            console,
            checked: HashMap::new(),
        }
    }

    /// Run selector until user quits or input ends.
    ///
    /// # Errors
    ///
    /// - Return [`ConsoleError`](crate::console::ConsoleError) if the console
    ///   cannot be read.
    #[instrument(skip(self), level = "debug")]
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(term) = self.console.prompt("Search packages (q to go back):")? else {
                return Ok(());
            };

            let term = term.trim();
            if term.is_empty() {
                continue;
            }
            if is_quit(term) {
                return Ok(());
            }

            let mut records = self.search.search(term);
            if records.is_empty() {
                self.console
                    .say(Tone::Warning, format!("no matching packages for {term:?}").as_str());
                continue;
            }

            if let Flow::Leave = self.browse(&mut records)? {
                return Ok(());
            }
        }
    }

    fn browse(&mut self, records: &mut [PackageRecord]) -> Result<Flow> {
        let mut pager = Pager::new(records.len());

        loop {
            self.refresh(records, pager.range());
            self.render(records, &pager);

            let Some(input) = self.console.prompt("Select packages:")? else {
                return Ok(Flow::Leave);
            };

            match PageCommand::parse(input.as_str()) {
                PageCommand::Next => pager.next(),
                PageCommand::Prev => pager.prev(),
                PageCommand::Back => return Ok(Flow::Query),
                PageCommand::Select(text) => {
                    let selection = parse_selection(text.as_str(), records.len());
                    for rejected in &selection.rejected {
                        self.console.say(Tone::Warning, rejected.to_string().as_str());
                    }

                    if selection.picks.is_empty() {
                        self.console.say(Tone::Warning, "nothing selected");
                        continue;
                    }

                    self.install_batch(records, &selection.picks);
                    return Ok(Flow::Query);
                }
            }
        }
    }

    /// Re-check install state of records on page whose origin cannot report it.
    fn refresh(&mut self, records: &mut [PackageRecord], range: Range<usize>) {
        for record in &mut records[range] {
            if record.origin.reports_installed() || record.installed {
                continue;
            }

            let key = (record.origin, record.install_key().to_string());
            let installed = match self.checked.get(&key) {
                Some(installed) => *installed,
                None => {
                    let installed = match record.origin {
                        Origin::Flatpak => self.installer.is_flatpak_installed(record.install_key()),
                        Origin::Pacman | Origin::Aur => self.installer.is_installed(record.name.as_str()),
                    };
                    self.checked.insert(key, installed);
                    installed
                }
            };
            record.installed = installed;
        }
    }

    fn render(&mut self, records: &[PackageRecord], pager: &Pager) {
        self.console.say(
            Tone::Heading,
            format!(
                "Page {}/{} ({} packages)",
                pager.page() + 1,
                pager.page_count(),
                records.len()
            )
            .as_str(),
        );

        let range = pager.range();
        for (index, record) in records[range.clone()].iter().enumerate() {
            let index = range.start + index;
            self.console.say(Tone::Plain, render_record(index, record).as_str());
            if !record.description.is_empty() {
                self.console
                    .say(Tone::Plain, format!("       {}", record.description).as_str());
            }
        }

        self.console.say(
            Tone::Plain,
            "n: next page, p: previous page, q: new search, 1,3,5: install",
        );
    }

    fn install_batch(&mut self, records: &mut [PackageRecord], picks: &[usize]) {
        let mut done = 0;

        for &index in picks {
            let record = &mut records[index];
            debug!("install {} from {}", record.name, record.origin);

            let result = match record.origin {
                Origin::Pacman | Origin::Aur => self.installer.install(record.name.as_str(), &[]),
                Origin::Flatpak => self.installer.install_flatpak(record.install_key()),
            };

            match result {
                Ok(installed) => {
                    done += 1;
                    record.installed = true;
                    self.checked.insert((record.origin, record.install_key().to_string()), true);

                    if installed == Installed::AlreadyPresent {
                        self.console
                            .say(Tone::Plain, format!("{} is already installed", record.name).as_str());
                    } else {
                        self.console
                            .say(Tone::Success, format!("{} installed", record.name).as_str());
                    }
                }
                Err(error) => self.console.say(Tone::Warning, error.to_string().as_str()),
            }
        }

        info!("installed {done} of {} selected packages", picks.len());
    }
}
