// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Main menu.
//!
//! The main menu lists one numbered entry per recipe in the manifest, followed
//! by the fixed entries for package search, yay setup, and flatpak setup. The
//! menu is redrawn after every action until the user quits or input ends.

use crate::{
    config::{Manifest, Recipe},
    console::{Console, Result, Tone},
    install::Installer,
    process::Runner,
    provision::{Helper, Provisioner},
    search::Search,
    select::{is_quit, Selector},
};

use tracing::{error, instrument};

/// What a menu entry does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Run recipe at index of manifest.
    Recipe(usize),
    Search,
    SetupYay,
    SetupFlatpak,
}

/// One numbered menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    pub action: Action,
}

/// List menu entries for manifest.
pub fn entries(manifest: &Manifest) -> Vec<Entry> {
    let mut entries = manifest
        .recipes
        .iter()
        .enumerate()
        .map(|(index, recipe)| Entry {
            label: recipe.description.clone(),
            action: Action::Recipe(index),
        })
        .collect::<Vec<_>>();

    entries.extend([
        Entry {
            label: "Search & install a package".into(),
            action: Action::Search,
        },
        Entry {
            label: "Setup yay (AUR helper)".into(),
            action: Action::SetupYay,
        },
        Entry {
            label: "Setup Flatpak".into(),
            action: Action::SetupFlatpak,
        },
    ]);

    entries
}

/// User choice at main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// 0-based index of entry.
    Pick(usize),
    Quit,
    Invalid,
}

/// Parse menu choice over `count` entries numbered from 1.
pub fn parse_choice(input: &str, count: usize) -> Choice {
    if is_quit(input) {
        return Choice::Quit;
    }

    match input.trim().parse::<usize>() {
        Ok(number) if (1..=count).contains(&number) => Choice::Pick(number - 1),
        _ => Choice::Invalid,
    }
}

/// Interactive main menu.
pub struct MainMenu<'a, R, I, S, C>
where
    R: Runner,
    I: Installer,
    S: Search,
    C: Console,
{
    manifest: &'a Manifest,
    entries: Vec<Entry>,
    provisioner: Provisioner<'a, R, I>,
    installer: &'a I,
    search: &'a S,
    console: &'a mut C,
}

impl<'a, R, I, S, C> MainMenu<'a, R, I, S, C>
where
    R: Runner,
    I: Installer,
    S: Search,
    C: Console,
{
    /// Construct new main menu.
    pub fn new(
        manifest: &'a Manifest,
        provisioner: Provisioner<'a, R, I>,
        installer: &'a I,
        search: &'a S,
        console: &'a mut C,
    ) -> Self {
        Self {
            manifest,
            entries: entries(manifest),
            provisioner,
            installer,
            search,
            console,
        }
    }

    /// Run menu until user quits or input ends.
    ///
    /// Failures of menu actions are reported and the menu is drawn again.
    ///
    /// # Errors
    ///
    /// - Return [`ConsoleError`](crate::console::ConsoleError) if the console
    ///   cannot be read.
    #[instrument(skip(self), level = "debug")]
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.draw();

            let prompt = format!("Choose an option (1-{}), or q to quit:", self.entries.len());
            let Some(input) = self.console.prompt(prompt.as_str())? else {
                return Ok(());
            };

            match parse_choice(input.as_str(), self.entries.len()) {
                Choice::Quit => return Ok(()),
                Choice::Invalid => self.console.say(
                    Tone::Warning,
                    format!("invalid option {:?}, please try again", input.trim()).as_str(),
                ),
                Choice::Pick(index) => self.dispatch(self.entries[index].action)?,
            }
        }
    }

    fn draw(&mut self) {
        self.console.say(Tone::Heading, "Arch Linux Setup Menu");
        for (index, entry) in self.entries.iter().enumerate() {
            self.console
                .say(Tone::Plain, format!(" [{}] {}", index + 1, entry.label).as_str());
        }
    }

    fn helper_for(&mut self, recipe: &Recipe) -> Result<Helper> {
        if !self.provisioner.needs_yay(recipe) {
            return Ok(Helper::Ensure);
        }

        if self
            .console
            .confirm("The yay AUR helper is not installed. Do you want to install it?")?
        {
            return Ok(Helper::Ensure);
        }

        self.console.say(
            Tone::Warning,
            "proceeding without yay, AUR packages will not be available",
        );
        Ok(Helper::Skip)
    }

    fn dispatch(&mut self, action: Action) -> Result<()> {
        let (label, result) = match action {
            Action::Search => {
                return Selector::new(self.search, self.installer, &mut *self.console).run();
            }
            Action::Recipe(index) => {
                let manifest = self.manifest;
                let recipe = &manifest.recipes[index];
                let helper = self.helper_for(recipe)?;
                (recipe.description.as_str(), self.provisioner.run_recipe(recipe, helper))
            }
            Action::SetupYay => ("yay setup", self.provisioner.setup_yay()),
            Action::SetupFlatpak => ("flatpak setup", self.provisioner.setup_flatpak()),
        };

        match result {
            Ok(()) => self.console.say(Tone::Success, format!("{label} complete").as_str()),
            Err(err) => {
                error!("{err}");
                self.console.say(Tone::Warning, format!("{label} failed").as_str());
            }
        }

        Ok(())
    }
}
