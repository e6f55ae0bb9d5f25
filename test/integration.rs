// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{CannedRunner, FakeInstaller, FixedSearch, Request, ScriptConsole};

use archup::{
    config::{Manifest, Recipe},
    console::Tone,
    menu::MainMenu,
    package::{Origin, PackageRecord},
    process::Verbosity,
    provision::Provisioner,
    search::PackageSearch,
    select::Selector,
};

use anyhow::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;

fn listing(count: usize) -> Vec<PackageRecord> {
    (1..=count)
        .filter_map(|index| PackageRecord::new(format!("pkg{index}"), "1.0-1", "", Origin::Pacman))
        .collect()
}

fn package(name: &str) -> Request {
    Request::Package {
        name: name.into(),
        extra_args: vec![],
    }
}

#[test]
fn search_and_install_across_every_source() -> Result<()> {
    let runner = CannedRunner::default()
        .with(
            "pacman -Ss kitty",
            indoc! {r#"
                extra/kitty 0.37.0-1 [installed]
                    A modern, hackable, featureful, OpenGL-based terminal emulator
            "#},
        )
        .with(
            "yay -Ss kitty",
            indoc! {r#"
                extra/kitty 0.37.0-1 [installed]
                    A modern, hackable, featureful, OpenGL-based terminal emulator
                aur/kitty-git 0.37.0.r12-1 (+3 0.00)
                    Kitty built from the latest commit
            "#},
        )
        .with("flatpak search kitty --columns=name", "Kitty Launcher\n")
        .with("flatpak search kitty --columns=description", "Launch kitty\n")
        .with("flatpak search kitty --columns=version", "1.0\n")
        .with("flatpak search kitty --columns=application", "io.kitty.Launcher\n");
    let installer = FakeInstaller::default();
    let search = PackageSearch::new(&runner);
    let mut console = ScriptConsole::new(["kitty", "1,2,3", "q"]);

    Selector::new(&search, &installer, &mut console).run()?;

    assert_eq!(
        installer.requests(),
        vec![
            package("kitty"),
            package("kitty-git"),
            Request::Flatpak {
                name: "io.kitty.Launcher".into()
            },
        ]
    );
    assert_eq!(
        console.lines(Tone::Success),
        vec!["kitty installed", "kitty-git installed", "Kitty Launcher installed"]
    );

    let rendered = console.lines(Tone::Plain);
    assert!(rendered.contains(&"  1. kitty 0.37.0-1 (pacman) [installed]"));
    assert!(rendered.contains(&"  2. kitty-git 0.37.0.r12-1 (AUR)"));
    assert!(rendered.contains(&"  3. Kitty Launcher 1.0 (Flatpak)"));

    Ok(())
}

#[test]
fn bad_selection_tokens_are_reported_and_skipped() -> Result<()> {
    let search = FixedSearch::new(listing(5));
    let installer = FakeInstaller::default();
    let mut console = ScriptConsole::new(["pkg", "1, 3,x,99", "q"]);

    Selector::new(&search, &installer, &mut console).run()?;

    assert_eq!(
        console.lines(Tone::Warning),
        vec![
            r#"invalid selection "x": not a number"#,
            r#"invalid selection "99": out of range"#,
        ]
    );
    assert_eq!(installer.requests(), vec![package("pkg1"), package("pkg3")]);

    Ok(())
}

#[test]
fn pages_wrap_in_both_directions() -> Result<()> {
    let search = FixedSearch::new(listing(23));
    let installer = FakeInstaller::default();
    let mut console = ScriptConsole::new(["pkg", "n", "n", "n", "p", "q", "q"]);

    Selector::new(&search, &installer, &mut console).run()?;

    assert_eq!(
        console.lines(Tone::Heading),
        vec![
            "Page 1/3 (23 packages)",
            "Page 2/3 (23 packages)",
            "Page 3/3 (23 packages)",
            "Page 1/3 (23 packages)",
            "Page 3/3 (23 packages)",
        ]
    );
    assert!(console.lines(Tone::Plain).contains(&" 23. pkg23 1.0-1 (pacman)"));
    assert!(installer.requests().is_empty());

    Ok(())
}

#[test]
fn install_failure_does_not_stop_batch() -> Result<()> {
    let search = FixedSearch::new(listing(2));
    let installer = FakeInstaller::default().with_broken("pkg1");
    let mut console = ScriptConsole::new(["pkg", "1,2"]);

    Selector::new(&search, &installer, &mut console).run()?;

    assert_eq!(installer.requests(), vec![package("pkg1"), package("pkg2")]);
    assert_eq!(console.lines(Tone::Warning), vec!["failed to install pkg1"]);
    assert_eq!(console.lines(Tone::Success), vec!["pkg2 installed"]);

    Ok(())
}

#[test]
fn empty_selection_prompts_again() -> Result<()> {
    let search = FixedSearch::new(listing(3));
    let installer = FakeInstaller::default().with_present("pkg2");
    let mut console = ScriptConsole::new(["pkg", "x", "2"]);

    Selector::new(&search, &installer, &mut console).run()?;

    assert_eq!(
        console.lines(Tone::Warning),
        vec![r#"invalid selection "x": not a number"#, "nothing selected"]
    );
    assert_eq!(console.lines(Tone::Heading).len(), 2);
    assert_eq!(installer.requests(), vec![package("pkg2")]);
    assert!(console.lines(Tone::Plain).contains(&"pkg2 is already installed"));

    Ok(())
}

#[test]
fn empty_results_go_back_to_query() -> Result<()> {
    let search = FixedSearch::new(Vec::new());
    let installer = FakeInstaller::default();
    let mut console = ScriptConsole::new(["zzz", "  ", "Quit", "never read"]);

    Selector::new(&search, &installer, &mut console).run()?;

    assert_eq!(console.lines(Tone::Warning), vec![r#"no matching packages for "zzz""#]);
    assert_eq!(*search.terms.borrow(), vec!["zzz"]);

    Ok(())
}

#[test]
fn install_state_is_checked_once_per_session() -> Result<()> {
    let records = vec![
        PackageRecord::new("kitty-git", "1.0-1", "", Origin::Aur).unwrap(),
        PackageRecord::new("Firefox", "", "", Origin::Flatpak).unwrap(),
    ];
    let search = FixedSearch::new(records);
    let installer = FakeInstaller::default().with_present("kitty-git");
    let mut console = ScriptConsole::new(["kitty", "n", "p", "q", "kitty", "q"]);

    Selector::new(&search, &installer, &mut console).run()?;

    assert_eq!(installer.checks.get(), 2);
    assert!(console
        .lines(Tone::Plain)
        .contains(&"  1. kitty-git 1.0-1 (AUR) [installed]"));
    assert!(console.lines(Tone::Plain).contains(&"  2. Firefox (Flatpak)"));

    Ok(())
}

fn devel_manifest() -> Manifest {
    Manifest {
        recipes: vec![Recipe {
            name: "devel".into(),
            description: "Install Developer Tools".into(),
            packages: vec!["gdb".into()],
            ..Default::default()
        }],
    }
}

#[test]
fn menu_runs_recipe_and_rejects_bad_choice() -> Result<()> {
    let manifest = devel_manifest();
    let runner = CannedRunner::default();
    let installer = FakeInstaller::default();
    let search = FixedSearch::new(Vec::new());
    let provisioner = Provisioner::new(&runner, &installer, Verbosity::Verbose);
    let mut console = ScriptConsole::new(["9", "1", "q"]);

    MainMenu::new(&manifest, provisioner, &installer, &search, &mut console).run()?;

    assert_eq!(
        console.lines(Tone::Warning),
        vec![r#"invalid option "9", please try again"#]
    );
    assert_eq!(console.lines(Tone::Success), vec!["Install Developer Tools complete"]);
    assert_eq!(console.lines(Tone::Heading).len(), 3);
    assert_eq!(installer.requests(), vec![package("gdb")]);

    Ok(())
}

#[test]
fn menu_reports_failed_recipe() -> Result<()> {
    let manifest = devel_manifest();
    let runner = CannedRunner::default();
    let installer = FakeInstaller::default().with_broken("gdb");
    let search = FixedSearch::new(Vec::new());
    let provisioner = Provisioner::new(&runner, &installer, Verbosity::Verbose);
    let mut console = ScriptConsole::new(["1"]);

    MainMenu::new(&manifest, provisioner, &installer, &search, &mut console).run()?;

    assert_eq!(console.lines(Tone::Warning), vec!["Install Developer Tools failed"]);

    Ok(())
}

fn aur_manifest() -> Manifest {
    Manifest {
        recipes: vec![Recipe {
            name: "doom".into(),
            description: "Install Doom Emacs".into(),
            aur_helper: true,
            packages: vec!["emms".into()],
            ..Default::default()
        }],
    }
}

#[test]
fn menu_installs_yay_when_confirmed() -> Result<()> {
    let manifest = aur_manifest();
    let runner = CannedRunner::default();
    let installer = FakeInstaller::default().with_broken("base-devel");
    let search = FixedSearch::new(Vec::new());
    let provisioner = Provisioner::new(&runner, &installer, Verbosity::Verbose);
    let mut console = ScriptConsole::new(["1", "y", "q"]);

    MainMenu::new(&manifest, provisioner, &installer, &search, &mut console).run()?;

    assert_eq!(installer.requests(), vec![package("base-devel"), package("emms")]);
    assert_eq!(console.lines(Tone::Warning), vec!["Install Doom Emacs failed"]);

    Ok(())
}

#[test]
fn menu_goes_on_without_yay_when_declined() -> Result<()> {
    let manifest = aur_manifest();
    let runner = CannedRunner::default();
    let installer = FakeInstaller::default();
    let search = FixedSearch::new(Vec::new());
    let provisioner = Provisioner::new(&runner, &installer, Verbosity::Verbose);
    let mut console = ScriptConsole::new(["1", "n", "q"]);

    MainMenu::new(&manifest, provisioner, &installer, &search, &mut console).run()?;

    assert_eq!(installer.requests(), vec![package("emms")]);
    assert_eq!(
        console.lines(Tone::Warning),
        vec!["proceeding without yay, AUR packages will not be available"]
    );
    assert_eq!(console.lines(Tone::Success), vec!["Install Doom Emacs complete"]);

    Ok(())
}

#[test]
fn menu_hands_over_to_package_search() -> Result<()> {
    let manifest = devel_manifest();
    let runner = CannedRunner::default();
    let installer = FakeInstaller::default();
    let search = FixedSearch::new(listing(1));
    let provisioner = Provisioner::new(&runner, &installer, Verbosity::Verbose);
    let mut console = ScriptConsole::new(["2", "vim", "q", "q"]);

    MainMenu::new(&manifest, provisioner, &installer, &search, &mut console).run()?;

    assert_eq!(*search.terms.borrow(), vec!["vim"]);
    assert!(installer.requests().is_empty());
    assert_eq!(
        console
            .lines(Tone::Heading)
            .into_iter()
            .filter(|line| *line == "Arch Linux Setup Menu")
            .count(),
        2
    );

    Ok(())
}
