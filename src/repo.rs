// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Remote repository cloning.
//!
//! Dotfile collections, editor distributions, and AUR build recipes are all
//! pulled in as Git repositories. Cloning goes through libgit2 with a progress
//! bar tracking received objects. If the remote demands credentials, the
//! progress bar is suspended and the user is prompted on the terminal.

use auth_git2::{GitAuthenticator, Prompter};
use git2::{build::RepoBuilder, Config, FetchOptions, RemoteCallbacks, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{path::Path, time};
use tracing::{info, instrument};

/// Clone depth request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Fetch entire history.
    #[default]
    Full,

    /// Fetch only the latest commit.
    Shallow,
}

/// Clone remote repository into target path.
///
/// Progress of the clone is displayed through a progress bar that is cleared
/// once the clone is done.
///
/// # Errors
///
/// - Return [`RepoError::Git2`] if libgit2 operations fail, e.g., target path
///   already exists and is not empty.
/// - Return [`RepoError::IndicatifStyleTemplate`] if progress bar style is
///   malformed.
#[instrument(skip(url, path), level = "debug")]
pub fn clone_repo(url: impl AsRef<str>, path: impl AsRef<Path>, depth: Depth) -> Result<Repository> {
    info!("clone {} into {}", url.as_ref(), path.as_ref().display());

    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);
    bar.set_message(url.as_ref().to_string());
    bar.enable_steady_tick(time::Duration::from_millis(100));

    let prompter = IndicatifPrompter::new(bar);
    let authenticator = GitAuthenticator::default().set_prompter(prompter.clone());
    let config = Config::open_default()?;

    let mut throttle = time::Instant::now();
    let mut rc = RemoteCallbacks::new();
    rc.credentials(authenticator.credentials(&config));
    rc.transfer_progress(|progress| {
        let stats = progress.to_owned();
        if throttle.elapsed() > time::Duration::from_millis(10) {
            throttle = time::Instant::now();
            prompter.bar.set_length(stats.total_objects() as u64);
            prompter.bar.set_position(stats.received_objects() as u64);
        }
        true
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(rc);
    if depth == Depth::Shallow {
        fo.depth(1);
    }

    let result = RepoBuilder::new()
        .fetch_options(fo)
        .clone(url.as_ref(), path.as_ref());
    prompter.bar.finish_and_clear();

    Ok(result?)
}

/// Git2 authentication prompter for progress bar.
#[derive(Debug, Clone)]
pub struct IndicatifPrompter {
    pub(crate) bar: ProgressBar,
}

impl IndicatifPrompter {
    /// Construct new progress bar authenticator.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for IndicatifPrompter {
    #[instrument(skip(self, url, _config), level = "debug")]
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| -> Option<(String, String)> {
            let username = Text::new("username").prompt().ok()?;
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
    }

    #[instrument(skip(self, username, url, _config), level = "debug")]
    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("authentication required at {url} for user {username}");
        self.bar.suspend(|| {
            Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }

    #[instrument(skip(self, ssh_key_path, _config), level = "debug")]
    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!(
            "authentication required with ssh key at {}",
            ssh_key_path.display()
        );
        self.bar.suspend(|| {
            Password::new("passphrase")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }
}

/// All possible error types for repository cloning.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = RepoError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn clone_from_local_path() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let origin = root.path().join("origin");
        let repo = Repository::init(&origin)?;
        let mut config = repo.config()?;
        config.set_str("user.name", "John Doe")?;
        config.set_str("user.email", "john@doe.com")?;

        let signature = repo.signature()?;
        let tree = repo.find_tree(repo.index()?.write_tree()?)?;
        repo.commit(Some("HEAD"), &signature, &signature, "chore: initial", &tree, &[])?;

        let url = origin.to_string_lossy().into_owned();
        let clone = clone_repo(url.as_str(), root.path().join("clone"), Depth::Full)?;
        assert!(clone.head().is_ok());

        Ok(())
    }

    #[test]
    fn clone_into_occupied_path_fails() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let target = root.path().join("occupied");
        std::fs::create_dir_all(&target)?;
        std::fs::write(target.join("file"), "blah")?;

        let result = clone_repo("/no/such/origin", &target, Depth::Full);
        assert!(matches!(result, Err(RepoError::Git2(_))));

        Ok(())
    }
}
