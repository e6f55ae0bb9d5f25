// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration file replacement.
//!
//! Configuration files are fetched from a remote URL and swapped in place of
//! whatever currently lives at the destination. An existing non-empty file is
//! first copied next to itself with an `_old.bak` suffix. That backup is never
//! removed, so a failed download or swap always leaves the previous
//! configuration recoverable.
//!
//! The download lands in a temporary file inside the destination directory,
//! and is only moved over the destination once it is known to be non-empty.

use crate::process::{Invocation, Runner};

use std::{
    ffi::OsString,
    fs::{copy, metadata, read_to_string, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

/// Suffix appended to backup copies of replaced configuration files.
pub const BACKUP_SUFFIX: &str = "_old.bak";

/// Outcome of applying a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Path of the backup made of the previous file, if there was one.
    pub backup: Option<PathBuf>,
}

/// Fetch and swap configuration files.
#[derive(Debug)]
pub struct ConfigApplier<'r, R>
where
    R: Runner,
{
    runner: &'r R,
}

impl<'r, R> ConfigApplier<'r, R>
where
    R: Runner,
{
    /// Construct new configuration applier.
    pub fn new(runner: &'r R) -> Self {
        Self { runner }
    }

    /// Replace configuration file at destination with content at URL.
    ///
    /// # Errors
    ///
    /// - Return [`ApplyError::CreateDir`] if destination directory cannot be
    ///   created.
    /// - Return [`ApplyError::Backup`] if existing file cannot be backed up.
    /// - Return [`ApplyError::TempFile`] if temporary download target cannot
    ///   be created.
    /// - Return [`ApplyError::Download`] if download fails.
    /// - Return [`ApplyError::EmptyDownload`] if downloaded file is empty.
    /// - Return [`ApplyError::Replace`] if destination cannot be replaced.
    #[instrument(skip(self, url, dest), level = "debug")]
    pub fn apply(&self, url: impl AsRef<str>, dest: impl AsRef<Path>) -> Result<Applied> {
        let url = url.as_ref();
        let dest = dest.as_ref();
        let dir = dest.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));

        if !dir.exists() {
            info!("create missing directory {}", dir.display());
            mkdirp::mkdirp(dir).map_err(|err| ApplyError::CreateDir {
                source: err,
                path: dir.to_path_buf(),
            })?;
        }

        let backup = if is_valid_file(dest) {
            let backup = backup_path(dest);
            copy(dest, &backup).map_err(|err| ApplyError::Backup {
                source: err,
                path: backup.clone(),
            })?;
            info!("backup created at {}", backup.display());
            Some(backup)
        } else {
            warn!("no valid configuration to back up at {}", dest.display());
            None
        };

        let download = NamedTempFile::new_in(dir).map_err(|err| ApplyError::TempFile {
            source: err,
            path: dir.to_path_buf(),
        })?;

        // INVARIANT: Replacement keeps permissions of the file it replaces.
        match_permissions(download.path(), dest).map_err(|err| ApplyError::Permissions {
            source: err,
            path: download.path().to_path_buf(),
        })?;

        info!("download {url}");
        let invocation = Invocation::new("curl")
            .args(["-fsSL", "-o"])
            .arg(download.path())
            .arg(url);
        let fetched = self.runner.capture(&invocation).map(|output| output.success);
        if !matches!(fetched, Ok(true)) {
            return Err(ApplyError::Download { url: url.into() });
        }

        if !is_valid_file(download.path()) {
            return Err(ApplyError::EmptyDownload { url: url.into() });
        }

        download.persist(dest).map_err(|err| ApplyError::Replace {
            source: err.error,
            path: dest.to_path_buf(),
        })?;
        info!("configuration applied to {}", dest.display());

        Ok(Applied { backup })
    }
}

/// Append line to file unless file already holds that exact line.
///
/// Missing files and parent directories are created. Returns false if the line
/// was already present.
///
/// # Errors
///
/// - Return [`ApplyError::CreateDir`] if parent directory cannot be created.
/// - Return [`ApplyError::Append`] if file cannot be read or written.
#[instrument(skip(path, line), level = "debug")]
pub fn append_line(path: impl AsRef<Path>, line: impl AsRef<str>) -> Result<bool> {
    let path = path.as_ref();
    let line = line.as_ref().trim_end_matches(['\r', '\n']);

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty() && !dir.exists()) {
        mkdirp::mkdirp(dir).map_err(|err| ApplyError::CreateDir {
            source: err,
            path: dir.to_path_buf(),
        })?;
    }

    let current = match read_to_string(path) {
        Ok(current) => current,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(ApplyError::Append {
                source: err,
                path: path.to_path_buf(),
            })
        }
    };

    if current.lines().any(|existing| existing == line) {
        info!("{} already holds {line:?}", path.display());
        return Ok(false);
    }

    let mut text = String::new();
    if !current.is_empty() && !current.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(line);
    text.push('\n');

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(text.as_bytes()))
        .map_err(|err| ApplyError::Append {
            source: err,
            path: path.to_path_buf(),
        })?;
    info!("appended {line:?} to {}", path.display());

    Ok(true)
}

/// Give file the permissions of `like`, or `0644` if `like` does not exist.
#[cfg(unix)]
fn match_permissions(path: &Path, like: &Path) -> std::io::Result<()> {
    use std::{
        fs::{set_permissions, Permissions},
        os::unix::fs::PermissionsExt,
    };

    let permissions = metadata(like)
        .map(|meta| meta.permissions())
        .unwrap_or_else(|_| Permissions::from_mode(0o644));
    set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn match_permissions(_: &Path, _: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Backup location for a configuration file.
pub fn backup_path(path: impl AsRef<Path>) -> PathBuf {
    let mut backup = OsString::from(path.as_ref().as_os_str());
    backup.push(BACKUP_SUFFIX);
    PathBuf::from(backup)
}

/// Check that path is a file with at least one byte in it.
pub fn is_valid_file(path: impl AsRef<Path>) -> bool {
    metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// All possible error types for configuration application.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("failed to create directory {path:?}")]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("failed to back up configuration to {path:?}")]
    Backup {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("failed to create temporary file in {path:?}")]
    TempFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("failed to set permissions of {path:?}")]
    Permissions {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("failed to append to {path:?}")]
    Append {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("failed to download configuration from {url}")]
    Download { url: String },

    #[error("downloaded configuration from {url} is empty")]
    EmptyDownload { url: String },

    #[error("failed to replace configuration at {path:?}")]
    Replace {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ApplyError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Captured, Result as ProcessResult, Verbosity};

    use pretty_assertions::assert_eq;
    use std::fs::write;
    use tempfile::TempDir;

    /// Fake curl that writes fixed content to the `-o` target.
    struct FakeCurl {
        body: Option<&'static str>,
    }

    impl Runner for FakeCurl {
        fn capture(&self, invocation: &Invocation) -> ProcessResult<Captured> {
            let Some(body) = self.body else {
                return Ok(Captured::default());
            };

            let args = invocation.arguments();
            let target = args
                .iter()
                .position(|arg| arg == "-o")
                .map(|index| PathBuf::from(&args[index + 1]))
                .unwrap();
            write(target, body).unwrap();

            Ok(Captured {
                success: true,
                ..Default::default()
            })
        }

        fn run(&self, _: &Invocation, _: Verbosity) -> ProcessResult<bool> {
            Ok(true)
        }
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path("/home/blah/.zshrc"),
            PathBuf::from("/home/blah/.zshrc_old.bak")
        );
    }

    #[test]
    fn apply_backs_up_and_replaces() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let dest = root.path().join("kitty.conf");
        write(&dest, "font_size 11\n")?;

        let runner = FakeCurl { body: Some("font_size 13\n") };
        let applied = ConfigApplier::new(&runner).apply("https://example.org/kitty.conf", &dest)?;

        assert_eq!(applied.backup, Some(backup_path(&dest)));
        assert_eq!(read_to_string(backup_path(&dest))?, "font_size 11\n");
        assert_eq!(read_to_string(&dest)?, "font_size 13\n");

        Ok(())
    }

    #[test]
    fn apply_creates_missing_directories() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let dest = root.path().join("wezterm").join("nested").join("wezterm.lua");

        let runner = FakeCurl { body: Some("return {}\n") };
        let applied = ConfigApplier::new(&runner).apply("https://example.org/wezterm.lua", &dest)?;

        assert_eq!(applied.backup, None);
        assert_eq!(read_to_string(&dest)?, "return {}\n");

        Ok(())
    }

    #[test]
    fn failed_download_keeps_backup_and_original() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let dest = root.path().join(".zshrc");
        write(&dest, "export EDITOR=vim\n")?;

        let runner = FakeCurl { body: None };
        let result = ConfigApplier::new(&runner).apply("https://example.org/zshrc", &dest);

        assert!(matches!(result, Err(ApplyError::Download { .. })));
        assert_eq!(read_to_string(backup_path(&dest))?, "export EDITOR=vim\n");
        assert_eq!(read_to_string(&dest)?, "export EDITOR=vim\n");

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn replacement_keeps_existing_mode() -> anyhow::Result<()> {
        use std::{
            fs::{set_permissions, Permissions},
            os::unix::fs::PermissionsExt,
        };

        let root = TempDir::new()?;
        let dest = root.path().join(".zshrc");
        write(&dest, "export EDITOR=vim\n")?;
        set_permissions(&dest, Permissions::from_mode(0o640))?;

        let runner = FakeCurl { body: Some("export EDITOR=nvim\n") };
        ConfigApplier::new(&runner).apply("https://example.org/zshrc", &dest)?;

        assert_eq!(metadata(&dest)?.permissions().mode() & 0o777, 0o640);

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn new_configuration_is_world_readable() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new()?;
        let dest = root.path().join("kitty").join("kitty.conf");

        let runner = FakeCurl { body: Some("font_size 13\n") };
        ConfigApplier::new(&runner).apply("https://example.org/kitty.conf", &dest)?;

        assert_eq!(metadata(&dest)?.permissions().mode() & 0o777, 0o644);

        Ok(())
    }

    #[test]
    fn append_line_creates_missing_file() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let path = root.path().join("nested").join(".profile");

        assert!(append_line(&path, "export PATH=~/.npm-global/bin:$PATH")?);
        assert_eq!(read_to_string(&path)?, "export PATH=~/.npm-global/bin:$PATH\n");

        Ok(())
    }

    #[test]
    fn append_line_is_idempotent() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let path = root.path().join(".zshrc");
        write(&path, "alias ls=eza")?;

        let line = r#"export PATH="$PATH:$HOME/.config/emacs/bin""#;
        assert!(append_line(&path, line)?);
        assert!(!append_line(&path, line)?);
        assert_eq!(read_to_string(&path)?, format!("alias ls=eza\n{line}\n"));

        Ok(())
    }

    #[test]
    fn empty_download_is_rejected() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let dest = root.path().join("config.lua");
        write(&dest, "")?;

        let runner = FakeCurl { body: Some("") };
        let result = ConfigApplier::new(&runner).apply("https://example.org/config.lua", &dest);

        assert!(matches!(result, Err(ApplyError::EmptyDownload { .. })));
        assert!(!backup_path(&dest).exists());

        Ok(())
    }
}
