// SPDX-FileCopyrightText: 2025 SOTAOI <dev@sotaoi.io>
// SPDX-License-Identifier: MIT

//! Template scaffolding from a remote repository.
//!
//! The create command provisions a deployment by cloning a template
//! repository, re-arranging its contents into the expected layout, and
//! handing control to the template's own bootstrap script.
//!
//! # Re-Layout
//!
//! Template repositories pack their deliverables into two known container
//! directories at the top level. `packedapps` holds application trees that
//! belong directly at the deployment root, and `packedpackages` holds
//! package trees that belong under `packages/`. The re-layout step unpacks
//! both containers and removes them afterwards. This expected shape is a
//! fixed contract with the template repository, so re-layout is its own
//! named step that can be exercised without a clone in front of it.

use crate::deploy::DeployTarget;

use auth_git2::{GitAuthenticator, Prompter};
use git2::{build::RepoBuilder, Config, FetchOptions, RemoteCallbacks};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    time,
};
use tracing::{debug, info, instrument, warn};

/// Container directory whose subdirectories belong at the deployment root.
const PACKED_APPS: &str = "packedapps";

/// Container directory whose subdirectories belong under `packages/`.
const PACKED_PACKAGES: &str = "packedpackages";

/// Source repository for the create command.
///
/// The CLI accepts the literal repository argument `new` to mean "use the
/// default template repository". That sentinel is mapped to
/// [`TemplateSource::Default`] at the CLI edge, so everything past argument
/// handling deals with an explicit variant instead of a magic string
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Clone from the configured default template remote.
    Default,

    /// Clone from an explicit remote URL.
    Remote(String),
}

impl TemplateSource {
    /// Map raw repository argument to template source.
    pub fn from_arg(arg: impl Into<String>) -> Self {
        let arg = arg.into();
        if arg == "new" {
            Self::Default
        } else {
            Self::Remote(arg)
        }
    }

    /// Resolve template source to a concrete remote URL.
    pub fn remote_url(&self, default_remote: &str) -> String {
        match self {
            Self::Default => default_remote.to_owned(),
            Self::Remote(url) => url.clone(),
        }
    }
}

/// Clone template repository into deployment target.
///
/// The progress of the clone is displayed through a progress bar. If any
/// credentials are required for the clone to continue, then the user will
/// be prompted for that information accordingly, with the progress bar
/// blocked for input. Clone failure is fatal and surfaced as-is.
///
/// # Errors
///
/// - Return [`Error::Git2`] if libgit2 operations fail.
#[instrument(skip(url, target), level = "debug")]
pub fn clone_template(url: impl AsRef<str>, target: &DeployTarget) -> Result<()> {
    info!("clone template {} into {target}", url.as_ref());
    let bar = ProgressBar::no_length();
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);
    bar.set_message(url.as_ref().to_string());
    bar.enable_steady_tick(time::Duration::from_millis(100));

    let prompter = ClonePrompter::new(bar);
    let authenticator = GitAuthenticator::default().set_prompter(prompter.clone());
    let config = Config::open_default()?;

    let mut throttle = time::Instant::now();
    let mut rc = RemoteCallbacks::new();
    rc.credentials(authenticator.credentials(&config));
    rc.transfer_progress(|progress| {
        let stats = progress.to_owned();
        let bar_size = stats.total_objects() as u64;
        let bar_pos = stats.received_objects() as u64;
        if throttle.elapsed() > time::Duration::from_millis(10) {
            throttle = time::Instant::now();
            prompter.bar.set_length(bar_size);
            prompter.bar.set_position(bar_pos);
        }
        true
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(rc);
    RepoBuilder::new()
        .fetch_options(fo)
        .clone(url.as_ref(), target.as_path())?;
    prompter.bar.finish_and_clear();

    Ok(())
}

/// Re-arrange a freshly cloned template into its final layout.
///
/// Moves every immediate subdirectory of `packedapps` up to the deployment
/// root and every immediate subdirectory of `packedpackages` into
/// `packages/`, then removes the emptied containers. Non-directory entries
/// inside either container are not moved; they are discarded along with
/// their container. A template without one or both containers is left
/// untouched for the missing container.
///
/// # Errors
///
/// - Return [`Error::Relayout`] if a container cannot be read, an entry
///   cannot be moved, or a container cannot be removed.
#[instrument(skip(root), level = "debug")]
pub fn relayout(root: impl AsRef<Path>) -> Result<()> {
    let root = root.as_ref();
    unpack_container(&root.join(PACKED_APPS), root)?;
    unpack_container(&root.join(PACKED_PACKAGES), &root.join("packages"))?;

    Ok(())
}

fn unpack_container(container: &Path, dest: &Path) -> Result<()> {
    if !container.is_dir() {
        debug!("no container at {:?}", container.display());
        return Ok(());
    }

    let relayout_err = |err: std::io::Error, path: &Path| Error::Relayout {
        source: err,
        path: path.to_path_buf(),
    };

    fs::create_dir_all(dest).map_err(|err| relayout_err(err, dest))?;
    let entries = fs::read_dir(container).map_err(|err| relayout_err(err, container))?;
    for entry in entries {
        let entry = entry.map_err(|err| relayout_err(err, container))?;
        let entry_path = entry.path();
        if !entry_path.is_dir() {
            warn!("skip stray entry {:?} in container", entry_path.display());
            continue;
        }

        let final_path = dest.join(entry.file_name());
        debug!("move {:?} to {:?}", entry_path.display(), final_path.display());
        fs::rename(&entry_path, &final_path).map_err(|err| relayout_err(err, &entry_path))?;
    }

    fs::remove_dir_all(container).map_err(|err| relayout_err(err, container))?;

    Ok(())
}

/// Run the template's bootstrap command from the deployment directory.
///
/// The bootstrap process inherits stdin, stdout, and stderr so the user
/// observes its progress in real time. Blocks until the process finishes;
/// a nonzero exit status is propagated as this command's failure.
///
/// # Errors
///
/// - Return [`Error::EmptyBootstrapCommand`] if no command was configured.
/// - Return [`Error::Syscall`] if the process cannot be spawned or exits
///   with a nonzero status.
#[instrument(skip(root, command), level = "debug")]
pub fn bootstrap(root: impl AsRef<Path>, command: &[String]) -> Result<()> {
    let (program, args) = command.split_first().ok_or(Error::EmptyBootstrapCommand)?;
    info!("run bootstrap command {:?}", command.join(" "));

    let status = Command::new(program)
        .args(args)
        .current_dir(root.as_ref())
        .spawn()?
        .wait()?;
    if !status.success() {
        return Err(Error::Syscall(std::io::Error::other(format!(
            "bootstrap command {program:?} failed with {status}"
        ))));
    }

    Ok(())
}

/// Git2 authentication prompter for the clone progress bar.
#[derive(Debug, Clone)]
pub struct ClonePrompter {
    pub(crate) bar: ProgressBar,
}

impl ClonePrompter {
    /// Construct new progress bar authenticator.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for ClonePrompter {
    #[instrument(skip(self, url, _config), level = "debug")]
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| -> Option<(String, String)> {
            let username = Text::new("username").prompt().unwrap();
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .unwrap();
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
        self.bar.suspend(|| -> Option<String> {
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .unwrap();
            Some(password)
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
        self.bar.suspend(|| -> Option<String> {
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .unwrap();
            Some(password)
        })
    }
}

/// Template scaffolding error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Style template cannot be set for progress bar.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),

    /// Cloned template cannot be re-arranged into its final layout.
    #[error("failed to re-layout cloned template at {:?}", path.display())]
    Relayout {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// No bootstrap command was configured.
    #[error("bootstrap command is empty")]
    EmptyBootstrapCommand,

    /// External bootstrap process fails.
    #[error(transparent)]
    Syscall(#[from] std::io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case("new", TemplateSource::Default; "sentinel maps to default")]
    #[test_case(
        "https://blah.org/foo.git",
        TemplateSource::Remote("https://blah.org/foo.git".into());
        "url maps to remote"
    )]
    #[test]
    fn template_source_from_arg(arg: &str, expect: TemplateSource) {
        use pretty_assertions::assert_eq;

        assert_eq!(TemplateSource::from_arg(arg), expect);
    }

    #[test]
    fn template_source_resolves_remote_url() {
        let default_remote = "https://blah.org/default.git";

        let result = TemplateSource::Default.remote_url(default_remote);
        assert_eq!(result, default_remote);

        let result =
            TemplateSource::Remote("https://blah.org/fork.git".into()).remote_url(default_remote);
        assert_eq!(result, "https://blah.org/fork.git");
    }

    #[test]
    fn relayout_flattens_both_containers() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        fs::create_dir_all(root.path().join(PACKED_APPS).join("web"))?;
        fs::create_dir_all(root.path().join(PACKED_APPS).join("api"))?;
        fs::create_dir_all(root.path().join(PACKED_PACKAGES).join("core"))?;
        fs::write(root.path().join(PACKED_APPS).join("web").join("index.ts"), "export {};\n")?;

        relayout(root.path())?;

        assert!(root.path().join("web").join("index.ts").is_file());
        assert!(root.path().join("api").is_dir());
        assert!(root.path().join("packages").join("core").is_dir());
        assert!(!root.path().join(PACKED_APPS).exists());
        assert!(!root.path().join(PACKED_PACKAGES).exists());

        Ok(())
    }

    #[test]
    fn relayout_discards_stray_container_entries() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        fs::create_dir_all(root.path().join(PACKED_APPS).join("web"))?;
        fs::write(root.path().join(PACKED_APPS).join("stray.txt"), "not an app\n")?;

        relayout(root.path())?;

        assert!(root.path().join("web").is_dir());
        assert!(!root.path().join("stray.txt").exists());
        assert!(!root.path().join(PACKED_APPS).exists());

        Ok(())
    }

    #[test]
    fn relayout_without_containers_is_a_no_op() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        fs::write(root.path().join("README.md"), "# template\n")?;

        relayout(root.path())?;

        assert!(root.path().join("README.md").is_file());
        assert!(!root.path().join("packages").exists());

        Ok(())
    }

    #[test]
    fn bootstrap_propagates_nonzero_exit_status() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;

        let result = bootstrap(root.path(), &["false".to_string()]);

        assert!(matches!(result, Err(Error::Syscall(_))));

        Ok(())
    }

    #[test]
    fn bootstrap_rejects_empty_command() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;

        let result = bootstrap(root.path(), &[]);

        assert!(matches!(result, Err(Error::EmptyBootstrapCommand)));

        Ok(())
    }
}
