// SPDX-FileCopyrightText: 2025 SOTAOI <dev@sotaoi.io>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the optional `signal.toml` configuration file.
//! Every setting has a built-in default, so the file only needs to exist
//! when the defaults are not good enough.
//!
//! # Default Template Remote
//!
//! The create command accepts the literal repository argument `new` to mean
//! "use the default template repository". The remote that `new` expands to
//! lives here as [`Settings::default_remote`] instead of being compared
//! against inline, so deployments can point the sentinel at a fork or a
//! mirror without rebuilding the tool.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Remote used when the caller asks for a fresh default template.
pub const DEFAULT_REMOTE: &str = "https://github.com/sotaoi/sotaoi.git";

/// Signal configuration layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct SignalConfig {
    /// Settings for template provisioning.
    #[serde(default)]
    pub settings: Settings,
}

impl SignalConfig {
    /// Load configuration from target file.
    ///
    /// Falls back to built-in defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ReadFile`] if the file exists but cannot be
    ///   read.
    /// - Return [`ConfigError::Deserialize`] if the file cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => content.parse(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::ReadFile {
                source: err,
                path: path.as_ref().to_path_buf(),
            }),
        }
    }
}

impl FromStr for SignalConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: SignalConfig = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on base directory override.
        if let Some(base_dir) = &config.settings.base_dir {
            config.settings.base_dir = Some(PathBuf::from(
                shellexpand::full(base_dir.to_string_lossy().as_ref())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        Ok(config)
    }
}

impl Display for SignalConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Template provisioning settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Remote URL that the `new` repository sentinel expands to.
    pub default_remote: String,

    /// Override for the SOTAOI base directory.
    pub base_dir: Option<PathBuf>,

    /// Bootstrap command run from the deployment directory after a clone.
    pub bootstrap_command: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_remote: DEFAULT_REMOTE.into(),
            base_dir: None,
            bootstrap_command: vec!["./signal".into(), "sotaoi:web".into()],
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration file at {:?}", path.display())]
    ReadFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("SOTAOI_HOME", "/srv/sotaoi")])]
    fn deserialize_signal_config() -> anyhow::Result<()> {
        let result: SignalConfig = r#"
            [settings]
            default_remote = "https://blah.org/foo.git"
            base_dir = "$SOTAOI_HOME/versions"
            bootstrap_command = ["./signal", "sotaoi:web"]
        "#
        .parse()?;

        let expect = SignalConfig {
            settings: Settings {
                default_remote: "https://blah.org/foo.git".into(),
                base_dir: Some(PathBuf::from("/srv/sotaoi/versions")),
                bootstrap_command: vec!["./signal".into(), "sotaoi:web".into()],
            },
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn serialize_signal_config() {
        let result = SignalConfig {
            settings: Settings {
                default_remote: "https://blah.org/foo.git".into(),
                base_dir: Some(PathBuf::from("/srv/sotaoi/versions")),
                bootstrap_command: vec!["./signal".into(), "sotaoi:web".into()],
            },
        }
        .to_string();

        let expect = indoc! {r#"
            [settings]
            default_remote = "https://blah.org/foo.git"
            base_dir = "/srv/sotaoi/versions"
            bootstrap_command = [
                "./signal",
                "sotaoi:web",
            ]
        "#};

        assert_eq!(result, expect);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() -> anyhow::Result<()> {
        let config = SignalConfig::load("/nonexistent/signal.toml")?;

        assert_eq!(config.settings.default_remote, DEFAULT_REMOTE);
        assert_eq!(config.settings.base_dir, None);
        assert_eq!(
            config.settings.bootstrap_command,
            vec!["./signal".to_string(), "sotaoi:web".to_string()]
        );

        Ok(())
    }
}
