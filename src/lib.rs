// SPDX-FileCopyrightText: 2025 SOTAOI <dev@sotaoi.io>
// SPDX-License-Identifier: MIT

//! SOTAOI template provisioning.
//!
//! Signal materializes a local SOTAOI deployment in one of two ways: by
//! replicating a packed version tree out of the local version registry, or
//! by cloning a template repository and re-arranging its contents into the
//! expected deployment layout.
//!
//! # Versions
//!
//! A __version__ is a named, immutable snapshot of the SOTAOI template tree.
//! Versions are plain directories grouped under a single base directory that
//! ships next to the installed executable. The [`registry`] module scans
//! that base directory, the [`replicate`] module reproduces a version's tree
//! at a deployment path, and the [`deploy`] module guards the deployment
//! path preconditions shared by every command.
//!
//! # Templates
//!
//! Fresh deployments come from a template repository instead of a packed
//! version. The [`scaffold`] module clones the template, unpacks its
//! container directories into their final positions, and hands control to
//! the template's own bootstrap script.

pub mod config;
pub mod deploy;
pub mod path;
pub mod registry;
pub mod replicate;
pub mod scaffold;

pub use config::SignalConfig;
pub use deploy::DeployTarget;
pub use registry::VersionRegistry;
pub use replicate::{replicate, replicate_with_exclusions, ExclusionSet};
pub use scaffold::TemplateSource;
