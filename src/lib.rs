//! Staged workspace initialisation.
//!
//! [`init::InitData`] drives telemetry start, optional dependency install,
//! database connection and cache settings validation, collecting every
//! outcome in an [`init::InitResult`]. [`modconfig`] validates the plugin
//! requirements of a mod dependency tree.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod init;
pub mod installer;
pub mod modconfig;
pub mod status;
pub mod telemetry;
pub mod workspace;

pub use error::{ErrorAndWarnings, InitError};
pub use init::{InitData, InitResult, InitServices, Invoker};
pub use workspace::Workspace;
