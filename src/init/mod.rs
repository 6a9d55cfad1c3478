//! Staged initialisation of a workspace session.
//!
//! [`InitData`] drives the stages and owns the resources they acquire;
//! [`InitResult`] collects the outcome.

mod client_factory;
mod data;
mod result;

pub use client_factory::get_db_client;
pub use data::{InitData, InitServices, Invoker, APP_NAME};
pub use result::{InitResult, InitSummary};
