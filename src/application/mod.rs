//! Application layer: lifecycle runner, commands and services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod command;
pub mod commands;
pub mod error;
pub mod runner;
pub mod services;

pub use command::{Command, Stage};
pub use error::{ApplicationError, ApplicationResult, IoResultExt};
pub use runner::{install_panic_hook, ExitGuard, RunOptions, Runner};
