//! mite: command orchestration core of the migration tool
//!
//! Locates the project root, loads the layered configuration and drives the
//! selected command through one uniform lifecycle.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
