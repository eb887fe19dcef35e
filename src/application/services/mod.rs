//! Application services
//!
//! Concrete services used by the runner and the commands.
//! Services depend on I/O boundary traits (FileSystem)
//! but are themselves concrete structs, not traits.

mod journal;
mod root;

pub use journal::{JournalService, JOURNAL_FILENAME};
pub use root::RootResolver;
