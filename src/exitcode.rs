//! Process exit codes

/// Successful termination
pub const OK: i32 = 0;

/// Any failed invocation: dispatch error or failed lifecycle stage
pub const FAILURE: i32 = 1;
