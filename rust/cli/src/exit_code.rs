//! Exit codes returned by [`crate::run`].

pub const SUCCESS: i32 = 0;

/// Bad arguments, configuration or I/O failure.
pub const ERROR: i32 = 2;
