/// Contains constant values which are used as arguments to functions and in log messages.
pub mod constants;

/// Contains the error handling tooling.
pub mod error;

/// Contains tools for working with files.
pub mod file;

/// Contains macros.
pub(crate) mod macros;
