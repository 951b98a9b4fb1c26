//! Command-line front end for `dtsb-core`.

pub mod args;
pub mod config;
pub mod tracing_config;

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod args_tests;

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;
