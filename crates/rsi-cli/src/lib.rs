//! Command-line driver: load a serialized analysis session, infer the
//! responses of its methods and report them as JSON.

pub mod args;
pub mod driver;

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod args_tests;
