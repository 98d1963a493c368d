//! Library side of the `sdq` binary: configuration and logging setup.

pub mod config;
pub mod logging;
