//! CLI command implementations

pub mod bootstrap;
pub mod replay;
