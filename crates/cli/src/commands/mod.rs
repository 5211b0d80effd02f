//! CLI commands

pub mod common_protos;
pub mod generate;
