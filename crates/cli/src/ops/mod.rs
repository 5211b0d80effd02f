//! Reusable operations shared by the packaging commands
//!
//! Both commands build a session configuration the same way: command-line
//! flags first, then the project config file, then built-in defaults.

pub mod session;
