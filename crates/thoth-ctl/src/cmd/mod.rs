//! CLI command modules.

pub mod catalog;
pub mod http;
pub mod shell;
pub mod status;
pub mod sync;
