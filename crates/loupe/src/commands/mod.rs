//! CLI subcommands.

pub mod check;
pub mod css;
pub mod init;
pub mod run;
