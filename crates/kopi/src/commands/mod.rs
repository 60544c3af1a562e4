//! CLI subcommands.

pub mod enhance;
pub mod extract;
pub mod generate;
pub mod init;
pub mod screenshots;
pub mod site_files;
