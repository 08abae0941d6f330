//! commands/mod.rs
//! Módulo que agrupa los subcomandos del CLI.

pub mod report_command;
pub mod send_command;
pub mod stats_command;
pub mod test_smtp_command;
