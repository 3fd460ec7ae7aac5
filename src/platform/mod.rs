//! Platform terminal integrations.

pub mod stdout_terminal;

pub use stdout_terminal::StdoutTerminal;
