/// Main configuration module.
///
/// Re-exports submodules for table rules, server defaults and command-line arguments.
pub mod args;
pub mod server;
pub mod table;
