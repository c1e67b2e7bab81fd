// Application layer: wires config, preference storage and the session to CLI subcommands.

pub mod commands;

pub use commands::run;
