//! `civarc` command-line adapter: argument parsing, logging and wiring of
//! the archive pipeline.
#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod logging;
pub mod parser;

pub use commands::{ArchiveArgs, Commands, ImagesArgs, ModelsArgs};
pub use logging::{RedactedLine, RedactingWriter};
pub use parser::Cli;
