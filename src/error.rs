//! Error taxonomy for the shell.
//!
//! One top-level enum aggregating small per-concern error cases, derived
//! with `thiserror::Error` so `Display` produces the exact fixed strings
//! the dispatcher prints.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MfsError {
    #[error("Error: File system image not found.")]
    ImageNotFound,

    #[error("Error: File system image is already open.")]
    AlreadyOpen,

    #[error("Error: File system not open.")]
    NotOpen,

    #[error("Error: File system image must be opened first.")]
    MustOpenFirst,

    #[error("Error: Filename not given.")]
    FilenameNotGiven,

    #[error("Error: File not found. ")]
    NotFound,

    #[error("Error: Entry is not a directory.")]
    NotADirectory,

    #[error("Error: Not enough arguments. ({0} arguments given)")]
    NotEnoughArguments(usize),

    #[error("Error: Unknown command.")]
    UnknownCommand,

    #[error("Error: {0}")]
    Io(#[from] std::io::Error),
}
