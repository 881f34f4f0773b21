// src/error.rs
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RidfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed map configuration {path}:{line}: {message}")]
    Config {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Map file not found: {0}")]
    MissingMapFile(PathBuf),

    #[error("Class ID {0} is outside the dispatch table")]
    InvalidClassId(u8),

    #[error("Output already registered: {0}")]
    DuplicateOutput(String),
}

impl RidfError {
    pub(crate) fn config(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        RidfError::Config {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RidfError>;
