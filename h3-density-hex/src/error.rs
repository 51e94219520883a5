use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Stream-level failures. Any of these aborts the run; per-line problems are
/// reported as [`crate::record::RecordError`] and never reach this type.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("cannot open input {}", path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create output {}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read failed at input line {line}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("write to output failed")]
    Write(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
