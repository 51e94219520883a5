use std::io::Write;

use num_bigint::BigUint;
use thiserror::Error;

use crate::identifier::{self, IdentifierError};

pub const HEADER: &str = "h3code,density";

/// One `identifier,density` line. The density is kept as the raw text that
/// followed the comma.
#[derive(Debug, PartialEq, Eq)]
pub struct Record<'a> {
    pub identifier: BigUint,
    pub density: &'a str,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected 2 comma-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Record<'_>>, RecordError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut fields = line.split(',');
    let (id, density) = match (fields.next(), fields.next(), fields.next()) {
        (Some(id), Some(density), None) => (id, density),
        _ => {
            return Err(RecordError::FieldCount {
                found: line.split(',').count(),
            })
        }
    };

    let identifier = identifier::parse_decimal(id)?;
    Ok(Some(Record { identifier, density }))
}

impl Record<'_> {
    pub fn hex_identifier(&self) -> String {
        identifier::to_hex(&self.identifier)
    }

    /// Writes `<hex>,<density>\n`.
    pub fn write_csv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{},{}", self.hex_identifier(), self.density)
    }
}
