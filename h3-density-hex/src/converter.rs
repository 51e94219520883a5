use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use tracing::{debug, span, trace, warn, Level};

use crate::error::{ConvertError, Result};
use crate::input::{self, lines};
use crate::record::{self, RecordError, HEADER};

/// Line tallies for one run. Every non-blank line lands in exactly one of
/// `converted`, `malformed` or `unparseable`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSummary {
    pub converted: u64,
    pub blank: u64,
    pub malformed: u64,
    pub unparseable: u64,
}

impl ConversionSummary {
    pub fn skipped(&self) -> u64 {
        self.malformed + self.unparseable
    }
}

/// Stream `input` to `output`, rewriting each `decimal_id,density` line as
/// `hex_id,density` under a `h3code,density` header.
///
/// Bad lines are logged and skipped; only I/O failures abort.
pub fn convert<R: BufRead, W: Write>(input: R, mut output: W) -> Result<ConversionSummary> {
    let _span = span!(Level::DEBUG, "convert").entered();

    writeln!(output, "{}", HEADER).map_err(ConvertError::Write)?;

    let mut summary = ConversionSummary::default();
    for (index, line) in lines(input).enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| ConvertError::Read { line: line_no, source })?;

        match record::parse_line(&line) {
            Ok(None) => summary.blank += 1,
            Ok(Some(record)) => {
                record.write_csv(&mut output).map_err(ConvertError::Write)?;
                trace!("line {}: {} -> {}", line_no, record.identifier, record.hex_identifier());
                summary.converted += 1;
            }
            Err(err @ RecordError::FieldCount { .. }) => {
                warn!("Skipping invalid line {}: {} ({})", line_no, line.trim(), err);
                summary.malformed += 1;
            }
            Err(err @ RecordError::Identifier(_)) => {
                warn!("Skipping line {} due to error: {} - {}", line_no, line.trim(), err);
                summary.unparseable += 1;
            }
        }
    }

    output.flush().map_err(ConvertError::Write)?;
    debug!("Finished: {:?}", summary);
    Ok(summary)
}

/// Convert the file at `input_path` into a new file at `output_path`.
///
/// The input is opened before the output is created, so a missing input
/// leaves no output behind. A failure part-way through leaves whatever was
/// already written in place.
pub fn convert_file(input_path: &Path, output_path: &Path) -> Result<ConversionSummary> {
    let input = input::open_input(input_path)?;
    debug!("Reading {} (gzip: {})", input_path.display(), input.is_compressed());

    let file = File::create(output_path).map_err(|source| ConvertError::CreateOutput {
        path: output_path.to_path_buf(),
        source,
    })?;
    convert(input, BufWriter::new(file))
}
