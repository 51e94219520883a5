use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use tracing::{debug, info};

use crate::error::{ConvertError, Result};
use crate::instrumented_reader::InstrumentedReader;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Input that is either plain text or a gzip stream, decided by sniffing the
/// first bytes. Either way the caller sees decompressed lines.
pub enum InputStream<R: BufRead> {
    Plain(R),
    Gzip(BufReader<MultiGzDecoder<R>>),
}

pub type FileInput = InputStream<BufReader<InstrumentedReader<File, fn(u64)>>>;

impl<R: BufRead> InputStream<R> {
    pub fn new(mut reader: R) -> io::Result<Self> {
        let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
        if is_gzip {
            debug!("Input is gzip-compressed");
            Ok(InputStream::Gzip(BufReader::new(MultiGzDecoder::new(reader))))
        } else {
            Ok(InputStream::Plain(reader))
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, InputStream::Gzip(_))
    }
}

impl<R: BufRead> Read for InputStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputStream::Plain(reader) => reader.read(buf),
            InputStream::Gzip(decoder) => decoder.read(buf),
        }
    }
}

impl<R: BufRead> BufRead for InputStream<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            InputStream::Plain(reader) => reader.fill_buf(),
            InputStream::Gzip(decoder) => decoder.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            InputStream::Plain(reader) => reader.consume(amt),
            InputStream::Gzip(decoder) => decoder.consume(amt),
        }
    }
}

/// Text lines split on `\n`, `\r\n` or a lone `\r`, with the terminator
/// removed. Invalid UTF-8 surfaces as an `InvalidData` error for that line.
pub struct Lines<R> {
    reader: R,
    skip_lf: bool,
}

pub fn lines<R: BufRead>(reader: R) -> Lines<R> {
    Lines {
        reader,
        skip_lf: false,
    }
}

impl<R: BufRead> Lines<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                if line.is_empty() {
                    return Ok(None);
                }
                break;
            }
            // The `\n` of a `\r\n` pair may arrive in the next buffer.
            if self.skip_lf {
                self.skip_lf = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }
            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    line.extend_from_slice(&available[..i]);
                    self.skip_lf = available[i] == b'\r';
                    self.reader.consume(i + 1);
                    break;
                }
                None => {
                    let n = available.len();
                    line.extend_from_slice(available);
                    self.reader.consume(n);
                }
            }
        }
        String::from_utf8(line)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

fn log_progress(bytes_read: u64) {
    info!("Read {} MiB of input", bytes_read / (1024 * 1024));
}

/// Open `path` for line reading. Progress is logged every 8 MiB of file
/// bytes (compressed bytes for gzip input).
pub fn open_input(path: &Path) -> Result<FileInput> {
    let open_err = |source| ConvertError::OpenInput {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_err)?;
    let reader = InstrumentedReader::new(file, log_progress as fn(u64));
    InputStream::new(BufReader::new(reader)).map_err(open_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn plain_text_passes_through() {
        let mut input = InputStream::new(Cursor::new(b"1,0.5\n2,0.6\n".to_vec())).unwrap();
        assert!(!input.is_compressed());
        let mut text = String::new();
        input.read_to_string(&mut text).unwrap();
        assert_eq!(text, "1,0.5\n2,0.6\n");
    }

    #[test]
    fn gzip_is_decoded() {
        let input = InputStream::new(Cursor::new(gzip(b"1,0.5\n2,0.6\n"))).unwrap();
        assert!(input.is_compressed());
        let lines: Vec<String> = input.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["1,0.5", "2,0.6"]);
    }

    #[test]
    fn concatenated_gzip_members() {
        let mut data = gzip(b"1,0.5\n");
        data.extend(gzip(b"2,0.6\n"));
        let mut input = InputStream::new(Cursor::new(data)).unwrap();
        let mut text = String::new();
        input.read_to_string(&mut text).unwrap();
        assert_eq!(text, "1,0.5\n2,0.6\n");
    }

    #[test]
    fn empty_input_is_plain() {
        let input = InputStream::new(Cursor::new(Vec::new())).unwrap();
        assert!(!input.is_compressed());
        assert_eq!(input.lines().count(), 0);
    }

    fn split(data: &[u8], capacity: usize) -> Vec<String> {
        let reader = BufReader::with_capacity(capacity, data);
        lines(reader).map(|l| l.unwrap()).collect()
    }

    #[test]
    fn splits_on_every_line_ending() {
        for capacity in [1, 2, 3, 8192] {
            assert_eq!(split(b"1,0.5\r2,0.6\r", capacity), vec!["1,0.5", "2,0.6"]);
            assert_eq!(split(b"a\r\nb\nc\rd", capacity), vec!["a", "b", "c", "d"]);
            assert_eq!(split(b"\r\n\r\n", capacity), vec!["", ""]);
            assert_eq!(split(b"\r\r\n\n", capacity), vec!["", "", ""]);
            assert_eq!(split(b"", capacity), Vec::<String>::new());
        }
    }

    #[test]
    fn invalid_utf8_line_is_an_error() {
        let mut iter = lines(&b"ok\n\xff\n"[..]);
        assert_eq!(iter.next().unwrap().unwrap(), "ok");
        let err = iter.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        match open_input(&path) {
            Err(ConvertError::OpenInput { path: p, source }) => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a missing file"),
        }
    }
}
