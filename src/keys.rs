//! Loading the key vocabulary: one key per line, plain ASCII.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::error::ChdError;

/// Lines of a reader, split on `\n` with a trailing `\r` removed.
pub struct RawLines<B> {
    buf: B,
}

impl<B> RawLines<B> {
    pub fn new(buf: B) -> Self {
        Self { buf }
    }
}

impl<B: BufRead> Iterator for RawLines<B> {
    type Item = std::io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();
        match self.buf.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                }
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read all keys from `reader`, in order. Blank lines are skipped and
/// duplicates are kept.
pub fn read_keys<R: BufRead>(reader: R) -> Result<Vec<String>, ChdError> {
    let mut keys = Vec::new();
    for (i, line) in RawLines::new(reader).enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        if !line.is_ascii() {
            return Err(ChdError::NonAsciiLine { line: i + 1 });
        }
        // ASCII is valid UTF-8.
        keys.push(String::from_utf8(line).map_err(|_| ChdError::NonAsciiLine { line: i + 1 })?);
    }
    Ok(keys)
}

/// Read all keys from the file at `path`.
pub fn read_keys_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ChdError> {
    let file = File::open(path.as_ref())?;
    let keys = read_keys(BufReader::new(file))?;
    debug!("Read {} keys from {}", keys.len(), path.as_ref().display());
    Ok(keys)
}
