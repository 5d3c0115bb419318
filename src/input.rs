// src/input.rs
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::ProcessingError;

/// Open a log for reading, or stdin for `-`.
///
/// The file is opened here, before any line is pulled, so a missing file
/// is reported before anything has been written.
pub fn open_input(path: &str, buffer_size: usize) -> Result<Box<dyn BufRead>, ProcessingError> {
    if path == "-" {
        return Ok(Box::new(BufReader::with_capacity(buffer_size, io::stdin())));
    }

    let file = File::open(Path::new(path)).map_err(|e| ProcessingError::FileNotFound {
        path: path.to_string(),
        source: e,
    })?;
    Ok(Box::new(BufReader::with_capacity(buffer_size, file)))
}

/// Line iterator that tolerates invalid UTF-8.
///
/// Each line is decoded lossily and stripped of its `\n` / `\r\n`
/// terminator. The read buffer is reused between lines.
pub struct LineReader<R> {
    input: R,
    buffer: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(input: R) -> Self {
        LineReader {
            input,
            buffer: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        match self.input.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                if self.buffer.last() == Some(&b'\n') {
                    self.buffer.pop();
                    if self.buffer.last() == Some(&b'\r') {
                        self.buffer.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buffer).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
