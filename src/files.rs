// Line sources for the interpreter: a file or piped stdin, one line at a time.
//
// The interpreter never sees a file handle. The host pulls lines from a LineSource and feeds
// them to process_line.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub struct LineSource {
    reader: Box<dyn BufRead>,
    pub line_number: usize,
}

impl LineSource {
    pub fn open(path: &Path) -> io::Result<LineSource> {
        let file = File::open(path)?;
        debug!(path = %path.display(), "opened source file");
        Ok(LineSource::from_reader(Box::new(BufReader::new(file))))
    }

    pub fn stdin() -> LineSource {
        LineSource::from_reader(Box::new(io::stdin().lock()))
    }

    pub fn from_reader(reader: Box<dyn BufRead>) -> LineSource {
        LineSource { reader, line_number: 0 }
    }

    /// get_line returns the next line without its terminator, None at end of input
    ///
    pub fn get_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}
