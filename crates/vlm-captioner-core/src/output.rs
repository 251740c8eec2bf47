//! Output formatting for caption results.
//!
//! Plain text prints one caption per line (prefixed with the image path when
//! more than one image was requested). CSV prints an `imagepath,caption`
//! header followed by one record per caption.

use std::io::{self, Write};
use std::path::Path;

/// CSV header row.
pub const CSV_HEADER: [&str; 2] = ["imagepath", "caption"];

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One caption per line
    Text,
    /// `imagepath,caption` records
    Csv,
}

enum Sink<W: Write> {
    Text(W),
    Csv(csv::Writer<W>),
}

/// A writer that emits caption records in text or CSV form.
pub struct CaptionWriter<W: Write> {
    sink: Sink<W>,
    prefix_paths: bool,
    header_pending: bool,
    records_written: usize,
}

impl<W: Write> CaptionWriter<W> {
    /// Create a new caption writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The underlying writer (usually stdout)
    /// * `format` - Output format
    /// * `multiple` - Whether more than one image was requested; in text
    ///   format this prefixes each line with its image path
    pub fn new(writer: W, format: OutputFormat, multiple: bool) -> Self {
        let sink = match format {
            OutputFormat::Text => Sink::Text(writer),
            OutputFormat::Csv => Sink::Csv(csv::Writer::from_writer(writer)),
        };

        Self {
            sink,
            prefix_paths: multiple,
            header_pending: format == OutputFormat::Csv,
            records_written: 0,
        }
    }

    /// Write one caption for `path`.
    pub fn write(&mut self, path: &Path, caption: &str) -> io::Result<()> {
        self.write_header_if_pending()?;

        let path = path.to_string_lossy();
        match &mut self.sink {
            Sink::Text(w) => {
                if self.prefix_paths {
                    writeln!(w, "{path}: {caption}")?;
                } else {
                    writeln!(w, "{caption}")?;
                }
            }
            Sink::Csv(w) => {
                w.write_record([&*path, caption])
                    .map_err(io::Error::other)?;
            }
        }
        self.records_written += 1;
        Ok(())
    }

    /// Write the CSV header if nothing has been written yet, then flush.
    pub fn finish(&mut self) -> io::Result<()> {
        self.write_header_if_pending()?;
        self.flush()
    }

    /// Get the number of captions written.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        match &mut self.sink {
            Sink::Text(w) => w.flush(),
            Sink::Csv(w) => w.flush(),
        }
    }

    fn write_header_if_pending(&mut self) -> io::Result<()> {
        if !self.header_pending {
            return Ok(());
        }
        if let Sink::Csv(w) = &mut self.sink {
            w.write_record(CSV_HEADER).map_err(io::Error::other)?;
        }
        self.header_pending = false;
        Ok(())
    }
}
