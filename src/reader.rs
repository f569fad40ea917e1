use crate::error::{FastqError, FormatError, IoContext};
use crate::policy::{ErrorPolicy, ReaderOptions};
use crate::record::FastqRecord;
use crate::util::is_gzip_input;

#[cfg(feature = "gzip")]
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Sync FASTQ reader (plain/.gz), streaming, strictly 4 lines per record.
///
/// The `@`/`+` markers are not checked: any 4-line group whose first line is
/// non-empty is a record. An empty or missing first line ends the stream.
pub struct FastqReader {
    rdr: Box<dyn BufRead + Send>,
    opts: ReaderOptions,
    line_num: u64,
    byte_pos: u64,
    done: bool,
}

impl FastqReader {
    /// Open from a file path. Auto-detect `.gz` by extension or magic bytes.
    pub fn from_path<P: AsRef<Path>>(path: P, opts: ReaderOptions) -> Result<Self, FastqError> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| FastqError::io_err(e, IoContext::START))?;

        let is_gz = is_gzip_input(path, &f);

        let rdr: Box<dyn BufRead + Send> = if is_gz {
            #[cfg(feature = "gzip")]
            {
                let dec = MultiGzDecoder::new(f);
                Box::new(BufReader::with_capacity(256 * 1024, dec))
            }
            #[cfg(not(feature = "gzip"))]
            {
                return Err(FastqError::fmt_err(
                    FormatError::GzipDisabled,
                    IoContext::START,
                ));
            }
        } else {
            #[cfg(feature = "mmap")]
            {
                use memmap2::Mmap;
                use std::io::Cursor;
                // Own the Mmap inside Cursor to avoid self-ref problems
                let mmap = unsafe { Mmap::map(&f) }
                    .map_err(|e| FastqError::io_err(e, IoContext::START))?;
                Box::new(BufReader::with_capacity(512 * 1024, Cursor::new(mmap)))
            }
            #[cfg(not(feature = "mmap"))]
            {
                Box::new(BufReader::with_capacity(256 * 1024, f))
            }
        };

        Ok(Self::from_boxed(rdr, opts))
    }

    /// Wrap an arbitrary `BufRead` (stdin, an already-decompressed stream, etc.).
    pub fn from_bufread<R: BufRead + Send + 'static>(reader: R, opts: ReaderOptions) -> Self {
        Self::from_boxed(Box::new(reader), opts)
    }

    fn from_boxed(rdr: Box<dyn BufRead + Send>, opts: ReaderOptions) -> Self {
        Self {
            rdr,
            opts,
            line_num: 0,
            byte_pos: 0,
            done: false,
        }
    }

    /// Iterator-style `next` record.
    pub fn next(&mut self) -> Option<Result<FastqRecord, FastqError>> {
        while !self.done {
            match self.read_one() {
                Ok(Some(rec)) => return Some(Ok(rec)),
                Ok(None) => self.done = true,
                Err(err) => {
                    if self.opts.error_policy == ErrorPolicy::Return || !err.is_malformed() {
                        self.done = true;
                        return Some(Err(err));
                    }
                    log::warn!("skipping malformed record: {err}");
                    if is_truncation(&err) {
                        self.done = true;
                    }
                }
            }
        }
        None
    }

    /// Lines consumed so far.
    pub fn line_num(&self) -> u64 {
        self.line_num
    }

    fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<usize, FastqError> {
        buf.clear();
        let n = self
            .rdr
            .read_until(b'\n', buf)
            .map_err(|e| FastqError::io_err(e, self.ctx()))?;
        if n > 0 {
            self.line_num += 1;
            self.byte_pos += n as u64;
            trim_terminator(buf);
        }
        Ok(n)
    }

    fn read_required_line(&mut self, buf: &mut Vec<u8>) -> Result<(), FastqError> {
        if self.read_line(buf)? == 0 {
            return Err(FastqError::fmt_err(FormatError::UnexpectedEof, self.ctx()));
        }
        Ok(())
    }

    fn read_one(&mut self) -> Result<Option<FastqRecord>, FastqError> {
        let mut id = Vec::with_capacity(128);
        let n = self.read_line(&mut id)?;
        if n == 0 {
            return Ok(None);
        }
        if id.is_empty() {
            log::debug!("empty id line at line {}, treating as end of input", self.line_num);
            return Ok(None);
        }

        let mut seq = Vec::with_capacity(256);
        self.read_required_line(&mut seq)?;
        let mut sep = Vec::with_capacity(8);
        self.read_required_line(&mut sep)?;
        let mut qual = Vec::with_capacity(256);
        self.read_required_line(&mut qual)?;

        validate(&seq, &qual).map_err(|e| FastqError::fmt_err(e, self.ctx()))?;
        Ok(Some(FastqRecord {
            id: id_to_string(id),
            seq,
            qual,
        }))
    }

    #[inline]
    fn ctx(&self) -> IoContext {
        IoContext {
            byte_pos: self.byte_pos,
            line_num: self.line_num,
        }
    }
}

impl Iterator for FastqReader {
    type Item = Result<FastqRecord, FastqError>;
    fn next(&mut self) -> Option<Self::Item> {
        FastqReader::next(self)
    }
}

pub(crate) fn trim_terminator(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}

/// Lines are read as bytes; an id that is not UTF-8 is kept with U+FFFD
/// replacements rather than failing the record.
pub(crate) fn id_to_string(id: Vec<u8>) -> String {
    String::from_utf8(id).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

pub(crate) fn validate(seq: &[u8], qual: &[u8]) -> Result<(), FormatError> {
    if seq.is_empty() {
        return Err(FormatError::EmptySequence);
    }
    if qual.len() != seq.len() {
        return Err(FormatError::LengthMismatch {
            seq: seq.len(),
            qual: qual.len(),
        });
    }
    Ok(())
}

pub(crate) fn is_truncation(err: &FastqError) -> bool {
    matches!(
        err,
        FastqError::Format {
            source: FormatError::UnexpectedEof,
            ..
        }
    )
}
