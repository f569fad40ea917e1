#![cfg(feature = "async")]

use crate::error::{FastqError, FormatError, IoContext};
use crate::policy::{ErrorPolicy, ReaderOptions};
use crate::reader::{id_to_string, is_truncation, trim_terminator, validate};
use crate::record::FastqRecord;
use crate::util::{has_gz_extension, is_gzip_magic};

use async_compression::tokio::bufread::GzipDecoder;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

/// Async FASTQ reader (plain/.gz), streaming, 4 lines per record.
pub struct AsyncFastqReader {
    rdr: BufReader<Box<dyn AsyncBufRead + Unpin + Send>>,
    opts: ReaderOptions,
    line_num: u64,
    byte_pos: u64,
    done: bool,
}

impl AsyncFastqReader {
    /// Open async from path; `.gz` auto-detect by extension or magic bytes.
    pub async fn from_path<P: AsRef<Path>>(
        path: P,
        opts: ReaderOptions,
    ) -> Result<Self, FastqError> {
        let path = path.as_ref();
        let mut f = File::open(path)
            .await
            .map_err(|e| FastqError::io_err(e, IoContext::START))?;

        let is_gz = has_gz_extension(path) || looks_like_gzip_async(&mut f).await.unwrap_or(false);

        let inner: Box<dyn AsyncBufRead + Unpin + Send> = if is_gz {
            let mut gz = GzipDecoder::new(BufReader::with_capacity(256 * 1024, f));
            gz.multiple_members(true);
            Box::new(BufReader::with_capacity(256 * 1024, gz))
        } else {
            Box::new(BufReader::with_capacity(256 * 1024, f))
        };

        Ok(Self::from_boxed(inner, opts))
    }

    /// Wrap any async `AsyncBufRead`.
    pub fn from_async_bufread<R>(reader: R, opts: ReaderOptions) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self::from_boxed(Box::new(reader), opts)
    }

    fn from_boxed(inner: Box<dyn AsyncBufRead + Unpin + Send>, opts: ReaderOptions) -> Self {
        Self {
            rdr: BufReader::with_capacity(256 * 1024, inner),
            opts,
            line_num: 0,
            byte_pos: 0,
            done: false,
        }
    }

    /// Fetch next record (async).
    pub async fn next_record(&mut self) -> Option<Result<FastqRecord, FastqError>> {
        while !self.done {
            match self.read_one().await {
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

    async fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<usize, FastqError> {
        buf.clear();
        let n = self
            .rdr
            .read_until(b'\n', buf)
            .await
            .map_err(|e| FastqError::io_err(e, self.ctx()))?;
        if n > 0 {
            self.line_num += 1;
            self.byte_pos += n as u64;
            trim_terminator(buf);
        }
        Ok(n)
    }

    async fn read_required_line(&mut self, buf: &mut Vec<u8>) -> Result<(), FastqError> {
        if self.read_line(buf).await? == 0 {
            return Err(FastqError::fmt_err(FormatError::UnexpectedEof, self.ctx()));
        }
        Ok(())
    }

    async fn read_one(&mut self) -> Result<Option<FastqRecord>, FastqError> {
        let mut id = Vec::with_capacity(128);
        if self.read_line(&mut id).await? == 0 || id.is_empty() {
            return Ok(None);
        }

        let mut seq = Vec::with_capacity(256);
        self.read_required_line(&mut seq).await?;
        let mut sep = Vec::with_capacity(8);
        self.read_required_line(&mut sep).await?;
        let mut qual = Vec::with_capacity(256);
        self.read_required_line(&mut qual).await?;

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

async fn looks_like_gzip_async(f: &mut File) -> io::Result<bool> {
    let pos = f.stream_position().await?;
    let mut magic = [0u8; 2];
    let n = f.read(&mut magic).await?;
    f.seek(SeekFrom::Start(pos)).await?;
    Ok(is_gzip_magic(&magic[..n]))
}
