use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Peek at the first two bytes, leaving the cursor where it was.
fn looks_like_gzip<R: Read + Seek>(mut r: R) -> io::Result<bool> {
    let mut magic = [0u8; 2];
    let pos = r.stream_position()?;
    let n = r.read(&mut magic)?;
    r.seek(SeekFrom::Start(pos))?;
    Ok(is_gzip_magic(&magic[..n]))
}

pub fn has_gz_extension(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

/// `.gz` extension, or gzip magic bytes for mislabelled files.
pub fn is_gzip_input(path: &Path, f: &File) -> bool {
    has_gz_extension(path) || looks_like_gzip(f).unwrap_or(false)
}

pub(crate) fn is_gzip_magic(magic: &[u8]) -> bool {
    magic.len() >= 2 && magic[..2] == GZIP_MAGIC
}
