//! Byte-by-byte content comparison.
//!
//! Used before relinking a digest match when verification is enabled, so a
//! digest collision can never merge two different files.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Compare the contents of two files.
///
/// Sizes are compared first; contents are then streamed through two buffers
/// of `buffer_size` bytes each.
///
/// # Errors
///
/// Returns the first I/O error from opening or reading either file.
pub fn files_identical(a: &Path, b: &Path, buffer_size: usize) -> io::Result<bool> {
    let mut file_a = File::open(a)?;
    let mut file_b = File::open(b)?;

    if file_a.metadata()?.len() != file_b.metadata()?.len() {
        return Ok(false);
    }

    let buffer_size = buffer_size.max(1);
    let mut buf_a = vec![0u8; buffer_size];
    let mut buf_b = vec![0u8; buffer_size];

    loop {
        let n_a = fill(&mut file_a, &mut buf_a)?;
        let n_b = fill(&mut file_b, &mut buf_b)?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
