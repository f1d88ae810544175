//! `std::io` adapters.
//!
//! [`DigestWriter`] tees everything written through it into a handle, and
//! [`absorb_reader`] drains a reader into a handle.

use std::io::{self, Read, Write};

use zeroize::Zeroize;

use crate::handle::StatefulDigest;

/// Default read buffer size for [`absorb_reader`].
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Writer adapter that feeds every written byte into a digest handle.
///
/// Only bytes accepted by the inner writer are hashed, so a short write
/// hashes exactly what was written.
#[derive(Debug)]
pub struct DigestWriter<W, D> {
    inner: W,
    digest: D,
}

impl<W, D: StatefulDigest> DigestWriter<W, D> {
    /// Wraps `inner`, hashing into `digest`.
    pub fn new(inner: W, digest: D) -> Self {
        Self { inner, digest }
    }

    /// The digest handle.
    pub fn digest(&self) -> &D {
        &self.digest
    }

    /// Mutable access to the digest handle, e.g. to `finish` it.
    pub fn digest_mut(&mut self) -> &mut D {
        &mut self.digest
    }

    /// The wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Splits the adapter into the wrapped writer and the digest handle.
    pub fn into_parts(self) -> (W, D) {
        (self.inner, self.digest)
    }
}

impl<D: StatefulDigest> DigestWriter<io::Sink, D> {
    /// A writer that only hashes.
    pub fn sink(digest: D) -> Self {
        Self::new(io::sink(), digest)
    }
}

impl<W: Write, D: StatefulDigest> Write for DigestWriter<W, D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.digest.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Reads `reader` to EOF into `digest`, returning the number of bytes read.
pub fn absorb_reader<D: StatefulDigest, R: Read>(digest: &mut D, reader: R) -> io::Result<u64> {
    absorb_reader_with_buffer(digest, reader, DEFAULT_BUFFER_SIZE)
}

/// Like [`absorb_reader`] with an explicit buffer size (at least one byte).
///
/// The buffer is zeroized before returning.
pub fn absorb_reader_with_buffer<D: StatefulDigest, R: Read>(
    digest: &mut D,
    mut reader: R,
    buffer_size: usize,
) -> io::Result<u64> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;

    let result = loop {
        match reader.read(&mut buf) {
            Ok(0) => break Ok(total),
            Ok(n) => {
                digest.update(&buf[..n]);
                total += n as u64;
            },
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => break Err(e),
        }
    };

    buf.zeroize();
    result
}
