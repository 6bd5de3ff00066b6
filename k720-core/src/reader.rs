//! Byte-accurate reads over a serial line
//!
//! Serial reads routinely return fewer bytes than asked for. The reader
//! here keeps reading until the buffer is full, the line goes quiet, or
//! the stream fails, so callers never mistake a partial buffer for a
//! complete one.

use std::io::{self, Read};

use tracing::trace;

/// A read that failed partway through
#[derive(Debug, thiserror::Error)]
#[error("read failed after {read} bytes: {source}")]
pub struct ReadError {
    /// Bytes accumulated before the failure
    pub read: usize,

    /// Underlying stream error
    #[source]
    pub source: io::Error,
}

impl From<ReadError> for io::Error {
    fn from(err: ReadError) -> Self {
        err.source
    }
}

/// Fill `buf` from `reader`, tolerating short reads
///
/// Returns:
/// - `Ok(buf.len())` once the buffer is full
/// - `Ok(n)` with `n < buf.len()` when the stream reports zero bytes or
///   its read timeout expires (`TimedOut`/`WouldBlock`); this is not an
///   error and the caller must compare `n` against what it asked for
/// - `Err(ReadError)` for any other failure, carrying the byte count so far
///
/// `Interrupted` reads are retried.
///
/// # Examples
///
/// ```
/// use k720_core::reader::read_exact;
///
/// let mut line: &[u8] = b"\x06\x31";
/// let mut buf = [0u8; 3];
///
/// // Two bytes arrive, then the line goes quiet
/// assert_eq!(read_exact(&mut line, &mut buf).unwrap(), 2);
/// ```
pub fn read_exact<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<usize, ReadError> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                trace!(wanted = buf.len(), got = filled, "Stream returned no data");
                break;
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e)
                if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) =>
            {
                trace!(wanted = buf.len(), got = filled, "Read timed out");
                break;
            }
            Err(source) => {
                return Err(ReadError {
                    read: filled,
                    source,
                });
            }
        }
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays scripted read results one call at a time
    struct Script(VecDeque<io::Result<Vec<u8>>>);

    impl Read for Script {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Ok(chunk)) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    Ok(n)
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    fn script(steps: Vec<io::Result<Vec<u8>>>) -> Script {
        Script(steps.into())
    }

    #[test]
    fn test_accumulates_partial_reads() {
        let mut s = script(vec![Ok(vec![1]), Ok(vec![2, 3]), Ok(vec![4])]);
        let mut buf = [0u8; 4];

        assert_eq!(read_exact(&mut s, &mut buf).unwrap(), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_stops_when_full() {
        let mut s = script(vec![Ok(vec![1, 2]), Ok(vec![3, 4])]);
        let mut buf = [0u8; 2];

        assert_eq!(read_exact(&mut s, &mut buf).unwrap(), 2);
        // Remaining bytes are left for the next read
        let mut rest = [0u8; 2];
        assert_eq!(read_exact(&mut s, &mut rest).unwrap(), 2);
        assert_eq!(rest, [3, 4]);
    }

    #[test]
    fn test_zero_read_is_short_not_error() {
        let mut s = script(vec![Ok(vec![9]), Ok(vec![])]);
        let mut buf = [0u8; 3];

        assert_eq!(read_exact(&mut s, &mut buf).unwrap(), 1);
    }

    #[test]
    fn test_timeout_is_short_not_error() {
        let mut s = script(vec![
            Ok(vec![7, 8]),
            Err(io::Error::from(io::ErrorKind::TimedOut)),
        ]);
        let mut buf = [0u8; 5];

        assert_eq!(read_exact(&mut s, &mut buf).unwrap(), 2);
    }

    #[test]
    fn test_interrupted_is_retried() {
        let mut s = script(vec![
            Err(io::Error::from(io::ErrorKind::Interrupted)),
            Ok(vec![1]),
        ]);
        let mut buf = [0u8; 1];

        assert_eq!(read_exact(&mut s, &mut buf).unwrap(), 1);
    }

    #[test]
    fn test_error_reports_progress() {
        let mut s = script(vec![
            Ok(vec![1, 2]),
            Err(io::Error::from(io::ErrorKind::BrokenPipe)),
        ]);
        let mut buf = [0u8; 4];

        let err = read_exact(&mut s, &mut buf).unwrap_err();
        assert_eq!(err.read, 2);
        assert_eq!(err.source.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_empty_buffer() {
        let mut s = script(vec![]);
        assert_eq!(read_exact(&mut s, &mut []).unwrap(), 0);
    }
}
