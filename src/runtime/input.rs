use std::io;
use std::os::fd::RawFd;

use crate::error::{AutofitError, Result};

/// Default growth step of the input buffer.
pub const INPUT_CHUNK: usize = 1024;

/// Result of one non-blocking read attempt.
#[derive(Debug)]
pub enum ReadOutcome {
    Data(usize),
    WouldBlock,
    Closed,
    Failed(io::Error),
}

/// A byte stream the reactor watches for replacement text.
pub trait InputSource {
    fn descriptor(&self) -> RawFd;

    /// Read into `buf` without blocking.
    fn read_chunk(&mut self, buf: &mut [u8]) -> ReadOutcome;
}

/// Non-blocking reader over a borrowed descriptor, stdin by default.
///
/// The descriptor's original file status flags are restored on drop. The
/// descriptor itself is never closed.
pub struct FdSource {
    fd: RawFd,
    original_flags: libc::c_int,
}

impl FdSource {
    pub fn stdin() -> Result<Self> {
        Self::new(libc::STDIN_FILENO)
    }

    pub fn new(fd: RawFd) -> Result<Self> {
        // SAFETY: fcntl on an arbitrary descriptor only reports EBADF on misuse.
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(AutofitError::StreamRead(io::Error::last_os_error()));
        }
        if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
            return Err(AutofitError::StreamRead(io::Error::last_os_error()));
        }
        Ok(Self {
            fd,
            original_flags: flags,
        })
    }
}

impl InputSource for FdSource {
    fn descriptor(&self) -> RawFd {
        self.fd
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> ReadOutcome {
        // SAFETY: `buf` is valid for `buf.len()` writable bytes.
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
        match n {
            0 => ReadOutcome::Closed,
            n if n > 0 => ReadOutcome::Data(n as usize),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
                        ReadOutcome::WouldBlock
                    }
                    _ => ReadOutcome::Failed(err),
                }
            }
        }
    }
}

impl Drop for FdSource {
    fn drop(&mut self) {
        unsafe { libc::fcntl(self.fd, libc::F_SETFL, self.original_flags) };
    }
}

/// What one drain cycle pulled out of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Drained {
    pub bytes: usize,
    pub closed: bool,
}

/// Accumulates every byte ever read from the input stream.
///
/// Capacity grows by `chunk` bytes whenever less than a chunk of headroom is
/// left, so a single read never gets a short buffer.
#[derive(Debug)]
pub struct InputBuffer {
    data: Vec<u8>,
    chunk: usize,
}

impl InputBuffer {
    pub fn new(chunk: usize) -> Self {
        Self {
            data: Vec::new(),
            chunk: chunk.max(1),
        }
    }

    pub fn set_chunk(&mut self, chunk: usize) {
        self.chunk = chunk.max(1);
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn extend(&mut self, bytes: &[u8]) -> Result<()> {
        self.data
            .try_reserve(bytes.len())
            .map_err(|err| AutofitError::Allocation(err.to_string()))?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Read from `source` until it would block or reaches end of stream.
    pub fn drain(&mut self, source: &mut dyn InputSource) -> Result<Drained> {
        let mut drained = Drained::default();
        loop {
            self.ensure_headroom()?;
            let start = self.data.len();
            self.data.resize(self.data.capacity(), 0);

            match source.read_chunk(&mut self.data[start..]) {
                ReadOutcome::Data(n) if n > 0 => {
                    self.data.truncate(start + n);
                    drained.bytes += n;
                }
                ReadOutcome::Data(_) | ReadOutcome::Closed => {
                    self.data.truncate(start);
                    drained.closed = true;
                    return Ok(drained);
                }
                ReadOutcome::WouldBlock => {
                    self.data.truncate(start);
                    return Ok(drained);
                }
                ReadOutcome::Failed(err) => {
                    self.data.truncate(start);
                    return Err(AutofitError::StreamRead(err));
                }
            }
        }
    }

    fn ensure_headroom(&mut self) -> Result<()> {
        if self.data.capacity() - self.data.len() < self.chunk {
            self.data
                .try_reserve_exact(self.chunk)
                .map_err(|err| AutofitError::Allocation(err.to_string()))?;
        }
        Ok(())
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(INPUT_CHUNK)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Chunk, ScriptedInput};
    use super::*;
    use crate::runtime::readiness::testing::Pipe;

    #[test]
    fn drain_stops_when_the_source_would_block() {
        let mut buffer = InputBuffer::new(8);
        let mut source = ScriptedInput::new(
            3,
            [
                Chunk::Bytes(b"ab"),
                Chunk::Bytes(b"cd"),
                Chunk::WouldBlock,
                Chunk::Bytes(b"ef"),
            ],
        );

        let drained = buffer.drain(&mut source).unwrap();

        assert_eq!(drained, Drained { bytes: 4, closed: false });
        assert_eq!(buffer.bytes(), b"abcd");
        assert_eq!(source.script.len(), 1);
    }

    #[test]
    fn successive_drains_accumulate() {
        let mut buffer = InputBuffer::new(4);
        let mut source = ScriptedInput::new(
            3,
            [
                Chunk::Bytes(b"A"),
                Chunk::WouldBlock,
                Chunk::Bytes(b"BC"),
                Chunk::Closed,
            ],
        );

        assert!(!buffer.drain(&mut source).unwrap().closed);
        let second = buffer.drain(&mut source).unwrap();

        assert!(second.closed);
        assert_eq!(buffer.bytes(), b"ABC");
    }

    #[test]
    fn headroom_grows_by_whole_chunks() {
        let mut buffer = InputBuffer::new(4);
        let mut source = ScriptedInput::new(3, [Chunk::Bytes(b"abcd"), Chunk::Bytes(b"efg")]);

        buffer.drain(&mut source).unwrap();

        assert_eq!(buffer.bytes(), b"abcdefg");
        assert!(buffer.capacity() - buffer.len() >= 1);
        assert!(buffer.capacity() >= 8);
    }

    #[test]
    fn read_failures_are_stream_errors() {
        let mut buffer = InputBuffer::default();
        buffer.extend(b"kept").unwrap();
        let mut source = ScriptedInput::new(3, [Chunk::Fail]);

        let err = buffer.drain(&mut source).unwrap_err();

        assert!(matches!(err, AutofitError::StreamRead(_)));
        assert_eq!(buffer.bytes(), b"kept");
    }

    #[test]
    fn fd_source_reads_a_pipe_without_blocking() {
        let mut pipe = Pipe::new();
        let mut source = FdSource::new(pipe.read).unwrap();
        let mut buffer = InputBuffer::new(16);

        assert_eq!(buffer.drain(&mut source).unwrap(), Drained::default());

        pipe.send(b"hello\n");
        assert_eq!(buffer.drain(&mut source).unwrap().bytes, 6);

        pipe.close_write();
        assert!(buffer.drain(&mut source).unwrap().closed);
        assert_eq!(buffer.bytes(), b"hello\n");
    }
}
