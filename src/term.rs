use std::io;
use std::os::unix::io::RawFd;

use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::unistd;
use tracing::{debug, warn};

use crate::error::Error;
use crate::line;
use crate::status::Status;

/// The descriptor value of a handle whose device has been released.
const CLOSED: RawFd = -1;

/// An asynchronous communications port.
///
/// A `Term` is the sole owner of its descriptor. It is not internally
/// synchronized: sharing one handle between threads requires external
/// locking, both for byte I/O and for the control operations (the OS
/// applies concurrent attribute stores last-write-wins).
///
/// All calls block. Reads may block indefinitely if the device yields
/// neither data nor an end-of-stream condition; that is the device's
/// behavior, not this crate's.
#[derive(Debug)]
pub struct Term {
    path: String,
    fd: RawFd,
}

impl Term {
    /// Opens an asynchronous communications port.
    ///
    /// The device is opened read-write, without becoming the process's
    /// controlling terminal, and with close-on-exec set so the
    /// descriptor does not leak into child processes. None of this is
    /// configurable.
    pub fn open(path: &str) -> Result<Self, Error> {
        let flags = OFlag::O_NOCTTY | OFlag::O_CLOEXEC | OFlag::O_RDWR;

        let fd = fcntl::open(path, flags, Mode::empty()).map_err(|source| Error::Open {
            path: path.into(),
            source,
        })?;

        debug!(%path, fd, "Opened terminal device");

        Ok(Self {
            path: path.into(),
            fd,
        })
    }

    /// The device path this handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The live descriptor, or [`Error::Closed`] after `close`.
    /// Every operation passes through here so a stale descriptor number
    /// can never reach the OS.
    fn fd(&self) -> Result<RawFd, Error> {
        if self.fd == CLOSED {
            Err(Error::Closed(self.path.clone()))
        } else {
            Ok(self.fd)
        }
    }

    /// Reads up to `buf.len()` bytes from the terminal, returning the
    /// number of bytes read.
    ///
    /// A zero-byte result for a non-empty `buf` with no OS error is the
    /// end of the stream and is reported as [`Error::EndOfStream`].
    /// Short reads are normal: the raw count is returned without error
    /// and callers handle partial reads themselves.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let fd = self.fd()?;

        match unistd::read(fd, buf) {
            Ok(0) if !buf.is_empty() => Err(Error::EndOfStream),
            Ok(n) => Ok(n),
            Err(source) => Err(Error::Io {
                op: "read",
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Writes `buf` to the terminal, returning the number of bytes
    /// written.
    ///
    /// A count short of `buf.len()` is reported as
    /// [`Error::ShortWrite`]; success always means the whole buffer was
    /// accepted.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        let fd = self.fd()?;

        match unistd::write(fd, buf) {
            Ok(n) if n != buf.len() => Err(Error::ShortWrite {
                written: n,
                requested: buf.len(),
            }),
            Ok(n) => Ok(n),
            Err(source) => Err(Error::Io {
                op: "write",
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Closes the device and releases the descriptor.
    ///
    /// The handle is marked closed before the OS result is known, so
    /// even a failed close leaves nothing that could be mistaken for a
    /// live descriptor. Any later call, including another `close`,
    /// fails with [`Error::Closed`].
    pub fn close(&mut self) -> Result<(), Error> {
        let fd = self.fd()?;
        self.fd = CLOSED;

        debug!(path = %self.path, fd, "Closing terminal device");

        unistd::close(fd).map_err(|source| Error::Io {
            op: "close",
            path: self.path.clone(),
            source,
        })
    }

    /// Sets the receive and transmit baud rates, applied immediately.
    ///
    /// Rates without a line-discipline encoding are rejected with
    /// [`Error::UnsupportedSpeed`] before the device is touched.
    pub fn set_speed(&self, baud: u32) -> Result<(), Error> {
        line::set_speed(self.fd()?, &self.path, baud)
    }

    /// Discards both data received but not read, and data written but
    /// not transmitted.
    pub fn flush(&self) -> Result<(), Error> {
        line::flush(self.fd()?, &self.path)
    }

    /// Sends a break signal for the OS default duration.
    pub fn send_break(&self) -> Result<(), Error> {
        line::send_break(self.fd()?, &self.path)
    }

    /// The state of the "MODEM" bits.
    pub fn status(&self) -> Result<Status, Error> {
        line::status(self.fd()?, &self.path)
    }

    /// Sets the state of the "MODEM" bits, verbatim.
    pub fn set_status(&self, status: Status) -> Result<(), Error> {
        line::set_status(self.fd()?, &self.path, status)
    }
}

impl Drop for Term {
    fn drop(&mut self) {
        if self.fd == CLOSED {
            return;
        }

        if let Err(e) = self.close() {
            warn!(path = %self.path, ?e, "Problem closing terminal device");
        }
    }
}

/// Follows the std convention: end of stream is `Ok(0)`, not an error.
impl io::Read for Term {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match Term::read(self, buf) {
            Ok(n) => Ok(n),
            Err(Error::EndOfStream) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

/// Follows the std convention: short writes return the partial count,
/// and `flush` waits for pending output to be transmitted (it does not
/// discard anything; that is [`Term::flush`]).
impl io::Write for Term {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match Term::write(self, buf) {
            Ok(n) => Ok(n),
            Err(Error::ShortWrite { written, .. }) => Ok(written),
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let fd = self.fd()?;
        line::drain(fd, &self.path).map_err(Into::into)
    }
}
