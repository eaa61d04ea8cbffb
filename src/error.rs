use std::io;

use nix::errno::Errno;
use thiserror::Error;

/// Any error this library might encounter.
#[derive(Debug, Error)]
pub enum Error {
    /// The device could not be opened.
    #[error("Could not open `{path}`")]
    Open {
        /// The device path given to open.
        path: String,

        /// The OS error code.
        #[source]
        source: Errno,
    },

    /// An OS-level I/O failure.
    #[error("Operation `{op}` failed on `{path}`")]
    Io {
        /// The failing operation, e.g. "read".
        op: &'static str,

        /// The device path.
        path: String,

        /// The OS error code.
        #[source]
        source: Errno,
    },

    /// A write moved fewer bytes than requested without the OS
    /// reporting a failure.
    #[error("Short write: {written} of {requested} bytes")]
    ShortWrite {
        /// Bytes the OS accepted.
        written: usize,

        /// Bytes we asked it to accept.
        requested: usize,
    },

    /// A read into a non-empty buffer returned zero bytes with no OS
    /// error. The expected end of the stream, not a failure.
    #[error("End of stream")]
    EndOfStream,

    /// A line-attribute fetch or store failed. The device is left in
    /// whatever state the OS left it in; nothing is rolled back.
    #[error("Operation `{op}` on the line attributes of `{path}` failed")]
    Attributes {
        /// The failing half of the cycle, e.g. "tcgetattr".
        op: &'static str,

        /// The device path.
        path: String,

        /// The OS error code.
        #[source]
        source: Errno,
    },

    /// The requested baud rate has no line-discipline encoding.
    /// Rates are never rounded to a nearby supported one.
    #[error("Unsupported baud rate `{0}`")]
    UnsupportedSpeed(u32),

    /// The handle was used after `close`.
    #[error("Device `{0}` is closed")]
    Closed(String),
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Open { source, .. }
            | Error::Io { source, .. }
            | Error::Attributes { source, .. } => io::Error::from_raw_os_error(source as i32),
            Error::ShortWrite { .. } => io::Error::new(io::ErrorKind::WriteZero, e.to_string()),
            Error::EndOfStream => io::Error::new(io::ErrorKind::UnexpectedEof, e.to_string()),
            Error::UnsupportedSpeed(_) => io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
            Error::Closed(_) => io::Error::new(io::ErrorKind::NotConnected, e.to_string()),
        }
    }
}
