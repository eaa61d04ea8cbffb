#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

/// Possible errors in this library.
pub mod error;

/// Logging/tracing setup.
pub mod logging;

/// The terminal device handle: lifecycle, byte I/O and line control.
pub mod term;

/// The "MODEM" status bits.
pub mod status;

/// Line-discipline access: termios get-modify-set cycles and modem ioctls.
pub(crate) mod line;

pub use error::Error;
pub use status::Status;
pub use term::Term;
