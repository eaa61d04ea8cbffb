//! Every control operation here is a fresh fetch from the OS, a mutation,
//! and a store back. Nothing is cached between calls, so external
//! reconfiguration of the same device is picked up rather than clobbered
//! with stale attributes.

use std::os::unix::io::RawFd;

use libc::c_int;
use nix::errno::Errno;
use nix::sys::termios::{self, BaudRate, FlushArg, SetArg};
use tracing::trace;

use crate::error::Error;
use crate::status::Status;

nix::ioctl_read_bad!(tiocmget, libc::TIOCMGET, c_int);
nix::ioctl_write_ptr_bad!(tiocmset, libc::TIOCMSET, c_int);

fn attr_error<'p>(op: &'static str, path: &'p str) -> impl FnOnce(Errno) -> Error + 'p {
    move |source| Error::Attributes {
        op,
        path: path.into(),
        source,
    }
}

/// Maps a numeric rate onto the line-discipline encoding.
///
/// Unsupported rates are an error, never rounded to a neighbor.
fn baud_rate(baud: u32) -> Result<BaudRate, Error> {
    use BaudRate::*;

    Ok(match baud {
        50 => B50,
        75 => B75,
        110 => B110,
        134 => B134,
        150 => B150,
        200 => B200,
        300 => B300,
        600 => B600,
        1200 => B1200,
        1800 => B1800,
        2400 => B2400,
        4800 => B4800,
        9600 => B9600,
        19200 => B19200,
        38400 => B38400,
        57600 => B57600,
        115_200 => B115200,
        230_400 => B230400,
        #[cfg(target_os = "linux")]
        460_800 => B460800,
        #[cfg(target_os = "linux")]
        500_000 => B500000,
        #[cfg(target_os = "linux")]
        576_000 => B576000,
        #[cfg(target_os = "linux")]
        921_600 => B921600,
        #[cfg(target_os = "linux")]
        1_000_000 => B1000000,
        #[cfg(target_os = "linux")]
        1_152_000 => B1152000,
        #[cfg(target_os = "linux")]
        1_500_000 => B1500000,
        #[cfg(target_os = "linux")]
        2_000_000 => B2000000,
        #[cfg(target_os = "linux")]
        2_500_000 => B2500000,
        #[cfg(target_os = "linux")]
        3_000_000 => B3000000,
        #[cfg(target_os = "linux")]
        3_500_000 => B3500000,
        #[cfg(target_os = "linux")]
        4_000_000 => B4000000,
        _ => return Err(Error::UnsupportedSpeed(baud)),
    })
}

/// Sets both the receive and transmit rates, applied immediately
/// (no draining of pending output).
pub(crate) fn set_speed(fd: RawFd, path: &str, baud: u32) -> Result<(), Error> {
    let rate = baud_rate(baud)?;

    let mut attrs = termios::tcgetattr(fd).map_err(attr_error("tcgetattr", path))?;
    termios::cfsetspeed(&mut attrs, rate).map_err(attr_error("cfsetspeed", path))?;

    trace!(%path, baud, "Setting line speed");
    termios::tcsetattr(fd, SetArg::TCSANOW, &attrs).map_err(attr_error("tcsetattr", path))
}

/// Discards data received but not read, and data written but not
/// transmitted.
pub(crate) fn flush(fd: RawFd, path: &str) -> Result<(), Error> {
    trace!(%path, "Flushing both queues");
    termios::tcflush(fd, FlushArg::TCIOFLUSH).map_err(attr_error("tcflush", path))
}

/// Blocks until all written data has been transmitted.
pub(crate) fn drain(fd: RawFd, path: &str) -> Result<(), Error> {
    termios::tcdrain(fd).map_err(attr_error("tcdrain", path))
}

/// Sends a break signal for the OS default duration.
pub(crate) fn send_break(fd: RawFd, path: &str) -> Result<(), Error> {
    trace!(%path, "Sending break");
    termios::tcsendbreak(fd, 0).map_err(attr_error("tcsendbreak", path))
}

/// Reads the modem status bits.
pub(crate) fn status(fd: RawFd, path: &str) -> Result<Status, Error> {
    let mut bits: c_int = 0;
    unsafe { tiocmget(fd, &mut bits) }.map_err(attr_error("TIOCMGET", path))?;

    Ok(Status(bits))
}

/// Writes the modem status bits verbatim.
pub(crate) fn set_status(fd: RawFd, path: &str, status: Status) -> Result<(), Error> {
    trace!(%path, %status, "Setting modem status bits");

    let bits = status.0;
    unsafe { tiocmset(fd, &bits) }.map_err(attr_error("TIOCMSET", path))?;

    Ok(())
}
