//! Exercises a real pseudo-terminal pair: the master side plays the role
//! of the far end of the line, the slave side is opened through [`Term`]
//! like any serial device node.
//!
//! Modem-bit ioctls are not supported by the pty driver, so those error
//! paths are covered via `/dev/null` and the pure bit logic lives in the
//! unit tests.

use std::os::unix::io::AsRawFd;

use color_eyre::Result;
use nix::fcntl::OFlag;
use nix::pty::{grantpt, posix_openpt, ptsname_r, unlockpt, PtyMaster};
use nix::sys::termios::{self, SetArg};
use serial_line::{Error, Status, Term};

/// A fresh pty pair in raw mode (no echo, no canonical line buffering),
/// so bytes pass through both directions unmangled.
fn raw_pty() -> Result<(PtyMaster, String)> {
    let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY)?;
    grantpt(&master)?;
    unlockpt(&master)?;

    let slave_path = ptsname_r(&master)?;

    let mut attrs = termios::tcgetattr(master.as_raw_fd())?;
    termios::cfmakeraw(&mut attrs);
    termios::tcsetattr(master.as_raw_fd(), SetArg::TCSANOW, &attrs)?;

    Ok((master, slave_path))
}

#[test]
fn open_then_close_does_not_leak_the_device() -> Result<()> {
    let (_master, path) = raw_pty()?;

    let mut term = Term::open(&path)?;
    term.close()?;

    // Same node must still be openable.
    let mut term = Term::open(&path)?;
    term.close()?;

    Ok(())
}

#[test]
fn open_missing_device_fails() {
    let err = Term::open("/dev/serial-line-does-not-exist").unwrap_err();

    assert!(matches!(err, Error::Open { .. }), "got {err:?}");
}

#[test]
fn loopback_round_trip() -> Result<()> {
    let (master, path) = raw_pty()?;

    let mut term = Term::open(&path)?;
    term.set_speed(9600)?;

    nix::unistd::write(master.as_raw_fd(), b"hello")?;

    let mut buf = [0u8; 32];
    let n = term.read(&mut buf)?;
    assert_eq!(&buf[..n], b"hello");

    let n = term.write(b"olleh")?;
    assert_eq!(n, 5);

    let mut buf = [0u8; 32];
    let n = nix::unistd::read(master.as_raw_fd(), &mut buf)?;
    assert_eq!(&buf[..n], b"olleh");

    term.close()?;

    Ok(())
}

#[test]
fn zero_length_read_is_never_end_of_stream() -> Result<()> {
    let (_master, path) = raw_pty()?;

    let mut term = Term::open(&path)?;

    // No data is pending; a zero-length request must neither block nor
    // report end of stream.
    let n = term.read(&mut [])?;
    assert_eq!(n, 0);

    term.close()?;

    Ok(())
}

#[test]
fn end_of_stream_on_an_exhausted_device() -> Result<()> {
    let mut term = Term::open("/dev/null")?;

    assert!(matches!(term.read(&mut [0u8; 4]), Err(Error::EndOfStream)));

    term.close()?;

    Ok(())
}

#[test]
fn every_operation_fails_after_close() -> Result<()> {
    let (_master, path) = raw_pty()?;

    let mut term = Term::open(&path)?;
    term.close()?;

    assert!(matches!(term.read(&mut [0u8; 4]), Err(Error::Closed(_))));
    assert!(matches!(term.write(b"hi"), Err(Error::Closed(_))));
    assert!(matches!(term.set_speed(9600), Err(Error::Closed(_))));
    assert!(matches!(term.flush(), Err(Error::Closed(_))));
    assert!(matches!(term.send_break(), Err(Error::Closed(_))));
    assert!(matches!(term.status(), Err(Error::Closed(_))));
    assert!(matches!(
        term.set_status(Status::default()),
        Err(Error::Closed(_))
    ));
    assert!(matches!(term.close(), Err(Error::Closed(_))));

    Ok(())
}

#[test]
fn dropping_an_open_handle_releases_the_device() -> Result<()> {
    let (_master, path) = raw_pty()?;

    {
        let _term = Term::open(&path)?;
    }

    let mut term = Term::open(&path)?;
    term.close()?;

    Ok(())
}

#[test]
fn unsupported_speed_is_rejected_not_rounded() -> Result<()> {
    let (_master, path) = raw_pty()?;

    let term = Term::open(&path)?;

    match term.set_speed(12_345) {
        Err(Error::UnsupportedSpeed(baud)) => assert_eq!(baud, 12_345),
        other => panic!("expected rejection, got {other:?}"),
    }

    Ok(())
}

#[test]
fn attribute_errors_carry_operation_and_path() -> Result<()> {
    // /dev/null is a character device but not a terminal, so the
    // attribute fetch itself fails.
    let mut term = Term::open("/dev/null")?;

    match term.set_speed(9600) {
        Err(Error::Attributes { op, path, .. }) => {
            assert_eq!(op, "tcgetattr");
            assert_eq!(path, "/dev/null");
        }
        other => panic!("expected attribute error, got {other:?}"),
    }

    assert!(matches!(term.status(), Err(Error::Attributes { .. })));

    term.close()?;

    Ok(())
}

#[test]
fn flush_and_break_succeed_on_a_live_line() -> Result<()> {
    let (_master, path) = raw_pty()?;

    let mut term = Term::open(&path)?;

    term.flush()?;
    term.send_break()?;

    term.close()?;

    Ok(())
}

#[test]
fn std_io_traits_follow_std_conventions() -> Result<()> {
    use std::io::{Read, Write};

    let (master, path) = raw_pty()?;

    let mut term = Term::open(&path)?;

    term.write_all(b"hello")?;

    let mut buf = [0u8; 32];
    let n = nix::unistd::read(master.as_raw_fd(), &mut buf)?;
    assert_eq!(&buf[..n], b"hello");

    term.close()?;

    // End of stream is Ok(0) through the std trait, not an error.
    let mut term = Term::open("/dev/null")?;
    let n = Read::read(&mut term, &mut [0u8; 4])?;
    assert_eq!(n, 0);
    term.close()?;

    Ok(())
}
