use std::fmt::Display;

use libc::c_int;

/// The current "MODEM" status bits, which consist of all of the RS-232
/// signal lines except RXD and TXD.
///
/// This is a plain value. It does not track the device it was read from;
/// push changes back with [`crate::Term::set_status`].
///
/// The bit layout is the platform's own (`libc::TIOCM_*`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub(crate) c_int);

/// The signal lines we know by name, for [`Display`].
const LINES: &[(c_int, &str)] = &[
    (libc::TIOCM_DTR, "DTR"),
    (libc::TIOCM_RTS, "RTS"),
    (libc::TIOCM_CTS, "CTS"),
    (libc::TIOCM_DSR, "DSR"),
    (libc::TIOCM_CAR, "CD"),
    (libc::TIOCM_RNG, "RI"),
];

/// Generates the accessors for one signal line from its bit constant.
/// Each accessor may only touch its own bit.
macro_rules! modem_line {
    ($bit:path, $(#[$get_meta:meta])* $get:ident, $(#[$set_meta:meta])* $set:ident) => {
        modem_line!($bit, $(#[$get_meta])* $get);

        $(#[$set_meta])*
        pub fn $set(&mut self, asserted: bool) {
            if asserted {
                self.0 |= $bit;
            } else {
                self.0 &= !$bit;
            }
        }
    };
    ($bit:path, $(#[$get_meta:meta])* $get:ident) => {
        $(#[$get_meta])*
        pub fn $get(&self) -> bool {
            self.0 & $bit == $bit
        }
    };
}

impl Status {
    modem_line!(
        libc::TIOCM_DTR,
        /// The state of the DTR (data terminal ready) signal.
        dtr,
        /// Sets or clears the DTR (data terminal ready) signal.
        set_dtr
    );

    modem_line!(
        libc::TIOCM_RTS,
        /// The state of the RTS (request to send) signal.
        rts,
        /// Sets or clears the RTS (request to send) signal.
        set_rts
    );

    modem_line!(
        libc::TIOCM_CTS,
        /// The state of the CTS (clear to send) signal.
        /// Driven by the peer; there is no setter.
        cts
    );

    modem_line!(
        libc::TIOCM_DSR,
        /// The state of the DSR (data set ready) signal.
        /// Driven by the peer; there is no setter.
        dsr
    );

    modem_line!(
        libc::TIOCM_CAR,
        /// The state of the CD (carrier detect) signal.
        /// Driven by the peer; there is no setter.
        carrier_detect
    );

    modem_line!(
        libc::TIOCM_RNG,
        /// The state of the RI (ring indicator) signal.
        /// Driven by the peer; there is no setter.
        ring
    );
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut asserted = LINES
            .iter()
            .filter(|(bit, _)| self.0 & *bit == *bit)
            .map(|(_, name)| *name);

        match asserted.next() {
            None => write!(f, "(none)"),
            Some(first) => {
                write!(f, "{first}")?;
                for name in asserted {
                    write!(f, " {name}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dtr_round_trip() {
        let mut status = Status::default();
        assert!(!status.dtr());

        status.set_dtr(true);
        assert!(status.dtr());

        status.set_dtr(false);
        assert!(!status.dtr());
    }

    #[test]
    fn toggling_dtr_leaves_unrelated_lines_alone() {
        let mut status = Status::default();
        status.set_rts(true);

        status.set_dtr(true);
        status.set_dtr(false);

        assert!(status.rts());
        assert!(!status.dtr());
    }

    #[test]
    fn setting_a_line_twice_is_idempotent() {
        let mut status = Status::default();
        status.set_dtr(true);
        let once = status;

        status.set_dtr(true);
        assert_eq!(once, status);
    }

    #[test]
    fn display_names_asserted_lines() {
        let mut status = Status::default();
        assert_eq!(status.to_string(), "(none)");

        status.set_dtr(true);
        status.set_rts(true);
        assert_eq!(status.to_string(), "DTR RTS");
    }

    #[test]
    fn input_lines_read_the_native_bits() {
        let status = Status(libc::TIOCM_CTS | libc::TIOCM_CAR);

        assert!(status.cts());
        assert!(status.carrier_detect());
        assert!(!status.dsr());
        assert!(!status.ring());
    }
}
