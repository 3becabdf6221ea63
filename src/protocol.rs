use arrayvec::ArrayString;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;

/// Longest SDI-12 command frame this driver issues, in characters,
/// including the address prefix and the `!` terminator.
pub const MAX_COMMAND_LEN: usize = 4;

/// Contact attempts per address when probing for a live device.
pub const PROBE_ATTEMPTS: u32 = 3;
/// Spacing between contact attempts.
pub const PROBE_RETRY_DELAY_MS: u32 = 30;
/// Reply polling step. Interoperability constant: must exceed the
/// per-character transmission time so each poll can see a fresh byte.
pub const POLL_INTERVAL_MS: u32 = 9;
/// Fixed device turnaround latency before the first reply character.
pub const RESPONSE_LATENCY_MS: u32 = 12;
/// Transmission time per character (~8.3 ms at 1200 baud, rounded down).
pub const CHAR_TIME_MS: u32 = 8;
/// Default bus settle time after power-up.
pub const DEFAULT_SETTLE_MS: u32 = 500;
/// Default reply deadline for a measurement exchange.
pub const DEFAULT_TIMEOUT_MS: u32 = 5000;

const_assert!(POLL_INTERVAL_MS > CHAR_TIME_MS);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("no sensor address configured")]
    NoAddress,
    #[error("address must be one of 0-9, a-z, A-Z")]
    InvalidAddress,
    #[error("command is empty or not ASCII")]
    InvalidCommand,
    #[error("command exceeds {MAX_COMMAND_LEN} characters")]
    CommandTooLong,
    #[error("timed out waiting for sensor reply")]
    Timeout,
    #[error("reply did not start with the sensor address")]
    AddressMismatch,
    #[error("reply too short to carry a checksum trailer")]
    TruncatedReply,
    #[error("reply checksum trailer is invalid")]
    BadTrailer,
}

/// One device address on the shared bus.
///
/// Valid addresses are `'0'-'9'`, `'a'-'z'` and `'A'-'Z'`; "no address" is
/// `Option::<SensorAddress>::None`, never an in-band character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct SensorAddress(char);

impl SensorAddress {
    /// Factory-default device address.
    pub const DEFAULT: SensorAddress = SensorAddress('0');

    pub fn new(c: char) -> Option<Self> {
        c.is_ascii_alphanumeric().then_some(Self(c))
    }

    pub fn as_char(self) -> char {
        self.0
    }

    /// All addresses in discovery priority order: the factory default and
    /// the rest of `0-9` first, then `a-z`, then `A-Z`.
    pub fn scan_order() -> impl Iterator<Item = SensorAddress> {
        ('0'..='9').chain('a'..='z').chain('A'..='Z').map(SensorAddress)
    }
}

impl TryFrom<char> for SensorAddress {
    type Error = ProtocolError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::new(c).ok_or(ProtocolError::InvalidAddress)
    }
}

impl From<SensorAddress> for char {
    fn from(address: SensorAddress) -> char {
        address.0
    }
}

impl core::fmt::Display for SensorAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bounded ASCII command frame, e.g. `aR3!`.
///
/// The first character is a placeholder for the device address and is
/// overwritten at transmission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementCommand(ArrayString<MAX_COMMAND_LEN>);

impl MeasurementCommand {
    pub fn parse(command: &str) -> Result<Self, ProtocolError> {
        if command.is_empty() || !command.is_ascii() {
            return Err(ProtocolError::InvalidCommand);
        }
        ArrayString::from(command)
            .map(Self)
            .map_err(|_| ProtocolError::CommandTooLong)
    }

    /// Returns the command with `address` substituted as its first character.
    pub fn addressed(&self, address: SensorAddress) -> Self {
        let mut buf = ArrayString::new();
        buf.push(address.as_char());
        buf.push_str(&self.0[1..]);
        Self(buf)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for MeasurementCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
