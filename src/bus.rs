use arrayvec::ArrayString;
use tracing::{debug, info, warn};

use crate::protocol::{
    MeasurementCommand, ProtocolError, SensorAddress, CHAR_TIME_MS, POLL_INTERVAL_MS,
    PROBE_ATTEMPTS, PROBE_RETRY_DELAY_MS, RESPONSE_LATENCY_MS,
};
use crate::transport::{BusTransport, Delay};

// R3/R4 reports: reply payload after the echoed address starts with a
// sensortype character (skipped) and ends with a 2-character trailer
// before CR LF.
const REPORT_EXPECTED_LEN: usize = 35;
const REPORT_SKIP: u32 = 1;
const REPORT_STOP_BYTE: u8 = b'\r';

/// Driver for one device on a shared, half-duplex, address-routed bus.
///
/// Owns a single logical address slot. The bus medium itself is shared;
/// callers must serialize access across driver instances.
pub struct SensorBus<T: BusTransport, D: Delay> {
    transport: T,
    delay: D,
    address: Option<SensorAddress>,
}

impl<T: BusTransport, D: Delay> SensorBus<T, D> {
    /// Creates a driver assuming the factory-default address `'0'`.
    pub fn new(transport: T, delay: D) -> Self {
        Self::with_address(transport, delay, SensorAddress::DEFAULT)
    }

    pub fn with_address(transport: T, delay: D, address: SensorAddress) -> Self {
        Self {
            transport,
            delay,
            address: Some(address),
        }
    }

    pub fn address(&self) -> Option<SensorAddress> {
        self.address
    }

    pub fn set_address(&mut self, address: Option<SensorAddress>) {
        self.address = address;
    }

    /// Starts the transceiver and waits `settle_ms` for the line and the
    /// attached devices to settle.
    pub fn init(&mut self, settle_ms: u32) {
        self.transport.start();
        self.delay.delay_ms(settle_ms);
        debug!(settle_ms, "sensor bus started");
    }

    /// Probes `address` with up to 3 attention commands, 30 ms apart.
    /// Anything heard back counts as a live device.
    pub fn is_responding(&mut self, address: SensorAddress) -> bool {
        let mut frame = ArrayString::<2>::new();
        frame.push(address.as_char());
        frame.push('!');
        for _ in 0..PROBE_ATTEMPTS {
            self.transport.send_command(&frame);
            self.delay.delay_ms(PROBE_RETRY_DELAY_MS);
            if self.transport.available() {
                self.transport.clear_input();
                return true;
            }
        }
        self.transport.clear_input();
        false
    }

    /// Probes the currently configured address.
    pub fn is_connected(&mut self) -> bool {
        match self.address {
            Some(address) => self.is_responding(address),
            None => false,
        }
    }

    /// Scans the address space and adopts the first responding address.
    ///
    /// Scan order is a fixed priority: `'0'-'9'` (factory default first),
    /// then `'a'-'z'`, then `'A'-'Z'`. Adopts and returns `None` when the
    /// whole space stays silent.
    pub fn discover_address(&mut self) -> Option<SensorAddress> {
        for address in SensorAddress::scan_order() {
            if self.is_responding(address) {
                info!(%address, "sensor found");
                self.address = Some(address);
                return self.address;
            }
        }
        warn!("no sensor responded during address scan");
        self.address = None;
        None
    }

    /// Executes one timed measurement exchange and appends the filtered
    /// reply text to `out`.
    ///
    /// `command` is at most 4 ASCII characters; its first character is
    /// replaced with the configured address before transmission.
    /// `expected_len` sizes the initial wait for the reply, `timeout_ms`
    /// bounds the whole exchange, `skip` drops that many leading payload
    /// characters, and a character equal to `stop_byte` stops appending.
    /// The reply is drained until its terminating line-feed either way, so
    /// the device finishes transmitting before this returns.
    pub fn measure(
        &mut self,
        out: &mut String,
        command: &str,
        expected_len: usize,
        timeout_ms: u32,
        mut skip: u32,
        stop_byte: u8,
    ) -> Result<(), ProtocolError> {
        let address = self.address.ok_or(ProtocolError::NoAddress)?;
        let command = MeasurementCommand::parse(command)?.addressed(address);

        self.transport.clear_input();
        out.reserve(expected_len);
        self.transport.send_command(command.as_str());

        // Initial estimate for the full round trip at 1200 baud.
        let initial_wait =
            RESPONSE_LATENCY_MS + CHAR_TIME_MS * (command.len() as u32 + expected_len as u32);
        self.delay.delay_ms(initial_wait);

        let mut elapsed = initial_wait;
        let mut awaiting_echo = true;
        let mut appending = true;
        loop {
            let byte = if self.transport.available() {
                self.transport.read_byte()
            } else {
                None
            };
            let Some(byte) = byte else {
                self.delay.delay_ms(POLL_INTERVAL_MS);
                elapsed += POLL_INTERVAL_MS;
                if elapsed > timeout_ms {
                    return Err(ProtocolError::Timeout);
                }
                continue;
            };

            if awaiting_echo {
                if byte != address.as_char() as u8 {
                    return Err(ProtocolError::AddressMismatch);
                }
                awaiting_echo = false;
                continue;
            }
            if byte == b'\n' {
                return Ok(());
            }
            if skip > 0 {
                skip -= 1;
                continue;
            }
            if byte == stop_byte {
                appending = false;
            }
            if appending {
                out.push(char::from(byte));
            }
        }
    }

    /// Issues an `R3!` continuous measurement reporting averaged values
    /// and appends the cleaned result to `out`.
    ///
    /// Do not issue more frequently than every 20 s.
    pub fn measure_r3(&mut self, out: &mut String, timeout_ms: u32) -> Result<(), ProtocolError> {
        self.measure_report(out, "aR3!", timeout_ms)
    }

    /// Issues an `R4!` instantaneous measurement and appends the cleaned
    /// result to `out`.
    ///
    /// Do not issue more frequently than every 10 s.
    pub fn measure_r4(&mut self, out: &mut String, timeout_ms: u32) -> Result<(), ProtocolError> {
        self.measure_report(out, "aR4!", timeout_ms)
    }

    // Shared R3/R4 path: run the exchange, strip the sensortype/checksum
    // trailer, convert the value separators to tabs.
    fn measure_report(
        &mut self,
        out: &mut String,
        command: &str,
        timeout_ms: u32,
    ) -> Result<(), ProtocolError> {
        let offset = out.len();
        self.measure(
            out,
            command,
            REPORT_EXPECTED_LEN,
            timeout_ms,
            REPORT_SKIP,
            REPORT_STOP_BYTE,
        )?;

        if out[offset..].chars().count() < 2 {
            return Err(ProtocolError::TruncatedReply);
        }
        if !out.ends_with('0') {
            return Err(ProtocolError::BadTrailer);
        }
        out.pop();
        out.pop();

        let converted: String = out[offset..]
            .chars()
            .map(|c| if c == ' ' { '\t' } else { c })
            .collect();
        out.truncate(offset);
        out.push_str(&converted);
        Ok(())
    }
}
