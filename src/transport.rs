use std::thread;
use std::time::Duration;

/// Half-duplex sensor bus transceiver.
///
/// Models the wire primitives the bus driver needs: transmit a complete
/// command frame, poll for pending reply bytes, consume them one at a
/// time, and drop whatever is left in the receive buffer. The electrical
/// layer (line breaks, marking, 1200-baud framing) lives behind this trait.
pub trait BusTransport {
    /// Powers up the transceiver and starts listening.
    fn start(&mut self);

    /// Transmits `frame` on the bus.
    fn send_command(&mut self, frame: &str);

    /// Reports whether at least one reply byte is waiting.
    fn available(&mut self) -> bool;

    /// Consumes and returns the next reply byte, if any.
    fn read_byte(&mut self) -> Option<u8>;

    /// Discards all pending reply bytes.
    fn clear_input(&mut self);
}

/// Blocking millisecond delay.
///
/// Injected rather than called directly so tests can advance time without
/// sleeping; the bus driver's polling loops are built on this.
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// [`Delay`] backed by the OS scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
