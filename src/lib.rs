//! # Environmental Datalogger Core
//!
//! An embedded-style datalogging library providing buffered log-file
//! management on removable media and an SDI-12 sensor bus driver with
//! address discovery and timed measurement exchanges.
//!
//! ## Features
//!
//! - **Buffered file logging**: bounded append buffer, lazy file creation,
//!   date + sequence file naming
//! - **Size rotation**: files roll over before the FAT32 4 GiB ceiling
//! - **Hot-swap handling**: detach/attach protocol keeps records in memory
//!   while the card is out, with bounded, explicit data loss on overflow
//! - **Sensor bus driver**: address discovery over the full `0-9a-zA-Z`
//!   space, liveness probing, and a timed request/response exchange with
//!   skip/stop-byte reply filtering
//! - **Capability injection**: clock, storage, bus transport and delays are
//!   traits, so boards and tests plug in their own implementations
//!
//! ## Quick Start
//!
//! ```rust
//! use fieldlog::{BusTransport, Delay, SensorBus};
//!
//! // A bus with nothing attached: discovery scans the whole address
//! // space and comes back empty.
//! struct SilentBus;
//!
//! impl BusTransport for SilentBus {
//!     fn start(&mut self) {}
//!     fn send_command(&mut self, _frame: &str) {}
//!     fn available(&mut self) -> bool { false }
//!     fn read_byte(&mut self) -> Option<u8> { None }
//!     fn clear_input(&mut self) {}
//! }
//!
//! struct NoDelay;
//!
//! impl Delay for NoDelay {
//!     fn delay_ms(&mut self, _ms: u32) {}
//! }
//!
//! let mut bus = SensorBus::new(SilentBus, NoDelay);
//! bus.init(0);
//! assert!(bus.discover_address().is_none());
//! assert!(bus.address().is_none());
//! ```
//!
//! ## Architecture
//!
//! - [`logger`] - Buffered file logger with rotation and detach/attach
//! - [`bus`] - Sensor bus driver and measurement exchanges
//! - [`protocol`] - Addresses, command frames, timing constants, errors
//! - [`storage`] - Storage medium/file capability traits
//! - [`clock`] - Real-time clock capability trait
//! - [`transport`] - Bus transceiver and delay capability traits
//! - [`board`] - Board identity (pins, battery divider) as data

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::missing_errors_doc)]

pub mod board;
pub mod bus;
pub mod clock;
pub mod logger;
pub mod protocol;
pub mod storage;
pub mod transport;

// Re-export main public types for convenience
pub use board::{BatteryDivider, BoardConfig};
pub use bus::SensorBus;
pub use clock::{CalendarDate, Clock};
pub use logger::{BufferedFileLogger, LogError, LoggerConfig};
pub use protocol::{MeasurementCommand, ProtocolError, SensorAddress};
pub use storage::{StorageError, StorageFile, StorageMedium, MAX_FILE_SIZE};
pub use transport::{BusTransport, Delay, StdDelay};
