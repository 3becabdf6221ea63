use serde::{Deserialize, Serialize};

/// A calendar date as reported by the external real-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// Real-time clock service supplying the current calendar date.
///
/// Log file names embed the date, so the logger reads this once per file
/// creation. Timestamping individual records is the caller's concern.
pub trait Clock {
    fn today(&mut self) -> CalendarDate;
}
