use serde::{Deserialize, Serialize};

/// Battery-sense voltage divider parameters.
///
/// The ADC sits behind a resistor divider; converting a raw reading back
/// to battery millivolts needs the reference voltage and both resistors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryDivider {
    pub aref_volts: f32,
    pub r1_kohm: f32,
    pub r2_kohm: f32,
}

impl BatteryDivider {
    /// Converts a raw 10-bit ADC reading to battery millivolts.
    pub fn millivolts_from_raw(&self, raw: u16) -> f32 {
        (self.aref_volts / 1.023) * (self.r1_kohm + self.r2_kohm) / self.r2_kohm * f32::from(raw)
    }
}

/// Board identity as data: pin assignment and battery-sense parameters
/// injected at construction instead of compiled-in globals.
///
/// The logger core never touches GPIO itself; these values are handed to
/// the board support layer that implements the capability traits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rtc_interrupt_pin: u8,
    pub button_pin: u8,
    pub sd_chip_select_pin: u8,
    /// Card-detect switch, on boards that wire one.
    pub sd_card_detect_pin: Option<u8>,
    pub led_pin: u8,
    pub error_led_pin: u8,
    /// Data pin of the sensor bus.
    pub sensor_data_pin: u8,
    /// Battery voltage divider, on boards that expose one.
    pub battery: Option<BatteryDivider>,
}

impl BoardConfig {
    /// Sodaq Autonomo (SAMD21) field deployment board.
    pub fn sodaq_autonomo() -> Self {
        Self {
            rtc_interrupt_pin: 10,
            button_pin: 15,
            sd_chip_select_pin: 45,
            sd_card_detect_pin: None,
            led_pin: 13,
            error_led_pin: 13,
            sensor_data_pin: 3,
            battery: Some(BatteryDivider {
                aref_volts: 3.3,
                r1_kohm: 4.7,
                r2_kohm: 10.0,
            }),
        }
    }

    /// Adafruit Feather M0 Adalogger.
    pub fn feather_m0_adalogger() -> Self {
        Self {
            rtc_interrupt_pin: 11,
            button_pin: 1,
            sd_chip_select_pin: 4,
            sd_card_detect_pin: Some(7),
            led_pin: 8,
            error_led_pin: 13,
            sensor_data_pin: 12,
            battery: None,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
