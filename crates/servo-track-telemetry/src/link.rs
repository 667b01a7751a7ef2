use serde::{Deserialize, Serialize};

/// Baud rates the board UART can be configured for.
pub const SUPPORTED_BAUD_RATES: &[u32] = &[
    9_600, 19_200, 38_400, 57_600, 115_200, 230_400, 460_800, 921_600, 1_000_000, 1_500_000,
    2_000_000, 3_000_000,
];

/// Highest routable pad on the board's function-IO multiplexer.
const MAX_PIN: u8 = 63;

/// Invalid serial link settings.
///
/// Only the telemetry subsystem is affected: the session keeps running
/// without a link.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SerialConfigError {
    #[error("unsupported baud rate {0}")]
    UnsupportedBaud(u32),
    #[error("pin {pin} is out of range (0..=63)")]
    PinOutOfRange { pin: u8 },
    #[error("TX and RX cannot share pin {0}")]
    PinConflict(u8),
}

/// UART settings for the telemetry link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub tx_pin: u8,
    pub rx_pin: u8,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            tx_pin: 3,
            rx_pin: 4,
        }
    }
}

impl SerialSettings {
    pub fn validate(&self) -> Result<(), SerialConfigError> {
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(SerialConfigError::UnsupportedBaud(self.baud_rate));
        }
        for pin in [self.tx_pin, self.rx_pin] {
            if pin > MAX_PIN {
                return Err(SerialConfigError::PinOutOfRange { pin });
            }
        }
        if self.tx_pin == self.rx_pin {
            return Err(SerialConfigError::PinConflict(self.tx_pin));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = SerialSettings::default();
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!((settings.tx_pin, settings.rx_pin), (3, 4));
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad_baud = SerialSettings {
            baud_rate: 12_345,
            ..SerialSettings::default()
        };
        assert_eq!(
            bad_baud.validate(),
            Err(SerialConfigError::UnsupportedBaud(12_345))
        );

        let shared = SerialSettings {
            tx_pin: 4,
            ..SerialSettings::default()
        };
        assert_eq!(shared.validate(), Err(SerialConfigError::PinConflict(4)));

        let far = SerialSettings {
            rx_pin: 90,
            ..SerialSettings::default()
        };
        assert_eq!(
            far.validate(),
            Err(SerialConfigError::PinOutOfRange { pin: 90 })
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: SerialSettings = serde_json::from_str(r#"{"baud_rate": 9600}"#).unwrap();
        assert_eq!(settings.baud_rate, 9_600);
        assert_eq!(settings.tx_pin, 3);
    }
}
