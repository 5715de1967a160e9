//! Closed vocabularies used in command arguments and reply fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! word_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident => $word:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// The word the module uses on the wire.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $word),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownWord;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($word => Ok($name::$variant),)+
                    other => Err(UnknownWord(other.to_string())),
                }
            }
        }
    };
}

/// A reply word outside the vocabulary being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWord(pub String);

impl fmt::Display for UnknownWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown word {:?}", self.0)
    }
}

impl std::error::Error for UnknownWord {}

word_enum! {
    /// Module log verbosity.
    pub enum LogLevel {
        Debug => "debug",
        Info => "info",
    }
}

word_enum! {
    /// GPIO port letter. There is no port G on the module.
    pub enum GpioGroup {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        E => "E",
        F => "F",
        H => "H",
    }
}

word_enum! {
    /// GPIO direction.
    pub enum PinMode {
        Input => "0",
        Output => "1",
    }
}

word_enum! {
    /// LoRaWAN activation method.
    pub enum JoinMode {
        Otaa => "otaa",
        Abp => "abp",
    }
}

word_enum! {
    /// LoRaWAN device class supported by the module.
    pub enum DeviceClass {
        A => "A",
        C => "C",
    }
}

word_enum! {
    /// Uplink acknowledgement mode for `mac tx`.
    pub enum Confirm {
        Confirmed => "cnf",
        Unconfirmed => "ucnf",
    }
}

word_enum! {
    /// Periodic uplink behavior.
    pub enum TxMode {
        Cycle => "cycle",
        NoCycle => "no_cycle",
    }
}

word_enum! {
    /// GNSS operating mode.
    pub enum GpsMode {
        Auto => "auto",
        Manual => "manual",
        Idle => "idle",
    }
}

word_enum! {
    /// GNSS receiver start type.
    pub enum GpsStartMode {
        Hot => "hot",
        Warm => "warm",
        Cold => "cold",
    }
}

word_enum! {
    /// Payload format the module uses when it uplinks positions itself.
    pub enum UplinkFormat {
        Raw => "raw",
        Ipso => "ipso",
        Kiwi => "kiwi",
        UtcPos => "utc_pos",
    }
}

word_enum! {
    /// Satellite constellations used for a fix.
    pub enum SatelliteSystem {
        Gps => "gps",
        Hybrid => "hybrid",
    }
}

word_enum! {
    /// Coordinate representation requested from `gps get_data`.
    pub enum GpsDataFormat {
        /// Decimal degrees as the receiver reports them.
        Raw => "raw",
        /// Decimal degrees.
        Dd => "dd",
        /// Degrees, minutes, seconds.
        Dms => "dms",
    }
}

impl GpsDataFormat {
    /// Tag that leads a fix reply in this format.
    pub fn tag(self) -> &'static str {
        match self {
            GpsDataFormat::Raw => "RAW",
            GpsDataFormat::Dd => "DD",
            GpsDataFormat::Dms => "DMS",
        }
    }
}

word_enum! {
    /// GNSS sleep depth.
    pub enum GpsSleep {
        Light => "0",
        Deep => "1",
    }
}

word_enum! {
    /// Known firmware builds; they differ in a few reply shapes.
    pub enum FirmwareVersion {
        V165G9 => "v1.6.5-g9",
        V166G11 => "v1.6.6-g11",
    }
}

word_enum! {
    /// Module hardware model.
    pub enum Model {
        S76G => "S76G",
        S78G => "S78G",
    }
}

/// Render a boolean the way the module spells switches.
pub(crate) fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}
