//! Driver for AcSIP S7xG LoRa/GNSS modules.
//!
//! The S76G and S78G expose a LoRaWAN stack, a raw LoRa radio and a GNSS
//! receiver behind one text command set on a UART. This crate bundles the
//! layers that talk to it.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte-at-a-time link abstraction (serial port, mock)
//! - [`frame`]: reply frame recovery and the hex payload codec
//! - [`driver`]: command correlation, RF events, typed commands and decoders
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "serial")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use s7xg::driver::{Device, GpsDataFormat};
//! use s7xg::transport::SerialLink;
//!
//! let link = SerialLink::open("/dev/ttyUSB0", 115_200)?;
//! let mut device = Device::new(link);
//! let model = device.begin()?;
//! println!("{model}: {:?}", device.gps_data(GpsDataFormat::Dd)?);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "serial"))]
//! # fn main() {}
//! ```

/// Re-export transport types.
pub mod transport {
    pub use s7xg_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use s7xg_frame::*;
}

/// Re-export driver types.
pub mod driver {
    pub use s7xg_driver::*;
}

pub use s7xg_driver::{Device, Driver, DriverConfig, DriverError, ErrorKind, RfEvent, Status};
