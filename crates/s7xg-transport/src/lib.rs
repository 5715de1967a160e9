//! Byte-level link abstraction for S7xG modules.
//!
//! The framing and correlation layers never touch a port directly. They see
//! the module only through two capabilities:
//! - [`ByteSink`]: write command text verbatim
//! - [`ByteSource`]: take one byte if one is available, without blocking
//!
//! This is the lowest layer of s7xg. Everything else builds on top of
//! [`ByteLink`].

pub mod error;
pub mod traits;

#[cfg(feature = "mock")]
pub mod mock;
#[cfg(feature = "serial")]
pub mod serial;

pub use error::{Result, TransportError};
pub use traits::{ByteLink, ByteSink, ByteSource, IoLink};

#[cfg(feature = "mock")]
pub use mock::MockLink;
#[cfg(feature = "serial")]
pub use serial::{SerialLink, DEFAULT_BAUD_RATE};
