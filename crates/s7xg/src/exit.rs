use std::fmt;
use std::io;

use s7xg_driver::{DriverError, ErrorKind};
use s7xg_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => USAGE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
}

pub fn driver_error(context: &str, err: DriverError) -> CliError {
    let code = match err.kind() {
        ErrorKind::Timeout => TIMEOUT,
        ErrorKind::Transport => TRANSPORT_ERROR,
        ErrorKind::InvalidArgument => USAGE,
        ErrorKind::InvalidCommand | ErrorKind::Protocol => FAILURE,
        ErrorKind::Decode | ErrorKind::BufferOverflow | ErrorKind::CapacityExceeded => {
            DATA_INVALID
        }
    };
    CliError::new(code, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use s7xg_driver::Status;
    use s7xg_frame::FrameError;

    use super::*;

    #[test]
    fn driver_errors_map_to_exit_codes() {
        let timeout = DriverError::Frame(FrameError::Timeout(Duration::from_secs(1)));
        assert_eq!(driver_error("x", timeout).code, TIMEOUT);

        let closed = DriverError::from(TransportError::Closed);
        assert_eq!(driver_error("x", closed).code, TRANSPORT_ERROR);

        let busy = DriverError::Protocol {
            command: "mac join otaa".to_string(),
            status: Status::Busy,
        };
        assert_eq!(driver_error("x", busy).code, FAILURE);

        let model = DriverError::UnexpectedReply {
            command: "sip get_hw_model".to_string(),
            reply: "S99X".to_string(),
        };
        assert_eq!(driver_error("x", model).code, DATA_INVALID);

        let arg = DriverError::InvalidArgument("port".to_string());
        assert_eq!(driver_error("x", arg).code, USAGE);
    }

    #[test]
    fn message_carries_context() {
        let err = transport_error("open failed", TransportError::Closed);
        assert_eq!(err.to_string(), "open failed: link closed");
    }
}
