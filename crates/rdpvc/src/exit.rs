use std::fmt;
use std::io;

use rdpvc_frame::{RecvError, SendError};
use rdpvc_transport::TransportError;

// Process exit codes. 64 follows sysexits EX_USAGE.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
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
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn send_error(context: &str, err: SendError) -> CliError {
    match err {
        SendError::Transport(err) => transport_error(context, err),
        SendError::UnknownChannel(_) | SendError::InvalidChunkSize(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        SendError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn recv_error(context: &str, err: RecvError) -> CliError {
    match err {
        RecvError::UnknownChannel(_) => CliError::new(USAGE, format!("{context}: {err}")),
        RecvError::ConsumerRejected { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_units_map_to_data_invalid() {
        let err = recv_error(
            "inspect failed",
            RecvError::LengthMismatch {
                declared: 4,
                actual: 3,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("inspect failed: "));
    }

    #[test]
    fn test_unknown_channel_is_usage_error() {
        assert_eq!(send_error("chunk", SendError::UnknownChannel(7)).code, USAGE);
        assert_eq!(recv_error("inspect", RecvError::UnknownChannel(7)).code, USAGE);
    }

    #[test]
    fn test_transport_failures_map_through() {
        let err = send_error("chunk", SendError::Transport(TransportError::Shutdown));
        assert_eq!(err.code, TRANSPORT_ERROR);

        let err = send_error(
            "chunk",
            SendError::Transport(TransportError::Io(io::Error::from(
                io::ErrorKind::PermissionDenied,
            ))),
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }
}
